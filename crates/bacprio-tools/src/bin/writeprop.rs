use bacprio_core::services::{PropertyValue, WritePropertyRequest};
use bacprio_core::types::DataValue;
use bacprio_tools::{fail, ConnectionArgs, TargetArgs};
use clap::Parser;

/// Write a Real, or relinquish a priority with `--null`.
#[derive(Parser, Debug)]
#[command(name = "bacnet-writeprop")]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(flatten)]
    target: TargetArgs,
    /// Command priority, 1 (highest) to 16.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
    priority: u8,
    #[arg(long, required_unless_present = "null", conflicts_with = "null")]
    value: Option<f32>,
    /// Write Null, releasing the priority slot.
    #[arg(long)]
    null: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let client = args.connection.connect().await?;
    let device = args.connection.device();

    let result = match args.value {
        Some(value) => {
            let request = WritePropertyRequest {
                object_id: args.target.object,
                property_id: args.target.property,
                value: PropertyValue::Application(DataValue::Real(value)),
                priority: Some(args.priority),
                ..Default::default()
            };
            client.write_property(device, request).await
        }
        None => {
            client
                .write_property_null(
                    device,
                    args.target.object,
                    args.target.property,
                    args.priority,
                )
                .await
        }
    };

    match result {
        Ok(()) => println!(
            "{} {} written at priority {}",
            args.target.object, args.target.property, args.priority
        ),
        Err(e) => fail("write failed", e),
    }
    Ok(())
}
