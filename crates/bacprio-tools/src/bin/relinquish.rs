use bacprio_tools::{fail, ConnectionArgs, TargetArgs};
use clap::Parser;
use std::time::Duration;

/// Read a value, relinquish one priority slot, then read it again.
#[derive(Parser, Debug)]
#[command(name = "bacnet-relinquish")]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(flatten)]
    target: TargetArgs,
    /// Priority slot to release, 1 (highest) to 16.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
    priority: u8,
    /// Wait before the second read so the device can re-evaluate.
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let client = args.connection.connect().await?;
    let device = args.connection.device();
    let (object, property) = (args.target.object, args.target.property);

    let before = client
        .read_property(device, object, property)
        .await
        .unwrap_or_else(|e| fail("read failed", e));
    println!("{object} {property} before: {before}");

    if let Err(e) = client
        .write_property_null(device, object, property, args.priority)
        .await
    {
        fail("relinquish failed", e);
    }
    println!("relinquished priority {}", args.priority);

    tokio::time::sleep(Duration::from_millis(args.settle_ms)).await;

    let after = client
        .read_property(device, object, property)
        .await
        .unwrap_or_else(|e| fail("read failed", e));
    println!("{object} {property} after: {after}");
    Ok(())
}
