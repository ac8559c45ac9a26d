use bacprio_tools::{fail, ConnectionArgs, TargetArgs};
use clap::Parser;

/// Read one property and print its value.
#[derive(Parser, Debug)]
#[command(name = "bacnet-readprop")]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(flatten)]
    target: TargetArgs,
    /// Array index, e.g. a priority-array slot.
    #[arg(long)]
    index: Option<u32>,
    /// Print the full result as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let client = args.connection.connect().await?;

    let result = client
        .read_property_full(
            args.connection.device(),
            args.target.object,
            args.target.property,
            args.index,
        )
        .await;

    match result {
        Ok(r) if args.json => println!("{}", serde_json::to_string_pretty(&r)?),
        Ok(r) => println!("{} {}: {}", r.object_id, r.property_id, r.value),
        Err(e) => fail("read failed", e),
    }
    Ok(())
}
