//! Read the present value of analog-output 1 and relinquish priority 8.
//!
//! Usage:
//!   cargo run -p bacprio-client --example read_property -- --ip 192.168.1.100

use bacprio_client::{BacnetClient, ClientConfig};
use bacprio_core::types::{ObjectId, ObjectType, PropertyId};
use bacprio_datalink::DataLinkAddress;
use std::net::IpAddr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let ip: IpAddr = std::env::args()
        .skip_while(|a| a != "--ip")
        .nth(1)
        .ok_or("usage: --ip <device-ip>")?
        .parse()?;

    // BACNET_BIND etc. override the defaults (0.0.0.0:47808, 3 s, 3 retries).
    let client = BacnetClient::with_config(ClientConfig::from_env()?).await?;

    let addr = DataLinkAddress::bacnet_default(ip);
    let object_id = ObjectId::new(ObjectType::AnalogOutput, 1);

    let before = client
        .read_property(addr, object_id, PropertyId::PresentValue)
        .await?;
    println!("{object_id} present-value: {before}");

    client
        .write_property_null(addr, object_id, PropertyId::PresentValue, 8)
        .await?;

    let after = client
        .read_property(addr, object_id, PropertyId::PresentValue)
        .await?;
    println!("{object_id} present-value after relinquish: {after}");
    Ok(())
}
