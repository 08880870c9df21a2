use futures::StreamExt;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Enable logging.
    let _ = tracing_subscriber::fmt::try_init();

    // Broadcast a GET_INFO and print every unit that answers.
    let bind_ip = [0, 0, 0, 0].into();
    let mut units = unitlink::discover::units(bind_ip).await?;

    let discovery = timeout(Duration::from_secs(5), async {
        while let Some(info) = units.next().await {
            println!(
                "{:<26} {:<15} {} fw {} board {}",
                info.name,
                info.header.ip,
                info.mac_string(),
                info.firmware_version(),
                info.header.barcode,
            );
        }
    });

    match discovery.await {
        Ok(_) => println!("Discovery complete"),
        Err(_) => println!("Discovery timeout"),
    }

    Ok(())
}
