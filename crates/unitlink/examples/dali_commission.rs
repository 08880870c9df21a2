//! Commission the DALI bus of one unit, printing events as they arrive.
//!
//! Usage: `dali_commission <unit ip> <device address>`, e.g.
//! `dali_commission 192.168.1.40 0.0.1.1`.

use futures::StreamExt;
use unitlink::core::dali::CommissionMode;
use unitlink::core::DeviceAddress;
use unitlink::{Client, DaliEvent, DaliReport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Enable logging.
    let _ = tracing_subscriber::fmt::try_init();

    let mut args = std::env::args().skip(1);
    let (Some(ip), Some(address)) = (args.next(), args.next()) else {
        eprintln!("usage: dali_commission <unit ip> <device address>");
        return Ok(());
    };
    let address: DeviceAddress = address.parse()?;
    let client = Client::new(ip.parse()?, address);

    let mut report = DaliReport::default();
    let mut events = client.dali_commission_events(CommissionMode::Extend).await?;
    while let Some(event) = events.next().await {
        let event = event?;
        match &event {
            DaliEvent::CountChanged { old, new } => println!("Device count {old} -> {new}"),
            DaliEvent::Conflict(address) => println!("Conflict on short address {address}"),
            DaliEvent::Devices(devices) => {
                for device in devices {
                    println!("{device:?}");
                }
            }
            DaliEvent::Complete => println!("Commissioning complete"),
        }
        report.apply(event);
    }

    if !report.conflicts.is_empty() {
        tracing::info!("Resolving {} conflicts", report.conflicts.len());
        let resolved = client.dali_resolve_conflicts(&report.conflicts).await?;
        for outcome in &resolved.outcomes {
            match &outcome.error {
                None => println!("Resolved {}", outcome.address),
                Some(err) => println!("Could not resolve {}: {err}", outcome.address),
            }
        }
    }

    Ok(())
}
