//! Unit discovery and cross-subnet IP changes over broadcast.
//!
//! Both operations address every unit at once with the broadcast device
//! address, so they work before a unit's IP or device address is known.

use crate::core::frame::{self, MAX_DATAGRAM_SIZE};
use crate::core::general::{NetworkSettings, UnitInfo};
use crate::core::{cmds, port, DeviceAddress, DEFAULT_BROADCAST_ADDR};
use crate::transport::{self, Endpoint, Request};
use crate::ClientError;
use futures::Stream;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

/// The limited broadcast address on the broadcast port.
pub fn broadcast_target() -> SocketAddr {
    SocketAddr::new(DEFAULT_BROADCAST_ADDR.into(), port::BROADCAST)
}

/// Discover units on the local network.
///
/// Returns a stream yielding each distinct unit that answers, keyed by MAC.
/// A unit is yielded again only if its reported info changes. The stream
/// never ends on its own; bound it with a timeout.
///
/// # Example
///
/// ```no_run
/// use futures::StreamExt;
/// use std::time::Duration;
/// use tokio::time::timeout;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut units = unitlink::discover::units([0, 0, 0, 0].into()).await?;
///     let discovery = timeout(Duration::from_secs(3), async {
///         while let Some(info) = units.next().await {
///             println!("{} at {} ({})", info.name, info.header.ip, info.mac_string());
///         }
///     });
///     let _ = discovery.await;
///     Ok(())
/// }
/// ```
pub async fn units(bind_ip: IpAddr) -> Result<impl Stream<Item = UnitInfo>, ClientError> {
    units_at(bind_ip, broadcast_target()).await
}

/// Like [`units`], querying `target` rather than the broadcast address.
#[tracing::instrument]
pub async fn units_at(
    bind_ip: IpAddr,
    target: SocketAddr,
) -> Result<impl Stream<Item = UnitInfo>, ClientError> {
    let endpoint = Endpoint::open(bind_ip, target, true).await?;
    endpoint
        .send_frame(DeviceAddress::BROADCAST, cmds::general::GET_INFO, &[])
        .await?;

    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(async move {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut discovered = HashMap::new();
        loop {
            let len = tokio::select! {
                _ = tx.closed() => break,
                res = endpoint.recv(&mut buf) => match res {
                    Ok(len) => len,
                    Err(err) => {
                        tracing::debug!("Failed to recv on discovery endpoint: {err}");
                        break;
                    }
                },
            };
            let info = match frame::decode(&buf[..len], cmds::general::GET_INFO, true)
                .map_err(ClientError::from)
                .and_then(|frame| Ok(UnitInfo::try_from(&frame.payload[..])?))
            {
                Ok(info) => info,
                Err(err) => {
                    tracing::warn!("Ignoring discovery reply: {err}");
                    continue;
                }
            };
            let key = info.header.mac;
            if discovered.get(&key) != Some(&info) {
                tracing::debug!("Discovered unit {} at {}", info.mac_string(), info.header.ip);
                discovered.insert(key, info.clone());
                if tx.send(info).await.is_err() {
                    break;
                }
            }
        }
        tracing::debug!("Closing discovery stream");
    });

    Ok(ReceiverStream::new(rx))
}

/// Change the network settings of the unit with `settings.mac`, wherever it is.
///
/// The unit need not be reachable on its current IP; the command is
/// broadcast and the unit matching the MAC applies it and acknowledges.
pub async fn change_ip(
    bind_ip: IpAddr,
    settings: &NetworkSettings,
    timeout: Duration,
) -> Result<(), ClientError> {
    change_ip_at(bind_ip, broadcast_target(), settings, timeout).await
}

/// Like [`change_ip`], sending to `target` rather than the broadcast address.
#[tracing::instrument(skip(settings), fields(ip = %settings.ip))]
pub async fn change_ip_at(
    bind_ip: IpAddr,
    target: SocketAddr,
    settings: &NetworkSettings,
    timeout: Duration,
) -> Result<(), ClientError> {
    let payload = settings.to_payload();
    let request = Request::new(cmds::general::SET_IP, &payload);
    let endpoint = Endpoint::open(bind_ip, target, true).await?;
    endpoint
        .send_frame(DeviceAddress::BROADCAST, request.command, request.payload)
        .await?;
    transport::await_reply(&endpoint, &request, timeout, &CancellationToken::new()).await?;
    Ok(())
}
