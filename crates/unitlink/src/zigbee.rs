//! Zigbee pairing and device management.

use crate::core::cmds::zigbee as cmds;
use crate::core::frame;
use crate::core::zigbee::{self, IeeeAddress, ZigbeeControl, ZigbeeDevice};
use crate::transport::{Collect, Request};
use crate::{Client, ClientError};
use futures::StreamExt;
use std::time::Duration;

/// How long the close command is given to leave before its endpoint is released.
const CLOSE_LINGER: Duration = Duration::from_millis(100);

/// Result of [`Client::zigbee_explore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZigbeeExploration {
    /// Whether a device joined before the timeout.
    pub success: bool,
    pub device: Option<ZigbeeDevice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExploreState {
    OpeningNetwork,
    AwaitingDevice,
}

/// The exploration result once the network has been closed. A failed close
/// is logged and does not discard a joined device.
fn conclude(device: Option<ZigbeeDevice>, closed: Result<(), ClientError>) -> ZigbeeExploration {
    if let Err(err) = closed {
        tracing::warn!("Failed to close the network after exploring: {err}");
    }
    ZigbeeExploration {
        success: device.is_some(),
        device,
    }
}

impl Client {
    /// Open the network for `permit_seconds` and wait for one device to join.
    ///
    /// The network is closed again once a device announces itself, and also
    /// when none arrives within the configured Zigbee timeout. Finding no
    /// device is not an error: the result then has `success` unset.
    /// Announcements are only accepted after the unit acknowledged the open.
    #[tracing::instrument(skip(self))]
    pub async fn zigbee_explore(&self, permit_seconds: u8) -> Result<ZigbeeExploration, ClientError> {
        let payload = zigbee::open_payload(permit_seconds)?;
        // The open acknowledgement is a lone zero byte, so it must not end the exchange.
        let collect = Collect::new(cmds::OPEN_NETWORK, &payload, self.config().zigbee_timeout)
            .also_accept(cmds::NEW_DEVICE)
            .through_sentinel();
        let mut frames = self.stream(collect).await?;

        let mut state = ExploreState::OpeningNetwork;
        let mut device = None;
        while let Some(frame) = frames.next().await {
            let frame = frame?;
            if frame.command == cmds::OPEN_NETWORK {
                frame::check_status(&frame)?;
                if state == ExploreState::OpeningNetwork {
                    tracing::debug!("Network open, awaiting a device");
                    state = ExploreState::AwaitingDevice;
                }
                continue;
            }
            if state != ExploreState::AwaitingDevice {
                tracing::warn!("Ignoring device announcement before the network opened");
                continue;
            }
            match ZigbeeDevice::try_from(&frame.payload[..]) {
                Ok(joined) => {
                    tracing::info!("Device {} joined", joined.ieee);
                    device = Some(joined);
                    break;
                }
                Err(err) => tracing::warn!("Ignoring malformed device announcement: {err}"),
            }
        }
        // Dropping the stream ends the collector and releases its endpoint.
        drop(frames);

        if device.is_none() {
            tracing::info!("No device joined ({state:?}), closing network");
        }
        let closed = self.zigbee_close_network().await;
        Ok(conclude(device, closed))
    }

    /// Stop accepting joins. No reply is awaited.
    #[tracing::instrument(skip(self))]
    pub async fn zigbee_close_network(&self) -> Result<(), ClientError> {
        self.send_only(cmds::CLOSE_NETWORK, &[], CLOSE_LINGER).await
    }

    /// Every device joined to the unit's network.
    #[tracing::instrument(skip(self))]
    pub async fn zigbee_devices(&self) -> Result<Vec<ZigbeeDevice>, ClientError> {
        let collected = self.collect_all(cmds::GET_DEVICES).await?;
        Ok(collected.decode_each(ZigbeeDevice::decode_all)?)
    }

    /// Remove a device from the network.
    #[tracing::instrument(skip(self))]
    pub async fn zigbee_delete(&self, ieee: IeeeAddress) -> Result<(), ClientError> {
        let payload = zigbee::delete_payload(ieee);
        self.request(Request::new(cmds::DELETE_DEVICE, &payload))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn zigbee_control(&self, control: &ZigbeeControl) -> Result<(), ClientError> {
        let payload = control.to_payload()?;
        self.request(Request::new(cmds::CONTROL, &payload))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::zigbee::{Endpoint, IeeeAddress};

    fn joined() -> ZigbeeDevice {
        ZigbeeDevice {
            ieee: IeeeAddress([0x00, 0x12, 0x4B, 0x00, 0x1C, 0xA1, 0x7E, 0x01]),
            device_type: 0x01,
            endpoints: vec![Endpoint { id: 1, address: 0x3A2F }],
        }
    }

    #[test]
    fn test_close_failure_keeps_device() {
        let exploration = conclude(Some(joined()), Err(ClientError::Cancelled));
        assert!(exploration.success);
        assert_eq!(exploration.device, Some(joined()));
    }

    #[test]
    fn test_close_failure_without_device() {
        let exploration = conclude(None, Err(ClientError::Timeout(Duration::from_millis(100))));
        assert_eq!(exploration, ZigbeeExploration::default());
    }
}
