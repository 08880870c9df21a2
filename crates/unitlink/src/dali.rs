//! DALI commissioning, scanning and device settings.
//!
//! Commissioning and scanning are collector exchanges that can run for
//! minutes. The unit interleaves device-count and address-conflict
//! notifications with the device data, so every inbound frame is classified
//! into a [`DaliEvent`] before anything is accumulated.

use crate::core::cmds::{self, Command};
use crate::core::dali::{self, CommissionMode, DaliDevice, DaliPacket, DaliTarget, SCENES};
use crate::transport::{Collect, FrameStream, Request};
use crate::{Client, ClientError};
use futures::future;
use futures::stream::{BoxStream, StreamExt};

/// One classified packet of a commissioning or scan exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaliEvent {
    /// The number of devices on the bus changed.
    CountChanged { old: u8, new: u8 },
    /// Two devices answered on the same short address.
    Conflict(u8),
    /// Device records, numbered across the whole exchange.
    Devices(Vec<DaliDevice>),
    /// The unit finished; no further events follow.
    Complete,
}

/// Result of a commissioning or scan exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaliReport {
    /// Whether the unit signalled completion before the timeout.
    pub success: bool,
    pub devices: Vec<DaliDevice>,
    /// Conflicting short addresses, each listed once in order of first report.
    pub conflicts: Vec<u8>,
}

impl DaliReport {
    /// Fold an event into the report.
    pub fn apply(&mut self, event: DaliEvent) {
        match event {
            DaliEvent::CountChanged { old, new } => {
                tracing::debug!("DALI device count changed from {old} to {new}");
            }
            DaliEvent::Conflict(address) => {
                if !self.conflicts.contains(&address) {
                    self.conflicts.push(address);
                }
            }
            DaliEvent::Devices(devices) => self.devices.extend(devices),
            DaliEvent::Complete => self.success = true,
        }
    }
}

/// Outcome of resolving one conflicting address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictOutcome {
    pub address: u8,
    /// `None` when the unit accepted the resolution, otherwise the failure.
    pub error: Option<String>,
}

impl ConflictOutcome {
    pub fn is_resolved(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-address results of [`Client::dali_resolve_conflicts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    pub outcomes: Vec<ConflictOutcome>,
}

impl ConflictReport {
    /// Whether every address was resolved.
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(ConflictOutcome::is_resolved)
    }

    /// The addresses that could not be resolved.
    pub fn unresolved(&self) -> Vec<u8> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_resolved())
            .map(|o| o.address)
            .collect()
    }

    /// The resolved addresses, or [`ClientError::ConflictUnresolved`] naming the rest.
    pub fn into_result(self) -> Result<Vec<u8>, ClientError> {
        let unresolved = self.unresolved();
        if !unresolved.is_empty() {
            return Err(ClientError::ConflictUnresolved {
                addresses: unresolved,
            });
        }
        Ok(self.outcomes.into_iter().map(|o| o.address).collect())
    }
}

/// Classified events of a commissioning or scan exchange.
pub type DaliEvents = BoxStream<'static, Result<DaliEvent, ClientError>>;

/// Classify the frames of a DALI collector exchange, numbering device
/// records across frames.
fn classify(frames: FrameStream) -> DaliEvents {
    frames
        .scan(0usize, |next_index, frame| {
            let event = frame.and_then(|frame| {
                if frame.is_sentinel() {
                    return Ok(DaliEvent::Complete);
                }
                let event = match DaliPacket::classify(&frame.payload, *next_index)? {
                    DaliPacket::CountChanged { old, new } => DaliEvent::CountChanged { old, new },
                    DaliPacket::Conflict(address) => {
                        tracing::warn!("DALI address conflict on {address}");
                        DaliEvent::Conflict(address)
                    }
                    DaliPacket::Devices(devices) => {
                        *next_index += devices.len();
                        DaliEvent::Devices(devices)
                    }
                };
                Ok(event)
            });
            future::ready(Some(event))
        })
        .boxed()
}

/// Drain an event stream into a report.
pub async fn report(mut events: DaliEvents) -> Result<DaliReport, ClientError> {
    let mut report = DaliReport::default();
    while let Some(event) = events.next().await {
        report.apply(event?);
    }
    if !report.success {
        tracing::warn!("DALI exchange timed out with {} devices", report.devices.len());
    }
    Ok(report)
}

impl Client {
    /// Commission the bus, streaming each classified packet as it arrives.
    ///
    /// Keepalives are sent for the whole exchange. The stream ends after
    /// [`DaliEvent::Complete`] or at the commissioning timeout.
    #[tracing::instrument(skip(self))]
    pub async fn dali_commission_events(&self, mode: CommissionMode) -> Result<DaliEvents, ClientError> {
        let timing = &self.config().dali;
        let payload = mode.to_payload();
        let collect = Collect::new(cmds::dali::COMMISSION, &payload, timing.commission_timeout)
            .with_keepalive(timing.keepalive);
        Ok(classify(self.stream(collect).await?))
    }

    /// Commission the bus and gather the devices and conflicts it reports.
    pub async fn dali_commission(&self, mode: CommissionMode) -> Result<DaliReport, ClientError> {
        report(self.dali_commission_events(mode).await?).await
    }

    /// Scan the bus, streaming each classified packet as it arrives.
    #[tracing::instrument(skip(self))]
    pub async fn dali_scan_events(&self) -> Result<DaliEvents, ClientError> {
        let collect = Collect::new(cmds::dali::SCAN, &[], self.config().dali.scan_timeout);
        Ok(classify(self.stream(collect).await?))
    }

    /// Re-read the devices already addressed on the bus.
    pub async fn dali_scan(&self) -> Result<DaliReport, ClientError> {
        report(self.dali_scan_events().await?).await
    }

    /// Ask the unit to re-address each conflicting device, one at a time.
    ///
    /// Every address is validated before anything is sent. Failures are
    /// recorded per address rather than aborting the rest, except
    /// cancellation.
    #[tracing::instrument(skip(self))]
    pub async fn dali_resolve_conflicts(&self, addresses: &[u8]) -> Result<ConflictReport, ClientError> {
        let payloads = addresses
            .iter()
            .map(|&address| dali::conflict_payload(address))
            .collect::<Result<Vec<_>, _>>()?;
        let mut report = ConflictReport::default();
        for (&address, payload) in addresses.iter().zip(&payloads) {
            let request = Request::new(cmds::dali::RESOLVE_CONFLICT, payload).wait_after_busy();
            let error = match self.request(request).await {
                Ok(_) => None,
                Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
                Err(err) => {
                    tracing::warn!("Conflict on {address} not resolved: {err}");
                    Some(err.to_string())
                }
            };
            report.outcomes.push(ConflictOutcome { address, error });
        }
        Ok(report)
    }

    #[tracing::instrument(skip(self))]
    pub async fn dali_set_level(&self, target: DaliTarget, level: u8) -> Result<(), ClientError> {
        let payload = dali::level_payload(target, level)?;
        self.dali_command(cmds::dali::SET_LEVEL, &payload).await
    }

    /// Replace the group membership of one device.
    #[tracing::instrument(skip(self))]
    pub async fn dali_set_groups(&self, address: u8, groups: &[u8]) -> Result<(), ClientError> {
        let payload = dali::groups_payload(address, groups)?;
        self.dali_command(cmds::dali::SET_GROUPS, &payload).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn dali_set_scenes(
        &self,
        address: u8,
        scenes: &[Option<u8>; SCENES],
    ) -> Result<(), ClientError> {
        let payload = dali::scenes_payload(address, scenes)?;
        self.dali_command(cmds::dali::SET_SCENES, &payload).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn dali_set_fade(&self, address: u8, fade_time: u8, fade_rate: u8) -> Result<(), ClientError> {
        let payload = dali::fade_payload(address, fade_time, fade_rate)?;
        self.dali_command(cmds::dali::SET_FADE, &payload).await
    }

    async fn dali_command(&self, command: Command, payload: &[u8]) -> Result<(), ClientError> {
        self.request(Request::new(command, payload).wait_after_busy())
            .await?;
        Ok(())
    }
}
