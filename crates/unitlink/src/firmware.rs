//! Firmware update workflow.
//!
//! Validate the image against the unit's board, send the version header,
//! stream the body in packets, send the checksum, then poll until the unit
//! reports running the new firmware.

use crate::core::cmds::general;
use crate::core::firmware::{self, FirmwareImage};
use crate::transport::Request;
use crate::{Client, ClientError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

/// Step of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwarePhase {
    ValidatingImage,
    SendingHeader,
    StreamingBody,
    SendingChecksum,
    AwaitingReboot,
    Done,
    Failed,
}

impl FirmwarePhase {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            FirmwarePhase::ValidatingImage => "Validating image",
            FirmwarePhase::SendingHeader => "Sending header",
            FirmwarePhase::StreamingBody => "Sending firmware",
            FirmwarePhase::SendingChecksum => "Sending checksum",
            FirmwarePhase::AwaitingReboot => "Waiting for reboot",
            FirmwarePhase::Done => "Update complete",
            FirmwarePhase::Failed => "Update failed",
        }
    }
}

/// Progress of an update, published at every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareProgress {
    pub phase: FirmwarePhase,
    /// 0-100.
    pub percent: u8,
}

impl Default for FirmwareProgress {
    fn default() -> Self {
        Self {
            phase: FirmwarePhase::ValidatingImage,
            percent: 0,
        }
    }
}

const BODY_START: usize = 5;
const BODY_END: usize = 90;

fn report(progress: &watch::Sender<FirmwareProgress>, phase: FirmwarePhase, percent: usize) {
    let percent = percent.min(100) as u8;
    tracing::info!("{} ({percent}%)", phase.label());
    progress.send_replace(FirmwareProgress { phase, percent });
}

impl Client {
    /// Flash `image` (the text of a firmware file) onto the unit.
    ///
    /// `unit_barcode` is the barcode the unit reports in [`Client::info`]; an
    /// image built for another board fails with
    /// [`ClientError::BoardMismatch`] before anything is sent.
    #[tracing::instrument(skip(self, image, progress))]
    pub async fn update_firmware(
        &self,
        image: &str,
        unit_barcode: &str,
        progress: &watch::Sender<FirmwareProgress>,
    ) -> Result<(), ClientError> {
        let result = self.run_update(image, unit_barcode, progress).await;
        match &result {
            Ok(()) => report(progress, FirmwarePhase::Done, 100),
            Err(err) => {
                tracing::warn!("Firmware update failed: {err}");
                let percent = progress.borrow().percent.into();
                report(progress, FirmwarePhase::Failed, percent);
            }
        }
        result
    }

    async fn run_update(
        &self,
        image: &str,
        unit_barcode: &str,
        progress: &watch::Sender<FirmwareProgress>,
    ) -> Result<(), ClientError> {
        let timing = &self.config().firmware;

        report(progress, FirmwarePhase::ValidatingImage, 0);
        let image = FirmwareImage::parse(image)?;
        match &image.header {
            Some(header) if !image.matches_board(unit_barcode) => {
                return Err(ClientError::BoardMismatch {
                    expected: unit_barcode.trim().to_string(),
                    actual: header.barcode.clone(),
                });
            }
            Some(_) => {}
            None => tracing::warn!("Firmware image has no header line, skipping board check"),
        }

        let mut packet = 0;
        if let Some(header) = &image.header {
            report(progress, FirmwarePhase::SendingHeader, 2);
            self.send_firmware_packet(packet, &header.version).await?;
            packet += 1;
        }

        let body = image.packets();
        tracing::debug!(
            "Image has {} body bytes in {} packets",
            image.body_len(),
            body.len()
        );
        report(progress, FirmwarePhase::StreamingBody, BODY_START);
        for (i, chunk) in body.iter().enumerate() {
            self.send_firmware_packet(packet, chunk).await?;
            packet += 1;
            let percent = BODY_START + (BODY_END - BODY_START) * (i + 1) / body.len();
            report(progress, FirmwarePhase::StreamingBody, percent);
        }

        report(progress, FirmwarePhase::SendingChecksum, 92);
        self.send_firmware_packet(packet, &image.checksum_payload())
            .await?;

        report(progress, FirmwarePhase::AwaitingReboot, 95);
        let settle = timing.settle_time(image.lines.len());
        tracing::debug!("Waiting {settle:?} for the unit to apply the update");
        self.pause(settle).await?;
        self.await_new_firmware().await
    }

    /// Send one firmware packet, retrying with backoff.
    async fn send_firmware_packet(&self, packet: usize, payload: &[u8]) -> Result<(), ClientError> {
        let timing = &self.config().firmware;
        let mut attempts = 0;
        loop {
            attempts += 1;
            let request = Request::new(general::FIRMWARE, payload).with_timeout(timing.packet_timeout);
            match self.request(request).await {
                Ok(_) => return Ok(()),
                Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
                Err(err) if attempts >= timing.retries => {
                    return Err(ClientError::TransferFailed {
                        packet,
                        attempts,
                        source: Box::new(err),
                    });
                }
                Err(err) => {
                    tracing::warn!("Firmware packet {packet} attempt {attempts} failed: {err}");
                    self.pause(timing.backoff).await?;
                }
            }
        }
    }

    /// Poll the unit's status until it reports the new firmware.
    ///
    /// Polls start one interval apart whether the previous one was answered
    /// or timed out.
    async fn await_new_firmware(&self) -> Result<(), ClientError> {
        let timing = &self.config().firmware;
        // `interval` rejects a zero period.
        let mut ticks = time::interval(timing.poll_interval.max(Duration::from_millis(1)));
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        for attempt in 1..=timing.poll_attempts {
            tokio::select! {
                biased;
                _ = self.cancellation_token().cancelled() => return Err(ClientError::Cancelled),
                _ = ticks.tick() => {}
            }
            let request = Request::get(general::GET_STATUS, &[]).with_timeout(timing.poll_interval);
            match self.request(request).await {
                Ok(frame) if firmware::is_confirmed(&frame.payload) => {
                    tracing::debug!("Update confirmed on poll {attempt}");
                    // Slave units answer early but need longer to resume.
                    if attempt <= 3 {
                        self.pause(timing.early_grace).await?;
                    }
                    return Ok(());
                }
                Ok(frame) => tracing::debug!("Poll {attempt}: status {:?}", frame.payload.first()),
                Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
                Err(err) => tracing::debug!("Poll {attempt} failed: {err}"),
            }
        }
        Err(ClientError::FirmwareNotConfirmed {
            attempts: timing.poll_attempts,
        })
    }
}
