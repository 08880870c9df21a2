//! Client configuration.
//!
//! Every timing used by the long-running workflows lives here so callers
//! (and tests) can shorten or lengthen them.

use crate::core::{port, ProtocolConfig};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Timings of the firmware update workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareTiming {
    /// Reply timeout of each firmware packet.
    pub packet_timeout: Duration,
    /// Attempts per packet before the transfer fails.
    pub retries: u32,
    /// Pause between attempts of the same packet.
    pub backoff: Duration,
    /// Settle time per body line before polling starts.
    pub settle_per_line: Duration,
    pub min_settle: Duration,
    pub max_settle: Duration,
    pub poll_attempts: u32,
    pub poll_interval: Duration,
    /// Extra wait when the unit confirms within the first three polls.
    pub early_grace: Duration,
}

impl Default for FirmwareTiming {
    fn default() -> Self {
        Self {
            packet_timeout: Duration::from_secs(10),
            retries: 6,
            backoff: Duration::from_millis(300),
            settle_per_line: Duration::from_millis(50),
            min_settle: Duration::from_secs(5),
            max_settle: Duration::from_secs(30),
            poll_attempts: 10,
            poll_interval: Duration::from_secs(1),
            early_grace: Duration::from_secs(8),
        }
    }
}

impl FirmwareTiming {
    /// Time to wait after the checksum packet before polling for the reboot.
    pub fn settle_time(&self, lines: usize) -> Duration {
        let lines = u32::try_from(lines).unwrap_or(u32::MAX);
        self.settle_per_line
            .saturating_mul(lines)
            .clamp(self.min_settle, self.max_settle)
    }

    /// Timings with every wait shortened to `step`, for exercising the workflow quickly.
    pub fn immediate(step: Duration) -> Self {
        Self {
            packet_timeout: step,
            retries: 6,
            backoff: step,
            settle_per_line: Duration::ZERO,
            min_settle: Duration::ZERO,
            max_settle: Duration::ZERO,
            poll_attempts: 10,
            poll_interval: step,
            early_grace: Duration::ZERO,
        }
    }
}

/// Timings of the DALI commissioning and scan exchanges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaliTiming {
    pub commission_timeout: Duration,
    pub scan_timeout: Duration,
    /// Interval of the keepalive datagrams sent while commissioning.
    pub keepalive: Duration,
}

impl Default for DaliTiming {
    fn default() -> Self {
        Self {
            commission_timeout: Duration::from_secs(6 * 60),
            scan_timeout: Duration::from_secs(3 * 60),
            keepalive: Duration::from_secs(60),
        }
    }
}

/// Settings shared by every call a [`crate::Client`] makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Local address each per-call endpoint binds to.
    pub bind_ip: IpAddr,
    /// Unit port.
    pub port: u16,
    /// Default reply timeout of a single exchange.
    pub timeout: Duration,
    pub protocol: ProtocolConfig,
    pub firmware: FirmwareTiming,
    pub dali: DaliTiming,
    /// How long a Zigbee exploration waits for a device to join.
    pub zigbee_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: port::UNIT,
            timeout: Duration::from_secs(5),
            protocol: ProtocolConfig::default(),
            firmware: FirmwareTiming::default(),
            dali: DaliTiming::default(),
            zigbee_timeout: Duration::from_secs(200),
        }
    }
}

impl ClientConfig {
    pub fn with_bind_ip(mut self, bind_ip: IpAddr) -> Self {
        self.bind_ip = bind_ip;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_protocol(mut self, protocol: ProtocolConfig) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_firmware(mut self, firmware: FirmwareTiming) -> Self {
        self.firmware = firmware;
        self
    }

    pub fn with_dali(mut self, dali: DaliTiming) -> Self {
        self.dali = dali;
        self
    }

    pub fn with_zigbee_timeout(mut self, timeout: Duration) -> Self {
        self.zigbee_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_time_clamped() {
        let timing = FirmwareTiming::default();
        assert_eq!(timing.settle_time(0), Duration::from_secs(5));
        assert_eq!(timing.settle_time(200), Duration::from_secs(10));
        assert_eq!(timing.settle_time(100_000), Duration::from_secs(30));
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.port, 6000);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.dali.commission_timeout, Duration::from_secs(360));
        assert_eq!(config.firmware.retries, 6);
        assert!(!config.protocol.send_name);
    }
}
