//! Zigbee mesh device records and control.

use crate::error::{DecodeError, ValidationError};
use crate::fields::{require, take};
use crate::limits;
use std::fmt;

/// Maximum endpoints reported per device.
pub const MAX_ENDPOINTS: usize = 4;

/// A 64-bit IEEE (MAC) address, as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IeeeAddress(pub [u8; 8]);

impl fmt::Display for IeeeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// An application endpoint on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub id: u8,
    pub address: u16,
}

/// A device joined to the unit's network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZigbeeDevice {
    pub ieee: IeeeAddress,
    pub device_type: u8,
    pub endpoints: Vec<Endpoint>,
}

impl ZigbeeDevice {
    pub const SIZE: usize = 22;

    /// Decode every record in a GET_DEVICES data frame.
    pub fn decode_all(payload: &[u8]) -> Result<Vec<Self>, DecodeError> {
        require("zigbee device", payload, Self::SIZE)?;
        payload
            .chunks_exact(Self::SIZE)
            .map(ZigbeeDevice::try_from)
            .collect()
    }

    /// Encode the record, as a unit would send it.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..8].copy_from_slice(&self.ieee.0);
        bytes[8] = self.device_type;
        let count = self.endpoints.len().min(MAX_ENDPOINTS);
        bytes[9] = count as u8;
        for (slot, endpoint) in bytes[10..].chunks_exact_mut(3).zip(&self.endpoints[..count]) {
            let [lo, hi] = endpoint.address.to_le_bytes();
            slot.copy_from_slice(&[endpoint.id, lo, hi]);
        }
        bytes
    }
}

impl TryFrom<&[u8]> for ZigbeeDevice {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let record = take::<{ ZigbeeDevice::SIZE }>("zigbee device", bytes)?;
        let mut ieee = [0u8; 8];
        ieee.copy_from_slice(&record[..8]);
        let count = usize::from(record[9]).min(MAX_ENDPOINTS);
        let endpoints = record[10..]
            .chunks_exact(3)
            .take(count)
            .map(|slot| Endpoint {
                id: slot[0],
                address: u16::from_le_bytes([slot[1], slot[2]]),
            })
            .collect();
        Ok(ZigbeeDevice {
            ieee: IeeeAddress(ieee),
            device_type: record[8],
            endpoints,
        })
    }
}

/// Payload for OPEN_NETWORK: how long the unit accepts joins.
pub fn open_payload(seconds: u8) -> Result<Vec<u8>, ValidationError> {
    limits::ZIGBEE_PERMIT_SECONDS.check(seconds)?;
    Ok(vec![seconds])
}

/// Payload for DELETE_DEVICE.
pub fn delete_payload(ieee: IeeeAddress) -> Vec<u8> {
    ieee.0.to_vec()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZigbeeAction {
    Off,
    On,
    /// Percent, 0-100.
    Level(u8),
}

/// A control command for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZigbeeControl {
    pub ieee: IeeeAddress,
    pub endpoint: u8,
    pub action: ZigbeeAction,
}

impl ZigbeeControl {
    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        let (action, level) = match self.action {
            ZigbeeAction::Off => (0, 0),
            ZigbeeAction::On => (1, 0),
            ZigbeeAction::Level(level) => {
                limits::LEVEL.check(level)?;
                (2, level)
            }
        };
        let mut buf = Vec::with_capacity(11);
        buf.extend_from_slice(&self.ieee.0);
        buf.extend_from_slice(&[self.endpoint, action, level]);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IEEE: IeeeAddress = IeeeAddress([0x00, 0x12, 0x4B, 0x00, 0x1C, 0xA1, 0x7E, 0x01]);

    #[test]
    fn test_decode_device() {
        let mut bytes = vec![0u8; ZigbeeDevice::SIZE];
        bytes[..8].copy_from_slice(&IEEE.0);
        bytes[8] = 0x01;
        bytes[9] = 2;
        bytes[10..13].copy_from_slice(&[1, 0x34, 0x12]);
        bytes[13..16].copy_from_slice(&[2, 0x35, 0x12]);
        let device = ZigbeeDevice::try_from(&bytes[..]).unwrap();
        assert_eq!(device.ieee, IEEE);
        assert_eq!(device.device_type, 0x01);
        assert_eq!(
            device.endpoints,
            [
                Endpoint { id: 1, address: 0x1234 },
                Endpoint { id: 2, address: 0x1235 }
            ]
        );
        assert_eq!(device.to_bytes()[..], bytes[..]);
    }

    #[test]
    fn test_endpoint_count_capped() {
        let mut bytes = [0u8; ZigbeeDevice::SIZE];
        bytes[9] = 9;
        let device = ZigbeeDevice::try_from(&bytes[..]).unwrap();
        assert_eq!(device.endpoints.len(), MAX_ENDPOINTS);
    }

    #[test]
    fn test_ieee_display() {
        assert_eq!(IEEE.to_string(), "00:12:4b:00:1c:a1:7e:01");
    }

    #[test]
    fn test_open_payload() {
        assert_eq!(open_payload(200).unwrap(), [200]);
        assert!(open_payload(0).is_err());
        assert!(open_payload(255).is_err());
    }

    #[test]
    fn test_control_payload() {
        let control = ZigbeeControl {
            ieee: IEEE,
            endpoint: 1,
            action: ZigbeeAction::Level(60),
        };
        let payload = control.to_payload().unwrap();
        assert_eq!(&payload[8..], [1, 2, 60]);
        let control = ZigbeeControl {
            action: ZigbeeAction::Level(101),
            ..control
        };
        assert!(control.to_payload().is_err());
    }
}
