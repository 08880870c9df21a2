//! Air-conditioner control, status and configuration.
//!
//! Temperatures travel as signed little-endian tenths of a degree.

use crate::error::{DecodeError, ValidationError};
use crate::fields::{require, take};
use crate::limits;

/// Encode a temperature in degrees as tenths.
fn temperature_to_wire(degrees: f32) -> [u8; 2] {
    ((degrees * 10.0).round() as i16).to_le_bytes()
}

fn temperature_from_wire(bytes: [u8; 2]) -> f32 {
    f32::from(i16::from_le_bytes(bytes)) / 10.0
}

/// A control command for one indoor unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcControl {
    pub index: u8,
    pub power: bool,
    /// 0 cool, 1 heat, 2 fan, 3 dry.
    pub mode: u8,
    /// 0 auto, 1-4 increasing speed.
    pub fan_speed: u8,
    pub swing: bool,
    /// Degrees Celsius.
    pub setpoint: f32,
}

impl AcControl {
    pub const SIZE: usize = 7;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::AC_INDEX.check(self.index)?;
        limits::AC_MODE.check(self.mode)?;
        limits::AC_FAN_SPEED.check(self.fan_speed)?;
        let tenths = (self.setpoint * 10.0).round() as i64;
        limits::AC_SETPOINT_TENTHS.check(tenths)?;
        let [t0, t1] = temperature_to_wire(self.setpoint);
        Ok(vec![
            self.index,
            self.power.into(),
            self.mode,
            self.fan_speed,
            self.swing.into(),
            t0,
            t1,
        ])
    }
}

/// Status reported by one indoor unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcStatus {
    pub status: u8,
    pub power: bool,
    pub fan_speed: u8,
    pub mode: u8,
    pub swing: bool,
    /// Setpoint, degrees Celsius.
    pub temperature: f32,
    /// Measured room temperature, degrees Celsius.
    pub room_temperature: f32,
}

impl AcStatus {
    pub const SIZE: usize = 10;
}

impl TryFrom<&[u8]> for AcStatus {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        #[rustfmt::skip]
        let [
            status,
            power,
            fan_speed,
            mode,
            swing,
            _,              // 5: reserved
            t0, t1,         // 6-7: setpoint
            r0, r1,         // 8-9: room temperature
        ] = take::<{ AcStatus::SIZE }>("ac status", bytes)?;

        Ok(AcStatus {
            status,
            power: power != 0,
            fan_speed,
            mode,
            swing: swing != 0,
            temperature: temperature_from_wire([t0, t1]),
            room_temperature: temperature_from_wire([r0, r1]),
        })
    }
}

/// Binding of one indoor unit to the gateway bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcConfig {
    pub index: u8,
    pub brand: u8,
    /// Bus address of the indoor unit, 1-247.
    pub address: u8,
    /// Lighting group that mirrors the unit's power state.
    pub group: u8,
    /// Whole degrees Celsius.
    pub min_setpoint: u8,
    pub max_setpoint: u8,
}

impl AcConfig {
    pub const SIZE: usize = 6;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::AC_INDEX.check(self.index)?;
        limits::AC_ADDRESS.check(self.address)?;
        limits::GROUP.check(self.group)?;
        limits::AC_SETPOINT.check(self.min_setpoint)?;
        limits::AC_SETPOINT.check(self.max_setpoint)?;
        if self.min_setpoint > self.max_setpoint {
            return Err(ValidationError {
                field: "min setpoint",
                min: limits::AC_SETPOINT.min,
                max: self.max_setpoint.into(),
                actual: self.min_setpoint.into(),
            });
        }
        Ok(vec![
            self.index,
            self.brand,
            self.address,
            self.group,
            self.min_setpoint,
            self.max_setpoint,
        ])
    }

    /// Decode every record in a CONFIG_GET_ALL data frame.
    pub fn decode_all(payload: &[u8]) -> Result<Vec<Self>, DecodeError> {
        require("ac config", payload, Self::SIZE)?;
        payload
            .chunks_exact(Self::SIZE)
            .map(AcConfig::try_from)
            .collect()
    }
}

impl TryFrom<&[u8]> for AcConfig {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let [index, brand, address, group, min_setpoint, max_setpoint] =
            take::<{ AcConfig::SIZE }>("ac config", bytes)?;
        Ok(AcConfig {
            index,
            brand,
            address,
            group,
            min_setpoint,
            max_setpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        let payload = [0, 1, 2, 1, 0, 0, 0xB4, 0x00, 0xFA, 0x00];
        let status = AcStatus::try_from(&payload[..]).unwrap();
        assert!(status.power);
        assert_eq!(status.fan_speed, 2);
        assert_eq!(status.mode, 1);
        assert!(!status.swing);
        assert_eq!(status.temperature, 18.0);
        assert_eq!(status.room_temperature, 25.0);
    }

    #[test]
    fn test_negative_room_temperature() {
        let [lo, hi] = (-55i16).to_le_bytes();
        let payload = [0, 0, 0, 0, 0, 0, 0xB4, 0x00, lo, hi];
        let status = AcStatus::try_from(&payload[..]).unwrap();
        assert_eq!(status.room_temperature, -5.5);
    }

    #[test]
    fn test_status_too_short() {
        assert!(AcStatus::try_from(&[0u8; 9][..]).is_err());
    }

    #[test]
    fn test_control_payload() {
        let control = AcControl {
            index: 3,
            power: true,
            mode: 0,
            fan_speed: 4,
            swing: true,
            setpoint: 22.5,
        };
        assert_eq!(control.to_payload().unwrap(), [3, 1, 0, 4, 1, 0xE1, 0x00]);
    }

    #[test]
    fn test_control_bounds() {
        let base = AcControl {
            index: 0,
            power: true,
            mode: 3,
            fan_speed: 0,
            swing: false,
            setpoint: 16.0,
        };
        assert!(base.to_payload().is_ok());
        assert!(AcControl { setpoint: 32.0, ..base }.to_payload().is_ok());
        assert!(AcControl { setpoint: 32.1, ..base }.to_payload().is_err());
        assert!(AcControl { setpoint: 15.9, ..base }.to_payload().is_err());
        assert_eq!(
            AcControl { mode: 4, ..base }.to_payload().unwrap_err().field,
            "ac mode"
        );
        assert_eq!(
            AcControl { fan_speed: 5, ..base }.to_payload().unwrap_err().field,
            "fan speed"
        );
        assert!(AcControl { index: 64, ..base }.to_payload().is_err());
    }

    #[test]
    fn test_config_records() {
        let config = AcConfig {
            index: 1,
            brand: 4,
            address: 17,
            group: 30,
            min_setpoint: 18,
            max_setpoint: 28,
        };
        let payload = config.to_payload().unwrap();
        assert_eq!(payload, [1, 4, 17, 30, 18, 28]);
        assert_eq!(AcConfig::decode_all(&payload).unwrap(), [config]);
        assert!(AcConfig { address: 0, ..config }.to_payload().is_err());
        assert!(AcConfig { address: 248, ..config }.to_payload().is_err());
        assert!(AcConfig { min_setpoint: 29, ..config }.to_payload().is_err());
    }
}
