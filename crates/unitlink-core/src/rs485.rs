//! RS-485 serial port settings.

use crate::error::{DecodeError, ValidationError};
use crate::fields::take;
use crate::limits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BaudRate {
    B9600 = 0,
    B19200 = 1,
    B38400 = 2,
    B57600 = 3,
    B115200 = 4,
}

impl BaudRate {
    pub fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
        }
    }
}

impl TryFrom<u8> for BaudRate {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(BaudRate::B9600),
            1 => Ok(BaudRate::B19200),
            2 => Ok(BaudRate::B38400),
            3 => Ok(BaudRate::B57600),
            4 => Ok(BaudRate::B115200),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Parity {
    None = 0,
    Odd = 1,
    Even = 2,
}

impl TryFrom<u8> for Parity {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Parity::None),
            1 => Ok(Parity::Odd),
            2 => Ok(Parity::Even),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub port: u8,
    pub baud: BaudRate,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
    /// Protocol spoken on the line, e.g. Modbus master.
    pub protocol: u8,
}

impl SerialConfig {
    pub const SIZE: usize = 6;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::RS485_PORT.check(self.port)?;
        limits::RS485_DATA_BITS.check(self.data_bits)?;
        limits::RS485_STOP_BITS.check(self.stop_bits)?;
        Ok(vec![
            self.port,
            self.baud as u8,
            self.data_bits,
            self.parity as u8,
            self.stop_bits,
            self.protocol,
        ])
    }

    /// Payload for RS485_GET.
    pub fn request_payload(port: u8) -> Result<Vec<u8>, ValidationError> {
        limits::RS485_PORT.check(port)?;
        Ok(vec![port])
    }
}

impl TryFrom<&[u8]> for SerialConfig {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let [port, baud, data_bits, parity, stop_bits, protocol] =
            take::<{ SerialConfig::SIZE }>("rs485 config", bytes)?;
        let invalid = |field: &'static str, value: u8| DecodeError::InvalidField {
            record: "rs485 config",
            field,
            value: value.into(),
        };
        Ok(SerialConfig {
            port,
            baud: BaudRate::try_from(baud).map_err(|v| invalid("baud", v))?,
            data_bits,
            parity: Parity::try_from(parity).map_err(|v| invalid("parity", v))?,
            stop_bits,
            protocol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modbus() -> SerialConfig {
        SerialConfig {
            port: 1,
            baud: BaudRate::B19200,
            data_bits: 8,
            parity: Parity::Even,
            stop_bits: 1,
            protocol: 2,
        }
    }

    #[test]
    fn test_layout() {
        let payload = modbus().to_payload().unwrap();
        assert_eq!(payload, [1, 1, 8, 2, 1, 2]);
        let decoded = SerialConfig::try_from(&payload[..]).unwrap();
        assert_eq!(decoded, modbus());
        assert_eq!(decoded.baud.bits_per_second(), 19200);
    }

    #[test]
    fn test_bounds() {
        assert!(SerialConfig { port: 2, ..modbus() }.to_payload().is_err());
        assert!(SerialConfig { data_bits: 6, ..modbus() }.to_payload().is_err());
        assert!(SerialConfig { stop_bits: 3, ..modbus() }.to_payload().is_err());
        assert!(SerialConfig::request_payload(1).is_ok());
    }

    #[test]
    fn test_invalid_baud() {
        let err = SerialConfig::try_from(&[0, 7, 8, 0, 1, 0][..]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "baud", value: 7, .. }));
    }
}
