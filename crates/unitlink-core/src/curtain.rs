//! Curtain motor control and configuration.

use crate::error::{DecodeError, ValidationError};
use crate::fields::{require, take};
use crate::limits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CurtainAction {
    Stop = 0,
    Open = 1,
    Close = 2,
    /// Move to the position given in percent.
    Position = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurtainControl {
    pub index: u8,
    pub action: CurtainAction,
    /// Percent open; ignored unless `action` is [`CurtainAction::Position`].
    pub position: u8,
}

impl CurtainControl {
    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::CURTAIN_INDEX.check(self.index)?;
        limits::LEVEL.check(self.position)?;
        Ok(vec![self.index, self.action as u8, self.position])
    }
}

/// Configuration of one curtain output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurtainConfig {
    pub index: u8,
    pub address: u8,
    pub kind: u8,
    /// Seconds to pause when reversing direction.
    pub pause_period: u8,
    /// Full-travel time in tenths of a second.
    pub transition_period: u16,
    /// Lighting groups that trigger open, close and stop; `None` when unbound.
    pub open_group: Option<u8>,
    pub close_group: Option<u8>,
    pub stop_group: Option<u8>,
}

impl CurtainConfig {
    pub const SIZE: usize = 15;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::CURTAIN_INDEX.check(self.index)?;
        for group in [self.open_group, self.close_group, self.stop_group]
            .into_iter()
            .flatten()
        {
            limits::GROUP.check(group)?;
        }
        let [tp0, tp1] = self.transition_period.to_le_bytes();
        let mut buf = Vec::with_capacity(Self::SIZE);
        buf.extend_from_slice(&[self.index, self.address, self.kind, self.pause_period, tp0, tp1]);
        buf.extend_from_slice(&[0; 6]);
        buf.extend_from_slice(&[
            self.open_group.unwrap_or(0),
            self.close_group.unwrap_or(0),
            self.stop_group.unwrap_or(0),
        ]);
        Ok(buf)
    }

    /// Decode every record in a CONFIG_GET_ALL data frame.
    pub fn decode_all(payload: &[u8]) -> Result<Vec<Self>, DecodeError> {
        require("curtain config", payload, Self::SIZE)?;
        payload
            .chunks_exact(Self::SIZE)
            .map(CurtainConfig::try_from)
            .collect()
    }
}

impl TryFrom<&[u8]> for CurtainConfig {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        #[rustfmt::skip]
        let [
            index,
            address,
            kind,
            pause_period,
            tp0, tp1,
            _, _, _, _, _, _,   // 6-11: reserved
            open_group,
            close_group,
            stop_group,
        ] = take::<{ CurtainConfig::SIZE }>("curtain config", bytes)?;

        let bound = |group: u8| (group != 0).then_some(group);
        Ok(CurtainConfig {
            index,
            address,
            kind,
            pause_period,
            transition_period: u16::from_le_bytes([tp0, tp1]),
            open_group: bound(open_group),
            close_group: bound(close_group),
            stop_group: bound(stop_group),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lounge() -> CurtainConfig {
        CurtainConfig {
            index: 2,
            address: 9,
            kind: 1,
            pause_period: 3,
            transition_period: 450,
            open_group: Some(10),
            close_group: Some(11),
            stop_group: None,
        }
    }

    #[test]
    fn test_config_layout() {
        let payload = lounge().to_payload().unwrap();
        assert_eq!(
            payload,
            [2, 9, 1, 3, 0xC2, 0x01, 0, 0, 0, 0, 0, 0, 10, 11, 0]
        );
        assert_eq!(CurtainConfig::try_from(&payload[..]).unwrap(), lounge());
    }

    #[test]
    fn test_decode_all() {
        let mut payload = lounge().to_payload().unwrap();
        payload.extend(CurtainConfig { index: 3, ..lounge() }.to_payload().unwrap());
        let configs = CurtainConfig::decode_all(&payload).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[1].index, 3);
        assert!(CurtainConfig::decode_all(&payload[..14]).is_err());
    }

    #[test]
    fn test_group_zero_rejected() {
        let config = CurtainConfig {
            stop_group: Some(0),
            ..lounge()
        };
        assert_eq!(config.to_payload().unwrap_err().field, "group");
    }

    #[test]
    fn test_control() {
        let control = CurtainControl {
            index: 1,
            action: CurtainAction::Position,
            position: 40,
        };
        assert_eq!(control.to_payload().unwrap(), [1, 3, 40]);
        assert!(CurtainControl { position: 101, ..control }.to_payload().is_err());
        assert!(CurtainControl { index: 64, ..control }.to_payload().is_err());
    }
}
