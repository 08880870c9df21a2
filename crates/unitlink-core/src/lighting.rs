//! Lighting group control and configuration.

use crate::config::ProtocolConfig;
use crate::error::{DecodeError, ValidationError};
use crate::fields::{read_text, require, take, write_text};
use crate::limits;

/// Output behaviour of a lighting group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GroupKind {
    Switch = 0,
    Dimmer = 1,
    TunableWhite = 2,
    Rgb = 3,
}

impl TryFrom<u8> for GroupKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GroupKind::Switch),
            1 => Ok(GroupKind::Dimmer),
            2 => Ok(GroupKind::TunableWhite),
            3 => Ok(GroupKind::Rgb),
            other => Err(other),
        }
    }
}

/// Current level of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLevel {
    pub group: u8,
    /// Percent, 0-100.
    pub level: u8,
}

impl GroupLevel {
    pub const SIZE: usize = 2;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::GROUP.check(self.group)?;
        limits::LEVEL.check(self.level)?;
        Ok(vec![self.group, self.level])
    }

    /// Decode every `group, level` pair in a GET_LEVELS data frame.
    pub fn decode_all(payload: &[u8]) -> Vec<GroupLevel> {
        payload
            .chunks_exact(Self::SIZE)
            .map(|pair| GroupLevel {
                group: pair[0],
                level: pair[1],
            })
            .collect()
    }
}

/// Configuration of one lighting group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupConfig {
    pub group: u8,
    pub kind: GroupKind,
    pub min_level: u8,
    pub max_level: u8,
    /// Tenths of a second.
    pub fade_time: u8,
    /// Only sent when [`ProtocolConfig::send_name`] is set.
    pub name: String,
}

impl GroupConfig {
    /// Size without the optional name.
    pub const SIZE: usize = 5;

    pub fn to_payload(&self, config: &ProtocolConfig) -> Result<Vec<u8>, ValidationError> {
        limits::GROUP.check(self.group)?;
        limits::LEVEL.check(self.min_level)?;
        limits::LEVEL.check(self.max_level)?;
        if self.min_level > self.max_level {
            return Err(ValidationError {
                field: "min level",
                min: 0,
                max: self.max_level.into(),
                actual: self.min_level.into(),
            });
        }
        let mut buf = Vec::with_capacity(Self::SIZE + ProtocolConfig::NAME_SIZE);
        buf.extend_from_slice(&[
            self.group,
            self.kind as u8,
            self.min_level,
            self.max_level,
            self.fade_time,
        ]);
        if config.send_name {
            write_text(&mut buf, &self.name, ProtocolConfig::NAME_SIZE);
        }
        Ok(buf)
    }

    /// Decode every record in a GROUP_GET_ALL data frame.
    pub fn decode_all(payload: &[u8], config: &ProtocolConfig) -> Result<Vec<Self>, DecodeError> {
        let size = Self::record_size(config);
        require("lighting group", payload, size)?;
        payload
            .chunks_exact(size)
            .map(|record| Self::decode(record, config))
            .collect()
    }

    pub fn decode(bytes: &[u8], config: &ProtocolConfig) -> Result<Self, DecodeError> {
        let [group, kind, min_level, max_level, fade_time] = take::<5>("lighting group", bytes)?;
        let kind = GroupKind::try_from(kind).map_err(|value| DecodeError::InvalidField {
            record: "lighting group",
            field: "kind",
            value: value.into(),
        })?;
        let name = if config.send_name {
            require("lighting group", bytes, Self::record_size(config))?;
            read_text(&bytes[Self::SIZE..Self::SIZE + ProtocolConfig::NAME_SIZE])
        } else {
            String::new()
        };
        Ok(GroupConfig {
            group,
            kind,
            min_level,
            max_level,
            fade_time,
            name,
        })
    }

    fn record_size(config: &ProtocolConfig) -> usize {
        if config.send_name {
            Self::SIZE + ProtocolConfig::NAME_SIZE
        } else {
            Self::SIZE
        }
    }
}
