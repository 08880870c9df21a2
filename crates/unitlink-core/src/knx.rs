//! KNX gateway mappings.
//!
//! Group addresses use the 3-level form `area/line/device`, packed as
//! 5 + 3 + 8 bits and written little-endian. Output masks are big-endian.

use crate::error::{check_len, DecodeError, ValidationError};
use crate::fields::{require, take};
use crate::limits;
use std::fmt;

/// A 3-level KNX group address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KnxGroupAddress {
    raw: u16,
}

impl KnxGroupAddress {
    pub const MAX_AREA: u8 = 31;
    pub const MAX_LINE: u8 = 7;

    /// Pack the three components, masking each to its bit width.
    pub const fn new(area: u8, line: u8, device: u8) -> Self {
        let raw = ((area as u16 & 0x1F) << 11) | ((line as u16 & 0x07) << 8) | device as u16;
        Self { raw }
    }

    pub const fn raw(self) -> u16 {
        self.raw
    }

    pub const fn area(self) -> u8 {
        ((self.raw >> 11) & 0x1F) as u8
    }

    pub const fn line(self) -> u8 {
        ((self.raw >> 8) & 0x07) as u8
    }

    pub const fn device(self) -> u8 {
        (self.raw & 0xFF) as u8
    }

    pub const fn to_wire(self) -> [u8; 2] {
        self.raw.to_le_bytes()
    }

    pub const fn from_wire(bytes: [u8; 2]) -> Self {
        Self {
            raw: u16::from_le_bytes(bytes),
        }
    }

    /// Pack an `area/line/device` string.
    ///
    /// Fewer than three parts or a non-numeric part packs to `0/0/0`, which
    /// units treat as "unassigned".
    pub fn pack(s: &str) -> Self {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() < 3 {
            return Self::default();
        }
        let mut values = [0u32; 3];
        for (value, part) in values.iter_mut().zip(&parts) {
            match part.trim().parse() {
                Ok(v) => *value = v,
                Err(_) => return Self::default(),
            }
        }
        let [area, line, device] = values;
        let raw = ((area & 0x1F) << 11) | ((line & 0x07) << 8) | (device & 0xFF);
        Self { raw: raw as u16 }
    }
}

impl From<u16> for KnxGroupAddress {
    fn from(raw: u16) -> Self {
        Self { raw }
    }
}

impl fmt::Display for KnxGroupAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.area(), self.line(), self.device())
    }
}

/// Datapoint behaviour of a KNX mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KnxKind {
    Switch = 0,
    Dimmer = 1,
    Value = 2,
    Curtain = 3,
    Scene = 4,
}

impl TryFrom<u8> for KnxKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(KnxKind::Switch),
            1 => Ok(KnxKind::Dimmer),
            2 => Ok(KnxKind::Value),
            3 => Ok(KnxKind::Curtain),
            4 => Ok(KnxKind::Scene),
            other => Err(other),
        }
    }
}

/// One mapping between a KNX group address and local outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnxConfig {
    /// Mapping slot, 0-511.
    pub index: u16,
    pub kind: KnxKind,
    pub group_address: KnxGroupAddress,
    pub feedback_address: KnxGroupAddress,
    /// Bit N set means output channel N follows this mapping.
    pub output_mask: u16,
    pub local_group: u8,
}

impl KnxConfig {
    pub const SIZE: usize = 10;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::KNX_ADDRESS.check(self.index)?;
        limits::GROUP.check(self.local_group)?;
        let mut buf = Vec::with_capacity(Self::SIZE);
        buf.extend_from_slice(&self.index.to_le_bytes());
        buf.push(self.kind as u8);
        buf.extend_from_slice(&self.group_address.to_wire());
        buf.extend_from_slice(&self.feedback_address.to_wire());
        buf.extend_from_slice(&self.output_mask.to_be_bytes());
        buf.push(self.local_group);
        Ok(buf)
    }

    /// Whether output channel `n` follows this mapping.
    pub fn drives_output(&self, n: u8) -> bool {
        n < 16 && self.output_mask & (1 << n) != 0
    }

    /// Decode every record in a CONFIG_GET_ALL data frame.
    pub fn decode_all(payload: &[u8]) -> Result<Vec<Self>, DecodeError> {
        require("knx config", payload, Self::SIZE)?;
        payload
            .chunks_exact(Self::SIZE)
            .map(KnxConfig::try_from)
            .collect()
    }
}

impl TryFrom<&[u8]> for KnxConfig {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let [i0, i1, kind, g0, g1, f0, f1, m0, m1, local_group] =
            take::<{ KnxConfig::SIZE }>("knx config", bytes)?;
        let kind = KnxKind::try_from(kind).map_err(|value| DecodeError::InvalidField {
            record: "knx config",
            field: "kind",
            value: value.into(),
        })?;
        Ok(KnxConfig {
            index: u16::from_le_bytes([i0, i1]),
            kind,
            group_address: KnxGroupAddress::from_wire([g0, g1]),
            feedback_address: KnxGroupAddress::from_wire([f0, f1]),
            output_mask: u16::from_be_bytes([m0, m1]),
            local_group,
        })
    }
}

/// Payload deleting the mapping in `index`.
pub fn delete_payload(index: u16) -> Result<Vec<u8>, ValidationError> {
    limits::KNX_ADDRESS.check(index)?;
    Ok(index.to_le_bytes().to_vec())
}

/// A raw telegram value written to a group address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnxWrite {
    pub group_address: KnxGroupAddress,
    pub value: Vec<u8>,
}

impl KnxWrite {
    pub const MAX_VALUE_SIZE: usize = 14;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        check_len("knx value", self.value.len(), Self::MAX_VALUE_SIZE)?;
        let mut buf = Vec::with_capacity(3 + self.value.len());
        buf.extend_from_slice(&self.group_address.to_wire());
        buf.push(self.value.len() as u8);
        buf.extend_from_slice(&self.value);
        Ok(buf)
    }
}
