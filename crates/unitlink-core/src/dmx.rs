//! DMX512 channel output and fixture configuration.

use crate::error::{check_len, DecodeError, ValidationError};
use crate::fields::{require, take};
use crate::limits;

/// Number of channels in a DMX universe.
pub const UNIVERSE_SIZE: u16 = 512;

/// Raw channel values starting at `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmxChannels {
    /// First channel, 1-512.
    pub start: u16,
    pub values: Vec<u8>,
}

impl DmxChannels {
    pub const MAX_VALUES: usize = 255;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::DMX_ADDRESS.check(self.start)?;
        check_len("dmx values", self.values.len(), Self::MAX_VALUES)?;
        let last = i64::from(self.start) + self.values.len() as i64 - 1;
        limits::DMX_ADDRESS.check(last.max(i64::from(self.start)))?;
        let mut buf = Vec::with_capacity(3 + self.values.len());
        buf.extend_from_slice(&self.start.to_le_bytes());
        buf.push(self.values.len() as u8);
        buf.extend_from_slice(&self.values);
        Ok(buf)
    }
}

/// Patch of one fixture into the universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmxFixture {
    pub index: u8,
    /// First channel, 1-512.
    pub start: u16,
    pub channels: u8,
    pub kind: u8,
    /// Lighting group driving the fixture.
    pub group: u8,
}

impl DmxFixture {
    pub const SIZE: usize = 7;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::DMX_FIXTURE_INDEX.check(self.index)?;
        limits::DMX_ADDRESS.check(self.start)?;
        limits::DMX_FIXTURE_CHANNELS.check(self.channels)?;
        limits::DMX_ADDRESS.check(i64::from(self.start) + i64::from(self.channels) - 1)?;
        limits::GROUP.check(self.group)?;
        let [s0, s1] = self.start.to_le_bytes();
        Ok(vec![self.index, s0, s1, self.channels, self.kind, self.group, 0])
    }

    /// Decode every record in a FIXTURE_GET_ALL data frame.
    pub fn decode_all(payload: &[u8]) -> Result<Vec<Self>, DecodeError> {
        require("dmx fixture", payload, Self::SIZE)?;
        payload
            .chunks_exact(Self::SIZE)
            .map(DmxFixture::try_from)
            .collect()
    }
}

impl TryFrom<&[u8]> for DmxFixture {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let [index, s0, s1, channels, kind, group, _] = take::<{ DmxFixture::SIZE }>("dmx fixture", bytes)?;
        Ok(DmxFixture {
            index,
            start: u16::from_le_bytes([s0, s1]),
            channels,
            kind,
            group,
        })
    }
}
