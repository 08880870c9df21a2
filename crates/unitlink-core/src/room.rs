//! Rooms: named bundles of groups, an AC and a curtain.

use crate::error::{check_len, DecodeError, ValidationError};
use crate::fields::{read_padded, require, take, write_padded};
use crate::limits;

/// Marks an unused AC or curtain slot.
pub const NONE: u8 = 0xFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub index: u8,
    pub enabled: bool,
    pub groups: Vec<u8>,
    pub ac: Option<u8>,
    pub curtain: Option<u8>,
}

impl Room {
    pub const SIZE: usize = 20;
    pub const MAX_GROUPS: usize = 16;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::ROOM_INDEX.check(self.index)?;
        check_len("room groups", self.groups.len(), Self::MAX_GROUPS)?;
        for &group in &self.groups {
            limits::GROUP.check(group)?;
        }
        if let Some(ac) = self.ac {
            limits::AC_INDEX.check(ac)?;
        }
        if let Some(curtain) = self.curtain {
            limits::CURTAIN_INDEX.check(curtain)?;
        }
        let mut buf = Vec::with_capacity(Self::SIZE);
        buf.extend_from_slice(&[self.index, self.enabled as u8]);
        write_padded(&mut buf, &self.groups, Self::MAX_GROUPS, 0);
        buf.push(self.ac.unwrap_or(NONE));
        buf.push(self.curtain.unwrap_or(NONE));
        Ok(buf)
    }

    /// Decode every record in a ROOM_GET_ALL data frame.
    pub fn decode_all(payload: &[u8]) -> Result<Vec<Self>, DecodeError> {
        require("room", payload, Self::SIZE)?;
        payload.chunks_exact(Self::SIZE).map(Room::try_from).collect()
    }
}

impl TryFrom<&[u8]> for Room {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let record = take::<{ Room::SIZE }>("room", bytes)?;
        let slot = |value: u8| (value != NONE).then_some(value);
        Ok(Room {
            index: record[0],
            enabled: record[1] != 0,
            groups: read_padded(&record[2..18], 0),
            ac: slot(record[18]),
            curtain: slot(record[19]),
        })
    }
}
