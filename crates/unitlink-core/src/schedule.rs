//! Time-of-day schedules that fire scenes.

use crate::error::{check_len, DecodeError, ValidationError};
use crate::fields::{require, take};
use crate::limits;
use bitflags::bitflags;

bitflags! {
    /// Days a schedule runs on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Weekdays: u8 {
        const MONDAY = 1 << 0;
        const TUESDAY = 1 << 1;
        const WEDNESDAY = 1 << 2;
        const THURSDAY = 1 << 3;
        const FRIDAY = 1 << 4;
        const SATURDAY = 1 << 5;
        const SUNDAY = 1 << 6;

        const WORKDAYS = Self::MONDAY.bits()
            | Self::TUESDAY.bits()
            | Self::WEDNESDAY.bits()
            | Self::THURSDAY.bits()
            | Self::FRIDAY.bits();
        const WEEKEND = Self::SATURDAY.bits() | Self::SUNDAY.bits();
    }
}

impl Weekdays {
    /// One flag byte per day, Monday first.
    pub fn to_flags(self) -> [u8; 7] {
        std::array::from_fn(|day| u8::from(self.bits() & (1 << day) != 0))
    }

    pub fn from_flags(flags: [u8; 7]) -> Self {
        let bits = flags
            .iter()
            .enumerate()
            .filter(|(_, &flag)| flag != 0)
            .fold(0u8, |bits, (day, _)| bits | 1 << day);
        Self::from_bits_truncate(bits)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub index: u8,
    pub enabled: bool,
    pub mode: u8,
    pub dmx_duration: u8,
    /// Repeat interval in minutes when `mode` repeats.
    pub interval: u16,
    pub days: Weekdays,
    pub hour: u8,
    pub minute: u8,
    /// Always encoded as 0; units fire on the minute.
    pub second: u8,
    pub scenes: Vec<u8>,
}

impl Schedule {
    /// Size without the scene list.
    pub const MIN_SIZE: usize = 23;
    pub const MAX_SCENES: usize = 32;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::SCHEDULE_INDEX.check(self.index)?;
        limits::HOUR.check(self.hour)?;
        limits::MINUTE.check(self.minute)?;
        limits::SECOND.check(self.second)?;
        check_len("schedule scenes", self.scenes.len(), Self::MAX_SCENES)?;
        for &scene in &self.scenes {
            limits::SCENE_INDEX.check(scene)?;
        }
        let [i0, i1] = self.interval.to_le_bytes();
        let mut buf = Vec::with_capacity(Self::MIN_SIZE + self.scenes.len());
        buf.extend_from_slice(&[self.index, self.enabled as u8, self.mode, self.dmx_duration, i0, i1]);
        buf.extend_from_slice(&[0; 6]);
        buf.extend_from_slice(&self.days.to_flags());
        buf.extend_from_slice(&[self.hour, self.minute, 0, self.scenes.len() as u8]);
        buf.extend_from_slice(&self.scenes);
        Ok(buf)
    }

    /// Decode one record, returning it along with the bytes it occupied.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), DecodeError> {
        #[rustfmt::skip]
        let [
            index,
            enabled,
            mode,
            dmx_duration,
            i0, i1,
            _, _, _, _, _, _,       // 6-11: reserved
            mon, tue, wed, thu, fri, sat, sun,
            hour,
            minute,
            second,
            count,
        ] = take::<{ Schedule::MIN_SIZE }>("schedule", bytes)?;

        let len = Self::MIN_SIZE + usize::from(count);
        require("schedule", bytes, len)?;
        let schedule = Schedule {
            index,
            enabled: enabled != 0,
            mode,
            dmx_duration,
            interval: u16::from_le_bytes([i0, i1]),
            days: Weekdays::from_flags([mon, tue, wed, thu, fri, sat, sun]),
            hour,
            minute,
            second,
            scenes: bytes[Self::MIN_SIZE..len].to_vec(),
        };
        Ok((schedule, len))
    }

    /// Decode every record in a SCHEDULE_GET_ALL data frame.
    pub fn decode_all(mut payload: &[u8]) -> Result<Vec<Self>, DecodeError> {
        let mut schedules = Vec::new();
        while !payload.is_empty() {
            let (schedule, len) = Self::decode(payload)?;
            schedules.push(schedule);
            payload = &payload[len..];
        }
        Ok(schedules)
    }
}

/// Payload for SCHEDULE_DELETE.
pub fn delete_payload(index: u8) -> Result<Vec<u8>, ValidationError> {
    limits::SCHEDULE_INDEX.check(index)?;
    Ok(vec![index])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn morning() -> Schedule {
        Schedule {
            index: 3,
            enabled: true,
            mode: 1,
            dmx_duration: 0,
            interval: 300,
            days: Weekdays::WORKDAYS,
            hour: 6,
            minute: 45,
            second: 0,
            scenes: vec![12, 13],
        }
    }

    #[test]
    fn test_layout() {
        let payload = morning().to_payload().unwrap();
        #[rustfmt::skip]
        assert_eq!(
            payload,
            [
                3, 1, 1, 0, 0x2C, 0x01,
                0, 0, 0, 0, 0, 0,
                1, 1, 1, 1, 1, 0, 0,
                6, 45, 0, 2,
                12, 13,
            ]
        );
        let (decoded, len) = Schedule::decode(&payload).unwrap();
        assert_eq!(len, 25);
        assert_eq!(decoded, morning());
    }

    #[test]
    fn test_second_always_zero() {
        let schedule = Schedule {
            second: 30,
            ..morning()
        };
        assert_eq!(schedule.to_payload().unwrap()[21], 0);
    }

    #[test]
    fn test_bounds() {
        assert!(Schedule { hour: 23, minute: 59, ..morning() }.to_payload().is_ok());
        assert_eq!(Schedule { hour: 24, ..morning() }.to_payload().unwrap_err().field, "hour");
        assert_eq!(Schedule { minute: 60, ..morning() }.to_payload().unwrap_err().field, "minute");
        assert_eq!(Schedule { index: 32, ..morning() }.to_payload().unwrap_err().field, "schedule index");
        assert!(Schedule { scenes: vec![100], ..morning() }.to_payload().is_err());
        assert!(Schedule { scenes: vec![0; 33], ..morning() }.to_payload().is_err());
        assert!(delete_payload(31).is_ok());
        assert!(delete_payload(32).is_err());
    }

    #[test]
    fn test_decode_all() {
        let mut payload = morning().to_payload().unwrap();
        let weekend = Schedule {
            index: 4,
            days: Weekdays::WEEKEND,
            scenes: vec![],
            ..morning()
        };
        payload.extend(weekend.to_payload().unwrap());
        assert_eq!(Schedule::decode_all(&payload).unwrap(), [morning(), weekend]);
        assert!(Schedule::decode_all(&payload[..24]).is_err());
    }

    #[test]
    fn test_weekday_flags() {
        let days = Weekdays::MONDAY | Weekdays::SUNDAY;
        assert_eq!(days.to_flags(), [1, 0, 0, 0, 0, 0, 1]);
        assert_eq!(Weekdays::from_flags([1, 0, 0, 0, 0, 0, 2]), days);
    }
}
