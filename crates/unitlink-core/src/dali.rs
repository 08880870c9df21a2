//! DALI bus records and commissioning packets.
//!
//! Scan and commissioning replies carry up to 16 device records of
//! [`DaliDevice::SIZE`] bytes each. During commissioning the unit interleaves
//! two notification shapes with the data, told apart by payload length.

use crate::error::{DecodeError, ValidationError};
use crate::fields::take;
use crate::limits;
use bitflags::bitflags;

/// Scene level marking "not part of this scene".
pub const SCENE_NOT_SET: u8 = 0xFF;
/// Address byte of an unused record slot.
pub const EMPTY_SLOT: u8 = 0xFF;
/// Number of scenes and groups a DALI device supports.
pub const SCENES: usize = 16;
pub const GROUPS: usize = 16;
/// Device records per data frame.
pub const DEVICES_PER_FRAME: usize = 16;

bitflags! {
    /// Colour control capabilities (DT8) reported by a device.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ColorFeatures: u8 {
        const XY = 0b0000_0001;
        const TC = 0b0000_0010;
        const PRIMARY_N = 0b0001_1100;
        const RGBWAF = 0b1110_0000;
    }
}

/// One device as reported by a scan or commissioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaliDevice {
    /// Position across every frame of the exchange, starting at 0.
    pub index: usize,
    /// Short address, 0-63.
    pub address: u8,
    pub online: bool,
    pub status: u8,
    pub device_type: u8,
    pub color: ColorFeatures,
    pub actual_level: u8,
    pub min_level: u8,
    pub max_level: u8,
    pub fade_time: u8,
    pub fade_rate: u8,
    /// Level recalled by each scene, `None` when the device is not in it.
    pub scenes: [Option<u8>; SCENES],
    /// Bit N set means member of group N.
    pub groups: u16,
    pub group_address: u8,
}

impl DaliDevice {
    pub const SIZE: usize = 37;

    /// Whether the device belongs to group `n`.
    pub fn in_group(&self, n: u8) -> bool {
        usize::from(n) < GROUPS && self.groups & (1 << n) != 0
    }

    /// The groups the device belongs to, ascending.
    pub fn group_list(&self) -> Vec<u8> {
        (0..GROUPS as u8).filter(|&n| self.in_group(n)).collect()
    }

    /// Decode one record slot. Unused slots yield `None`.
    pub fn decode(bytes: &[u8], index: usize) -> Result<Option<Self>, DecodeError> {
        let slot = take::<{ DaliDevice::SIZE }>("dali device", bytes)?;
        if slot[0] == EMPTY_SLOT {
            return Ok(None);
        }
        let mut scenes = [None; SCENES];
        for (scene, &level) in scenes.iter_mut().zip(&slot[10..10 + SCENES]) {
            *scene = (level != SCENE_NOT_SET).then_some(level);
        }
        Ok(Some(DaliDevice {
            index,
            address: slot[0],
            online: slot[1] != 0,
            status: slot[2],
            device_type: slot[3],
            color: ColorFeatures::from_bits_retain(slot[4]),
            actual_level: slot[5],
            min_level: slot[6],
            max_level: slot[7],
            fade_time: slot[8],
            fade_rate: slot[9],
            scenes,
            groups: u16::from_be_bytes([slot[26], slot[27]]),
            group_address: slot[28],
        }))
    }

    /// Decode every record in a data frame, numbering them from `first_index`.
    pub fn decode_frame(payload: &[u8], first_index: usize) -> Result<Vec<Self>, DecodeError> {
        let mut devices = Vec::with_capacity(DEVICES_PER_FRAME);
        for slot in payload.chunks_exact(Self::SIZE) {
            if let Some(device) = Self::decode(slot, first_index + devices.len())? {
                devices.push(device);
            }
        }
        Ok(devices)
    }

    /// Encode the record into a slot, as a unit would send it.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut slot = [0u8; Self::SIZE];
        slot[..10].copy_from_slice(&[
            self.address,
            self.online.into(),
            self.status,
            self.device_type,
            self.color.bits(),
            self.actual_level,
            self.min_level,
            self.max_level,
            self.fade_time,
            self.fade_rate,
        ]);
        for (byte, scene) in slot[10..10 + SCENES].iter_mut().zip(&self.scenes) {
            *byte = scene.unwrap_or(SCENE_NOT_SET);
        }
        slot[26..28].copy_from_slice(&self.groups.to_be_bytes());
        slot[28] = self.group_address;
        slot
    }
}

/// One inbound packet of a scan or commissioning exchange, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaliPacket {
    /// The number of devices found on the bus changed.
    CountChanged { old: u8, new: u8 },
    /// Two devices answered on the same short address.
    Conflict(u8),
    /// Device records.
    Devices(Vec<DaliDevice>),
}

impl DaliPacket {
    /// Classify a payload by its shape, numbering device records from `first_index`.
    pub fn classify(payload: &[u8], first_index: usize) -> Result<Self, DecodeError> {
        match *payload {
            [old, new] => Ok(DaliPacket::CountChanged { old, new }),
            [0xFF, 0xFF, 0xFF, address] => Ok(DaliPacket::Conflict(address)),
            _ => DaliDevice::decode_frame(payload, first_index).map(DaliPacket::Devices),
        }
    }
}

/// How commissioning treats devices that already have an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommissionMode {
    /// Clear every short address and re-address the whole bus.
    Reset = 0,
    /// Keep existing addresses and only address new devices.
    Extend = 1,
}

impl CommissionMode {
    pub fn to_payload(self) -> Vec<u8> {
        vec![self as u8]
    }
}

/// Devices addressed by a DALI command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaliTarget {
    Short(u8),
    Group(u8),
    Broadcast,
}

impl DaliTarget {
    fn to_bytes(self) -> Result<[u8; 2], ValidationError> {
        match self {
            DaliTarget::Short(address) => {
                limits::DALI_SHORT_ADDRESS.check(address)?;
                Ok([0, address])
            }
            DaliTarget::Group(group) => {
                limits::DALI_GROUP.check(group)?;
                Ok([1, group])
            }
            DaliTarget::Broadcast => Ok([2, 0]),
        }
    }
}

/// Payload for SET_LEVEL: direct arc power.
pub fn level_payload(target: DaliTarget, level: u8) -> Result<Vec<u8>, ValidationError> {
    let [kind, target] = target.to_bytes()?;
    limits::DALI_LEVEL.check(level)?;
    Ok(vec![kind, target, level])
}

/// Payload for SET_GROUPS: the full group membership of one device.
pub fn groups_payload(address: u8, groups: &[u8]) -> Result<Vec<u8>, ValidationError> {
    limits::DALI_SHORT_ADDRESS.check(address)?;
    let mut mask = 0u16;
    for &group in groups {
        limits::DALI_GROUP.check(group)?;
        mask |= 1 << group;
    }
    let [hi, lo] = mask.to_be_bytes();
    Ok(vec![address, hi, lo])
}

/// Payload for SET_SCENES: the level of each scene, `None` to remove the device from it.
pub fn scenes_payload(address: u8, scenes: &[Option<u8>; SCENES]) -> Result<Vec<u8>, ValidationError> {
    limits::DALI_SHORT_ADDRESS.check(address)?;
    for level in scenes.iter().flatten() {
        limits::DALI_LEVEL.check(*level)?;
    }
    let mut buf = Vec::with_capacity(1 + SCENES);
    buf.push(address);
    buf.extend(scenes.iter().map(|scene| scene.unwrap_or(SCENE_NOT_SET)));
    Ok(buf)
}

/// Payload for SET_FADE.
pub fn fade_payload(address: u8, fade_time: u8, fade_rate: u8) -> Result<Vec<u8>, ValidationError> {
    limits::DALI_SHORT_ADDRESS.check(address)?;
    limits::DALI_FADE_TIME.check(fade_time)?;
    limits::DALI_FADE_RATE.check(fade_rate)?;
    Ok(vec![address, fade_time, fade_rate])
}

/// Payload for RESOLVE_CONFLICT on one short address.
pub fn conflict_payload(address: u8) -> Result<Vec<u8>, ValidationError> {
    limits::DALI_SHORT_ADDRESS.check(address)?;
    Ok(vec![address])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(address: u8) -> DaliDevice {
        let mut scenes = [None; SCENES];
        scenes[0] = Some(0);
        scenes[3] = Some(200);
        DaliDevice {
            index: 0,
            address,
            online: true,
            status: 0,
            device_type: 8,
            color: ColorFeatures::TC,
            actual_level: 254,
            min_level: 1,
            max_level: 254,
            fade_time: 4,
            fade_rate: 7,
            scenes,
            groups: 0b0000_0000_0000_0101,
            group_address: 0,
        }
    }

    #[test]
    fn test_decode_slot() {
        let slot = device(5).to_bytes();
        assert_eq!(slot[26..28], [0x00, 0x05]);
        assert_eq!(slot[10], 0);
        assert_eq!(slot[11], SCENE_NOT_SET);

        let decoded = DaliDevice::decode(&slot, 7).unwrap().unwrap();
        assert_eq!(decoded.index, 7);
        assert_eq!(decoded.address, 5);
        assert!(decoded.color.contains(ColorFeatures::TC));
        // Zero is a valid scene level and survives the 0xFF padding.
        assert_eq!(decoded.scenes[0], Some(0));
        assert_eq!(decoded.scenes[1], None);
        assert_eq!(decoded.scenes[3], Some(200));
        assert_eq!(decoded.group_list(), [0, 2]);
    }

    #[test]
    fn test_group_mask_is_big_endian() {
        let mut slot = device(1).to_bytes();
        slot[26] = 0x80;
        slot[27] = 0x01;
        let decoded = DaliDevice::decode(&slot, 0).unwrap().unwrap();
        assert!(decoded.in_group(15));
        assert!(decoded.in_group(0));
        assert!(!decoded.in_group(8));
    }

    #[test]
    fn test_decode_frame_skips_empty_slots() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&device(1).to_bytes());
        payload.extend_from_slice(&[EMPTY_SLOT; DaliDevice::SIZE]);
        payload.extend_from_slice(&device(2).to_bytes());
        let devices = DaliDevice::decode_frame(&payload, 16).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!((devices[0].index, devices[0].address), (16, 1));
        assert_eq!((devices[1].index, devices[1].address), (17, 2));
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            DaliPacket::classify(&[3, 4], 0).unwrap(),
            DaliPacket::CountChanged { old: 3, new: 4 }
        );
        assert_eq!(
            DaliPacket::classify(&[0xFF, 0xFF, 0xFF, 7], 0).unwrap(),
            DaliPacket::Conflict(7)
        );
        match DaliPacket::classify(&device(9).to_bytes(), 3).unwrap() {
            DaliPacket::Devices(devices) => {
                assert_eq!(devices.len(), 1);
                assert_eq!(devices[0].index, 3);
            }
            other => panic!("unexpected packet {other:?}"),
        }
    }

    #[test]
    fn test_level_payload() {
        assert_eq!(level_payload(DaliTarget::Short(63), 254).unwrap(), [0, 63, 254]);
        assert_eq!(level_payload(DaliTarget::Group(15), 0).unwrap(), [1, 15, 0]);
        assert_eq!(level_payload(DaliTarget::Broadcast, 100).unwrap(), [2, 0, 100]);
        assert!(level_payload(DaliTarget::Short(64), 0).is_err());
        assert!(level_payload(DaliTarget::Group(16), 0).is_err());
        assert!(level_payload(DaliTarget::Broadcast, 255).is_err());
    }

    #[test]
    fn test_groups_payload() {
        assert_eq!(groups_payload(4, &[0, 15]).unwrap(), [4, 0x80, 0x01]);
        assert!(groups_payload(4, &[16]).is_err());
    }

    #[test]
    fn test_scenes_payload() {
        let mut scenes = [None; SCENES];
        scenes[1] = Some(0);
        scenes[15] = Some(128);
        let payload = scenes_payload(2, &scenes).unwrap();
        assert_eq!(payload.len(), 17);
        assert_eq!(payload[0], 2);
        assert_eq!(payload[1], SCENE_NOT_SET);
        assert_eq!(payload[2], 0);
        assert_eq!(payload[16], 128);
    }

    #[test]
    fn test_fade_payload() {
        assert_eq!(fade_payload(1, 0, 1).unwrap(), [1, 0, 1]);
        assert!(fade_payload(1, 16, 1).is_err());
        assert!(fade_payload(1, 0, 0).is_err());
    }
}
