//! Scenes, multi-scenes and timed scene sequences.

use crate::config::ProtocolConfig;
use crate::error::{check_len, DecodeError, ValidationError};
use crate::fields::{read_text, require, take, write_text};
use crate::limits;

/// One group and the level it is set to when the scene runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneEntry {
    pub group: u8,
    /// Percent, 0-100.
    pub level: u8,
}

/// A stored scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneConfig {
    pub index: u8,
    pub entries: Vec<SceneEntry>,
    /// Only sent when [`ProtocolConfig::send_name`] is set.
    pub name: String,
}

impl SceneConfig {
    pub const MAX_ENTRIES: usize = 32;

    pub fn to_payload(&self, config: &ProtocolConfig) -> Result<Vec<u8>, ValidationError> {
        limits::SCENE_INDEX.check(self.index)?;
        check_len("scene entries", self.entries.len(), Self::MAX_ENTRIES)?;
        let mut buf = Vec::with_capacity(2 + 2 * self.entries.len() + ProtocolConfig::NAME_SIZE);
        buf.push(self.index);
        buf.push(self.entries.len() as u8);
        for entry in &self.entries {
            limits::GROUP.check(entry.group)?;
            limits::LEVEL.check(entry.level)?;
            buf.extend_from_slice(&[entry.group, entry.level]);
        }
        if config.send_name {
            write_text(&mut buf, &self.name, ProtocolConfig::NAME_SIZE);
        }
        Ok(buf)
    }

    /// Decode one record, returning it along with the bytes it occupied.
    pub fn decode(bytes: &[u8], config: &ProtocolConfig) -> Result<(Self, usize), DecodeError> {
        let [index, count] = take::<2>("scene", bytes)?;
        let count = usize::from(count);
        if count > Self::MAX_ENTRIES {
            return Err(DecodeError::InvalidField {
                record: "scene",
                field: "entry count",
                value: count as i64,
            });
        }
        let mut len = 2 + 2 * count;
        require("scene", bytes, len)?;
        let entries = bytes[2..len]
            .chunks_exact(2)
            .map(|pair| SceneEntry {
                group: pair[0],
                level: pair[1],
            })
            .collect();
        let name = if config.send_name {
            require("scene", bytes, len + ProtocolConfig::NAME_SIZE)?;
            let name = read_text(&bytes[len..len + ProtocolConfig::NAME_SIZE]);
            len += ProtocolConfig::NAME_SIZE;
            name
        } else {
            String::new()
        };
        let scene = SceneConfig {
            index,
            entries,
            name,
        };
        Ok((scene, len))
    }

    /// Decode every record in a SCENE_GET_ALL data frame.
    pub fn decode_all(mut payload: &[u8], config: &ProtocolConfig) -> Result<Vec<Self>, DecodeError> {
        let mut scenes = Vec::new();
        while !payload.is_empty() {
            let (scene, len) = Self::decode(payload, config)?;
            scenes.push(scene);
            payload = &payload[len..];
        }
        Ok(scenes)
    }
}

/// Payload for SCENE_TRIGGER.
pub fn trigger_payload(index: u8) -> Result<Vec<u8>, ValidationError> {
    limits::SCENE_INDEX.check(index)?;
    Ok(vec![index])
}

/// Payload for SCENE_DELETE.
pub fn delete_payload(index: u8) -> Result<Vec<u8>, ValidationError> {
    limits::SCENE_INDEX.check(index)?;
    Ok(vec![index])
}

/// Several scenes fired together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiScene {
    pub index: u8,
    pub scenes: Vec<u8>,
}

impl MultiScene {
    pub const MAX_SCENES: usize = 16;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::MULTI_SCENE_INDEX.check(self.index)?;
        check_len("multi-scene scenes", self.scenes.len(), Self::MAX_SCENES)?;
        let mut buf = Vec::with_capacity(2 + self.scenes.len());
        buf.push(self.index);
        buf.push(self.scenes.len() as u8);
        for &scene in &self.scenes {
            limits::SCENE_INDEX.check(scene)?;
            buf.push(scene);
        }
        Ok(buf)
    }

    pub fn trigger_payload(index: u8) -> Result<Vec<u8>, ValidationError> {
        limits::MULTI_SCENE_INDEX.check(index)?;
        Ok(vec![index])
    }
}

/// One step of a sequence: run `scene`, then hold for `hold` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceStep {
    pub scene: u8,
    pub hold: u16,
}

/// Scenes played one after another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub index: u8,
    pub repeat: bool,
    pub steps: Vec<SequenceStep>,
}

impl Sequence {
    pub const MAX_STEPS: usize = 20;

    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::SEQUENCE_INDEX.check(self.index)?;
        check_len("sequence steps", self.steps.len(), Self::MAX_STEPS)?;
        let mut buf = Vec::with_capacity(3 + 3 * self.steps.len());
        buf.extend_from_slice(&[self.index, self.repeat as u8, self.steps.len() as u8]);
        for step in &self.steps {
            limits::SCENE_INDEX.check(step.scene)?;
            let [h0, h1] = step.hold.to_le_bytes();
            buf.extend_from_slice(&[step.scene, h0, h1]);
        }
        Ok(buf)
    }

    /// Payload for SEQUENCE_CONTROL.
    pub fn control_payload(index: u8, run: bool) -> Result<Vec<u8>, ValidationError> {
        limits::SEQUENCE_INDEX.check(index)?;
        Ok(vec![index, run as u8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evening() -> SceneConfig {
        SceneConfig {
            index: 7,
            entries: vec![
                SceneEntry { group: 1, level: 30 },
                SceneEntry { group: 4, level: 100 },
            ],
            name: "Evening".into(),
        }
    }

    #[test]
    fn test_scene_layout() {
        let payload = evening().to_payload(&ProtocolConfig::default()).unwrap();
        assert_eq!(payload, [7, 2, 1, 30, 4, 100]);
        let (scene, len) = SceneConfig::decode(&payload, &ProtocolConfig::default()).unwrap();
        assert_eq!(len, 6);
        assert_eq!(scene.entries, evening().entries);
        assert_eq!(scene.name, "");
    }

    #[test]
    fn test_scene_with_name() {
        let config = ProtocolConfig::default().with_send_name(true);
        let mut payload = evening().to_payload(&config).unwrap();
        assert_eq!(payload.len(), 26);
        let second = SceneConfig {
            index: 8,
            entries: vec![],
            name: "Off".into(),
        };
        payload.extend(second.to_payload(&config).unwrap());
        let scenes = SceneConfig::decode_all(&payload, &config).unwrap();
        assert_eq!(scenes, [evening(), second]);
    }

    #[test]
    fn test_scene_bounds() {
        assert!(trigger_payload(0).is_ok());
        assert!(trigger_payload(99).is_ok());
        assert_eq!(trigger_payload(100).unwrap_err().field, "scene index");
        let too_many = SceneConfig {
            entries: vec![SceneEntry { group: 1, level: 0 }; 33],
            ..evening()
        };
        assert!(too_many.to_payload(&ProtocolConfig::default()).is_err());
    }

    #[test]
    fn test_truncated_scene() {
        let err = SceneConfig::decode(&[1, 3, 1, 2], &ProtocolConfig::default()).unwrap_err();
        assert!(matches!(err, DecodeError::PayloadTooShort { expected: 8, .. }));
    }

    #[test]
    fn test_multi_scene() {
        let multi = MultiScene {
            index: 39,
            scenes: vec![0, 99],
        };
        assert_eq!(multi.to_payload().unwrap(), [39, 2, 0, 99]);
        assert!(MultiScene { index: 40, ..multi.clone() }.to_payload().is_err());
        assert!(MultiScene { scenes: vec![100], ..multi }.to_payload().is_err());
    }

    #[test]
    fn test_sequence() {
        let sequence = Sequence {
            index: 19,
            repeat: true,
            steps: vec![
                SequenceStep { scene: 3, hold: 600 },
                SequenceStep { scene: 4, hold: 5 },
            ],
        };
        assert_eq!(
            sequence.to_payload().unwrap(),
            [19, 1, 2, 3, 0x58, 0x02, 4, 5, 0]
        );
        assert_eq!(Sequence::control_payload(2, true).unwrap(), [2, 1]);
        assert!(Sequence::control_payload(20, false).is_err());
    }
}
