//! Command pairs understood by units.
//!
//! Every frame carries two command bytes: `cmd1` selects the subsystem and
//! `cmd2` the operation within it. Replies echo the pair of the request.

use std::fmt;

/// Bit set on either command byte of an error reply.
pub const ERROR_FLAG: u8 = 0x80;

/// Subsystems addressed by `cmd1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Subsystem {
    General = 0x01,
    Lighting = 0x02,
    Ac = 0x03,
    Curtain = 0x04,
    Knx = 0x05,
    Dali = 0x06,
    Dmx = 0x07,
    Zigbee = 0x08,
    LedSpi = 0x09,
}

impl TryFrom<u8> for Subsystem {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Subsystem::General),
            0x02 => Ok(Subsystem::Lighting),
            0x03 => Ok(Subsystem::Ac),
            0x04 => Ok(Subsystem::Curtain),
            0x05 => Ok(Subsystem::Knx),
            0x06 => Ok(Subsystem::Dali),
            0x07 => Ok(Subsystem::Dmx),
            0x08 => Ok(Subsystem::Zigbee),
            0x09 => Ok(Subsystem::LedSpi),
            other => Err(other),
        }
    }
}

/// A `cmd1`/`cmd2` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    pub cmd1: u8,
    pub cmd2: u8,
}

impl Command {
    pub const fn new(subsystem: Subsystem, op: u8) -> Self {
        Self {
            cmd1: subsystem as u8,
            cmd2: op,
        }
    }

    /// Build a pair from raw bytes, e.g. as read from a frame.
    pub const fn from_raw(cmd1: u8, cmd2: u8) -> Self {
        Self { cmd1, cmd2 }
    }

    /// Whether either byte carries the error flag.
    pub const fn is_error(self) -> bool {
        (self.cmd1 | self.cmd2) & ERROR_FLAG != 0
    }

    /// The pair with the error flag cleared from both bytes.
    pub const fn without_error_flag(self) -> Self {
        Self {
            cmd1: self.cmd1 & !ERROR_FLAG,
            cmd2: self.cmd2 & !ERROR_FLAG,
        }
    }

    /// The subsystem named by `cmd1`, if known.
    pub fn subsystem(self) -> Option<Subsystem> {
        Subsystem::try_from(self.cmd1 & !ERROR_FLAG).ok()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}/{:02X}", self.cmd1, self.cmd2)
    }
}

macro_rules! commands {
    ($subsystem:ident { $($name:ident = $op:expr),* $(,)? }) => {
        $(pub const $name: Command = Command::new(Subsystem::$subsystem, $op);)*
    };
}

/// Unit-wide operations, scenes, schedules, rooms and RS-485.
pub mod general {
    use super::{Command, Subsystem};
    commands!(General {
        GET_INFO = 0x01,
        REBOOT = 0x02,
        SET_IP = 0x03,
        GET_STATUS = 0x04,
        FIRMWARE = 0x05,
        SET_NAME = 0x06,
        SCENE_SET = 0x10,
        SCENE_TRIGGER = 0x11,
        SCENE_GET_ALL = 0x12,
        SCENE_DELETE = 0x13,
        MULTI_SCENE_SET = 0x14,
        MULTI_SCENE_TRIGGER = 0x15,
        SEQUENCE_SET = 0x16,
        SEQUENCE_CONTROL = 0x17,
        SCHEDULE_SET = 0x18,
        SCHEDULE_GET_ALL = 0x19,
        SCHEDULE_DELETE = 0x1A,
        ROOM_SET = 0x20,
        ROOM_GET_ALL = 0x21,
        RS485_SET = 0x22,
        RS485_GET = 0x23,
    });
}

pub mod lighting {
    use super::{Command, Subsystem};
    commands!(Lighting {
        SET_LEVEL = 0x01,
        GET_LEVELS = 0x02,
        GROUP_SET = 0x03,
        GROUP_GET_ALL = 0x04,
    });
}

pub mod ac {
    use super::{Command, Subsystem};
    commands!(Ac {
        CONTROL = 0x01,
        GET_STATUS = 0x02,
        CONFIG_SET = 0x03,
        CONFIG_GET_ALL = 0x04,
    });
}

pub mod curtain {
    use super::{Command, Subsystem};
    commands!(Curtain {
        CONTROL = 0x01,
        CONFIG_SET = 0x02,
        CONFIG_GET_ALL = 0x03,
    });
}

pub mod knx {
    use super::{Command, Subsystem};
    commands!(Knx {
        CONFIG_SET = 0x01,
        CONFIG_GET_ALL = 0x02,
        CONFIG_DELETE = 0x03,
        WRITE = 0x04,
    });
}

pub mod dali {
    use super::{Command, Subsystem};
    commands!(Dali {
        COMMISSION = 0x01,
        SCAN = 0x02,
        RESOLVE_CONFLICT = 0x03,
        SET_LEVEL = 0x04,
        SET_GROUPS = 0x05,
        SET_SCENES = 0x06,
        SET_FADE = 0x07,
    });
}

pub mod dmx {
    use super::{Command, Subsystem};
    commands!(Dmx {
        SET_CHANNELS = 0x01,
        FIXTURE_SET = 0x02,
        FIXTURE_GET_ALL = 0x03,
    });
}

pub mod zigbee {
    use super::{Command, Subsystem};
    commands!(Zigbee {
        OPEN_NETWORK = 0x01,
        CLOSE_NETWORK = 0x02,
        NEW_DEVICE = 0x03,
        GET_DEVICES = 0x04,
        DELETE_DEVICE = 0x05,
        CONTROL = 0x06,
    });
}

pub mod led {
    use super::{Command, Subsystem};
    commands!(LedSpi {
        SET_COLOR = 0x01,
        SET_EFFECT = 0x02,
        CONFIG_SET = 0x03,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_flag() {
        let cmd = dali::SCAN;
        assert!(!cmd.is_error());

        let err = Command::from_raw(cmd.cmd1 | ERROR_FLAG, cmd.cmd2);
        assert!(err.is_error());
        assert_eq!(err.without_error_flag(), cmd);

        let err = Command::from_raw(cmd.cmd1, cmd.cmd2 | ERROR_FLAG);
        assert!(err.is_error());
        assert_eq!(err.without_error_flag(), cmd);
    }

    #[test]
    fn test_subsystem() {
        assert_eq!(ac::GET_STATUS.subsystem(), Some(Subsystem::Ac));
        assert_eq!(Command::from_raw(0x86, 0x01).subsystem(), Some(Subsystem::Dali));
        assert_eq!(Command::from_raw(0x42, 0x01).subsystem(), None);
        assert_eq!(Subsystem::try_from(0x42), Err(0x42));
    }

    #[test]
    fn test_display() {
        assert_eq!(zigbee::NEW_DEVICE.to_string(), "08/03");
    }
}
