//! Core types and codecs for the unit command protocol.
//!
//! This crate frames commands, classifies replies and encodes the fixed-layout
//! payload of every subsystem a unit exposes, without any network
//! implementation.

pub mod ac;
pub mod address;
pub mod cmds;
pub mod config;
pub mod curtain;
pub mod dali;
pub mod dmx;
pub mod error;
mod fields;
pub mod firmware;
pub mod frame;
pub mod general;
pub mod knx;
pub mod led;
pub mod lighting;
pub mod room;
pub mod rs485;
pub mod scene;
pub mod schedule;
pub mod status;
pub mod zigbee;

// Re-export commonly used types
pub use address::{AddressError, DeviceAddress};
pub use cmds::{Command, Subsystem};
pub use config::ProtocolConfig;
pub use error::{DecodeError, Limit, ValidationError};
pub use firmware::{FirmwareImage, ImageError};
pub use frame::{Frame, FrameError};
pub use general::{NetworkSettings, UnitInfo, UnitInfoHeader};
pub use status::StatusCode;

/// Ports that units listen on.
pub mod port {
    /// Port for all addressed unit traffic.
    pub const UNIT: u16 = 6000;
    /// Port for broadcast discovery and cross-subnet IP changes.
    pub const BROADCAST: u16 = 6001;
}

/// Address that discovery and IP changes are broadcast to.
pub const DEFAULT_BROADCAST_ADDR: std::net::Ipv4Addr = std::net::Ipv4Addr::BROADCAST;

/// Accepted ranges of caller-supplied fields.
pub mod limits {
    use crate::error::Limit;

    pub const GROUP: Limit = Limit::new("group", 1, 255);
    pub const LEVEL: Limit = Limit::new("level", 0, 100);
    pub const UNIT_NAME_LEN: Limit = Limit::new("name length", 0, 32);

    pub const SCENE_INDEX: Limit = Limit::new("scene index", 0, 99);
    pub const MULTI_SCENE_INDEX: Limit = Limit::new("multi-scene index", 0, 39);
    pub const SEQUENCE_INDEX: Limit = Limit::new("sequence index", 0, 19);
    pub const SCHEDULE_INDEX: Limit = Limit::new("schedule index", 0, 31);
    pub const HOUR: Limit = Limit::new("hour", 0, 23);
    pub const MINUTE: Limit = Limit::new("minute", 0, 59);
    pub const SECOND: Limit = Limit::new("second", 0, 59);
    pub const ROOM_INDEX: Limit = Limit::new("room index", 0, 31);

    pub const AC_INDEX: Limit = Limit::new("ac index", 0, 63);
    pub const AC_MODE: Limit = Limit::new("ac mode", 0, 3);
    pub const AC_FAN_SPEED: Limit = Limit::new("fan speed", 0, 4);
    /// Setpoint in tenths of a degree.
    pub const AC_SETPOINT_TENTHS: Limit = Limit::new("setpoint", 160, 320);
    pub const AC_SETPOINT: Limit = Limit::new("setpoint", 16, 32);
    pub const AC_ADDRESS: Limit = Limit::new("ac address", 1, 247);

    pub const CURTAIN_INDEX: Limit = Limit::new("curtain index", 0, 63);

    pub const KNX_ADDRESS: Limit = Limit::new("knx address", 0, 511);

    pub const DALI_SHORT_ADDRESS: Limit = Limit::new("dali address", 0, 63);
    pub const DALI_GROUP: Limit = Limit::new("dali group", 0, 15);
    pub const DALI_LEVEL: Limit = Limit::new("dali level", 0, 254);
    pub const DALI_FADE_TIME: Limit = Limit::new("fade time", 0, 15);
    pub const DALI_FADE_RATE: Limit = Limit::new("fade rate", 1, 15);

    pub const DMX_ADDRESS: Limit = Limit::new("dmx address", 1, 512);
    pub const DMX_FIXTURE_INDEX: Limit = Limit::new("fixture index", 0, 63);
    pub const DMX_FIXTURE_CHANNELS: Limit = Limit::new("fixture channels", 1, 32);

    pub const ZIGBEE_PERMIT_SECONDS: Limit = Limit::new("permit seconds", 1, 254);

    pub const RS485_PORT: Limit = Limit::new("rs485 port", 0, 1);
    pub const RS485_DATA_BITS: Limit = Limit::new("data bits", 7, 8);
    pub const RS485_STOP_BITS: Limit = Limit::new("stop bits", 1, 2);

    pub const LED_CHANNEL: Limit = Limit::new("led channel", 0, 7);
    pub const LED_SPEED: Limit = Limit::new("led speed", 1, 10);
    pub const LED_PIXELS: Limit = Limit::new("pixel count", 1, 1024);
}
