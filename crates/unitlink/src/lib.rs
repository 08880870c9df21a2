//! A crate for configuring and commissioning building-automation units over UDP.
//!
//! A [`Client`] addresses one unit. Each call opens its own UDP endpoint,
//! sends one command and awaits either a single reply ([`Request`]) or an
//! open-ended run of frames closed by the unit's success sentinel
//! ([`Collect`]). Commissioning workflows (firmware, DALI, Zigbee) are built
//! from those two exchanges.

pub use client::Client;
pub use config::{ClientConfig, DaliTiming, FirmwareTiming};
pub use dali::{ConflictOutcome, ConflictReport, DaliEvent, DaliEvents, DaliReport};
pub use error::ClientError;
pub use firmware::{FirmwarePhase, FirmwareProgress};
pub use transport::{Collect, Collected, FrameStream, Request};
pub use unitlink_core as core;
pub use zigbee::ZigbeeExploration;

pub mod client;
pub mod config;
mod control;
pub mod dali;
pub mod discover;
pub mod error;
pub mod firmware;
mod scenes;
pub mod transport;
pub mod zigbee;
