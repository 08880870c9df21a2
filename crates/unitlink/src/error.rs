use crate::core::{DecodeError, FrameError, ImageError, ValidationError};
use std::time::Duration;
use thiserror::Error;

/// Error types that can occur when interacting with a unit.
#[derive(Debug, Error)]
pub enum ClientError {
    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// No matching reply arrived in time.
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    /// The client's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,
    /// The reply was malformed, answered another command, or reported a device error.
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// A caller-supplied value was out of range; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A reply payload did not hold the expected records.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The firmware image could not be parsed.
    #[error(transparent)]
    Image(#[from] ImageError),
    /// The firmware image targets another board.
    #[error("firmware is for board {actual:?}, unit is {expected:?}")]
    BoardMismatch { expected: String, actual: String },
    /// A firmware packet failed on every attempt.
    #[error("firmware packet {packet} failed after {attempts} attempts: {source}")]
    TransferFailed {
        packet: usize,
        attempts: u32,
        #[source]
        source: Box<ClientError>,
    },
    /// The unit never reported running the new firmware.
    #[error("unit did not confirm the update after {attempts} status polls")]
    FirmwareNotConfirmed { attempts: u32 },
    /// DALI address conflicts remain after resolution.
    #[error("unresolved DALI address conflicts: {addresses:?}")]
    ConflictUnresolved { addresses: Vec<u8> },
}

impl ClientError {
    /// Whether the unit reported a device error, as opposed to a transport failure.
    pub fn is_device_error(&self) -> bool {
        matches!(self, ClientError::Frame(FrameError::Device { .. }))
    }
}
