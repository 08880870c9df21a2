//! Frame encoding and decoding.
//!
//! ```text
//! +---------+--------+------+------+-------------+----------+
//! | address | length | cmd1 | cmd2 | payload ... | checksum |
//! |  4 (LE) | 2 (LE) |  1   |  1   |      N      |  2 (LE)  |
//! +---------+--------+------+------+-------------+----------+
//! ```
//!
//! `length` counts everything after itself (`4 + N`). The checksum is the
//! plain 16-bit wrapping sum of `cmd1`, `cmd2` and the payload bytes.
//! Inbound checksums are not verified; units have never been held to it.

use crate::cmds::Command;
use crate::status::StatusCode;
use crate::DeviceAddress;
use thiserror::Error;

/// Bytes preceding the command pair.
pub const HEADER_SIZE: usize = 6;
/// Smallest frame a unit can send: header, command pair and checksum.
pub const MIN_SIZE: usize = 10;
/// Receive buffer size large enough for any frame a unit sends.
pub const MAX_DATAGRAM_SIZE: usize = 4096;

/// Errors produced when decoding an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame too short: expected at least 10 bytes, got {actual}")]
    FrameTooShort { actual: usize },
    #[error("unexpected command: expected {expected}, got {actual}")]
    UnexpectedCommand { expected: Command, actual: Command },
    #[error("device error on {command}: {name}")]
    Device {
        command: Command,
        code: StatusCode,
        name: String,
    },
}

impl FrameError {
    fn device(command: Command, code: u8) -> Self {
        let code = StatusCode::from(code);
        FrameError::Device {
            command,
            code,
            name: code.name(),
        }
    }

    /// Whether this is a device report that the command is still executing.
    pub fn is_busy(&self) -> bool {
        matches!(self, FrameError::Device { code, .. } if code.is_busy())
    }
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub address: DeviceAddress,
    /// Declared length: command pair, payload and checksum.
    pub length: u16,
    pub command: Command,
    pub payload: Vec<u8>,
    pub checksum: u16,
}

impl Frame {
    /// Whether this is the single-zero-byte frame that ends a multi-reply exchange.
    pub fn is_sentinel(&self) -> bool {
        self.length == 5 && self.payload == [0]
    }
}

/// The additive checksum over `bytes`, truncated to 16 bits.
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b)))
}

/// Encode a frame into `buffer`, returning the number of bytes written.
pub fn write_frame(
    buffer: &mut Vec<u8>,
    address: DeviceAddress,
    command: Command,
    payload: &[u8],
) -> usize {
    let start_len = buffer.len();
    let length = (4 + payload.len()) as u16;
    buffer.extend_from_slice(&address.to_wire());
    buffer.extend_from_slice(&length.to_le_bytes());
    buffer.push(command.cmd1);
    buffer.push(command.cmd2);
    buffer.extend_from_slice(payload);
    let sum = checksum(&buffer[start_len + HEADER_SIZE..]);
    buffer.extend_from_slice(&sum.to_le_bytes());
    buffer.len() - start_len
}

/// Encode a frame as a new `Vec<u8>`.
pub fn encode(address: DeviceAddress, command: Command, payload: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(MIN_SIZE + payload.len());
    write_frame(&mut buffer, address, command, payload);
    buffer
}

/// The address-only datagram sent to keep long exchanges alive.
pub fn keepalive(address: DeviceAddress) -> [u8; 4] {
    address.to_wire()
}

/// Parse a frame without checking what it answers.
///
/// Only fails when the datagram cannot hold a frame at all.
pub fn parse(bytes: &[u8]) -> Result<Frame, FrameError> {
    if bytes.len() < MIN_SIZE {
        return Err(FrameError::FrameTooShort {
            actual: bytes.len(),
        });
    }
    let address = DeviceAddress::from_wire([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let length = u16::from_le_bytes([bytes[4], bytes[5]]);
    let command = Command::from_raw(bytes[6], bytes[7]);
    let payload_end = (8 + usize::from(length).saturating_sub(4)).min(bytes.len());
    let payload = bytes[8..payload_end].to_vec();
    let checksum = match bytes.get(payload_end..payload_end + 2) {
        Some(&[lo, hi]) => u16::from_le_bytes([lo, hi]),
        _ => 0,
    };
    Ok(Frame {
        address,
        length,
        command,
        payload,
        checksum,
    })
}

/// Decode and validate a frame answering `expected`.
///
/// Error replies (top bit set on either command byte) fail with
/// [`FrameError::Device`]. Unless `skip_status_check` is set, a non-zero
/// leading payload byte is treated as a device status failure too; GET-style
/// requests skip it because their first byte is data.
pub fn decode(
    bytes: &[u8],
    expected: Command,
    skip_status_check: bool,
) -> Result<Frame, FrameError> {
    decode_any(bytes, &[expected], skip_status_check)
}

/// Decode and validate a frame answering any command in `expected`.
///
/// A mismatch is reported against the first expected command.
pub fn decode_any(
    bytes: &[u8],
    expected: &[Command],
    skip_status_check: bool,
) -> Result<Frame, FrameError> {
    let frame = parse(bytes)?;
    if frame.command.is_error() {
        let code = frame.payload.first().copied().unwrap_or(u8::MAX);
        return Err(FrameError::device(frame.command.without_error_flag(), code));
    }
    if !expected.contains(&frame.command) {
        return Err(FrameError::UnexpectedCommand {
            expected: expected.first().copied().unwrap_or(frame.command),
            actual: frame.command,
        });
    }
    if !skip_status_check {
        check_status(&frame)?;
    }
    Ok(frame)
}

/// Fail with [`FrameError::Device`] when the leading status byte is non-zero.
///
/// For frames decoded with the status check skipped whose first byte turns
/// out to be a status after all.
pub fn check_status(frame: &Frame) -> Result<(), FrameError> {
    match frame.payload.first() {
        Some(&status) if status != 0 => Err(FrameError::device(frame.command, status)),
        _ => Ok(()),
    }
}
