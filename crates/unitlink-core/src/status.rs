//! Status codes reported by units.
//!
//! A unit reports failure either by setting the top bit of a command byte
//! (the first payload byte then holds the code) or, for operations that do
//! not return data, through a leading status byte in the payload.

use std::fmt;

/// A status code as reported by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Success,
    ErrCrc,
    NoSupport,
    LimitFrameLen,
    LimitInputNumber,
    LimitOutputNumber,
    LimitGroupPerInput,
    AbsentUnit,
    SlaveUnit,
    LowerFirmware,
    LicenseFail,
    HexFileCrc,
    /// The unit accepted the command and is still executing it; a final reply follows.
    Busy,
    TransferedFailed,
    Other,
    /// A code outside the known table.
    Unknown(u8),
}

impl StatusCode {
    /// The symbolic name of the code, as printed in device error messages.
    pub fn name(self) -> String {
        let name = match self {
            StatusCode::Success => "SUCCESS",
            StatusCode::ErrCrc => "ERR_CRC",
            StatusCode::NoSupport => "NO_SUPPORT",
            StatusCode::LimitFrameLen => "LIMIT_FRAME_LEN",
            StatusCode::LimitInputNumber => "LIMIT_INPUT_NUMBER",
            StatusCode::LimitOutputNumber => "LIMIT_OUTPUT_NUMBER",
            StatusCode::LimitGroupPerInput => "LIMIT_GROUP_PER_INPUT",
            StatusCode::AbsentUnit => "ABSENT_UNIT",
            StatusCode::SlaveUnit => "SLAVE_UNIT",
            StatusCode::LowerFirmware => "LOWER_FIRMWARE",
            StatusCode::LicenseFail => "LICENSE_FAIL",
            StatusCode::HexFileCrc => "HEX_FILE_CRC",
            StatusCode::Busy => "BUSY",
            StatusCode::TransferedFailed => "TRANSFERED_FAILED",
            StatusCode::Other => "OTHER",
            StatusCode::Unknown(code) => return format!("Unknown error ({code})"),
        };
        name.to_string()
    }

    /// Whether the code reports an interim "still executing" state.
    pub fn is_busy(self) -> bool {
        self == StatusCode::Busy
    }
}

impl From<u8> for StatusCode {
    fn from(value: u8) -> Self {
        match value {
            0 => StatusCode::Success,
            1 => StatusCode::ErrCrc,
            2 => StatusCode::NoSupport,
            3 => StatusCode::LimitFrameLen,
            4 => StatusCode::LimitInputNumber,
            5 => StatusCode::LimitOutputNumber,
            6 => StatusCode::LimitGroupPerInput,
            7 => StatusCode::AbsentUnit,
            8 => StatusCode::SlaveUnit,
            9 => StatusCode::LowerFirmware,
            10 => StatusCode::LicenseFail,
            11 => StatusCode::HexFileCrc,
            12 => StatusCode::Busy,
            254 => StatusCode::TransferedFailed,
            255 => StatusCode::Other,
            code => StatusCode::Unknown(code),
        }
    }
}

impl From<StatusCode> for u8 {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::Success => 0,
            StatusCode::ErrCrc => 1,
            StatusCode::NoSupport => 2,
            StatusCode::LimitFrameLen => 3,
            StatusCode::LimitInputNumber => 4,
            StatusCode::LimitOutputNumber => 5,
            StatusCode::LimitGroupPerInput => 6,
            StatusCode::AbsentUnit => 7,
            StatusCode::SlaveUnit => 8,
            StatusCode::LowerFirmware => 9,
            StatusCode::LicenseFail => 10,
            StatusCode::HexFileCrc => 11,
            StatusCode::Busy => 12,
            StatusCode::TransferedFailed => 254,
            StatusCode::Other => 255,
            StatusCode::Unknown(code) => code,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
