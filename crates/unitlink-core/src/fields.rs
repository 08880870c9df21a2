//! Helpers for fixed-layout payload fields.

use crate::error::DecodeError;
use std::ffi::CStr;

/// Borrow the first `N` bytes of `bytes` as a fixed-size array.
pub(crate) fn take<const N: usize>(
    record: &'static str,
    bytes: &[u8],
) -> Result<[u8; N], DecodeError> {
    bytes
        .get(0..N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(DecodeError::PayloadTooShort {
            record,
            expected: N,
            actual: bytes.len(),
        })
}

/// Require at least `len` bytes.
pub(crate) fn require(record: &'static str, bytes: &[u8], len: usize) -> Result<(), DecodeError> {
    if bytes.len() < len {
        return Err(DecodeError::PayloadTooShort {
            record,
            expected: len,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Write `text` into a NUL-padded field of exactly `len` bytes.
///
/// Text longer than the field is cut at the last whole character that fits.
pub(crate) fn write_text(buffer: &mut Vec<u8>, text: &str, len: usize) {
    let mut end = text.len().min(len);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    buffer.extend_from_slice(&text.as_bytes()[..end]);
    buffer.resize(buffer.len() + (len - end), 0);
}

/// Read a NUL-padded text field.
pub(crate) fn read_text(bytes: &[u8]) -> String {
    match CStr::from_bytes_until_nul(bytes) {
        Ok(cstr) => String::from_utf8_lossy(cstr.to_bytes()).into_owned(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Write `values` padded with `pad` up to exactly `len` bytes.
pub(crate) fn write_padded(buffer: &mut Vec<u8>, values: &[u8], len: usize, pad: u8) {
    let n = values.len().min(len);
    buffer.extend_from_slice(&values[..n]);
    buffer.resize(buffer.len() + (len - n), pad);
}

/// Read a padded array back into its set entries.
pub(crate) fn read_padded(bytes: &[u8], pad: u8) -> Vec<u8> {
    bytes.iter().copied().filter(|&b| b != pad).collect()
}
