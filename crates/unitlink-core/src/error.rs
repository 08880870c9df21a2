//! Errors shared by the subsystem codecs.

use thiserror::Error;

/// A caller-supplied value lies outside the range the unit accepts.
///
/// Raised before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} must be in {min}..={max}, got {actual}")]
pub struct ValidationError {
    pub field: &'static str,
    pub min: i64,
    pub max: i64,
    pub actual: i64,
}

/// A reply payload could not be decoded into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{record} payload too short: expected at least {expected} bytes, got {actual}")]
    PayloadTooShort {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{record} has invalid {field} value {value}")]
    InvalidField {
        record: &'static str,
        field: &'static str,
        value: i64,
    },
}

/// An inclusive range accepted for one named field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub field: &'static str,
    pub min: i64,
    pub max: i64,
}

impl Limit {
    pub const fn new(field: &'static str, min: i64, max: i64) -> Self {
        Self { field, min, max }
    }

    /// Check that `value` lies within the range.
    pub fn check(self, value: impl Into<i64>) -> Result<(), ValidationError> {
        let actual = value.into();
        if actual < self.min || actual > self.max {
            return Err(ValidationError {
                field: self.field,
                min: self.min,
                max: self.max,
                actual,
            });
        }
        Ok(())
    }
}

/// Check that a list holds at most `max` entries.
pub fn check_len(field: &'static str, len: usize, max: usize) -> Result<(), ValidationError> {
    if len > max {
        return Err(ValidationError {
            field,
            min: 0,
            max: max as i64,
            actual: len as i64,
        });
    }
    Ok(())
}
