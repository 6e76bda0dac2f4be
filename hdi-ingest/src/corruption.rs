//! Corruption detection
//!
//! Lost values in the source feeds were overwritten with a four-letter
//! placeholder. Any value with exactly that shape is treated as corrupted,
//! whatever the column's logical type. Nothing else is detected: empty
//! strings and out-of-range numbers pass through untouched.

use thiserror::Error;

/// Length of the corruption placeholder
const MARKER_LEN: usize = 4;

/// A field value carried the corruption marker
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("corrupted value '{0}'")]
pub struct CorruptionDetected(pub String);

/// True iff `value` is exactly four alphabetic characters
pub fn is_corrupted(value: &str) -> bool {
    let mut count = 0;
    for c in value.chars() {
        if !c.is_alphabetic() {
            return false;
        }
        count += 1;
        if count > MARKER_LEN {
            return false;
        }
    }
    count == MARKER_LEN
}

/// Per-field check returning the value when it is usable
pub fn check_field(value: &str) -> Result<&str, CorruptionDetected> {
    if is_corrupted(value) {
        Err(CorruptionDetected(value.to_string()))
    } else {
        Ok(value)
    }
}
