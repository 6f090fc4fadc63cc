//! Error types for the location record protocol.

use crate::types::Axis;
use thiserror::Error;

/// Reasons a candidate record can be rejected, or a record buffer refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// No comma between the two axes, or the comma is the first or last byte.
    #[error("missing or misplaced axis separator")]
    MissingSeparator,

    /// The axis field has no decimal point where one is allowed.
    #[error("{axis} field has no decimal point within the first {max_index} bytes")]
    MissingDecimalPoint {
        /// Axis being parsed.
        axis: Axis,
        /// The decimal point must sit strictly before this index.
        max_index: usize,
    },

    /// The fractional part does not have the fixed number of digits.
    #[error("{axis} field has {actual} fractional digits, expected {expected}")]
    FractionLength {
        /// Axis being parsed.
        axis: Axis,
        /// Required number of fractional digits.
        expected: usize,
        /// Number of bytes found after the decimal point.
        actual: usize,
    },

    /// A byte that should be a decimal digit is not.
    #[error("{axis} field has a non-digit byte 0x{byte:02X} at offset {offset}")]
    InvalidDigit {
        /// Axis being parsed.
        axis: Axis,
        /// Offset of the byte within the axis field.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },

    /// The value exceeds the axis bound.
    #[error("{axis} value is beyond {max} degrees")]
    OutOfRange {
        /// Axis being parsed.
        axis: Axis,
        /// Maximum absolute degrees for the axis.
        max: u16,
    },

    /// A record buffer of the wrong size was supplied to the encoder.
    #[error("record buffer must be exactly {expected} bytes, got {actual}")]
    BufferSize {
        /// Required buffer length.
        expected: usize,
        /// Supplied buffer length.
        actual: usize,
    },
}

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
