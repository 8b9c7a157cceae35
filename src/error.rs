//! Error types for symbol construction and rendering.

use thiserror::Error;

use crate::types::EncodeMode;

/// The error type for all fallible operations in this crate.
///
/// Errors are raised synchronously at the failing operation. A symbol that
/// has reported an error is left in an undefined state and should be
/// discarded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QrError {
    /// Unknown error correction level name at construction.
    #[error("unknown error correction level: {name:?}")]
    BadErrorLevel {
        /// The level name that failed to parse.
        name: String,
    },

    /// Unknown encoding mode name passed to `add_data_in_mode`.
    #[error("unknown encoding mode: {name:?}")]
    BadMode {
        /// The mode name that failed to parse.
        name: String,
    },

    /// Input character not legal for the segment's mode.
    #[error("character at offset {offset} is not valid in {mode:?} mode")]
    BadCharacter {
        /// Mode whose alphabet was violated.
        mode: EncodeMode,
        /// Character offset of the offending input.
        offset: usize,
    },

    /// Odd Shift-JIS byte length, or a code point outside both Kanji ranges.
    #[error("invalid Shift-JIS Kanji payload at byte offset {offset}")]
    BadKanji {
        /// Byte offset of the offending pair (or trailing byte).
        offset: usize,
    },

    /// The segments do not fit the requested symbol version.
    #[error("encoded data is {bits} bits but the symbol holds only {capacity} bits")]
    CodeOverflow {
        /// Bits required by the encoded segments.
        bits: usize,
        /// Bit capacity of the (version, level) combination.
        capacity: usize,
    },

    /// Grid coordinate outside `[0, N)`, or a read before `make()`.
    #[error("module ({row}, {col}) is outside the {size}x{size} symbol")]
    OutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Side length of the symbol; 0 when the symbol has not been built.
        size: usize,
    },

    /// A table lookup fell outside the standard's coverage. Unreachable for
    /// legal (version, level) inputs.
    #[error("internal table error: {message}")]
    Internal {
        /// Description of the failed lookup.
        message: String,
    },
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, QrError>;

impl QrError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
