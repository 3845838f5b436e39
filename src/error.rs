//! Error taxonomy untuk encode/decode
//!
//! Semua kegagalan dikembalikan langsung ke pemanggil via `?`.
//! Tidak ada retry dan tidak ada hasil parsial dari `serialize`.

use thiserror::Error;

/// Errors produced while encoding or decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The value or destination has a shape the codec cannot represent,
    /// or a shape mismatch that is detectable before touching the bytes.
    #[error("shape error: {reason}")]
    Shape {
        /// Human readable cause.
        reason: String,
    },

    /// The input ended before the destination shape was fully decoded.
    #[error("truncated input at offset {offset}: need {needed} bytes, have {available}")]
    TruncatedInput {
        /// Absolute offset (from the start of the input) of the failed read.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes that were left.
        available: usize,
    },

    /// A sequence or map could not be sized for the decoded count.
    #[error("allocation failed: {requested} {what}")]
    Allocation {
        /// What was being allocated ("elements", "entries").
        what: &'static str,
        /// Requested count.
        requested: usize,
    },

    /// Bytes decoded into a UTF-8 string type were not valid UTF-8.
    #[error("invalid utf-8 in string at offset {offset}")]
    InvalidUtf8 {
        /// Absolute offset of the string payload.
        offset: usize,
    },
}

/// Result type untuk operasi codec
pub type Result<T> = std::result::Result<T, CodecError>;

impl CodecError {
    pub(crate) fn shape(reason: impl Into<String>) -> Self {
        CodecError::Shape {
            reason: reason.into(),
        }
    }

    /// Geser offset error dari sub-decoder ke koordinat parent.
    ///
    /// Nested decoders only see a suffix view, so their offsets start at 0.
    pub(crate) fn shifted(self, base: usize) -> Self {
        match self {
            CodecError::TruncatedInput {
                offset,
                needed,
                available,
            } => CodecError::TruncatedInput {
                offset: offset + base,
                needed,
                available,
            },
            CodecError::InvalidUtf8 { offset } => CodecError::InvalidUtf8 {
                offset: offset + base,
            },
            other => other,
        }
    }

    /// True for [`CodecError::TruncatedInput`].
    pub fn is_truncated(&self) -> bool {
        matches!(self, CodecError::TruncatedInput { .. })
    }

    /// True for [`CodecError::Shape`].
    pub fn is_shape(&self) -> bool {
        matches!(self, CodecError::Shape { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shifted_moves_truncation_offset() {
        let err = CodecError::TruncatedInput {
            offset: 2,
            needed: 4,
            available: 1,
        };
        assert_eq!(
            err.shifted(10),
            CodecError::TruncatedInput {
                offset: 12,
                needed: 4,
                available: 1
            }
        );
    }

    #[test]
    fn test_shifted_keeps_shape_error() {
        let err = CodecError::shape("channel");
        assert_eq!(err.clone().shifted(7), err);
        assert!(err.is_shape());
        assert!(!err.is_truncated());
    }

    #[test]
    fn test_display() {
        let err = CodecError::Allocation {
            what: "elements",
            requested: 3,
        };
        assert_eq!(err.to_string(), "allocation failed: 3 elements");
    }
}
