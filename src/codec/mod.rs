//! Codec Layer: shape-driven encode/decode
//!
//! Prinsip desain:
//! - Tanpa schema: tidak ada type tag atau nama field di stream
//! - Shape ditentukan oleh tipe tujuan, bukan oleh bytes
//! - Rekursi simetris: encode dan decode berjalan dengan urutan yang sama
//!
//! Static path: [`Encode`]/[`Decode`] implemented per type (by hand for
//! primitive and composite rules, by `#[derive]` for structs).
//! Dynamic path: [`value`] walks a [`Value`] tree against a runtime [`Shape`].

mod composite;
mod primitive;
mod shape;
pub mod value;

use crate::core::{ByteSink, ByteSource};
use crate::error::Result;

pub use primitive::{Complex128, Complex64};
pub use shape::{Field, PrimitiveKind, Shape};
pub use value::Value;

/// Types whose wire shape is known statically.
///
/// The returned tree is built eagerly, so for a recursive type such as
/// `struct Node { next: Option<Box<Node>> }` this never returns and overflows
/// the stack. Encoding and decoding such types does not call `shape()`; to use
/// one with the dynamic walker, build a finite [`Shape`] by hand.
pub trait Shaped {
    fn shape() -> Shape;
}

/// Types that can be written to a [`ByteSink`].
pub trait Encode: Shaped {
    /// Append this value's encoding to `sink`.
    fn encode(&self, sink: &mut ByteSink) -> Result<()>;
}

/// Types that can be decoded in place from bytes borrowed for `'de`.
///
/// Decoding mutates `self`. On error, fields decoded before the failure keep
/// their new values; the caller should discard the destination.
pub trait Decode<'de>: Shaped {
    /// Decode from the start of `input` and return how many bytes were used.
    ///
    /// Trailing bytes after the value are left alone.
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize>;
}

/// Decode that does not borrow from the input.
pub trait DecodeOwned: for<'de> Decode<'de> {}

impl<T> DecodeOwned for T where T: for<'de> Decode<'de> {}

/// Decode a nested value from the source's remaining bytes and advance the
/// source by exactly what the nested decode consumed.
///
/// Struct fields have no length prefix, so this echo is the only way the
/// parent learns where the next field starts.
#[inline]
pub fn decode_echo<'de, T>(src: &mut ByteSource<'de>, dst: &mut T) -> Result<()>
where
    T: Decode<'de> + ?Sized,
{
    let base = src.consumed();
    let used = dst
        .decode_into(src.bytes_from_cursor())
        .map_err(|e| e.shifted(base))?;
    src.skip(used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[test]
    fn test_decode_echo_advances_parent() {
        let data = [0x2A, 0x00, 0x00, 0x00, 0x07];
        let mut src = ByteSource::new(&data);

        let mut value = 0u32;
        decode_echo(&mut src, &mut value).unwrap();
        assert_eq!(value, 42);
        assert_eq!(src.consumed(), 4);
        assert_eq!(src.next().unwrap(), 7);
    }

    #[test]
    fn test_decode_echo_reports_absolute_offset() {
        let data = [1u8, 2, 3, 4, 5];
        let mut src = ByteSource::new(&data);
        src.skip(3).unwrap();

        let mut value = 0u64;
        let err = decode_echo(&mut src, &mut value).unwrap_err();
        assert_eq!(
            err,
            CodecError::TruncatedInput {
                offset: 3,
                needed: 8,
                available: 2
            }
        );
        assert_eq!(src.consumed(), 3);
    }
}
