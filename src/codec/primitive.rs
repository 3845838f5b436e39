//! Primitive Codec: scalar leaves, little-endian, fixed width per kind
//!
//! | Kind            | Width | Layout                          |
//! |-----------------|-------|---------------------------------|
//! | bool            | 1     | `0x01` / `0x00`                 |
//! | i8/u8           | 1     | raw byte                        |
//! | i16/u16         | 2     | LE                              |
//! | i32/u32/f32     | 4     | LE (float: IEEE-754 bits)       |
//! | i64/u64/f64     | 8     | LE; `isize`/`usize` widen to 64 |
//! | complex64       | 8     | f32 real, f32 imaginary         |
//! | complex128      | 16    | f64 real, f64 imaginary         |
//! | string          | 4 + n | u32 byte count + raw bytes      |

use std::borrow::Cow;

use super::{Decode, Encode, PrimitiveKind, Shape, Shaped};
use crate::core::{ByteSink, ByteSource};
use crate::error::{CodecError, Result};

/// Write a u32 length prefix.
#[inline(always)]
pub(crate) fn put_len(sink: &mut ByteSink, len: usize) -> Result<()> {
    let prefix = u32::try_from(len)
        .map_err(|_| CodecError::shape(format!("length {len} exceeds u32 prefix")))?;
    sink.put_u32(prefix);
    Ok(())
}

/// Read a u32 length prefix.
#[inline(always)]
pub(crate) fn get_len(src: &mut ByteSource<'_>) -> Result<usize> {
    Ok(src.get_u32()? as usize)
}

/// Read a length-prefixed byte range without copying.
#[inline(always)]
pub(crate) fn get_raw<'de>(src: &mut ByteSource<'de>) -> Result<(usize, &'de [u8])> {
    let n = get_len(src)?;
    let offset = src.consumed();
    Ok((offset, src.read(n)?))
}

#[inline(always)]
pub(crate) fn utf8(raw: &[u8], offset: usize) -> Result<&str> {
    std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8 { offset })
}

macro_rules! fixed_width {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl Shaped for $ty {
            #[inline(always)]
            fn shape() -> Shape {
                Shape::Primitive(PrimitiveKind::$kind)
            }
        }

        impl Encode for $ty {
            #[inline(always)]
            fn encode(&self, sink: &mut ByteSink) -> Result<()> {
                sink.write(&self.to_le_bytes());
                Ok(())
            }
        }

        impl<'de> Decode<'de> for $ty {
            #[inline(always)]
            fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
                let mut src = ByteSource::new(input);
                *self = <$ty>::from_le_bytes(src.read_array()?);
                Ok(src.consumed())
            }
        }
    )*};
}

fixed_width! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

// Platform word selalu dinormalisasi ke 64-bit di wire
macro_rules! word_sized {
    ($($ty:ty => $wide:ty, $kind:ident);* $(;)?) => {$(
        impl Shaped for $ty {
            #[inline(always)]
            fn shape() -> Shape {
                Shape::Primitive(PrimitiveKind::$kind)
            }
        }

        impl Encode for $ty {
            #[inline(always)]
            fn encode(&self, sink: &mut ByteSink) -> Result<()> {
                sink.write(&(*self as $wide).to_le_bytes());
                Ok(())
            }
        }

        impl<'de> Decode<'de> for $ty {
            fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
                let mut src = ByteSource::new(input);
                let wide = <$wide>::from_le_bytes(src.read_array()?);
                *self = <$ty>::try_from(wide).map_err(|_| {
                    CodecError::shape(format!(
                        "{wide} does not fit {} on this host",
                        stringify!($ty)
                    ))
                })?;
                Ok(src.consumed())
            }
        }
    )*};
}

word_sized! {
    isize => i64, I64;
    usize => u64, U64;
}

impl Shaped for bool {
    #[inline(always)]
    fn shape() -> Shape {
        Shape::Primitive(PrimitiveKind::Bool)
    }
}

impl Encode for bool {
    #[inline(always)]
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        sink.put(*self as u8);
        Ok(())
    }
}

impl<'de> Decode<'de> for bool {
    #[inline(always)]
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
        let mut src = ByteSource::new(input);
        *self = src.next()? == 1;
        Ok(src.consumed())
    }
}

/// Complex number with `f32` parts (8 bytes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex64 {
    pub re: f32,
    pub im: f32,
}

/// Complex number with `f64` parts (16 bytes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex128 {
    pub re: f64,
    pub im: f64,
}

macro_rules! complex {
    ($($ty:ident($part:ty) => $kind:ident);* $(;)?) => {$(
        impl $ty {
            pub const fn new(re: $part, im: $part) -> Self {
                Self { re, im }
            }
        }

        impl Shaped for $ty {
            #[inline(always)]
            fn shape() -> Shape {
                Shape::Primitive(PrimitiveKind::$kind)
            }
        }

        impl Encode for $ty {
            #[inline(always)]
            fn encode(&self, sink: &mut ByteSink) -> Result<()> {
                sink.write(&self.re.to_le_bytes());
                sink.write(&self.im.to_le_bytes());
                Ok(())
            }
        }

        impl<'de> Decode<'de> for $ty {
            #[inline(always)]
            fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
                let mut src = ByteSource::new(input);
                self.re = <$part>::from_le_bytes(src.read_array()?);
                self.im = <$part>::from_le_bytes(src.read_array()?);
                Ok(src.consumed())
            }
        }
    )*};
}

complex! {
    Complex64(f32) => Complex64;
    Complex128(f64) => Complex128;
}

impl Shaped for str {
    #[inline(always)]
    fn shape() -> Shape {
        Shape::Primitive(PrimitiveKind::Str)
    }
}

impl Encode for str {
    #[inline(always)]
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        put_len(sink, self.len())?;
        sink.write(self.as_bytes());
        Ok(())
    }
}

impl Shaped for String {
    #[inline(always)]
    fn shape() -> Shape {
        Shape::Primitive(PrimitiveKind::Str)
    }
}

impl Encode for String {
    #[inline(always)]
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        self.as_str().encode(sink)
    }
}

impl<'de> Decode<'de> for String {
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
        let mut src = ByteSource::new(input);
        let (offset, raw) = get_raw(&mut src)?;
        // Copy: alokasi lama dipakai ulang kalau cukup
        self.clear();
        self.push_str(utf8(raw, offset)?);
        Ok(src.consumed())
    }
}

/// Borrowed string: aliases the input, no copy.
impl<'de: 'a, 'a> Decode<'de> for &'a str {
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
        let mut src = ByteSource::new(input);
        let (offset, raw) = get_raw(&mut src)?;
        *self = utf8(raw, offset)?;
        Ok(src.consumed())
    }
}

/// Borrowed byte string. Wire-identical to `Vec<u8>` and to a string, but
/// accepts bytes that are not UTF-8.
impl<'de: 'a, 'a> Decode<'de> for &'a [u8] {
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
        let mut src = ByteSource::new(input);
        let (_, raw) = get_raw(&mut src)?;
        *self = raw;
        Ok(src.consumed())
    }
}

impl Shaped for Cow<'_, str> {
    #[inline(always)]
    fn shape() -> Shape {
        Shape::Primitive(PrimitiveKind::Str)
    }
}

impl Encode for Cow<'_, str> {
    #[inline(always)]
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        self.as_ref().encode(sink)
    }
}

impl<'de: 'a, 'a> Decode<'de> for Cow<'a, str> {
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
        let mut src = ByteSource::new(input);
        let (offset, raw) = get_raw(&mut src)?;
        *self = Cow::Borrowed(utf8(raw, offset)?);
        Ok(src.consumed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<T: Encode + ?Sized>(value: &T) -> Vec<u8> {
        let mut sink = ByteSink::new();
        value.encode(&mut sink).unwrap();
        sink.into_bytes()
    }

    fn roundtrip<T>(value: T) -> T
    where
        T: Encode + for<'de> Decode<'de> + Default,
    {
        let bytes = encode(&value);
        let mut out = T::default();
        let used = out.decode_into(&bytes).unwrap();
        assert_eq!(used, bytes.len());
        out
    }

    #[test]
    fn test_integer_layout() {
        assert_eq!(encode(&-2i8), vec![0xFE]);
        assert_eq!(encode(&0x0102u16), vec![0x02, 0x01]);
        assert_eq!(encode(&-1i32), vec![0xFF; 4]);
        assert_eq!(encode(&1u64), vec![1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_word_sized_is_64_bit() {
        assert_eq!(encode(&7usize), encode(&7u64));
        assert_eq!(encode(&-7isize), encode(&-7i64));
        assert_eq!(roundtrip(-7isize), -7);
        assert_eq!(<usize as Shaped>::shape(), Shape::Primitive(PrimitiveKind::U64));
    }

    #[test]
    fn test_bool() {
        assert_eq!(encode(&true), vec![0x01]);
        assert_eq!(encode(&false), vec![0x00]);
        assert!(roundtrip(true));

        let mut flag = true;
        flag.decode_into(&[0x00]).unwrap();
        assert!(!flag);
    }

    #[test]
    fn test_int64_boundaries() {
        for v in [9223372036854775807i64, -9223372036854775807, 0] {
            assert_eq!(roundtrip(v), v);
        }
        for v in [0u64, 18446744073709551615] {
            assert_eq!(roundtrip(v), v);
        }
    }

    #[test]
    fn test_float_boundaries() {
        for v in [f32::MAX, -f32::MAX] {
            assert_eq!(roundtrip(v), v);
            assert_eq!(encode(&v), v.to_bits().to_le_bytes().to_vec());
        }
        for v in [f64::MAX, -f64::MAX] {
            assert_eq!(roundtrip(v), v);
            assert_eq!(encode(&v), v.to_bits().to_le_bytes().to_vec());
        }
    }

    #[test]
    fn test_complex_layout() {
        let c = Complex64::new(1.5, -2.0);
        let bytes = encode(&c);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1.5f32.to_le_bytes());
        assert_eq!(&bytes[4..], &(-2.0f32).to_le_bytes());
        assert_eq!(roundtrip(c), c);

        let c = Complex128::new(f64::MAX, f64::MIN_POSITIVE);
        assert_eq!(encode(&c).len(), 16);
        assert_eq!(roundtrip(c), c);
    }

    #[test]
    fn test_string_multibyte() {
        let s = "test-again#$çcçá";
        let bytes = encode(s);
        // Prefix adalah jumlah byte, bukan jumlah karakter
        assert_eq!(&bytes[..4], &(s.len() as u32).to_le_bytes());
        assert_eq!(&bytes[4..], s.as_bytes());
        assert_eq!(roundtrip(s.to_string()), s);
    }

    #[test]
    fn test_borrowed_str_aliases_input() {
        let bytes = encode("zero-copy");
        let mut out: &str = "";
        out.decode_into(&bytes).unwrap();
        assert_eq!(out, "zero-copy");
        assert_eq!(out.as_ptr(), bytes[4..].as_ptr());

        let mut cow: Cow<'_, str> = Cow::default();
        cow.decode_into(&bytes).unwrap();
        assert!(matches!(cow, Cow::Borrowed("zero-copy")));
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = [2, 0, 0, 0, 0xC3, 0x28];
        let mut out = String::new();
        assert_eq!(
            out.decode_into(&bytes).unwrap_err(),
            CodecError::InvalidUtf8 { offset: 4 }
        );

        // Byte string menerima bytes apa pun
        let mut raw: &[u8] = &[];
        assert_eq!(raw.decode_into(&bytes).unwrap(), 6);
        assert_eq!(raw, &[0xC3, 0x28]);
    }

    #[test]
    fn test_truncated_string() {
        let bytes = [5, 0, 0, 0, b'a', b'b'];
        let mut out = String::new();
        assert_eq!(
            out.decode_into(&bytes).unwrap_err(),
            CodecError::TruncatedInput {
                offset: 4,
                needed: 5,
                available: 2
            }
        );
    }
}
