//! Dynamic Walker: encode/decode dipandu oleh [`Shape`] saat runtime
//!
//! Static path (`Encode`/`Decode`) mengetahui shape dari tipe Rust. Walker ini
//! menerima shape sebagai data, sehingga bisa menangani value yang tipenya
//! baru diketahui saat runtime. Aturan wire-nya identik dengan static path:
//! bytes yang dihasilkan sama persis untuk isi logis yang sama.
//!
//! This is also where shape problems surface at run time: an
//! [`Shape::Unsupported`] component or a [`Value`] that does not match its
//! descriptor returns [`CodecError::Shape`].
//!
//! Maps with common primitive key/value kinds take a fast path that reads and
//! writes entries directly instead of recursing through the dispatcher.

use super::composite::{ABSENT, PRESENT};
use super::primitive::{get_len, get_raw, put_len};
use super::{decode_echo, Complex128, Complex64, Encode, PrimitiveKind, Shape};
use crate::core::{ByteSink, ByteSource};
use crate::error::{CodecError, Result};

/// Runtime value tree matching a [`Shape`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Complex64(Complex64),
    Complex128(Complex128),
    /// Raw string bytes, not validated as UTF-8
    Str(Vec<u8>),
    Pointer(Option<Box<Value>>),
    /// Field values in declaration order
    Struct(Vec<Value>),
    Sequence(Vec<Value>),
    /// Entries in enumeration order
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn string(s: impl AsRef<[u8]>) -> Self {
        Value::Str(s.as_ref().to_vec())
    }

    pub fn some(inner: Value) -> Self {
        Value::Pointer(Some(Box::new(inner)))
    }

    pub fn none() -> Self {
        Value::Pointer(None)
    }

    /// String content, if this is a UTF-8 string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(raw) => std::str::from_utf8(raw).ok(),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Complex64(_) => "complex64",
            Value::Complex128(_) => "complex128",
            Value::Str(_) => "str",
            Value::Pointer(_) => "pointer",
            Value::Struct(_) => "struct",
            Value::Sequence(_) => "sequence",
            Value::Map(_) => "map",
        }
    }
}

#[cold]
fn mismatch(shape: &Shape, value: &Value) -> CodecError {
    CodecError::shape(format!(
        "{} value does not match shape {shape}",
        value.kind_name()
    ))
}

#[cold]
fn unsupported(what: &str) -> CodecError {
    CodecError::shape(format!("{what} has no wire representation"))
}

#[inline(always)]
fn put_raw(sink: &mut ByteSink, raw: &[u8]) -> Result<()> {
    put_len(sink, raw.len())?;
    sink.write(raw);
    Ok(())
}

/// Encode `value` following `shape`.
pub fn encode_value(shape: &Shape, value: &Value, sink: &mut ByteSink) -> Result<()> {
    match (shape, value) {
        (Shape::Unsupported(what), _) => Err(unsupported(what)),
        (Shape::Primitive(kind), value) => encode_primitive(*kind, value, sink),
        (Shape::Pointer(_), Value::Pointer(None)) => {
            sink.put(ABSENT);
            Ok(())
        }
        (Shape::Pointer(inner), Value::Pointer(Some(pointee))) => {
            sink.put(PRESENT);
            encode_value(inner, pointee, sink)
        }
        (Shape::Struct(fields), Value::Struct(values)) => {
            if fields.len() != values.len() {
                return Err(CodecError::shape(format!(
                    "struct value has {} fields, shape {shape} has {}",
                    values.len(),
                    fields.len()
                )));
            }
            for (field, value) in fields.iter().zip(values) {
                encode_value(&field.shape, value, sink)?;
            }
            Ok(())
        }
        (Shape::Sequence { element, len }, Value::Sequence(items)) => {
            if let Some(n) = len {
                if *n != items.len() {
                    return Err(CodecError::shape(format!(
                        "sequence of {} elements does not fit shape {shape}",
                        items.len()
                    )));
                }
            }
            put_len(sink, items.len())?;
            for item in items {
                encode_value(element, item, sink)?;
            }
            Ok(())
        }
        (Shape::Map { key, value }, Value::Map(entries)) => {
            match MapFastPath::select(key, value) {
                Some(fast) => fast.encode(entries, sink),
                None => encode_map_generic(key, value, entries, sink),
            }
        }
        (shape, value) => Err(mismatch(shape, value)),
    }
}

fn encode_primitive(kind: PrimitiveKind, value: &Value, sink: &mut ByteSink) -> Result<()> {
    match (kind, value) {
        (PrimitiveKind::Bool, Value::Bool(v)) => v.encode(sink),
        (PrimitiveKind::I8, Value::I8(v)) => v.encode(sink),
        (PrimitiveKind::I16, Value::I16(v)) => v.encode(sink),
        (PrimitiveKind::I32, Value::I32(v)) => v.encode(sink),
        (PrimitiveKind::I64, Value::I64(v)) => v.encode(sink),
        (PrimitiveKind::U8, Value::U8(v)) => v.encode(sink),
        (PrimitiveKind::U16, Value::U16(v)) => v.encode(sink),
        (PrimitiveKind::U32, Value::U32(v)) => v.encode(sink),
        (PrimitiveKind::U64, Value::U64(v)) => v.encode(sink),
        (PrimitiveKind::F32, Value::F32(v)) => v.encode(sink),
        (PrimitiveKind::F64, Value::F64(v)) => v.encode(sink),
        (PrimitiveKind::Complex64, Value::Complex64(v)) => v.encode(sink),
        (PrimitiveKind::Complex128, Value::Complex128(v)) => v.encode(sink),
        (PrimitiveKind::Str, Value::Str(raw)) => put_raw(sink, raw),
        (kind, value) => Err(mismatch(&Shape::Primitive(kind), value)),
    }
}

fn encode_map_generic(
    key: &Shape,
    value: &Shape,
    entries: &[(Value, Value)],
    sink: &mut ByteSink,
) -> Result<()> {
    put_len(sink, entries.len())?;
    for (k, v) in entries {
        encode_value(key, k, sink)?;
        encode_value(value, v, sink)?;
    }
    Ok(())
}

/// Decode one value of `shape` from the start of `input`.
///
/// Returns the value and the number of bytes consumed; trailing bytes are
/// left alone.
pub fn decode_value(shape: &Shape, input: &[u8]) -> Result<(Value, usize)> {
    let mut src = ByteSource::new(input);
    let value = match shape {
        Shape::Unsupported(what) => return Err(unsupported(what)),
        Shape::Primitive(kind) => decode_primitive(*kind, &mut src)?,
        Shape::Pointer(inner) => {
            if src.next()? == ABSENT {
                Value::Pointer(None)
            } else {
                Value::some(echo(&mut src, inner)?)
            }
        }
        Shape::Struct(fields) => {
            let mut values = Vec::with_capacity(fields.len());
            for field in fields {
                values.push(echo(&mut src, &field.shape)?);
            }
            Value::Struct(values)
        }
        Shape::Sequence { element, len } => {
            let count = get_len(&mut src)?;
            if let Some(n) = len {
                if *n != count {
                    return Err(CodecError::shape(format!(
                        "shape {shape} cannot hold {count} decoded elements"
                    )));
                }
            }
            let mut items = with_capacity(count, src.remaining(), "elements")?;
            for _ in 0..count {
                items.push(echo(&mut src, element)?);
            }
            Value::Sequence(items)
        }
        Shape::Map { key, value } => {
            let entries = match MapFastPath::select(key, value) {
                Some(fast) => fast.decode(&mut src)?,
                None => decode_map_generic(key, value, &mut src)?,
            };
            Value::Map(entries)
        }
    };
    Ok((value, src.consumed()))
}

/// Nested decode lewat suffix view, lalu parent skip sejumlah consumed.
#[inline]
fn echo(src: &mut ByteSource<'_>, shape: &Shape) -> Result<Value> {
    let base = src.consumed();
    let (value, used) =
        decode_value(shape, src.bytes_from_cursor()).map_err(|e| e.shifted(base))?;
    src.skip(used)?;
    Ok(value)
}

fn with_capacity<T>(count: usize, remaining: usize, what: &'static str) -> Result<Vec<T>> {
    let mut items = Vec::new();
    items
        .try_reserve(count.min(remaining))
        .map_err(|_| CodecError::Allocation {
            what,
            requested: count,
        })?;
    Ok(items)
}

fn decode_primitive(kind: PrimitiveKind, src: &mut ByteSource<'_>) -> Result<Value> {
    macro_rules! leaf {
        ($variant:ident, $init:expr) => {{
            let mut v = $init;
            decode_echo(src, &mut v)?;
            Value::$variant(v)
        }};
    }

    Ok(match kind {
        PrimitiveKind::Bool => leaf!(Bool, false),
        PrimitiveKind::I8 => leaf!(I8, 0i8),
        PrimitiveKind::I16 => leaf!(I16, 0i16),
        PrimitiveKind::I32 => leaf!(I32, 0i32),
        PrimitiveKind::I64 => leaf!(I64, 0i64),
        PrimitiveKind::U8 => leaf!(U8, 0u8),
        PrimitiveKind::U16 => leaf!(U16, 0u16),
        PrimitiveKind::U32 => leaf!(U32, 0u32),
        PrimitiveKind::U64 => leaf!(U64, 0u64),
        PrimitiveKind::F32 => leaf!(F32, 0f32),
        PrimitiveKind::F64 => leaf!(F64, 0f64),
        PrimitiveKind::Complex64 => leaf!(Complex64, Complex64::default()),
        PrimitiveKind::Complex128 => leaf!(Complex128, Complex128::default()),
        PrimitiveKind::Str => Value::Str(get_raw(src)?.1.to_vec()),
    })
}

fn decode_map_generic(
    key: &Shape,
    value: &Shape,
    src: &mut ByteSource<'_>,
) -> Result<Vec<(Value, Value)>> {
    let count = get_len(src)?;
    let mut entries = with_capacity(count, src.remaining(), "entries")?;
    for _ in 0..count {
        let k = echo(src, key)?;
        let v = echo(src, value)?;
        entries.push((k, v));
    }
    Ok(entries)
}

/// Specialised map layouts for common primitive key/value kinds.
///
/// Purely an optimisation: output is byte-identical to the generic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MapFastPath {
    I64ToI64,
    StrToStr,
    StrToI64,
}

impl MapFastPath {
    pub(crate) fn select(key: &Shape, value: &Shape) -> Option<Self> {
        use PrimitiveKind::{Str, I64};

        match (key, value) {
            (Shape::Primitive(I64), Shape::Primitive(I64)) => Some(MapFastPath::I64ToI64),
            (Shape::Primitive(Str), Shape::Primitive(Str)) => Some(MapFastPath::StrToStr),
            (Shape::Primitive(Str), Shape::Primitive(I64)) => Some(MapFastPath::StrToI64),
            _ => None,
        }
    }

    fn kinds(self) -> (PrimitiveKind, PrimitiveKind) {
        use PrimitiveKind::{Str, I64};

        match self {
            MapFastPath::I64ToI64 => (I64, I64),
            MapFastPath::StrToStr => (Str, Str),
            MapFastPath::StrToI64 => (Str, I64),
        }
    }

    /// Error for an entry the fast path cannot write, naming the half that
    /// does not match.
    #[cold]
    fn entry_mismatch(self, key: &Value, value: &Value) -> CodecError {
        let (key_kind, value_kind) = self.kinds();
        let holds = |kind: PrimitiveKind, v: &Value| {
            matches!(
                (kind, v),
                (PrimitiveKind::I64, Value::I64(_)) | (PrimitiveKind::Str, Value::Str(_))
            )
        };

        if holds(key_kind, key) {
            mismatch(&Shape::Primitive(value_kind), value)
        } else {
            mismatch(&Shape::Primitive(key_kind), key)
        }
    }

    pub(crate) fn encode(self, entries: &[(Value, Value)], sink: &mut ByteSink) -> Result<()> {
        put_len(sink, entries.len())?;
        for entry in entries {
            match (self, entry) {
                (MapFastPath::I64ToI64, (Value::I64(k), Value::I64(v))) => {
                    sink.put_u64(*k as u64);
                    sink.put_u64(*v as u64);
                }
                (MapFastPath::StrToStr, (Value::Str(k), Value::Str(v))) => {
                    put_raw(sink, k)?;
                    put_raw(sink, v)?;
                }
                (MapFastPath::StrToI64, (Value::Str(k), Value::I64(v))) => {
                    put_raw(sink, k)?;
                    sink.put_u64(*v as u64);
                }
                (_, (k, v)) => return Err(self.entry_mismatch(k, v)),
            }
        }
        Ok(())
    }

    pub(crate) fn decode(self, src: &mut ByteSource<'_>) -> Result<Vec<(Value, Value)>> {
        let count = get_len(src)?;
        let mut entries = with_capacity(count, src.remaining(), "entries")?;
        for _ in 0..count {
            let entry = match self {
                MapFastPath::I64ToI64 => (
                    Value::I64(src.get_u64()? as i64),
                    Value::I64(src.get_u64()? as i64),
                ),
                MapFastPath::StrToStr => (
                    Value::Str(get_raw(src)?.1.to_vec()),
                    Value::Str(get_raw(src)?.1.to_vec()),
                ),
                MapFastPath::StrToI64 => (
                    Value::Str(get_raw(src)?.1.to_vec()),
                    Value::I64(src.get_u64()? as i64),
                ),
            };
            entries.push(entry);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Field;

    fn prim(kind: PrimitiveKind) -> Shape {
        Shape::Primitive(kind)
    }

    fn encode(shape: &Shape, value: &Value) -> Vec<u8> {
        let mut sink = ByteSink::new();
        encode_value(shape, value, &mut sink).unwrap();
        sink.into_bytes()
    }

    fn person_shape() -> Shape {
        Shape::Struct(vec![
            Field::new("active", prim(PrimitiveKind::Bool)),
            Field::new("name", prim(PrimitiveKind::Str)),
            Field::new("age", prim(PrimitiveKind::I64)),
        ])
    }

    fn person(active: bool, name: &str, age: i64) -> Value {
        Value::Struct(vec![Value::Bool(active), Value::string(name), Value::I64(age)])
    }

    #[test]
    fn test_struct_roundtrip() {
        let shape = person_shape();
        let value = person(true, "Alice", 30);
        let bytes = encode(&shape, &value);
        assert_eq!(bytes.len(), 1 + 4 + 5 + 8);

        let (decoded, used) = decode_value(&shape, &bytes).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(used, bytes.len());
    }

    #[test]
    fn test_pointer_and_sequence() {
        let shape = Shape::sequence(Shape::pointer(person_shape()));
        let value = Value::Sequence(vec![
            Value::some(person(false, "", 0)),
            Value::none(),
            Value::some(person(true, "Bob", -4)),
        ]);
        let bytes = encode(&shape, &value);
        assert_eq!(&bytes[..4], &[3, 0, 0, 0]);
        assert_eq!(decode_value(&shape, &bytes).unwrap().0, value);
    }

    #[test]
    fn test_unsupported_shape() {
        let shape = Shape::Struct(vec![
            Field::new("id", prim(PrimitiveKind::U8)),
            Field::new("events", Shape::Unsupported("channel")),
        ]);
        let value = Value::Struct(vec![Value::U8(1), Value::U8(2)]);

        let mut sink = ByteSink::new();
        assert!(encode_value(&shape, &value, &mut sink)
            .unwrap_err()
            .is_shape());
        assert!(decode_value(&shape, &[1, 2]).unwrap_err().is_shape());
    }

    #[test]
    fn test_value_shape_mismatch() {
        let mut sink = ByteSink::new();
        let err = encode_value(&person_shape(), &Value::I64(3), &mut sink).unwrap_err();
        assert!(err.is_shape());

        let err = encode_value(
            &person_shape(),
            &Value::Struct(vec![Value::Bool(true)]),
            &mut sink,
        )
        .unwrap_err();
        assert!(err.is_shape());

        let err = encode_value(
            &Shape::array(prim(PrimitiveKind::U8), 2),
            &Value::Sequence(vec![Value::U8(1)]),
            &mut sink,
        )
        .unwrap_err();
        assert!(err.is_shape());
    }

    #[test]
    fn test_fast_path_selection() {
        let i64s = prim(PrimitiveKind::I64);
        let strs = prim(PrimitiveKind::Str);
        assert_eq!(MapFastPath::select(&i64s, &i64s), Some(MapFastPath::I64ToI64));
        assert_eq!(MapFastPath::select(&strs, &strs), Some(MapFastPath::StrToStr));
        assert_eq!(MapFastPath::select(&strs, &i64s), Some(MapFastPath::StrToI64));
        assert_eq!(MapFastPath::select(&i64s, &strs), None);
        assert_eq!(MapFastPath::select(&i64s, &person_shape()), None);
    }

    #[test]
    fn test_fast_path_matches_generic() {
        let cases = [
            (
                MapFastPath::I64ToI64,
                vec![
                    (Value::I64(i64::MAX), Value::I64(-1)),
                    (Value::I64(0), Value::I64(0)),
                ],
            ),
            (
                MapFastPath::StrToStr,
                vec![
                    (Value::string("k"), Value::string("test-again#$çcçá")),
                    (Value::string(""), Value::string("")),
                ],
            ),
            (
                MapFastPath::StrToI64,
                vec![(Value::string("one"), Value::I64(1))],
            ),
        ];

        for (fast, entries) in cases {
            let (key_kind, value_kind) = fast.kinds();
            let (key, value) = (prim(key_kind), prim(value_kind));

            let mut fast_sink = ByteSink::new();
            fast.encode(&entries, &mut fast_sink).unwrap();

            let mut generic_sink = ByteSink::new();
            encode_map_generic(&key, &value, &entries, &mut generic_sink).unwrap();

            assert_eq!(fast_sink.bytes(), generic_sink.bytes(), "{fast:?}");

            let bytes = fast_sink.bytes();
            let fast_decoded = fast.decode(&mut ByteSource::new(bytes)).unwrap();
            let generic_decoded =
                decode_map_generic(&key, &value, &mut ByteSource::new(bytes)).unwrap();
            assert_eq!(fast_decoded, entries);
            assert_eq!(generic_decoded, entries);
        }
    }

    #[test]
    fn test_fast_path_rejects_wrong_entries() {
        let mut sink = ByteSink::new();
        let entries = vec![(Value::I32(1), Value::I64(1))];
        assert!(MapFastPath::I64ToI64
            .encode(&entries, &mut sink)
            .unwrap_err()
            .is_shape());
    }

    #[test]
    fn test_fast_path_names_mismatched_half() {
        let mut sink = ByteSink::new();

        let bad_value = vec![(Value::I64(1), Value::string("x"))];
        assert_eq!(
            MapFastPath::I64ToI64.encode(&bad_value, &mut sink).unwrap_err(),
            CodecError::shape("str value does not match shape i64")
        );

        let bad_key = vec![(Value::U8(1), Value::I64(1))];
        assert_eq!(
            MapFastPath::StrToI64.encode(&bad_key, &mut sink).unwrap_err(),
            CodecError::shape("u8 value does not match shape str")
        );
    }

    #[test]
    fn test_non_utf8_string_is_kept() {
        let shape = prim(PrimitiveKind::Str);
        let value = Value::Str(vec![0xFF, 0xFE]);
        let bytes = encode(&shape, &value);
        let (decoded, _) = decode_value(&shape, &bytes).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(decoded.as_str(), None);
    }

    #[test]
    fn test_truncated_nested_offset() {
        let shape = Shape::Struct(vec![
            Field::new("a", prim(PrimitiveKind::U16)),
            Field::new("b", Shape::pointer(prim(PrimitiveKind::U32))),
        ]);
        let err = decode_value(&shape, &[1, 0, PRESENT, 9]).unwrap_err();
        assert_eq!(
            err,
            CodecError::TruncatedInput {
                offset: 3,
                needed: 4,
                available: 1
            }
        );
    }
}
