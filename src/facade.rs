//! Serializer Facade: entry point publik
//!
//! - `serialize` / `serialize_into`: value -> bytes, tanpa output parsial
//! - `deserialize`: bytes -> destination (copy)
//! - `deserialize_borrowed`: bytes -> destination (zero-copy, string alias ke input)
//! - `data_rebind`: konversi antar dua tipe dengan shape yang sama
//!
//! The decoder trusts the destination: bytes produced from one shape and
//! decoded into a structurally different one are misread without an error
//! whenever the difference is not detectable (for example two `u32` fields
//! swapped). Trailing bytes after the decoded value are ignored.

use std::any::type_name;

use tracing::{debug, trace};

use crate::codec::value::{decode_value, encode_value};
use crate::codec::{Decode, DecodeOwned, Encode, Shape, Value};
use crate::core::{ByteSink, DEFAULT_CAPACITY};
use crate::error::{CodecError, Result};

/// Encode `value` into a fresh buffer.
pub fn serialize<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut sink = ByteSink::new();
    serialize_into(value, &mut sink)?;
    Ok(sink.into_bytes())
}

/// Append `value`'s encoding to an existing sink.
///
/// On error the sink is rewound to its length before the call.
pub fn serialize_into<T: Encode + ?Sized>(value: &T, sink: &mut ByteSink) -> Result<()> {
    let start = sink.len();
    match value.encode(sink) {
        Ok(()) => {
            trace!(ty = type_name::<T>(), len = sink.len() - start, "serialized");
            Ok(())
        }
        Err(err) => {
            sink.rewind(start);
            debug!(ty = type_name::<T>(), error = %err, "serialize failed");
            Err(err)
        }
    }
}

/// Decode `bytes` into `target`, copying string data.
///
/// On error `target` is left partially written: fields decoded before the
/// failure keep their new values. Discard it.
pub fn deserialize<T: DecodeOwned>(bytes: &[u8], target: &mut T) -> Result<()> {
    decode(bytes, target)
}

/// Decode `bytes` into `target`, letting `&str`/`&[u8]` leaves borrow from
/// `bytes` instead of copying.
pub fn deserialize_borrowed<'de, T>(bytes: &'de [u8], target: &mut T) -> Result<()>
where
    T: Decode<'de> + ?Sized,
{
    decode(bytes, target)
}

#[inline]
fn decode<'de, T: Decode<'de> + ?Sized>(bytes: &'de [u8], target: &mut T) -> Result<()> {
    match target.decode_into(bytes) {
        Ok(used) => {
            trace!(
                ty = type_name::<T>(),
                used,
                trailing = bytes.len() - used,
                "deserialized"
            );
            Ok(())
        }
        Err(err) => {
            debug!(
                ty = type_name::<T>(),
                error = %err,
                "deserialize failed, destination partially written"
            );
            Err(err)
        }
    }
}

/// Re-shape `source` into `target` through the wire format.
///
/// Same as `deserialize(&serialize(source)?, target)`.
pub fn data_rebind<S, T>(source: &S, target: &mut T) -> Result<()>
where
    S: Encode + ?Sized,
    T: DecodeOwned,
{
    let bytes = serialize(source)?;
    deserialize(&bytes, target)
}

/// Encode a runtime [`Value`] following a runtime [`Shape`].
///
/// Unsupported shapes are rejected before anything is written.
pub fn serialize_value(shape: &Shape, value: &Value) -> Result<Vec<u8>> {
    if let Some(what) = shape.find_unsupported() {
        debug!(%shape, "serialize rejected unsupported shape");
        return Err(CodecError::shape(format!("{what} has no wire representation")));
    }

    let mut sink = ByteSink::new();
    encode_value(shape, value, &mut sink)?;
    trace!(%shape, len = sink.len(), "serialized value");
    Ok(sink.into_bytes())
}

/// Decode a runtime [`Value`] of the given [`Shape`].
///
/// Like [`serialize_value`], unsupported shapes are rejected before any byte
/// is read, even when the component would never be reached (empty sequence,
/// absent pointer).
pub fn deserialize_value(shape: &Shape, bytes: &[u8]) -> Result<Value> {
    if let Some(what) = shape.find_unsupported() {
        debug!(%shape, "deserialize rejected unsupported shape");
        return Err(CodecError::shape(format!("{what} has no wire representation")));
    }

    let (value, used) = decode_value(shape, bytes)?;
    trace!(%shape, used, trailing = bytes.len() - used, "deserialized value");
    Ok(value)
}

/// The contract every serializer adapter exposes, so callers can drive them
/// interchangeably.
pub trait Serializer<T: ?Sized> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short identifier ("tagless", "json", ...)
    fn name(&self) -> &'static str;

    fn serialize(&self, value: &T) -> std::result::Result<Vec<u8>, Self::Error>;

    fn deserialize(&self, bytes: &[u8], target: &mut T) -> std::result::Result<(), Self::Error>;
}

/// Codec configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaglessConfig {
    /// Kapasitas awal sink untuk setiap `serialize`
    pub initial_capacity: usize,
}

impl Default for TaglessConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// This codec behind the [`Serializer`] contract
#[derive(Debug, Clone, Copy, Default)]
pub struct Tagless {
    config: TaglessConfig,
}

impl Tagless {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TaglessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TaglessConfig {
        &self.config
    }
}

impl<T: Encode + DecodeOwned> Serializer<T> for Tagless {
    type Error = CodecError;

    fn name(&self) -> &'static str {
        "tagless"
    }

    fn serialize(&self, value: &T) -> Result<Vec<u8>> {
        let mut sink = ByteSink::with_capacity(self.config.initial_capacity);
        serialize_into(value, &mut sink)?;
        Ok(sink.into_bytes())
    }

    fn deserialize(&self, bytes: &[u8], target: &mut T) -> Result<()> {
        decode(bytes, target)
    }
}
