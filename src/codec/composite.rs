//! Composite Codec: pointer, struct, sequence dan map
//!
//! Setiap nested value di-decode lewat [`decode_echo`]: sub-decoder menerima
//! suffix view dan melaporkan jumlah byte yang dipakai.
//!
//! Wire rules:
//! - Pointer (`Option<T>`): 1-byte presence flag, `0x01` absent, `0x00`
//!   present followed by the pointee
//! - Struct (tuples, derived structs): fields back to back, no prefix
//! - Sequence (`Vec<T>`, `[T]`, `[T; N]`, `VecDeque<T>`): u32 count + elements
//! - Map (`HashMap`, `BTreeMap`): u32 count + (key, value) pairs

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};

use super::primitive::{get_len, put_len};
use super::{decode_echo, Decode, Encode, Field, Shape, Shaped};
use crate::core::{ByteSink, ByteSource};
use crate::error::{CodecError, Result};

/// Presence flag: pointee tidak ada
pub const ABSENT: u8 = 0x01;
/// Presence flag: pointee mengikuti
pub const PRESENT: u8 = 0x00;

/// Size an empty collection for `count` decoded items.
///
/// Reservation is capped by the bytes left in the input so a corrupt count
/// cannot force a huge allocation up front; the collection still grows past
/// the cap if the items really are that small.
#[inline]
fn reserve_vec<T>(items: &mut Vec<T>, count: usize, remaining: usize) -> Result<()> {
    items
        .try_reserve(count.min(remaining))
        .map_err(|_| CodecError::Allocation {
            what: "elements",
            requested: count,
        })
}

impl<T: Shaped + ?Sized> Shaped for &T {
    #[inline(always)]
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    #[inline(always)]
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        (**self).encode(sink)
    }
}

// Box transparan: encoding sama dengan T
impl<T: Shaped + ?Sized> Shaped for Box<T> {
    #[inline(always)]
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    #[inline(always)]
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        (**self).encode(sink)
    }
}

impl<'de, T: Decode<'de>> Decode<'de> for Box<T> {
    #[inline(always)]
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
        (**self).decode_into(input)
    }
}

impl<T: Shaped> Shaped for Option<T> {
    fn shape() -> Shape {
        Shape::pointer(T::shape())
    }
}

impl<T: Encode> Encode for Option<T> {
    #[inline]
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        match self {
            None => {
                sink.put(ABSENT);
                Ok(())
            }
            Some(value) => {
                sink.put(PRESENT);
                value.encode(sink)
            }
        }
    }
}

impl<'de, T: Decode<'de> + Default> Decode<'de> for Option<T> {
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
        let mut src = ByteSource::new(input);
        if src.next()? == ABSENT {
            *self = None;
            return Ok(src.consumed());
        }

        // Alokasi storage baru sebelum rekursi ke pointee
        let slot = self.insert(T::default());
        decode_echo(&mut src, slot)?;
        Ok(src.consumed())
    }
}

impl<T: Shaped> Shaped for [T] {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        put_len(sink, self.len())?;
        for item in self {
            item.encode(sink)?;
        }
        Ok(())
    }
}

impl<T: Shaped> Shaped for Vec<T> {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }
}

impl<T: Encode> Encode for Vec<T> {
    #[inline(always)]
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        self.as_slice().encode(sink)
    }
}

impl<'de, T: Decode<'de> + Default> Decode<'de> for Vec<T> {
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
        let mut src = ByteSource::new(input);
        let count = get_len(&mut src)?;

        self.clear();
        reserve_vec(self, count, src.remaining())?;

        for _ in 0..count {
            let mut item = T::default();
            decode_echo(&mut src, &mut item)?;
            self.push(item);
        }
        Ok(src.consumed())
    }
}

impl<T: Shaped> Shaped for VecDeque<T> {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }
}

impl<T: Encode> Encode for VecDeque<T> {
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        put_len(sink, self.len())?;
        for item in self {
            item.encode(sink)?;
        }
        Ok(())
    }
}

impl<'de, T: Decode<'de> + Default> Decode<'de> for VecDeque<T> {
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
        let mut src = ByteSource::new(input);
        let count = get_len(&mut src)?;

        self.clear();
        self.try_reserve(count.min(src.remaining()))
            .map_err(|_| CodecError::Allocation {
                what: "elements",
                requested: count,
            })?;

        for _ in 0..count {
            let mut item = T::default();
            decode_echo(&mut src, &mut item)?;
            self.push_back(item);
        }
        Ok(src.consumed())
    }
}

impl<T: Shaped, const N: usize> Shaped for [T; N] {
    fn shape() -> Shape {
        Shape::array(T::shape(), N)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    #[inline(always)]
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        self.as_slice().encode(sink)
    }
}

impl<'de, T: Decode<'de>, const N: usize> Decode<'de> for [T; N] {
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
        let mut src = ByteSource::new(input);
        let count = get_len(&mut src)?;
        if count != N {
            return Err(CodecError::shape(format!(
                "array of {N} elements cannot hold {count} decoded elements"
            )));
        }

        for item in self.iter_mut() {
            decode_echo(&mut src, item)?;
        }
        Ok(src.consumed())
    }
}

impl<K: Shaped, V: Shaped, S> Shaped for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }
}

impl<K: Encode, V: Encode, S> Encode for HashMap<K, V, S> {
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        put_len(sink, self.len())?;
        // Urutan enumerasi tidak stabil: bytes hanya round-trip secara isi
        for (key, value) in self {
            key.encode(sink)?;
            value.encode(sink)?;
        }
        Ok(())
    }
}

impl<'de, K, V, S> Decode<'de> for HashMap<K, V, S>
where
    K: Decode<'de> + Default + Eq + Hash,
    V: Decode<'de> + Default,
    S: BuildHasher,
{
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
        let mut src = ByteSource::new(input);
        let count = get_len(&mut src)?;

        self.clear();
        self.try_reserve(count.min(src.remaining()))
            .map_err(|_| CodecError::Allocation {
                what: "entries",
                requested: count,
            })?;

        for _ in 0..count {
            let mut key = K::default();
            decode_echo(&mut src, &mut key)?;
            let mut value = V::default();
            decode_echo(&mut src, &mut value)?;
            self.insert(key, value);
        }
        Ok(src.consumed())
    }
}

impl<K: Shaped, V: Shaped> Shaped for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode(&self, sink: &mut ByteSink) -> Result<()> {
        put_len(sink, self.len())?;
        for (key, value) in self {
            key.encode(sink)?;
            value.encode(sink)?;
        }
        Ok(())
    }
}

impl<'de, K, V> Decode<'de> for BTreeMap<K, V>
where
    K: Decode<'de> + Default + Ord,
    V: Decode<'de> + Default,
{
    fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
        let mut src = ByteSource::new(input);
        let count = get_len(&mut src)?;

        self.clear();
        for _ in 0..count {
            let mut key = K::default();
            decode_echo(&mut src, &mut key)?;
            let mut value = V::default();
            decode_echo(&mut src, &mut value)?;
            self.insert(key, value);
        }
        Ok(src.consumed())
    }
}

impl Shaped for () {
    fn shape() -> Shape {
        Shape::Struct(Vec::new())
    }
}

impl Encode for () {
    #[inline(always)]
    fn encode(&self, _sink: &mut ByteSink) -> Result<()> {
        Ok(())
    }
}

impl<'de> Decode<'de> for () {
    #[inline(always)]
    fn decode_into(&mut self, _input: &'de [u8]) -> Result<usize> {
        Ok(0)
    }
}

// Tuple = struct tanpa nama field
macro_rules! tuple {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: Shaped),+> Shaped for ($($name,)+) {
            fn shape() -> Shape {
                Shape::Struct(vec![$(Field::new(stringify!($idx), <$name as Shaped>::shape())),+])
            }
        }

        impl<$($name: Encode),+> Encode for ($($name,)+) {
            #[inline]
            fn encode(&self, sink: &mut ByteSink) -> Result<()> {
                $(self.$idx.encode(sink)?;)+
                Ok(())
            }
        }

        impl<'de, $($name: Decode<'de>),+> Decode<'de> for ($($name,)+) {
            #[inline]
            fn decode_into(&mut self, input: &'de [u8]) -> Result<usize> {
                let mut src = ByteSource::new(input);
                $(decode_echo(&mut src, &mut self.$idx)?;)+
                Ok(src.consumed())
            }
        }
    };
}

tuple!(A.0);
tuple!(A.0, B.1);
tuple!(A.0, B.1, C.2);
tuple!(A.0, B.1, C.2, D.3);
tuple!(A.0, B.1, C.2, D.3, E.4);
tuple!(A.0, B.1, C.2, D.3, E.4, F.5);
tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6);
tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);
