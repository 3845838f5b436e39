//! Shape: klasifikasi struktural sebuah value
//!
//! Shape menentukan aturan encoding yang dipakai di setiap langkah rekursi.
//! Shape tidak pernah ditulis ke stream; decoder mengetahuinya dari tipe
//! tujuan (static path) atau dari descriptor (dynamic path).

use std::borrow::Cow;
use std::fmt;

/// Scalar leaf kinds and their wire widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Two `f32` components, 8 bytes
    Complex64,
    /// Two `f64` components, 16 bytes
    Complex128,
    /// Length-prefixed raw bytes
    Str,
}

impl PrimitiveKind {
    /// Fixed wire width in bytes, `None` for strings.
    #[inline(always)]
    pub const fn width(self) -> Option<usize> {
        match self {
            PrimitiveKind::Bool | PrimitiveKind::I8 | PrimitiveKind::U8 => Some(1),
            PrimitiveKind::I16 | PrimitiveKind::U16 => Some(2),
            PrimitiveKind::I32 | PrimitiveKind::U32 | PrimitiveKind::F32 => Some(4),
            PrimitiveKind::I64
            | PrimitiveKind::U64
            | PrimitiveKind::F64
            | PrimitiveKind::Complex64 => Some(8),
            PrimitiveKind::Complex128 => Some(16),
            PrimitiveKind::Str => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
            PrimitiveKind::Complex64 => "complex64",
            PrimitiveKind::Complex128 => "complex128",
            PrimitiveKind::Str => "str",
        }
    }
}

/// One struct field: name (for diagnostics only) and shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: Cow<'static, str>,
    pub shape: Shape,
}

impl Field {
    pub fn new(name: impl Into<Cow<'static, str>>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }
}

/// Structural classification of a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Primitive(PrimitiveKind),
    /// Optional value behind a presence flag
    Pointer(Box<Shape>),
    /// Fields in declaration order, no length prefix
    Struct(Vec<Field>),
    /// Length-prefixed elements; `len` is set for fixed-size arrays
    Sequence { element: Box<Shape>, len: Option<usize> },
    /// Length-prefixed key/value pairs
    Map { key: Box<Shape>, value: Box<Shape> },
    /// Tidak bisa direpresentasikan (channel, function, ...)
    Unsupported(&'static str),
}

impl Shape {
    pub fn pointer(inner: Shape) -> Self {
        Shape::Pointer(Box::new(inner))
    }

    pub fn sequence(element: Shape) -> Self {
        Shape::Sequence {
            element: Box::new(element),
            len: None,
        }
    }

    pub fn array(element: Shape, len: usize) -> Self {
        Shape::Sequence {
            element: Box::new(element),
            len: Some(len),
        }
    }

    pub fn map(key: Shape, value: Shape) -> Self {
        Shape::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// First unsupported component, searching depth-first.
    pub fn find_unsupported(&self) -> Option<&'static str> {
        match self {
            Shape::Primitive(_) => None,
            Shape::Pointer(inner) => inner.find_unsupported(),
            Shape::Struct(fields) => fields.iter().find_map(|f| f.shape.find_unsupported()),
            Shape::Sequence { element, .. } => element.find_unsupported(),
            Shape::Map { key, value } => key.find_unsupported().or_else(|| value.find_unsupported()),
            Shape::Unsupported(what) => Some(what),
        }
    }

    #[inline]
    pub fn is_supported(&self) -> bool {
        self.find_unsupported().is_none()
    }

    /// Exact encoded size if it does not depend on the value.
    ///
    /// Primitives (except strings) and structs made only of them are fixed;
    /// pointers, sequences and maps never are.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            Shape::Primitive(kind) => kind.width(),
            Shape::Struct(fields) => fields
                .iter()
                .try_fold(0usize, |acc, f| Some(acc + f.shape.fixed_width()?)),
            _ => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Primitive(kind) => f.write_str(kind.name()),
            Shape::Pointer(inner) => write!(f, "Option<{inner}>"),
            Shape::Struct(fields) => {
                f.write_str("{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.shape)?;
                }
                f.write_str("}")
            }
            Shape::Sequence { element, len: None } => write!(f, "[{element}]"),
            Shape::Sequence {
                element,
                len: Some(n),
            } => write!(f, "[{element}; {n}]"),
            Shape::Map { key, value } => write!(f, "Map<{key}, {value}>"),
            Shape::Unsupported(what) => write!(f, "unsupported({what})"),
        }
    }
}
