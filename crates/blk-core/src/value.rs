//! The BLK value model: a tagged union over every kind of datum a block entry
//! can hold.
//!
//! `Value` owns its payload outright — strings, nested blocks, and arrays own
//! heap storage, everything else is stored inline. `Clone` is a deep copy all
//! the way down (nested blocks included), so duplicating a value never aliases
//! owned payloads; ownership transfer is an ordinary Rust move.

use crate::block::Block;
use crate::math::{Float2, Float3, Float4, Int2, Int3, Int4, Mat4};

/// Discriminant for [`Value`] payloads and declared array element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Empty,
    Bool,
    Int,
    Uint64,
    Double,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    Mat4,
    Enum,
    String,
    Block,
    Array,
}

impl ValueKind {
    /// The type tag emitted in text form (`a:i = 5`), or `None` for kinds
    /// that serialize without a tag keyword.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            ValueKind::Empty => Some("tag"),
            ValueKind::Bool => Some("b"),
            ValueKind::Int => Some("i"),
            ValueKind::Uint64 => Some("u64"),
            ValueKind::Double => Some("r"),
            ValueKind::Vec2 => Some("p2"),
            ValueKind::Vec3 => Some("p3"),
            ValueKind::Vec4 => Some("p4"),
            ValueKind::IVec2 => Some("i2"),
            ValueKind::IVec3 => Some("i3"),
            ValueKind::IVec4 => Some("i4"),
            ValueKind::Mat4 => Some("m4"),
            ValueKind::String => Some("s"),
            ValueKind::Array => Some("arr"),
            ValueKind::Enum | ValueKind::Block => None,
        }
    }
}

/// A reference into the enum registry: which registered type, and which entry
/// of that type. Weak indices — they never own the registry data and stay
/// valid for the process lifetime because registrations are never removed.
///
/// `(0, 0)` doubles as the placeholder written when an `e_*` lookup fails
/// during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnumRef {
    pub type_id: u32,
    pub val_id: u32,
}

/// A homogeneous sequence of scalar or string values held by an `arr` entry.
///
/// `elem` is the declared element kind, established by the first parsed
/// element (`Double` for an empty array). Homogeneity is intended but not
/// enforced: the parser logs a mismatch diagnostic yet keeps the element.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    pub elem: ValueKind,
    pub values: Vec<Value>,
}

impl DataArray {
    pub fn new(elem: ValueKind) -> Self {
        DataArray {
            elem,
            values: Vec::new(),
        }
    }
}

impl Default for DataArray {
    fn default() -> Self {
        DataArray::new(ValueKind::Double)
    }
}

/// A single BLK datum. Exactly one payload is active, determined by the
/// variant; [`Value::kind`] recovers the tag.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Tag-only marker (`name:tag`), also the state of a cleared value.
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Uint64(u64),
    Double(f64),
    Vec2(Float2),
    Vec3(Float3),
    Vec4(Float4),
    IVec2(Int2),
    IVec3(Int3),
    IVec4(Int4),
    Mat4(Mat4),
    Enum(EnumRef),
    Str(String),
    Block(Box<Block>),
    Array(DataArray),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Empty => ValueKind::Empty,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Uint64(_) => ValueKind::Uint64,
            Value::Double(_) => ValueKind::Double,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::IVec2(_) => ValueKind::IVec2,
            Value::IVec3(_) => ValueKind::IVec3,
            Value::IVec4(_) => ValueKind::IVec4,
            Value::Mat4(_) => ValueKind::Mat4,
            Value::Enum(_) => ValueKind::Enum,
            Value::Str(_) => ValueKind::String,
            Value::Block(_) => ValueKind::Block,
            Value::Array(_) => ValueKind::Array,
        }
    }

    /// Releases any owned payload, leaving the value [`Value::Empty`].
    pub fn clear(&mut self) {
        *self = Value::Empty;
    }
}
