//! Numeric primitives held by BLK values: small float/int vectors and a 4x4
//! matrix.
//!
//! These stand in for the host environment's vector math library. They carry
//! no arithmetic — blk-core only stores, compares, and formats them.

/// 2-component float vector (`p2` values).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Float2 {
    pub x: f32,
    pub y: f32,
}

/// 3-component float vector (`p3` values).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Float3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 4-component float vector (`p4` values).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Float4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// 2-component int vector (`i2` values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Int2 {
    pub x: i32,
    pub y: i32,
}

/// 3-component int vector (`i3` values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Int3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// 4-component int vector (`i4` values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Int4 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub w: i32,
}

impl Float2 {
    pub fn new(x: f32, y: f32) -> Self {
        Float2 { x, y }
    }
}

impl Float3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Float3 { x, y, z }
    }
}

impl Float4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Float4 { x, y, z, w }
    }
}

impl Int2 {
    pub fn new(x: i32, y: i32) -> Self {
        Int2 { x, y }
    }
}

impl Int3 {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Int3 { x, y, z }
    }
}

impl Int4 {
    pub fn new(x: i32, y: i32, z: i32, w: i32) -> Self {
        Int4 { x, y, z, w }
    }
}

/// 4x4 float matrix (`m4` values), stored column-major.
///
/// `m[4 * col + row]` — which is exactly the textual order of an `m4` literal:
/// the first four numbers of the text form column 0, the next four column 1,
/// and so on. The serializer emits the same order back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [f32; 16],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Builds a matrix from 16 values in column-major order.
    pub fn from_cols(m: [f32; 16]) -> Self {
        Mat4 { m }
    }

    /// Element access by row and column.
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.m[4 * col + row]
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::IDENTITY
    }
}
