//! Block-type and face-direction vocabulary the mesher is generic over.
//!
//! The concrete block palette (which numeric IDs exist, which one is
//! "air") is the block-world generator's job and out of scope for this
//! crate (spec.md §1). What the mesher needs from a block type is just
//! enough to decide visibility and tag the emitted quad — expressed here
//! as a small trait, the same way the teacher's framebuffer code is
//! generic over a `Pixel` trait rather than hard-coding one format.
use nalgebra::Vector3;

/// A block type usable in a [`super::greedy::ChunkGrid`].
pub trait Block: Copy + PartialEq {
    /// Whether faces behind this block (i.e. facing it) should be
    /// emitted. Only "air" is transparent in the reference block palette
    /// (spec.md §3), but the mesher doesn't need to know that.
    fn is_transparent(&self) -> bool;

    /// Value written to the mesh's `texid` slot for faces of this block.
    fn texture_id(&self) -> u8;
}

/// One of the six axis-aligned face directions, in the tie-break order
/// spec.md §4.D fixes: `{-X, +X, -Y, +Y, -Z, +Z}`. The discriminants are
/// part of the mesh's on-disk `face: u8` contract (spec.md §6).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    NX = 0,
    PX = 1,
    NY = 2,
    PY = 3,
    NZ = 4,
    PZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::NX, Face::PX, Face::NY, Face::PY, Face::NZ, Face::PZ];

    #[inline]
    pub fn normal(self) -> Vector3<f32> {
        match self {
            Face::NX => Vector3::new(-1.0, 0.0, 0.0),
            Face::PX => Vector3::new(1.0, 0.0, 0.0),
            Face::NY => Vector3::new(0.0, -1.0, 0.0),
            Face::PY => Vector3::new(0.0, 1.0, 0.0),
            Face::NZ => Vector3::new(0.0, 0.0, -1.0),
            Face::PZ => Vector3::new(0.0, 0.0, 1.0),
        }
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Face::PX | Face::PY | Face::PZ)
    }

    #[inline]
    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }
}
