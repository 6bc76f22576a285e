//! Shallow error taxonomy.
//!
//! Almost every failure mode in this crate is a programming error and is
//! reported with `assert!`/`debug_assert!` rather than `Result` (mismatched
//! varying counts, out-of-range pixel indices, wait-counter underflow).
//! `RenderError` only covers the handful of conditions a caller can
//! plausibly hit and recover from.

#[derive(Debug, Fail)]
pub enum RenderError {
    #[fail(display = "chunk grid block slice has {} elements, expected {}", _0, _1)]
    InvalidChunkGridLength(usize, usize),
    #[fail(
        display = "attachment dimensions mismatch: color plane is {}x{}, depth plane is {}x{}",
        _0, _1, _2, _3
    )]
    AttachmentDimensionsMismatch(u32, u32, u32, u32),
    #[fail(
        display = "vertex shader declares {} varyings but fragment shader declares {}",
        _0, _1
    )]
    VaryingCountMismatch(usize, usize),
    #[fail(display = "triangle list vertex count {} is not a multiple of 3", _0)]
    InvalidVertexCount(u32),
}

pub type RenderResult<T> = Result<T, RenderError>;
