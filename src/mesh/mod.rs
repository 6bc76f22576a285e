//! The greedy chunk mesher.

pub mod block;
pub mod greedy;

pub use self::block::{Block, Face};
pub use self::greedy::{mesh_chunk, ChunkGrid, ChunkMesh};
