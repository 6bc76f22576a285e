//! CPU rasterization core for voxel-world chunk rendering.
//!
//! Three subsystems make up this crate: a programmable triangle
//! rasterizer (clip, rasterize, shade), a greedy chunk mesher, and a
//! work-stealing task scheduler used to parallelize vertex processing.
//! There is no GPU involved anywhere in this crate.

#[macro_use]
extern crate failure;

pub mod attachment;
pub mod error;
pub mod geometry;
pub mod interpolate;
pub mod mesh;
pub mod pipeline;
pub mod rasterizer;
pub mod shader;
pub mod worksteal;

pub use attachment::Attachment;
pub use error::{RenderError, RenderResult};
pub use pipeline::{Pipeline, RenderConfig};
pub use shader::{CullMode, DepthCompare, FragmentShader, PolygonMode, VertexProcessing, VertexShader};
