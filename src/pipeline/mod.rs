//! Drives vertex shading, clipping, and rasterization across a vertex
//! stream (spec.md §4.G).
//!
//! [`Pipeline::draw`] walks the stream on the calling thread.
//! [`Pipeline::draw_parallel`] fans the vertex-shading and clipping stage
//! out across the work-stealing thread pool, then rasterizes the results
//! serially in input order so two draws with the same inputs always
//! paint the same pixels regardless of how many workers ran.

mod parallel;
mod serial;

use nalgebra::Vector4;

use crate::attachment::Attachment;
use crate::error::{RenderError, RenderResult};
use crate::geometry::ClipVertex;
use crate::shader::{empty_varyings, CullMode, DepthCompare, FragmentShader, PolygonMode, VertexProcessing, VertexShader};

/// Everything a draw call needs apart from the render target itself.
pub struct RenderConfig<'a> {
    pub vertex_processing: VertexProcessing,
    pub vertex_count: u32,
    pub cull: CullMode,
    pub depth_compare: DepthCompare,
    pub polygon_mode: PolygonMode,
    pub vertex_shader: &'a dyn VertexShader,
    pub fragment_shader: &'a dyn FragmentShader,
}

impl<'a> RenderConfig<'a> {
    /// Checks invariants that must hold before a draw call starts
    /// (spec.md §3: vertex and fragment shaders must agree on varying
    /// count; a triangle needs at least 3 vertices).
    pub fn validate(&self) -> RenderResult<()> {
        let vs_count = self.vertex_shader.varying_count();
        let fs_count = self.fragment_shader.varying_count();
        if vs_count != fs_count {
            return Err(RenderError::VaryingCountMismatch(vs_count, fs_count));
        }

        match self.vertex_processing {
            VertexProcessing::TriangleList => {
                if self.vertex_count % 3 != 0 {
                    return Err(RenderError::InvalidVertexCount(self.vertex_count));
                }
            }
            VertexProcessing::TriangleStrip => {}
        }

        Ok(())
    }

    #[inline]
    fn triangle_count(&self) -> usize {
        triangle_count(self.vertex_processing, self.vertex_count)
    }

    #[inline]
    fn triangle_vertex_indices(&self, i: usize) -> (u32, u32, u32) {
        triangle_vertex_indices(self.vertex_processing, i)
    }
}

/// Number of triangles a vertex stream of `vertex_count` decomposes into
/// under `mode`.
#[inline]
fn triangle_count(mode: VertexProcessing, vertex_count: u32) -> usize {
    match mode {
        VertexProcessing::TriangleList => vertex_count as usize / 3,
        VertexProcessing::TriangleStrip => (vertex_count as usize).saturating_sub(2),
    }
}

/// Maps triangle index `i` to its three vertex indices, already in
/// winding-corrected order (strip mode alternates winding every other
/// triangle so every triangle faces the same way as its neighbors).
#[inline]
fn triangle_vertex_indices(mode: VertexProcessing, i: usize) -> (u32, u32, u32) {
    match mode {
        VertexProcessing::TriangleList => {
            let base = i as u32 * 3;
            (base, base + 1, base + 2)
        }
        VertexProcessing::TriangleStrip => {
            let base = i as u32;
            if i % 2 == 0 {
                (base, base + 1, base + 2)
            } else {
                (base + 1, base, base + 2)
            }
        }
    }
}

/// Stateless driver; all configuration lives in [`RenderConfig`].
pub struct Pipeline;

impl Pipeline {
    /// Renders `config`'s vertex stream into `attachment` on the calling
    /// thread.
    pub fn draw(config: &RenderConfig, attachment: &mut Attachment) -> RenderResult<()> {
        config.validate()?;
        serial::draw(config, attachment);
        Ok(())
    }

    /// Renders `config`'s vertex stream into `attachment`, parallelizing
    /// vertex shading and clipping across [`crate::worksteal::global`]'s
    /// thread pool (spec.md §4.G). Rasterization itself always runs on
    /// the calling thread, in input order.
    pub fn draw_parallel(config: &RenderConfig, attachment: &mut Attachment) -> RenderResult<()> {
        config.validate()?;
        parallel::draw(config, attachment);
        Ok(())
    }
}

#[inline]
fn shade_vertex(vertex_shader: &dyn VertexShader, varying_count: usize, index: u32) -> ClipVertex {
    let mut position = Vector4::zeros();
    let mut varyings = empty_varyings(varying_count);
    vertex_shader.invoke_vertex(index, &mut position, &mut varyings);
    ClipVertex::new(position, varyings)
}
