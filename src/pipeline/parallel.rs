//! Thread-pool-backed draw path.
//!
//! Vertex shading and clipping for each triangle are independent of every
//! other triangle, so they're the stage that gets parallelized; the
//! output is one clipped-triangle fan per input triangle, written into a
//! slot reserved for that triangle up front. Rasterization then walks
//! those slots in input order on the calling thread, so the final pixels
//! never depend on how the batches happened to interleave.

use std::sync::Arc;

use log::trace;
use smallvec::SmallVec;

use crate::attachment::Attachment;
use crate::geometry::{clip_primitive, Primitive};
use crate::rasterizer::rasterize_triangle;
use crate::shader::VertexShader;
use crate::worksteal::{global, TrustedThreadSafe, WaitCounter};

use super::{shade_vertex, triangle_vertex_indices, RenderConfig};

/// Triangles are handed to the pool in batches this large (SPEC_FULL.md
/// §4.G), so a worker amortizes one deque operation across many
/// triangles instead of contending for every single one.
const BATCH_SIZE: usize = 32;

/// The raw pointers a worker task needs, with the lifetime erased.
/// Soundness rests entirely on [`WaitCounter`]: every task's last action
/// is `decrement`, and the producer thread only reads `outputs` or drops
/// `config`'s borrow after `wait()` returns, so no worker can still be
/// touching these pointers by then.
struct ParallelContext {
    vertex_shader: *const dyn VertexShader,
    outputs: *mut SmallVec<[Primitive; 4]>,
    outputs_len: usize,
}

impl ParallelContext {
    #[inline]
    unsafe fn vertex_shader(&self) -> &dyn VertexShader {
        &*self.vertex_shader
    }

    #[inline]
    unsafe fn output_slot(&self, index: usize) -> &mut SmallVec<[Primitive; 4]> {
        debug_assert!(index < self.outputs_len);
        &mut *self.outputs.add(index)
    }
}

pub(super) fn draw(config: &RenderConfig, attachment: &mut Attachment) {
    let triangle_count = config.triangle_count();
    if triangle_count == 0 {
        return;
    }

    let varying_count = config.vertex_shader.varying_count();
    let vertex_processing = config.vertex_processing;

    let mut outputs: Vec<SmallVec<[Primitive; 4]>> = (0..triangle_count).map(|_| SmallVec::new()).collect();

    let ctx = Arc::new(TrustedThreadSafe::new(ParallelContext {
        vertex_shader: config.vertex_shader as *const dyn VertexShader,
        outputs: outputs.as_mut_ptr(),
        outputs_len: outputs.len(),
    }));

    let batch_count = (triangle_count + BATCH_SIZE - 1) / BATCH_SIZE;
    trace!("parallel draw: {triangle_count} triangles in {batch_count} batches");
    let wait = Arc::new(WaitCounter::new(batch_count));

    {
        let batch = global().submit_batch();
        for batch_index in 0..batch_count {
            let start = batch_index * BATCH_SIZE;
            let end = (start + BATCH_SIZE).min(triangle_count);

            let ctx = ctx.clone();
            let wait = wait.clone();

            batch.push_task(Box::new(move || {
                // SAFETY: `ctx` was built from the live borrows above, and
                // the caller (`draw`) does not return from `wait.wait()`
                // until every batch's task (including this one) has run
                // to completion, per `WaitCounter`'s contract.
                let ctx = ctx.get();

                for i in start..end {
                    let (i0, i1, i2) = triangle_vertex_indices(vertex_processing, i);

                    let vertex_shader = unsafe { ctx.vertex_shader() };
                    let v0 = shade_vertex(vertex_shader, varying_count, i0);
                    let v1 = shade_vertex(vertex_shader, varying_count, i1);
                    let v2 = shade_vertex(vertex_shader, varying_count, i2);

                    let slot = unsafe { ctx.output_slot(i) };
                    clip_primitive(&[v0, v1, v2], slot);
                }

                wait.decrement(1);
            }));
        }
    }

    wait.wait();

    let viewport = attachment.dimensions();
    for primitives in &outputs {
        for primitive in primitives.iter() {
            let screen = [primitive[0].normalize(viewport), primitive[1].normalize(viewport), primitive[2].normalize(viewport)];

            rasterize_triangle(&screen, config.cull, config.depth_compare, config.polygon_mode, config.fragment_shader, attachment);
        }
    }
}
