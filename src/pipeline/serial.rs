//! Single-threaded draw path: shade, clip, rasterize, one triangle at a time.

use log::trace;
use smallvec::SmallVec;

use crate::attachment::Attachment;
use crate::geometry::{clip_primitive, Primitive};
use crate::rasterizer::rasterize_triangle;

use super::{shade_vertex, RenderConfig};

pub(super) fn draw(config: &RenderConfig, attachment: &mut Attachment) {
    trace!("serial draw: {} triangles", config.triangle_count());
    let varying_count = config.vertex_shader.varying_count();
    let viewport = attachment.dimensions();
    let mut clipped: SmallVec<[Primitive; 4]> = SmallVec::new();

    for i in 0..config.triangle_count() {
        let (i0, i1, i2) = config.triangle_vertex_indices(i);

        let v0 = shade_vertex(config.vertex_shader, varying_count, i0);
        let v1 = shade_vertex(config.vertex_shader, varying_count, i1);
        let v2 = shade_vertex(config.vertex_shader, varying_count, i2);

        clip_primitive(&[v0, v1, v2], &mut clipped);

        for primitive in clipped.iter() {
            let screen = [primitive[0].normalize(viewport), primitive[1].normalize(viewport), primitive[2].normalize(viewport)];

            rasterize_triangle(&screen, config.cull, config.depth_compare, config.polygon_mode, config.fragment_shader, attachment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{CullMode, DepthCompare, FnFragmentShader, FnVertexShader, PolygonMode, VertexProcessing};
    use nalgebra::Vector4;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn fullscreen_triangle_fills_every_pixel() {
        let vs = FnVertexShader {
            varying_count: 0,
            f: |index: u32, out_position: &mut Vector4<f32>, _: &mut [Vector4<f32>]| {
                *out_position = match index {
                    0 => Vector4::new(-1.0, -1.0, 0.0, 1.0),
                    1 => Vector4::new(3.0, -1.0, 0.0, 1.0),
                    _ => Vector4::new(-1.0, 3.0, 0.0, 1.0),
                };
            },
        };

        let shaded = AtomicUsize::new(0);
        let fs = FnFragmentShader {
            varying_count: 0,
            f: |_: &[Vector4<f32>], _: (f32, f32, f32)| {
                shaded.fetch_add(1, Ordering::Relaxed);
                Vector4::new(1.0, 1.0, 1.0, 1.0)
            },
        };

        let config = RenderConfig {
            vertex_processing: VertexProcessing::TriangleList,
            vertex_count: 3,
            cull: CullMode::None,
            depth_compare: DepthCompare::None,
            polygon_mode: PolygonMode::Fill,
            vertex_shader: &vs,
            fragment_shader: &fs,
        };

        let mut color = vec![0u8; 4 * 4 * 4];
        let mut attachment = Attachment::new(4, 4, Some(&mut color), None).unwrap();
        draw(&config, &mut attachment);

        assert_eq!(shaded.load(Ordering::Relaxed), 16);
        assert!(color.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn depth_test_rejects_farther_triangle() {
        let vs = FnVertexShader {
            varying_count: 0,
            f: |index: u32, out_position: &mut Vector4<f32>, _: &mut [Vector4<f32>]| {
                // Two overlapping full-screen triangles at different depths,
                // interleaved 3 vertices apiece.
                let z = if index < 3 { 0.8 } else { 0.2 };
                *out_position = match index % 3 {
                    0 => Vector4::new(-1.0, -1.0, z, 1.0),
                    1 => Vector4::new(3.0, -1.0, z, 1.0),
                    _ => Vector4::new(-1.0, 3.0, z, 1.0),
                };
            },
        };

        let fs = FnFragmentShader {
            varying_count: 0,
            f: |_: &[Vector4<f32>], coord: (f32, f32, f32)| Vector4::new(coord.2, 0.0, 0.0, 1.0),
        };

        let config = RenderConfig {
            vertex_processing: VertexProcessing::TriangleList,
            vertex_count: 6,
            cull: CullMode::None,
            depth_compare: DepthCompare::Less,
            polygon_mode: PolygonMode::Fill,
            vertex_shader: &vs,
            fragment_shader: &fs,
        };

        let mut color = vec![0u8; 4 * 2 * 2];
        let mut depth = vec![1.0f32; 2 * 2];
        let mut attachment = Attachment::new(2, 2, Some(&mut color), Some(&mut depth)).unwrap();
        draw(&config, &mut attachment);

        // The second triangle (z = 0.2, nearer) should win the depth test
        // everywhere, even though it was submitted second.
        assert!(depth.iter().all(|&d| (d - 0.2).abs() < 1e-5));
    }
}
