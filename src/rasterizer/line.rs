//! LINE polygon mode: Bresenham wireframe, no perspective correction
//! (spec.md §4.F, "Polygon modes" and §9 "Wireframe perspective
//! correction" — this is a preserved rendering-fidelity choice, not an
//! oversight).

use nalgebra::Vector4;

use crate::attachment::Attachment;
use crate::geometry::ScreenVertex;
use crate::interpolate::linear_interpolate_varyings;
use crate::shader::{DepthCompare, FragmentShader};

use super::{channel_to_byte, pixel_to_ndc};

pub(crate) fn rasterize_line(
    screen: &[ScreenVertex; 3],
    depth_compare: DepthCompare,
    fragment_shader: &dyn FragmentShader,
    attachment: &mut Attachment,
) {
    let edges = [(0, 1), (1, 2), (2, 0)];

    for &(a, b) in edges.iter() {
        bresenham_edge(&screen[a], &screen[b], depth_compare, fragment_shader, attachment);
    }
}

fn bresenham_edge(
    start: &ScreenVertex,
    end: &ScreenVertex,
    depth_compare: DepthCompare,
    fragment_shader: &dyn FragmentShader,
    attachment: &mut Attachment,
) {
    let width = attachment.width();
    let height = attachment.height();

    let x0 = start.position.x.round() as i64;
    let y0 = start.position.y.round() as i64;
    let x1 = end.position.x.round() as i64;
    let y1 = end.position.y.round() as i64;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let varying_count = start.varyings.len();
    let mut interpolated: Vec<Vector4<f32>> = vec![Vector4::zeros(); varying_count];

    let (mut x, mut y) = (x0, y0);
    let total = dx.max(-dy).max(1) as f32;

    loop {
        if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
            let px = x as u32;
            let py = y as u32;

            // 8-connected edge progress, used both for the barycentric
            // triple and for depth/varying linear interpolation.
            let traveled = ((x - x0).abs().max((y - y0).abs())) as f32;
            let t = (traveled / total).clamp(0.0, 1.0);

            let z = (1.0 - t) * start.position.z + t * end.position.z;

            if (0.0..=1.0).contains(&z) {
                let passes = depth_compare == DepthCompare::None
                    || attachment.read_depth(px, py).map_or(true, |previous| depth_compare.passes(previous, z));

                if passes {
                    linear_interpolate_varyings(t, &start.varyings, &end.varyings, &mut interpolated);

                    let sx_center = x as f32 + 0.5;
                    let sy_center = y as f32 + 0.5;
                    let (x_ndc, y_ndc) = pixel_to_ndc(sx_center, sy_center, width, height);
                    let color = fragment_shader.invoke_fragment(&interpolated, (x_ndc, y_ndc, z));

                    attachment.write_depth(px, py, z);
                    attachment.write_color(
                        px,
                        py,
                        [
                            channel_to_byte(color.z),
                            channel_to_byte(color.y),
                            channel_to_byte(color.x),
                            channel_to_byte(color.w),
                        ],
                    );
                }
            }
        }

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::Dimensions;
    use crate::geometry::{ClipVertex, Varyings};
    use crate::shader::FnFragmentShader;

    fn screen_vertex(x: f32, y: f32, z: f32) -> ScreenVertex {
        let cv = ClipVertex::new(Vector4::new(0.0, 0.0, z, 1.0), Varyings::new());
        let mut sv = cv.normalize(Dimensions::new(8, 8));
        sv.position.x = x;
        sv.position.y = y;
        sv.position.z = z;
        sv
    }

    #[test]
    fn draws_only_edge_pixels_not_the_interior() {
        let screen = [screen_vertex(0.5, 0.5, 0.0), screen_vertex(6.5, 0.5, 0.0), screen_vertex(0.5, 6.5, 0.0)];
        let fs = FnFragmentShader { varying_count: 0, f: |_: &[Vector4<f32>], _: (f32, f32, f32)| Vector4::new(1.0, 1.0, 1.0, 1.0) };

        let mut color = vec![0u8; 4 * 8 * 8];
        let mut attachment = Attachment::new(8, 8, Some(&mut color), None).unwrap();
        rasterize_line(&screen, DepthCompare::None, &fs, &mut attachment);

        // The triangle's centroid sits well inside all three edges.
        let center = (3u32, 2u32);
        let idx = (center.1 as usize * 8 + center.0 as usize) * 4;
        assert_eq!(&color[idx..idx + 4], &[0, 0, 0, 0]);

        assert!(color.chunks_exact(4).any(|px| px == [255, 255, 255, 255]));
    }
}
