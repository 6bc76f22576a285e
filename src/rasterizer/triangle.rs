//! FILL polygon mode: the core edge-function scanline rasterizer.

use nalgebra::Vector4;

use crate::attachment::Attachment;
use crate::geometry::ScreenVertex;
use crate::interpolate::barycentric_interpolate_varyings;
use crate::shader::{DepthCompare, FragmentShader};

use super::{channel_to_byte, pixel_to_ndc};

/// Screen-space AABB of the triangle, clamped to the attachment bounds.
/// Returns `(min_x, max_x, min_y, max_y)` as pixel coordinates, `max`
/// exclusive.
fn pixel_bounds(screen: &[ScreenVertex; 3], width: u32, height: u32) -> (u32, u32, u32, u32) {
    let xs = [screen[0].position.x, screen[1].position.x, screen[2].position.x];
    let ys = [screen[0].position.y, screen[1].position.y, screen[2].position.y];

    let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let max_x = (xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max).ceil().max(0.0) as u32).min(width);
    let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let max_y = (ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max).ceil().max(0.0) as u32).min(height);

    (min_x, max_x, min_y, max_y)
}

/// Barycentric weights `(u, v, w)` for sample `(sx, sy)`, assigned to
/// `(v1, v2, v0)` respectively (spec.md §4.F step 3's fixed convention).
#[inline]
pub(crate) fn barycentric(screen: &[ScreenVertex; 3], det012: f32, sx: f32, sy: f32) -> (f32, f32, f32) {
    let p0 = screen[0].position;
    let p1 = screen[1].position;
    let p2 = screen[2].position;

    let det20p = (p0.x - p2.x) * (sy - p2.y) - (p0.y - p2.y) * (sx - p2.x);
    let det01p = (p1.x - p0.x) * (sy - p0.y) - (p1.y - p0.y) * (sx - p0.x);
    let det12p = (p2.x - p1.x) * (sy - p1.y) - (p2.y - p1.y) * (sx - p1.x);

    (det20p / det012, det01p / det012, det12p / det012)
}

pub(crate) fn rasterize_fill(
    screen: &[ScreenVertex; 3],
    det012: f32,
    depth_compare: DepthCompare,
    fragment_shader: &dyn FragmentShader,
    attachment: &mut Attachment,
) {
    rasterize_fill_filtered(screen, det012, depth_compare, fragment_shader, attachment, |_, _, _| true)
}

/// Shared with [`super::point::rasterize_point`], which adds an extra
/// per-pixel predicate on the barycentric weights.
pub(crate) fn rasterize_fill_filtered(
    screen: &[ScreenVertex; 3],
    det012: f32,
    depth_compare: DepthCompare,
    fragment_shader: &dyn FragmentShader,
    attachment: &mut Attachment,
    extra: impl Fn(f32, f32, f32) -> bool,
) {
    let width = attachment.width();
    let height = attachment.height();
    let (min_x, max_x, min_y, max_y) = pixel_bounds(screen, width, height);

    let varying_count = screen[0].varyings.len();
    let mut interpolated: Vec<Vector4<f32>> = vec![Vector4::zeros(); varying_count];

    for py in min_y..max_y {
        for px in min_x..max_x {
            let sx = px as f32 + 0.5;
            let sy = py as f32 + 0.5;

            let (u, v, w) = barycentric(screen, det012, sx, sy);

            if u < 0.0 || v < 0.0 || w < 0.0 {
                continue;
            }

            if !extra(u, v, w) {
                continue;
            }

            // Barycentric weights are assigned (v1, v2, v0) -> (u, v, w).
            let z = w * screen[0].position.z + u * screen[1].position.z + v * screen[2].position.z;

            if !(0.0..=1.0).contains(&z) {
                continue;
            }

            if depth_compare != DepthCompare::None {
                if let Some(previous) = attachment.read_depth(px, py) {
                    if !depth_compare.passes(previous, z) {
                        continue;
                    }
                }
            }

            // Perspective-correct varying interpolation (spec.md §4.F step 5).
            let w0 = screen[0].position.w;
            let w1 = screen[1].position.w;
            let w2 = screen[2].position.w;
            let denom = w * w0 + u * w1 + v * w2;

            barycentric_interpolate_varyings(
                w * w0 / denom,
                &screen[0].varyings,
                u * w1 / denom,
                &screen[1].varyings,
                v * w2 / denom,
                &screen[2].varyings,
                &mut interpolated,
            );

            let (x_ndc, y_ndc) = pixel_to_ndc(sx, sy, width, height);
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
