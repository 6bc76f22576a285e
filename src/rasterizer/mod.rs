//! The triangle rasterizer (spec.md §4.F).
//!
//! Each sub-triangle surviving the clipper (spec.md §4.E) is rasterized
//! independently: backface cull, screen-space AABB, per-pixel edge-function
//! test, perspective-correct varying interpolation, depth test, fragment
//! shader dispatch.

mod line;
mod point;
mod triangle;

use crate::attachment::Attachment;
use crate::geometry::{FaceWinding, ScreenVertex};
use crate::shader::{CullMode, DepthCompare, FragmentShader, PolygonMode};

/// Triangles with `|det012|` below this are considered degenerate and
/// silently skipped (spec.md §4.F, "Degenerate triangles"; ε left
/// unspecified there, fixed here per SPEC_FULL.md §4).
pub const DEGENERATE_EPSILON: f32 = 1e-7;

/// Twice-signed screen-space area of the triangle, using the fixed
/// y-down-pixel-space convention (spec.md §9): `det012 < 0` is
/// counter-clockwise.
#[inline]
pub fn det012(screen: &[ScreenVertex; 3]) -> f32 {
    let p0 = screen[0].position;
    let p1 = screen[1].position;
    let p2 = screen[2].position;

    let e01 = (p1.x - p0.x, p1.y - p0.y);
    let e02 = (p2.x - p0.x, p2.y - p0.y);

    e01.0 * e02.1 - e01.1 * e02.0
}

/// Rasterizes one clipped, screen-space triangle into `attachment`,
/// dispatching on `polygon_mode`. Returns without writing anything if the
/// triangle is degenerate or culled.
pub fn rasterize_triangle(
    screen: &[ScreenVertex; 3],
    cull: CullMode,
    depth_compare: DepthCompare,
    polygon_mode: PolygonMode,
    fragment_shader: &dyn FragmentShader,
    attachment: &mut Attachment,
) {
    let det = det012(screen);

    if det.abs() < DEGENERATE_EPSILON {
        return;
    }

    let winding = FaceWinding::from_det(det);
    if !winding.survives(cull) {
        return;
    }

    match polygon_mode {
        PolygonMode::Fill => triangle::rasterize_fill(screen, det, depth_compare, fragment_shader, attachment),
        PolygonMode::Point => point::rasterize_point(screen, det, depth_compare, fragment_shader, attachment),
        PolygonMode::Line => line::rasterize_line(screen, depth_compare, fragment_shader, attachment),
    }
}

/// Converts a pixel-space sample center back to NDC, per spec.md §6's
/// half-pixel-shift mapping, inverted (pixel space is y-down; NDC is
/// y-up, so the y term is flipped relative to x).
#[inline]
pub(crate) fn pixel_to_ndc(px: f32, py: f32, width: u32, height: u32) -> (f32, f32) {
    let x_ndc = (2.0 * px) / width as f32 - 1.0;
    let y_ndc = 1.0 - (2.0 * py) / height as f32;
    (x_ndc, y_ndc)
}

/// Converts a clamped color channel in `[0, 1]` to a byte, rounding to
/// nearest (spec.md §4.F step 6).
#[inline]
pub(crate) fn channel_to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}
