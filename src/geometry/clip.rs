//! Homogeneous clipping against the near/far planes (spec.md §4.E).
//!
//! Side clipping (left/right/top/bottom) is intentionally omitted — the
//! rasterizer's screen-space AABB step (spec.md §4.F step 2) already
//! discards off-screen pixels, and skipping x/y clipping keeps the
//! combinatorial blow-up of Sutherland–Hodgman down to the two planes that
//! actually matter for a homogeneous-space rasterizer: triangles behind the
//! eye or past the far plane would otherwise divide-by-zero or invert.

use smallvec::SmallVec;

use crate::geometry::{ClipVertex, Primitive};
use crate::interpolate::Interpolate;

/// The fixed, ordered set of active clipping planes (spec.md §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipPlane {
    /// `z >= -w`
    Near,
    /// `z <= w`
    Far,
}

/// All active planes, applied in this order.
pub const ACTIVE_PLANES: [ClipPlane; 2] = [ClipPlane::Near, ClipPlane::Far];

impl ClipPlane {
    /// Signed distance of a clip-space vertex to the plane. Positive or
    /// zero means inside.
    #[inline]
    fn distance(self, v: &ClipVertex) -> f32 {
        match self {
            ClipPlane::Near => v.position.z + v.position.w,
            ClipPlane::Far => v.position.w - v.position.z,
        }
    }
}

/// Buffer large enough for the polygon produced by clipping a triangle
/// against both active planes (at most input + 1 vertices per plane).
type ClipPolygon = SmallVec<[ClipVertex; 8]>;

/// Sutherland–Hodgman clip of a (convex) polygon against a single plane.
fn clip_polygon_against_plane(input: &[ClipVertex], plane: ClipPlane, output: &mut ClipPolygon) {
    output.clear();

    if input.is_empty() {
        return;
    }

    for i in 0..input.len() {
        let current = &input[i];
        let previous = &input[(i + input.len() - 1) % input.len()];

        let current_dist = plane.distance(current);
        let previous_dist = plane.distance(previous);

        let current_inside = current_dist >= 0.0;
        let previous_inside = previous_dist >= 0.0;

        if current_inside != previous_inside {
            let t = previous_dist / (previous_dist - current_dist);
            output.push(Interpolate::linear_interpolate(t, previous, current));
        }

        if current_inside {
            output.push(current.clone());
        }
    }
}

/// Clips a single triangle against every active plane in sequence,
/// returning 0 or more output triangles via fan triangulation of the
/// resulting convex polygon.
///
/// - Fully inside both planes: returns exactly one triangle, congruent to
///   the input (spec.md §8, round-trip law).
/// - Fully outside either plane: returns zero triangles.
/// - Straddling a plane: the clipped polygon has 4 or 5 vertices and is
///   fan-triangulated from vertex 0.
pub fn clip_primitive(primitive: &Primitive, out: &mut SmallVec<[Primitive; 4]>) {
    out.clear();

    let mut a: ClipPolygon = SmallVec::from_slice(primitive);
    let mut b: ClipPolygon = SmallVec::new();

    for &plane in ACTIVE_PLANES.iter() {
        clip_polygon_against_plane(&a, plane, &mut b);
        std::mem::swap(&mut a, &mut b);
        if a.is_empty() {
            return;
        }
    }

    // Fan-triangulate the surviving convex polygon.
    for i in 1..a.len().saturating_sub(1) {
        out.push([a[0].clone(), a[i].clone(), a[i + 1].clone()]);
    }
}
