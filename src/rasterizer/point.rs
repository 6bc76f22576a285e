//! POINT polygon mode: same pipeline as FILL, restricted to pixels close
//! to a vertex (spec.md §4.F, "Polygon modes").

use crate::attachment::Attachment;
use crate::geometry::ScreenVertex;
use crate::shader::{DepthCompare, FragmentShader};

use super::triangle::rasterize_fill_filtered;

/// A pixel is kept only if its largest barycentric weight is within this
/// margin of 1, i.e. it's close to one of the three vertices.
const POINT_MARGIN: f32 = 0.05;

pub(crate) fn rasterize_point(
    screen: &[ScreenVertex; 3],
    det012: f32,
    depth_compare: DepthCompare,
    fragment_shader: &dyn FragmentShader,
    attachment: &mut Attachment,
) {
    rasterize_fill_filtered(screen, det012, depth_compare, fragment_shader, attachment, |u, v, w| {
        u.max(v).max(w) >= 1.0 - POINT_MARGIN
    });
}
