//! Post-vertex-shader and post-clip vertex representations.

use nalgebra::Vector4;
use smallvec::SmallVec;

use crate::attachment::Dimensions;
use crate::interpolate::{barycentric_interpolate_varyings, linear_interpolate_varyings, Interpolate};

/// Varying vectors attached to a vertex. Sized for the common case (a
/// handful of varyings) without spilling to the heap.
pub type Varyings = SmallVec<[Vector4<f32>; 4]>;

/// A vertex in homogeneous clip space, as produced by the vertex shader and
/// consumed by the clipper.
///
/// `inv_w` is cached here rather than recomputed, since it's needed by both
/// the clipper (plane distance tests use `position.w` directly) and the
/// rasterizer (perspective-correct interpolation divides by it repeatedly).
#[derive(Debug, Clone)]
pub struct ClipVertex {
    pub position: Vector4<f32>,
    pub varyings: Varyings,
    pub inv_w: f32,
}

impl ClipVertex {
    #[inline]
    pub fn new(position: Vector4<f32>, varyings: Varyings) -> ClipVertex {
        let inv_w = 1.0 / position.w;
        ClipVertex { position, varyings, inv_w }
    }

    #[inline]
    pub fn varying_count(&self) -> usize {
        self.varyings.len()
    }

    /// Perspective-divides into NDC, then maps NDC into pixel space using
    /// `viewport`'s dimensions, flipping y so that it grows downward.
    pub fn normalize(&self, viewport: Dimensions) -> ScreenVertex {
        let w = self.position.w;
        let width = viewport.width as f32;
        let height = viewport.height as f32;

        let position = Vector4::new(
            (1.0 + self.position.x / w) * width / 2.0,
            (1.0 - self.position.y / w) * height / 2.0,
            self.position.z / w,
            1.0 / w,
        );

        ScreenVertex { position, varyings: self.varyings.clone() }
    }
}

impl Interpolate for ClipVertex {
    fn barycentric_interpolate(u: f32, x1: &Self, v: f32, x2: &Self, w: f32, x3: &Self) -> Self {
        let position = Interpolate::barycentric_interpolate(u, &x1.position, v, &x2.position, w, &x3.position);

        let mut varyings: Varyings = SmallVec::from_elem(Vector4::zeros(), x1.varyings.len());
        barycentric_interpolate_varyings(u, &x1.varyings, v, &x2.varyings, w, &x3.varyings, &mut varyings);

        ClipVertex { inv_w: 1.0 / position.w, position, varyings }
    }

    fn linear_interpolate(t: f32, x1: &Self, x2: &Self) -> Self {
        let position = Interpolate::linear_interpolate(t, &x1.position, &x2.position);

        let mut varyings: Varyings = SmallVec::from_elem(Vector4::zeros(), x1.varyings.len());
        linear_interpolate_varyings(t, &x1.varyings, &x2.varyings, &mut varyings);

        ClipVertex { inv_w: 1.0 / position.w, position, varyings }
    }
}

/// A vertex in screen (pixel) space, as consumed by the rasterizer.
///
/// `position` is `(pixel_x, pixel_y, ndc_z, 1/clip_w)`.
#[derive(Debug, Clone)]
pub struct ScreenVertex {
    pub position: Vector4<f32>,
    pub varyings: Varyings,
}

impl Interpolate for ScreenVertex {
    fn barycentric_interpolate(u: f32, x1: &Self, v: f32, x2: &Self, w: f32, x3: &Self) -> Self {
        let position = Interpolate::barycentric_interpolate(u, &x1.position, v, &x2.position, w, &x3.position);

        let mut varyings: Varyings = SmallVec::from_elem(Vector4::zeros(), x1.varyings.len());
        barycentric_interpolate_varyings(u, &x1.varyings, v, &x2.varyings, w, &x3.varyings, &mut varyings);

        ScreenVertex { position, varyings }
    }

    fn linear_interpolate(t: f32, x1: &Self, x2: &Self) -> Self {
        let position = Interpolate::linear_interpolate(t, &x1.position, &x2.position);

        let mut varyings: Varyings = SmallVec::from_elem(Vector4::zeros(), x1.varyings.len());
        linear_interpolate_varyings(t, &x1.varyings, &x2.varyings, &mut varyings);

        ScreenVertex { position, varyings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_maps_ndc_origin_to_viewport_center() {
        let v = ClipVertex::new(Vector4::new(0.0, 0.0, 0.0, 1.0), Varyings::new());
        let screen = v.normalize(Dimensions::new(100, 50));
        assert_eq!(screen.position.x, 50.0);
        assert_eq!(screen.position.y, 25.0);
    }

    #[test]
    fn normalize_flips_y() {
        let v = ClipVertex::new(Vector4::new(0.0, 1.0, 0.0, 1.0), Varyings::new());
        let screen = v.normalize(Dimensions::new(2, 2));
        assert_eq!(screen.position.y, 0.0);
    }
}
