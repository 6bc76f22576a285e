//! The chunk grid, SoA mesh, and greedy-meshing algorithm (spec.md §4.D).

use log::debug;
use nalgebra::{Vector2, Vector3};

use crate::error::{RenderError, RenderResult};
use crate::mesh::block::{Block, Face};

/// A dense `W x W x W` cube of block types. `(x, y, z)` maps to linear
/// index `x + z*W + y*W*W` (y is slowest-varying) per spec.md §3.
pub struct ChunkGrid<B, const W: usize> {
    blocks: Box<[B]>,
}

impl<B: Block, const W: usize> ChunkGrid<B, W> {
    /// Builds a grid from a flat `W*W*W`-length block slice in the
    /// `x + z*W + y*W*W` layout. Returns
    /// [`RenderError::InvalidChunkGridLength`] if the slice is the wrong size.
    pub fn from_blocks(blocks: Vec<B>) -> RenderResult<ChunkGrid<B, W>> {
        let expected = W * W * W;
        if blocks.len() != expected {
            return Err(RenderError::InvalidChunkGridLength(blocks.len(), expected));
        }
        Ok(ChunkGrid { blocks: blocks.into_boxed_slice() })
    }

    #[inline(always)]
    pub const fn width() -> usize {
        W
    }

    #[inline(always)]
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        x + z * W + y * W * W
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> B {
        self.blocks[Self::index(x, y, z)]
    }
}

/// SoA chunk mesh: five parallel arrays, one logical vertex per index
/// across all of them (spec.md §3, §6). `Vec::push`'s own geometric
/// growth satisfies the "buffers grow geometrically" invariant without
/// any custom reallocation logic.
#[derive(Debug, Default, Clone)]
pub struct ChunkMesh {
    pub positions: Vec<Vector3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub texcoords: Vec<Vector2<f32>>,
    pub texids: Vec<u8>,
    pub faces: Vec<u8>,
}

impl ChunkMesh {
    pub fn new() -> ChunkMesh {
        ChunkMesh::default()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    fn push_vertex(&mut self, position: Vector3<f32>, normal: Vector3<f32>, texcoord: Vector2<f32>, texid: u8, face: Face) {
        self.positions.push(position);
        self.normals.push(normal);
        self.texcoords.push(texcoord);
        self.texids.push(texid);
        self.faces.push(face as u8);
    }
}

/// Which grid axis (0=x, 1=y, 2=z) plays the role of `u`, `v`, and the
/// face-normal axis `w`, chosen per face so that `u x v` always equals
/// the *negative*-axis sibling's normal (spec.md §4.D, "Winding and
/// texcoords": positive faces then need exactly one winding swap to stay
/// CCW from outside).
fn face_axes(face: Face) -> (usize, usize, usize) {
    match face {
        Face::NX | Face::PX => (2, 1, 0), // u=z, v=y, w=x
        Face::NY | Face::PY => (0, 2, 1), // u=x, v=z, w=y
        Face::NZ | Face::PZ => (1, 0, 2), // u=y, v=x, w=z
    }
}

#[inline]
fn compose(axes: (usize, usize, usize), u: usize, v: usize, w: usize) -> (usize, usize, usize) {
    let mut coord = [0usize; 3];
    coord[axes.0] = u;
    coord[axes.1] = v;
    coord[axes.2] = w;
    (coord[0], coord[1], coord[2])
}

/// Runs the two-pass greedy-meshing algorithm over `grid`, appending
/// quads to `mesh`. `world_position` offsets every emitted position
/// (spec.md §4.D, "Input").
///
/// # Pass 1 — face visibility
/// For every solid block and each of the six face directions, the face
/// is visible iff the neighbor in that direction is outside the chunk or
/// transparent. Recorded as a 6-bit mask per block.
///
/// # Pass 2 — greedy merge
/// Scanning `y` outermost, then `z`, then `x`, and faces in
/// `{-X,+X,-Y,+Y,-Z,+Z}` order: each still-set face bit is extended along
/// its first tangent axis while the next block matches type and has the
/// bit set, then extended row-by-row along the second tangent axis only
/// when an entire candidate row matches. Every visible face from pass 1
/// is emitted exactly once (spec.md §8, invariant 4).
pub fn mesh_chunk<B: Block, const W: usize>(grid: &ChunkGrid<B, W>, world_position: Vector3<f32>, mesh: &mut ChunkMesh) {
    let mut visible = vec![0u8; W * W * W];
    let mut faces_visited = 0usize;
    let vertex_count_before = mesh.vertex_count();

    // Pass 1: face visibility.
    for y in 0..W {
        for z in 0..W {
            for x in 0..W {
                let block = grid.get(x, y, z);
                if block.is_transparent() {
                    continue;
                }

                let mut bits = 0u8;
                for face in Face::ALL {
                    if face_visible(grid, x, y, z, face) {
                        bits |= face.bit();
                        faces_visited += 1;
                    }
                }
                visible[ChunkGrid::<B, W>::index(x, y, z)] = bits;
            }
        }
    }

    // Pass 2: greedy merge.
    for y in 0..W {
        for z in 0..W {
            for x in 0..W {
                let block = grid.get(x, y, z);
                if block.is_transparent() {
                    continue;
                }

                for face in Face::ALL {
                    let idx = ChunkGrid::<B, W>::index(x, y, z);
                    if visible[idx] & face.bit() == 0 {
                        continue;
                    }

                    let axes = face_axes(face);
                    let coord = [x, y, z];
                    let (u0, v0, w0) = (coord[axes.0], coord[axes.1], coord[axes.2]);

                    // Consume the starting block's bit.
                    visible[idx] &= !face.bit();

                    // Step 1: extend along u.
                    let mut extent_u = 0usize;
                    loop {
                        let next_u = u0 + extent_u + 1;
                        if next_u >= W {
                            break;
                        }
                        let (nx, ny, nz) = compose(axes, next_u, v0, w0);
                        let nidx = ChunkGrid::<B, W>::index(nx, ny, nz);
                        if grid.get(nx, ny, nz) == block && visible[nidx] & face.bit() != 0 {
                            visible[nidx] &= !face.bit();
                            extent_u += 1;
                        } else {
                            break;
                        }
                    }

                    // Step 2: extend row-by-row along v.
                    let mut extent_v = 0usize;
                    'rows: loop {
                        let next_v = v0 + extent_v + 1;
                        if next_v >= W {
                            break;
                        }

                        for du in 0..=extent_u {
                            let (nx, ny, nz) = compose(axes, u0 + du, next_v, w0);
                            let nidx = ChunkGrid::<B, W>::index(nx, ny, nz);
                            if grid.get(nx, ny, nz) != block || visible[nidx] & face.bit() == 0 {
                                break 'rows;
                            }
                        }

                        for du in 0..=extent_u {
                            let (nx, ny, nz) = compose(axes, u0 + du, next_v, w0);
                            let nidx = ChunkGrid::<B, W>::index(nx, ny, nz);
                            visible[nidx] &= !face.bit();
                        }
                        extent_v += 1;
                    }

                    emit_quad(mesh, face, block.texture_id(), axes, u0, v0, w0, extent_u, extent_v, world_position);
                }
            }
        }
    }

    let quads_emitted = (mesh.vertex_count() - vertex_count_before) / 6;
    debug!("meshed chunk: {faces_visited} faces visited, {quads_emitted} quads emitted");
}

#[inline]
fn face_visible<B: Block, const W: usize>(grid: &ChunkGrid<B, W>, x: usize, y: usize, z: usize, face: Face) -> bool {
    let coord = [x as isize, y as isize, z as isize];
    let normal = face.normal();
    let delta = [normal.x as isize, normal.y as isize, normal.z as isize];

    let neighbor = [coord[0] + delta[0], coord[1] + delta[1], coord[2] + delta[2]];

    if neighbor.iter().any(|&c| c < 0 || c as usize >= W) {
        return true;
    }

    let (nx, ny, nz) = (neighbor[0] as usize, neighbor[1] as usize, neighbor[2] as usize);
    grid.get(nx, ny, nz).is_transparent()
}

#[allow(clippy::too_many_arguments)]
fn emit_quad(
    mesh: &mut ChunkMesh,
    face: Face,
    texture_id: u8,
    axes: (usize, usize, usize),
    u0: usize,
    v0: usize,
    w0: usize,
    extent_u: usize,
    extent_v: usize,
    world_position: Vector3<f32>,
) {
    // 0 on the negative side of the block, 1 on the positive side
    // (spec.md §4.D step 4).
    let w_offset = if face.is_positive() { 1.0 } else { 0.0 };

    let to_position = |u: usize, v: usize| -> Vector3<f32> {
        let (x, y, z) = compose(axes, u, v, w0);
        let mut p = Vector3::new(x as f32, y as f32, z as f32);
        p[axes.2] += w_offset;
        p + world_position
    };

    let eu = (extent_u + 1) as f32;
    let ev = (extent_v + 1) as f32;

    let c00 = to_position(u0, v0);
    let c10 = to_position(u0 + extent_u + 1, v0);
    let c01 = to_position(u0, v0 + extent_v + 1);
    let c11 = to_position(u0 + extent_u + 1, v0 + extent_v + 1);

    let t00 = Vector2::new(0.0, 0.0);
    let t10 = Vector2::new(eu, 0.0);
    let t01 = Vector2::new(0.0, ev);
    let t11 = Vector2::new(eu, ev);

    let normal = face.normal();

    // Default counter-clockwise quad; positive faces swap winding to stay
    // CCW as viewed from outside (spec.md §4.D).
    let tris: [(Vector3<f32>, Vector2<f32>, Vector3<f32>, Vector2<f32>, Vector3<f32>, Vector2<f32>); 2] = if !face.is_positive() {
        [(c00, t00, c10, t10, c11, t11), (c00, t00, c11, t11, c01, t01)]
    } else {
        [(c00, t00, c11, t11, c10, t10), (c00, t00, c01, t01, c11, t11)]
    };

    for (pa, ta, pb, tb, pc, tc) in tris {
        mesh.push_vertex(pa, normal, ta, texture_id, face);
        mesh.push_vertex(pb, normal, tb, texture_id, face);
        mesh.push_vertex(pc, normal, tc, texture_id, face);
    }
}
