use bitflags::bitflags;
use cgmath::Point3;

use crate::engine_state::voxels::block::block_side::{Axis, BlockSide};

bitflags! {
    /// Precomputed geometric properties of a model quad relative to its light face.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct QuadFlags: u32 {
        /// The quad does not cover the full unit face.
        const PARTIAL = 1 << 0;
        /// The quad is coplanar with its light face, at any depth.
        const PARALLEL = 1 << 1;
        /// The quad lies exactly on the block boundary of its light face.
        const ALIGNED = 1 << 2;
    }
}

/// Tolerance used when checking quad bounds against the unit cube.
const EPSILON: f32 = 0.0001;

impl QuadFlags {
    /// Classifies a quad from its vertex positions.
    ///
    /// # Arguments
    /// * `positions` - The four vertices in block-local coordinates
    /// * `face` - The face the quad is lit from
    ///
    /// # Returns
    /// The flags describing how the quad sits relative to `face`.
    pub fn compute(positions: &[Point3<f32>; 4], face: BlockSide) -> QuadFlags {
        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        for pos in positions {
            min.x = min.x.min(pos.x);
            min.y = min.y.min(pos.y);
            min.z = min.z.min(pos.z);
            max.x = max.x.max(pos.x);
            max.y = max.y.max(pos.y);
            max.z = max.z.max(pos.z);
        }

        let partial = match face.axis() {
            Axis::X => {
                min.y >= EPSILON || min.z >= EPSILON || max.y <= 1.0 - EPSILON || max.z <= 1.0 - EPSILON
            }
            Axis::Y => {
                min.x >= EPSILON || min.z >= EPSILON || max.x <= 1.0 - EPSILON || max.z <= 1.0 - EPSILON
            }
            Axis::Z => {
                min.x >= EPSILON || min.y >= EPSILON || max.x <= 1.0 - EPSILON || max.y <= 1.0 - EPSILON
            }
        };

        let parallel = match face.axis() {
            Axis::X => min.x == max.x,
            Axis::Y => min.y == max.y,
            Axis::Z => min.z == max.z,
        };

        let aligned = parallel
            && match face {
                BlockSide::DOWN => min.y < EPSILON,
                BlockSide::UP => max.y > 1.0 - EPSILON,
                BlockSide::NORTH => min.z < EPSILON,
                BlockSide::SOUTH => max.z > 1.0 - EPSILON,
                BlockSide::WEST => min.x < EPSILON,
                BlockSide::EAST => max.x > 1.0 - EPSILON,
            };

        let mut flags = QuadFlags::empty();
        flags.set(QuadFlags::PARTIAL, partial);
        flags.set(QuadFlags::PARALLEL, parallel);
        flags.set(QuadFlags::ALIGNED, aligned);
        flags
    }
}

/// Read access to the geometry of a model quad.
pub trait QuadView {
    /// Position of vertex `i` (0-3) in block-local coordinates.
    fn position(&self, i: usize) -> Point3<f32>;

    /// The quad's precomputed flags.
    fn flags(&self) -> QuadFlags;
}

/// A block model quad with its flags computed at construction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModelQuad {
    positions: [Point3<f32>; 4],
    light_face: BlockSide,
    flags: QuadFlags,
}

impl ModelQuad {
    /// Creates a quad lit from `light_face`.
    pub fn new(positions: [Point3<f32>; 4], light_face: BlockSide) -> Self {
        ModelQuad {
            positions,
            light_face,
            flags: QuadFlags::compute(&positions, light_face),
        }
    }

    /// Creates the full unit-square quad of a face, in canonical winding.
    pub fn full_face(side: BlockSide) -> Self {
        ModelQuad::new(full_face_vertices(side), side)
    }

    /// The face this quad is lit from.
    pub fn light_face(&self) -> BlockSide {
        self.light_face
    }
}

impl QuadView for ModelQuad {
    #[inline]
    fn position(&self, i: usize) -> Point3<f32> {
        self.positions[i]
    }

    #[inline]
    fn flags(&self) -> QuadFlags {
        self.flags
    }
}

/// Vertices of the full unit-square face on `side`, in canonical winding order.
pub fn full_face_vertices(side: BlockSide) -> [Point3<f32>; 4] {
    let p = Point3::new;
    match side {
        BlockSide::DOWN => [p(0.0, 0.0, 1.0), p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0)],
        BlockSide::UP => [p(0.0, 1.0, 0.0), p(0.0, 1.0, 1.0), p(1.0, 1.0, 1.0), p(1.0, 1.0, 0.0)],
        BlockSide::NORTH => [p(1.0, 1.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
        BlockSide::SOUTH => [p(0.0, 1.0, 1.0), p(0.0, 0.0, 1.0), p(1.0, 0.0, 1.0), p(1.0, 1.0, 1.0)],
        BlockSide::WEST => [p(0.0, 1.0, 0.0), p(0.0, 0.0, 0.0), p(0.0, 0.0, 1.0), p(0.0, 1.0, 1.0)],
        BlockSide::EAST => [p(1.0, 1.0, 1.0), p(1.0, 0.0, 1.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_faces_are_aligned_and_complete() {
        for side in BlockSide::all() {
            let quad = ModelQuad::full_face(side);
            assert_eq!(quad.flags(), QuadFlags::ALIGNED | QuadFlags::PARALLEL, "{side:?}");
        }
    }

    #[test]
    fn inset_top_is_parallel_but_not_aligned() {
        // A path block's top sits at 15/16.
        let y = 15.0 / 16.0;
        let quad = ModelQuad::new(
            [
                Point3::new(0.0, y, 0.0),
                Point3::new(0.0, y, 1.0),
                Point3::new(1.0, y, 1.0),
                Point3::new(1.0, y, 0.0),
            ],
            BlockSide::UP,
        );

        assert_eq!(quad.flags(), QuadFlags::PARALLEL);
    }

    #[test]
    fn half_face_is_partial() {
        let quad = ModelQuad::new(
            [
                Point3::new(0.0, 0.5, 1.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(1.0, 0.5, 1.0),
            ],
            BlockSide::SOUTH,
        );

        assert_eq!(
            quad.flags(),
            QuadFlags::ALIGNED | QuadFlags::PARALLEL | QuadFlags::PARTIAL
        );
    }

    #[test]
    fn slanted_quad_has_no_plane_flags() {
        let quad = ModelQuad::new(
            [
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            BlockSide::UP,
        );

        assert!(!quad.flags().contains(QuadFlags::PARALLEL));
        assert!(!quad.flags().contains(QuadFlags::ALIGNED));
    }
}
