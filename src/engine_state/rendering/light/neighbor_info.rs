//! Per-face neighbor geometry for smooth lighting.
//!
//! For every face direction this table names the four in-plane neighbor
//! directions that surround the face, and converts block-local vertex
//! positions into corner weights and a depth along the face normal.
//!
//! Corner `k` of a face is bordered by these neighbor directions:
//! - corner 0: `faces[3]` and `faces[0]`
//! - corner 1: `faces[2]` and `faces[0]`
//! - corner 2: `faces[2]` and `faces[1]`
//! - corner 3: `faces[3]` and `faces[1]`

use crate::engine_state::voxels::block::block_side::BlockSide;

/// Geometry of one face direction.
#[derive(Debug)]
pub struct AoNeighborInfo {
    /// The face this entry describes.
    pub side: BlockSide,
    /// The four in-plane directions around the face.
    pub faces: [BlockSide; 4],
    /// `vertex_corners[i]` is the corner feeding vertex `i` of a full face in
    /// canonical winding order.
    pub vertex_corners: [usize; 4],
}

static NEIGHBOR_INFO: [AoNeighborInfo; 6] = [
    AoNeighborInfo {
        side: BlockSide::DOWN,
        faces: [BlockSide::WEST, BlockSide::EAST, BlockSide::NORTH, BlockSide::SOUTH],
        vertex_corners: [0, 1, 2, 3],
    },
    AoNeighborInfo {
        side: BlockSide::UP,
        faces: [BlockSide::EAST, BlockSide::WEST, BlockSide::NORTH, BlockSide::SOUTH],
        vertex_corners: [2, 3, 0, 1],
    },
    AoNeighborInfo {
        side: BlockSide::NORTH,
        faces: [BlockSide::UP, BlockSide::DOWN, BlockSide::EAST, BlockSide::WEST],
        vertex_corners: [1, 2, 3, 0],
    },
    AoNeighborInfo {
        side: BlockSide::SOUTH,
        faces: [BlockSide::WEST, BlockSide::EAST, BlockSide::DOWN, BlockSide::UP],
        vertex_corners: [0, 1, 2, 3],
    },
    AoNeighborInfo {
        side: BlockSide::WEST,
        faces: [BlockSide::UP, BlockSide::DOWN, BlockSide::NORTH, BlockSide::SOUTH],
        vertex_corners: [1, 2, 3, 0],
    },
    AoNeighborInfo {
        side: BlockSide::EAST,
        faces: [BlockSide::DOWN, BlockSide::UP, BlockSide::NORTH, BlockSide::SOUTH],
        vertex_corners: [3, 0, 1, 2],
    },
];

impl AoNeighborInfo {
    /// Returns the table entry for `side`.
    #[inline]
    pub fn get(side: BlockSide) -> &'static AoNeighborInfo {
        &NEIGHBOR_INFO[side.ordinal()]
    }

    /// Computes bilinear weights of the four face corners at a block-local position.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Vertex position inside the unit cube, already clamped to `[0, 1]`
    ///
    /// # Returns
    /// One weight per corner; the weights sum to 1.
    pub fn corner_weights(&self, x: f32, y: f32, z: f32) -> [f32; 4] {
        let (u, v) = match self.side {
            BlockSide::DOWN => (z, 1.0 - x),
            BlockSide::UP => (z, x),
            BlockSide::NORTH => (1.0 - x, y),
            BlockSide::SOUTH => (y, 1.0 - x),
            BlockSide::WEST => (z, y),
            BlockSide::EAST => (z, 1.0 - y),
        };

        [
            v * u,
            v * (1.0 - u),
            (1.0 - v) * (1.0 - u),
            (1.0 - v) * u,
        ]
    }

    /// Distance of a position from the neighbor's face, along this face's normal.
    ///
    /// 0 lies on the block boundary shared with the neighbor across this face,
    /// 1 lies on the opposite boundary of this block.
    pub fn depth(&self, x: f32, y: f32, z: f32) -> f32 {
        match self.side {
            BlockSide::DOWN => y,
            BlockSide::UP => 1.0 - y,
            BlockSide::NORTH => z,
            BlockSide::SOUTH => 1.0 - z,
            BlockSide::WEST => x,
            BlockSide::EAST => 1.0 - x,
        }
    }

    /// Copies per-corner values onto the four vertices of a full face.
    pub fn map_corners<T: Copy>(&self, corners: &[T; 4], out: &mut [T; 4]) {
        for (vertex, corner) in self.vertex_corners.iter().enumerate() {
            out[vertex] = corners[*corner];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::meshing::quad::full_face_vertices;

    #[test]
    fn table_is_indexed_by_ordinal() {
        for side in BlockSide::all() {
            let info = AoNeighborInfo::get(side);
            assert_eq!(info.side, side);
            for face in info.faces {
                assert_ne!(face.axis(), side.axis());
            }
        }
    }

    #[test]
    fn weights_sum_to_one() {
        for side in BlockSide::all() {
            let info = AoNeighborInfo::get(side);
            let weights = info.corner_weights(0.25, 0.6, 0.9);
            let sum: f32 = weights.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6, "{side:?}: {sum}");
        }
    }

    #[test]
    fn full_face_vertices_select_their_mapped_corner() {
        for side in BlockSide::all() {
            let info = AoNeighborInfo::get(side);
            for (vertex, pos) in full_face_vertices(side).iter().enumerate() {
                let weights = info.corner_weights(pos.x, pos.y, pos.z);
                let mut expected = [0.0; 4];
                expected[info.vertex_corners[vertex]] = 1.0;
                assert_eq!(weights, expected, "{side:?} vertex {vertex}");
            }
        }
    }

    #[test]
    fn full_faces_sit_at_zero_depth() {
        for side in BlockSide::all() {
            let info = AoNeighborInfo::get(side);
            for pos in full_face_vertices(side) {
                assert_eq!(info.depth(pos.x, pos.y, pos.z), 0.0);
            }
        }
    }
}
