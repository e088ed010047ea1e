//! Smooth lighting and ambient occlusion for block model quads.
//!
//! This module turns the packed light words of a build's light snapshot into
//! per-vertex lightmap coordinates and brightness multipliers.
//!
//! # Architecture
//! - [`LightWord`] / [`LightDataAccess`]: the packed per-block input and the snapshot contract
//! - [`AoFaceData`]: lazily computed corner light for one face of one block
//! - [`AoNeighborInfo`]: per-direction neighbor directions, corner weights and depth
//! - [`SmoothLightPipeline`]: classifies quads and blends corner data onto vertices
//!
//! # Performance Considerations
//! - Corner data is cached per face and reused by every quad of the same block
//! - Full faces on the block grid skip interpolation and copy corners directly
//! - Corner averaging works on packed integer words, one add per neighbor

mod ao_face;
mod data;
mod neighbor_info;
mod smooth;

pub use ao_face::{combine_corner, AoFaceData};
pub use data::{
    lightmap_coord, LightDataAccess, LightWord, SparseLightCache, LIGHTMAP_MASK,
    MAX_LIGHT_COORDINATE,
};
pub use neighbor_info::AoNeighborInfo;
pub use smooth::SmoothLightPipeline;

use crate::engine_state::voxels::block::block_side::BlockSide;

/// Per-vertex lighting output for one quad.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct QuadLightData {
    /// Lightmap coordinate of each vertex (block light in bits 0-7, sky light in bits 16-23).
    pub lm: [u32; 4],
    /// Brightness multiplier of each vertex (occlusion times directional shade).
    pub br: [f32; 4],
}

/// Directional shading applied on top of ambient occlusion.
pub trait ShadeTable {
    /// Brightness multiplier for faces lit from `side`.
    ///
    /// # Arguments
    /// * `side` - The quad's light face
    /// * `shade` - Whether the quad has directional shading enabled
    fn brightness(&self, side: BlockSide, shade: bool) -> f32;
}

/// The classic overworld shading: bright tops, darker bottoms and sides.
#[derive(Copy, Clone, Debug, Default)]
pub struct DirectionalShading;

impl ShadeTable for DirectionalShading {
    fn brightness(&self, side: BlockSide, shade: bool) -> f32 {
        if !shade {
            return 1.0;
        }

        match side {
            BlockSide::DOWN => 0.5,
            BlockSide::UP => 1.0,
            BlockSide::NORTH | BlockSide::SOUTH => 0.8,
            BlockSide::WEST | BlockSide::EAST => 0.6,
        }
    }
}

impl<T: ShadeTable + ?Sized> ShadeTable for &T {
    fn brightness(&self, side: BlockSide, shade: bool) -> f32 {
        (**self).brightness(side, shade)
    }
}
