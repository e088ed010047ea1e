//! The smooth lighting pipeline.
//!
//! For every quad the pipeline picks one of four strategies depending on how
//! the quad sits inside its block:
//!
//! - **Aligned, full**: the quad is the block face itself. The corner values of
//!   the neighbor's face data are copied onto the vertices.
//! - **Aligned, partial**: the quad lies on the face but covers only part of
//!   it. Each vertex blends the four corners bilinearly.
//! - **Parallel**: the quad is inset into the block. Each vertex blends the
//!   block's own face data with the neighbor's, weighted by depth.
//! - **Non-parallel**: like parallel, but depths outside `[0, 1]` snap to one
//!   side.
//!
//! Face data is cached in 12 slots (6 faces, sampled around the block or
//! around its neighbor) and reused until the block position changes.

use cgmath::Point3;
use log::trace;

use super::{
    ao_face::AoFaceData,
    data::{lightmap_coord, LightDataAccess},
    neighbor_info::AoNeighborInfo,
    QuadLightData, ShadeTable,
};
use crate::engine_state::{
    rendering::meshing::quad::{QuadFlags, QuadView},
    voxels::block::block_side::BlockSide,
};

/// Produces interpolated per-vertex light and occlusion for model quads.
///
/// One pipeline belongs to one mesh-build worker; it is not shared.
///
/// # Type Parameters
/// - `L`: The light snapshot the pipeline reads from
/// - `S`: The directional shading table
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_mesh_core::{
///     BlockSide, DirectionalShading, LightWord, ModelQuad, QuadLightData,
///     SmoothLightPipeline, SparseLightCache,
/// };
///
/// let light = SparseLightCache::with_fallback(LightWord::new(240, 240).with_ao(1.0));
/// let mut pipeline = SmoothLightPipeline::new(&light, DirectionalShading);
///
/// let mut out = QuadLightData::default();
/// let quad = ModelQuad::full_face(BlockSide::UP);
/// pipeline.calculate(&quad, Point3::new(0, 0, 0), &mut out, None, BlockSide::UP, true);
///
/// assert_eq!(out.lm, [LightWord::new(240, 240).lightmap(); 4]);
/// assert_eq!(out.br, [1.0; 4]);
/// ```
pub struct SmoothLightPipeline<L, S> {
    light: L,
    shading: S,
    /// Face data indexed by `side.ordinal()` when sampled around the
    /// neighbor, and `side.ordinal() + 6` when sampled around the block.
    cached_face_data: [AoFaceData; 12],
    cached_pos: Option<Point3<i32>>,
}

impl<L: LightDataAccess, S: ShadeTable> SmoothLightPipeline<L, S> {
    /// Creates a pipeline reading from `light` and shading with `shading`.
    pub fn new(light: L, shading: S) -> Self {
        SmoothLightPipeline {
            light,
            shading,
            cached_face_data: Default::default(),
            cached_pos: None,
        }
    }

    /// Computes lighting for one quad of the block at `pos`.
    ///
    /// # Arguments
    /// * `quad` - The quad to light
    /// * `pos` - World position of the block the quad belongs to
    /// * `out` - Receives one lightmap coordinate and brightness per vertex
    /// * `_cull_face` - The face the quad is culled against, if any
    /// * `light_face` - The face the quad is lit from
    /// * `shade` - Whether directional shading applies
    pub fn calculate<Q: QuadView + ?Sized>(
        &mut self,
        quad: &Q,
        pos: Point3<i32>,
        out: &mut QuadLightData,
        _cull_face: Option<BlockSide>,
        light_face: BlockSide,
        shade: bool,
    ) {
        self.update_cached_data(pos);

        let flags = quad.flags();
        let neighbor_info = AoNeighborInfo::get(light_face);

        let aligned = flags.contains(QuadFlags::ALIGNED)
            || (flags.contains(QuadFlags::PARALLEL) && self.light.get(pos).full_cube_face());

        if aligned {
            if flags.contains(QuadFlags::PARTIAL) {
                self.apply_aligned_partial_face(neighbor_info, quad, pos, light_face, out);
            } else {
                self.apply_aligned_full_face(neighbor_info, pos, light_face, out);
            }
        } else if flags.contains(QuadFlags::PARALLEL) {
            self.apply_parallel_face(neighbor_info, quad, pos, light_face, out);
        } else {
            self.apply_non_parallel_face(neighbor_info, quad, pos, light_face, out);
        }

        self.apply_sided_brightness(out, light_face, shade);
    }

    /// Drops all cached face data, e.g. after the light snapshot was refreshed.
    pub fn reset(&mut self) {
        for data in self.cached_face_data.iter_mut() {
            data.reset();
        }
        self.cached_pos = None;
    }

    /// The light snapshot this pipeline reads from.
    pub fn light(&self) -> &L {
        &self.light
    }

    fn apply_aligned_full_face(
        &mut self,
        neighbor_info: &AoNeighborInfo,
        pos: Point3<i32>,
        side: BlockSide,
        out: &mut QuadLightData,
    ) {
        let face_data = self.cached_face_data(pos, side, true);
        neighbor_info.map_corners(&face_data.lm, &mut out.lm);
        neighbor_info.map_corners(&face_data.ao, &mut out.br);
    }

    fn apply_aligned_partial_face<Q: QuadView + ?Sized>(
        &mut self,
        neighbor_info: &AoNeighborInfo,
        quad: &Q,
        pos: Point3<i32>,
        side: BlockSide,
        out: &mut QuadLightData,
    ) {
        for i in 0..4 {
            let (x, y, z) = clamped_position(quad, i);
            let weights = neighbor_info.corner_weights(x, y, z);
            self.apply_aligned_partial_face_vertex(pos, side, &weights, i, out, true);
        }
    }

    fn apply_parallel_face<Q: QuadView + ?Sized>(
        &mut self,
        neighbor_info: &AoNeighborInfo,
        quad: &Q,
        pos: Point3<i32>,
        side: BlockSide,
        out: &mut QuadLightData,
    ) {
        for i in 0..4 {
            let (x, y, z) = clamped_position(quad, i);
            let weights = neighbor_info.corner_weights(x, y, z);
            let depth = neighbor_info.depth(x, y, z);

            if depth >= 1.0 {
                self.apply_aligned_partial_face_vertex(pos, side, &weights, i, out, false);
            } else {
                self.apply_inset_partial_face_vertex(pos, side, depth, 1.0 - depth, &weights, i, out);
            }
        }
    }

    fn apply_non_parallel_face<Q: QuadView + ?Sized>(
        &mut self,
        neighbor_info: &AoNeighborInfo,
        quad: &Q,
        pos: Point3<i32>,
        side: BlockSide,
        out: &mut QuadLightData,
    ) {
        for i in 0..4 {
            let (x, y, z) = clamped_position(quad, i);
            let weights = neighbor_info.corner_weights(x, y, z);
            let depth = neighbor_info.depth(x, y, z);

            if depth <= 0.0 {
                self.apply_aligned_partial_face_vertex(pos, side, &weights, i, out, true);
            } else if depth >= 1.0 {
                self.apply_aligned_partial_face_vertex(pos, side, &weights, i, out, false);
            } else {
                self.apply_inset_partial_face_vertex(pos, side, depth, 1.0 - depth, &weights, i, out);
            }
        }
    }

    fn apply_aligned_partial_face_vertex(
        &mut self,
        pos: Point3<i32>,
        side: BlockSide,
        weights: &[f32; 4],
        i: usize,
        out: &mut QuadLightData,
        offset: bool,
    ) {
        let face_data = self.unpacked_face_data(pos, side, offset);

        let sl = face_data.blended_sky_light(weights);
        let bl = face_data.blended_block_light(weights);
        let ao = face_data.blended_shade(weights);

        out.br[i] = ao;
        out.lm[i] = lightmap_coord(sl, bl);
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_inset_partial_face_vertex(
        &mut self,
        pos: Point3<i32>,
        side: BlockSide,
        inner_weight: f32,
        outer_weight: f32,
        weights: &[f32; 4],
        i: usize,
        out: &mut QuadLightData,
    ) {
        self.unpacked_face_data(pos, side, false);
        self.unpacked_face_data(pos, side, true);

        let inner = &self.cached_face_data[face_slot(side, false)];
        let outer = &self.cached_face_data[face_slot(side, true)];

        let ao = inner.blended_shade(weights) * inner_weight + outer.blended_shade(weights) * outer_weight;
        let sl = inner.blended_sky_light(weights) * inner_weight
            + outer.blended_sky_light(weights) * outer_weight;
        let bl = inner.blended_block_light(weights) * inner_weight
            + outer.blended_block_light(weights) * outer_weight;

        out.br[i] = ao;
        out.lm[i] = lightmap_coord(sl, bl);
    }

    fn apply_sided_brightness(&self, out: &mut QuadLightData, side: BlockSide, shade: bool) {
        let brightness = self.shading.brightness(side, shade);

        for br in out.br.iter_mut() {
            *br *= brightness;
        }
    }

    fn cached_face_data(&mut self, pos: Point3<i32>, side: BlockSide, offset: bool) -> &AoFaceData {
        let data = &mut self.cached_face_data[face_slot(side, offset)];

        if !data.has_light_data() {
            data.init_light_data(&self.light, pos, side, offset);
        }

        data
    }

    fn unpacked_face_data(&mut self, pos: Point3<i32>, side: BlockSide, offset: bool) -> &AoFaceData {
        self.cached_face_data(pos, side, offset);

        let data = &mut self.cached_face_data[face_slot(side, offset)];
        if !data.has_unpacked_light_data() {
            data.unpack_light_data();
        }

        data
    }

    fn update_cached_data(&mut self, pos: Point3<i32>) {
        if self.cached_pos != Some(pos) {
            trace!("Smooth lighting cache moved to {:?}", pos);

            for data in self.cached_face_data.iter_mut() {
                data.reset();
            }
            self.cached_pos = Some(pos);
        }
    }
}

#[inline]
fn face_slot(side: BlockSide, offset: bool) -> usize {
    if offset {
        side.ordinal()
    } else {
        side.ordinal() + 6
    }
}

#[inline]
fn clamped_position<Q: QuadView + ?Sized>(quad: &Q, i: usize) -> (f32, f32, f32) {
    let pos = quad.position(i);
    (
        pos.x.clamp(0.0, 1.0),
        pos.y.clamp(0.0, 1.0),
        pos.z.clamp(0.0, 1.0),
    )
}
