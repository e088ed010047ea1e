//! # Engine State Module
//!
//! The per-worker state of chunk mesh construction.
//!
//! ## Key Components
//!
//! * `MeshBuildContext` - Everything one mesh-build worker owns, bundled
//! * `buffer_state` - The GPU buffer contract and its backends
//! * `rendering` - Smooth lighting, face culling and the shared index buffer
//! * `voxels` - Block sides, culling shapes and the world view traits
//!
//! ## Architecture
//!
//! Mesh building runs on several workers at once. Nothing in this module is
//! shared between them: each worker creates its own `MeshBuildContext` over
//! its own light snapshot, and the scheduler hands finished meshes back to the
//! render thread.

use cgmath::Point3;
use log::debug;

use crate::{
    config::MeshingConfig,
    engine_state::{
        buffer_state::CommandList,
        rendering::{
            light::{LightDataAccess, QuadLightData, ShadeTable, SmoothLightPipeline},
            meshing::{
                BlockOcclusionCache, IndexBufferError, QuadView, SharedQuadIndexBuffer,
                ELEMENTS_PER_PRIMITIVE,
            },
        },
        voxels::block::{block_side::BlockSide, culling_shape::CullingShape, BlockState, BlockView},
    },
};

pub mod buffer_state;
pub mod rendering;
pub mod voxels;

/// The lighting pipeline, occlusion cache and index buffer of one mesh-build worker.
///
/// # Type Parameters
/// - `L`: The worker's light snapshot
/// - `Sh`: The directional shading table
/// - `S`: The culling shape type of the world's block states
/// - `C`: The command list owning the index buffer
pub struct MeshBuildContext<L, Sh, S, C>
where
    S: CullingShape,
    C: CommandList,
{
    /// Smooth lighting for the quads of the current build.
    pub lighting: SmoothLightPipeline<L, Sh>,
    /// Face visibility decisions.
    pub occlusion: BlockOcclusionCache<S>,
    /// The index buffer all quads of this worker are drawn with.
    pub index_buffer: SharedQuadIndexBuffer<C>,
    quad_count: usize,
}

impl<L, Sh, S, C> MeshBuildContext<L, Sh, S, C>
where
    L: LightDataAccess,
    Sh: ShadeTable,
    S: CullingShape,
    C: CommandList,
{
    /// Creates a worker context.
    ///
    /// # Arguments
    /// * `config` - Cache and index buffer settings
    /// * `light` - The worker's light snapshot
    /// * `shading` - Directional shading table
    /// * `commands` - Command list creating the index buffer
    pub fn new(config: &MeshingConfig, light: L, shading: Sh, commands: &mut C) -> Self {
        Self {
            lighting: SmoothLightPipeline::new(light, shading),
            occlusion: BlockOcclusionCache::with_capacity(config.occlusion_cache_capacity),
            index_buffer: SharedQuadIndexBuffer::with_growth_slack(
                commands,
                config.index_type,
                config.index_growth_slack,
            ),
            quad_count: 0,
        }
    }

    /// Culls and lights one quad of the block at `pos`.
    ///
    /// # Arguments
    /// * `view` - The world view of the current build
    /// * `state` - The state of the block at `pos`
    /// * `pos` - Position of the block the quad belongs to
    /// * `quad` - The quad to light
    /// * `cull_face` - The face the quad is hidden by, if a neighbor can hide it
    /// * `light_face` - The face the quad is lit from
    /// * `shade` - Whether directional shading applies
    ///
    /// # Returns
    /// The quad's per-vertex light, or `None` if the quad is culled.
    #[allow(clippy::too_many_arguments)]
    pub fn light_quad<V, Q>(
        &mut self,
        view: &V,
        state: &V::State,
        pos: Point3<i32>,
        quad: &Q,
        cull_face: Option<BlockSide>,
        light_face: BlockSide,
        shade: bool,
    ) -> Option<QuadLightData>
    where
        V: BlockView + ?Sized,
        V::State: BlockState<V, Shape = S>,
        Q: QuadView + ?Sized,
    {
        if let Some(side) = cull_face {
            if !self.occlusion.should_draw_side(state, view, pos, side) {
                return None;
            }
        }

        let mut out = QuadLightData::default();
        self.lighting
            .calculate(quad, pos, &mut out, cull_face, light_face, shade);
        self.quad_count += 1;

        Some(out)
    }

    /// Number of quads lit since the last [`MeshBuildContext::finish_build`].
    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    /// Ends the current build: grows the index buffer to cover its quads and
    /// drops the cached light data.
    ///
    /// # Returns
    /// The number of quads in the finished build.
    pub fn finish_build(&mut self, commands: &mut C) -> Result<usize, IndexBufferError> {
        let quads = std::mem::take(&mut self.quad_count);
        self.lighting.reset();
        self.index_buffer
            .ensure_capacity(commands, quads * ELEMENTS_PER_PRIMITIVE)?;

        debug!(
            "Finished mesh build with {} quads ({} memoized shape comparisons)",
            quads,
            self.occlusion.len()
        );

        Ok(quads)
    }
}
