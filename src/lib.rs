#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesh Core
//!
//! The lighting and culling core of a voxel chunk mesher, built on WGPU.
//!
//! For every block face the mesher asks this crate two questions: does the
//! face need to be drawn at all, and how bright is each of its vertices. It
//! also owns the index buffer every quad mesh is drawn with.
//!
//! ## Key Modules
//!
//! * `config` - Worker tunables loaded from JSON
//! * `engine_state` - Lighting, culling, index generation and the GPU buffer contract
//!
//! ## Architecture
//!
//! The crate is split into:
//! * Smooth lighting (`SmoothLightPipeline`, `AoFaceData`) over a read-only light snapshot
//! * Face culling (`BlockOcclusionCache`) over a read-only world view
//! * The shared quad index buffer (`SharedQuadIndexBuffer`) over a `CommandList` backend
//!
//! Each mesh-build worker owns one instance of each, bundled as `MeshBuildContext`.
//!
//! ## Usage
//!
//! ```rust
//! use voxel_mesh_core::{
//!     DirectionalShading, HostCommandList, IndexType, LightWord, MeshingConfig,
//!     SharedQuadIndexBuffer, SmoothLightPipeline, SparseLightCache,
//! };
//!
//! let config = MeshingConfig::default();
//! let light = SparseLightCache::with_fallback(LightWord::new(0, 240).with_ao(1.0));
//! let pipeline = SmoothLightPipeline::new(&light, DirectionalShading);
//!
//! let mut commands = HostCommandList::new();
//! let mut indices = SharedQuadIndexBuffer::new(&mut commands, config.index_type);
//! indices.ensure_capacity(&mut commands, 6 * 128).unwrap();
//! assert_eq!(indices.index_type(), IndexType::Short);
//! # let _ = pipeline;
//! ```
//!
//! ## Performance Considerations
//!
//! * Corner light is computed once per block face and shared by all its quads
//! * Full-cube faces are culled without touching the shape cache
//! * The index pattern is generated once and reused by every mesh

use log::info;

pub mod config;
pub mod engine_state;

pub use config::{ConfigError, MeshingConfig};
pub use engine_state::{
    buffer_state::{
        BufferUsageHint, CommandList, HostBuffer, HostCommand, HostCommandList, MapFlags,
        WgpuBuffer, WgpuCommandList,
    },
    rendering::{
        light::{
            combine_corner, lightmap_coord, AoFaceData, AoNeighborInfo, DirectionalShading,
            LightDataAccess, LightWord, QuadLightData, ShadeTable, SmoothLightPipeline,
            SparseLightCache, LIGHTMAP_MASK, MAX_LIGHT_COORDINATE,
        },
        meshing::{
            full_face_vertices, BlockOcclusionCache, IndexBufferError, IndexType, ModelQuad,
            QuadFlags, QuadView, SharedQuadIndexBuffer, ELEMENTS_PER_PRIMITIVE,
        },
    },
    voxels::block::{
        block_side::{Axis, BlockSide},
        culling_shape::{CullingShape, FaceShape, FACE_RESOLUTION},
        BlockState, BlockView,
    },
    MeshBuildContext,
};

/// Initializes logging to stdout, filtered by the `RUST_LOG` environment variable.
///
/// Calling it more than once is harmless; later calls leave the first logger in place.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    let initialized = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()
        .is_ok();

    if initialized {
        info!("Logger initialized");
    }
}
