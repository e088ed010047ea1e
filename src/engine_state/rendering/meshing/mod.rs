//! Face culling and index generation for chunk meshes.
//!
//! This module decides which block faces reach the mesh and provides the
//! shared index buffer every quad mesh is drawn with. Geometry itself comes
//! from the block models; the mesher only classifies and lights it.
//!
//! # Architecture
//! - `BlockOcclusionCache`: Decides per face whether it must be drawn, memoizing shape comparisons
//! - `QuadFlags` / `ModelQuad`: Geometric classification of model quads for the lighting pipeline
//! - `SharedQuadIndexBuffer`: The growable `{0, 1, 2, 2, 3, 0}` index pattern shared by all quad meshes
//!
//! # Performance Considerations
//! - Full-cube neighbors are culled by pointer identity, without hashing any shape
//! - Shape comparisons are memoized in a bounded LRU cache per worker
//! - The index buffer is regenerated only when a mesh outgrows it

mod index_buffer;
mod occlusion_cache;
pub(crate) mod quad;

pub use index_buffer::{
    IndexBufferError, IndexType, SharedQuadIndexBuffer, DEFAULT_GROWTH_SLACK, ELEMENTS_PER_PRIMITIVE,
    VERTICES_PER_PRIMITIVE,
};
pub use occlusion_cache::{BlockOcclusionCache, DEFAULT_OCCLUSION_CACHE_CAPACITY};
pub use quad::{full_face_vertices, ModelQuad, QuadFlags, QuadView};
