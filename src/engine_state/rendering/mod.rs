//! Rendering-side processing of voxel geometry.
//!
//! This module contains everything between a block model and the GPU that
//! depends on the surrounding world: smooth lighting, face culling and the
//! shared quad index buffer.

pub mod light;
pub mod meshing;
