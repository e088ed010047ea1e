//! # Voxels
//!
//! The block-level vocabulary shared by the lighting and culling code: face
//! directions, culling shapes and the read-only block view contract.
//!
//! ## Architecture
//!
//! * **Block sides**: the six faces of a voxel and their neighbor offsets
//! * **Culling shapes**: per-face occupancy compared during face culling
//! * **Block view / state**: traits the mesher's world snapshot implements

pub mod block;
