//! # Culling Shape Module
//!
//! Culling shapes describe how much of a block face is covered by solid
//! geometry. The occlusion cache compares them to decide whether the face
//! between two blocks can be skipped.
//!
//! [`FaceShape`] is the shape used by the engine: a 16x16 occupancy mask over
//! the face (one cell per model texel). Masks are shared behind an `Arc`, so
//! cloning a shape is cheap and the canonical full cube can be recognised by
//! pointer identity alone.

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, LazyLock},
};

use bitvec::prelude::*;

/// A face shape that can be compared against the face it touches.
///
/// Equality and hashing must be content based, since shapes are used as cache
/// keys. [`CullingShape::is_full_cube`] is the exception: it must be an
/// identity check against one canonical instance.
pub trait CullingShape: Clone + Eq + Hash {
    /// Whether the shape covers no area at all.
    fn is_empty(&self) -> bool;

    /// Whether this is the canonical full-cube instance.
    fn is_full_cube(&self) -> bool;

    /// Whether `self` occupies any area that `other` does not cover.
    fn protrudes_past(&self, other: &Self) -> bool;
}

/// Number of cells along each edge of a face mask.
pub const FACE_RESOLUTION: usize = 16;

const FACE_CELLS: usize = FACE_RESOLUTION * FACE_RESOLUTION;

type FaceBits = BitArr!(for FACE_CELLS, in u64, Lsb0);

#[derive(Clone, PartialEq, Eq, Hash)]
struct FaceMask {
    bits: FaceBits,
}

static FULL_CUBE: LazyLock<FaceShape> = LazyLock::new(|| FaceShape::from_rect(0, 0, 16, 16));

/// A 16x16 occupancy mask over one block face.
///
/// # Examples
///
/// ```
/// use voxel_mesh_core::{CullingShape, FaceShape};
///
/// let slab = FaceShape::from_rect(0, 0, 16, 8);
/// assert!(!slab.is_full_cube());
/// assert!(FaceShape::full_cube().is_full_cube());
/// ```
#[derive(Clone)]
pub struct FaceShape {
    mask: Arc<FaceMask>,
}

impl FaceShape {
    /// Returns the canonical full-cube shape.
    ///
    /// Every call hands out the same allocation, which is what makes the
    /// identity check in [`CullingShape::is_full_cube`] work.
    pub fn full_cube() -> FaceShape {
        FULL_CUBE.clone()
    }

    /// Returns a shape covering nothing.
    pub fn empty() -> FaceShape {
        FaceShape::from_bits(bitarr![u64, Lsb0; 0; FACE_CELLS])
    }

    /// Builds a shape covering the cells in `[min_u, max_u) x [min_v, max_v)`.
    ///
    /// # Arguments
    /// * `min_u`, `min_v` - Inclusive lower cell corner
    /// * `max_u`, `max_v` - Exclusive upper cell corner, clamped to 16
    pub fn from_rect(min_u: usize, min_v: usize, max_u: usize, max_v: usize) -> FaceShape {
        let mut bits = bitarr![u64, Lsb0; 0; FACE_CELLS];

        for v in min_v..max_v.min(FACE_RESOLUTION) {
            for u in min_u..max_u.min(FACE_RESOLUTION) {
                bits.set(v * FACE_RESOLUTION + u, true);
            }
        }

        FaceShape::from_bits(bits)
    }

    /// Builds a shape from a list of `(u, v)` cells. Out-of-range cells are ignored.
    pub fn from_cells(cells: impl IntoIterator<Item = (usize, usize)>) -> FaceShape {
        let mut bits = bitarr![u64, Lsb0; 0; FACE_CELLS];

        for (u, v) in cells {
            if u < FACE_RESOLUTION && v < FACE_RESOLUTION {
                bits.set(v * FACE_RESOLUTION + u, true);
            }
        }

        FaceShape::from_bits(bits)
    }

    /// Returns the union of two shapes.
    pub fn union(&self, other: &FaceShape) -> FaceShape {
        let mut bits = self.mask.bits.clone();
        for index in other.mask.bits.iter_ones() {
            bits.set(index, true);
        }

        FaceShape::from_bits(bits)
    }

    /// Number of covered cells.
    pub fn area(&self) -> usize {
        self.mask.bits.count_ones()
    }

    fn from_bits(bits: FaceBits) -> FaceShape {
        FaceShape {
            mask: Arc::new(FaceMask { bits }),
        }
    }
}

impl CullingShape for FaceShape {
    fn is_empty(&self) -> bool {
        self.mask.bits.not_any()
    }

    fn is_full_cube(&self) -> bool {
        Arc::ptr_eq(&self.mask, &FULL_CUBE.mask)
    }

    fn protrudes_past(&self, other: &FaceShape) -> bool {
        self.mask
            .bits
            .iter_ones()
            .any(|index| !other.mask.bits[index])
    }
}

impl PartialEq for FaceShape {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.mask, &other.mask) || self.mask == other.mask
    }
}

impl Eq for FaceShape {}

impl Hash for FaceShape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mask.hash(state);
    }
}

impl fmt::Debug for FaceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaceShape")
            .field("area", &self.area())
            .field("full_cube", &self.is_full_cube())
            .finish()
    }
}
