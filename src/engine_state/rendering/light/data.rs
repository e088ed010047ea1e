//! Packed per-block light words and the light source contract.
//!
//! A [`LightWord`] packs everything the smooth lighting pipeline needs to know
//! about one block into 32 bits, so a corner computation touches a single
//! integer per neighbor instead of several lookups.
//!
//! # Memory Layout
//! - bits 0-7: block light (lightmap coordinate)
//! - bits 8-15: ambient occlusion, quantized to 0-255
//! - bits 16-23: sky light (lightmap coordinate)
//! - bit 24: emissive
//! - bit 25: opaque
//! - bit 26: fully opaque (light cannot be sampled through the block)
//! - bit 27: the block's own face is a full unit square

use std::collections::HashMap;

use cgmath::Point3;

use crate::engine_state::voxels::block::block_side::BlockSide;

/// Mask isolating the two lightmap channels of a packed word.
pub const LIGHTMAP_MASK: u32 = 0x00FF_00FF;

/// The brightest lightmap coordinate (block 240, sky 240).
pub const MAX_LIGHT_COORDINATE: u32 = 0x00F0_00F0;

const BLOCK_SHIFT: u32 = 0;
const AO_SHIFT: u32 = 8;
const SKY_SHIFT: u32 = 16;

const EMISSIVE_BIT: u32 = 1 << 24;
const OPAQUE_BIT: u32 = 1 << 25;
const FULL_OPAQUE_BIT: u32 = 1 << 26;
const FULL_CUBE_FACE_BIT: u32 = 1 << 27;

/// Light and occlusion information for one block, packed into a `u32`.
///
/// The all-zero word is the "unlit" sentinel: no light, full occlusion and no
/// flags set. Missing data is always read as this value.
#[repr(transparent)]
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightWord(pub u32);

impl LightWord {
    /// The unlit sentinel.
    pub const UNLIT: LightWord = LightWord(0);

    /// Starts building a word with the given lightmap channels.
    ///
    /// # Arguments
    /// * `block` - Block light coordinate (0-255)
    /// * `sky` - Sky light coordinate (0-255)
    ///
    /// # Returns
    /// A word with no occlusion factor and no flags set.
    pub const fn new(block: u8, sky: u8) -> Self {
        LightWord(((block as u32) << BLOCK_SHIFT) | ((sky as u32) << SKY_SHIFT))
    }

    /// Returns a copy with the ambient occlusion factor set, clamped to `[0, 1]`.
    pub fn with_ao(self, ao: f32) -> Self {
        let quantized = (ao.clamp(0.0, 1.0) * 255.0).round() as u32;
        LightWord((self.0 & !(0xFF << AO_SHIFT)) | (quantized << AO_SHIFT))
    }

    /// Returns a copy with the emissive flag set to `value`.
    pub const fn with_emissive(self, value: bool) -> Self {
        self.with_flag(EMISSIVE_BIT, value)
    }

    /// Returns a copy with the opaque flag set to `value`.
    pub const fn with_opaque(self, value: bool) -> Self {
        self.with_flag(OPAQUE_BIT, value)
    }

    /// Returns a copy with the fully-opaque flag set to `value`.
    pub const fn with_full_opaque(self, value: bool) -> Self {
        self.with_flag(FULL_OPAQUE_BIT, value)
    }

    /// Returns a copy with the full-face flag set to `value`.
    pub const fn with_full_cube_face(self, value: bool) -> Self {
        self.with_flag(FULL_CUBE_FACE_BIT, value)
    }

    const fn with_flag(self, bit: u32, value: bool) -> Self {
        if value {
            LightWord(self.0 | bit)
        } else {
            LightWord(self.0 & !bit)
        }
    }

    /// Returns the two lightmap channels in place (block in bits 0-7, sky in bits 16-23).
    #[inline]
    pub const fn lightmap(self) -> u32 {
        self.0 & LIGHTMAP_MASK
    }

    /// Block light coordinate.
    #[inline]
    pub const fn block_light(self) -> u8 {
        (self.0 >> BLOCK_SHIFT) as u8
    }

    /// Sky light coordinate.
    #[inline]
    pub const fn sky_light(self) -> u8 {
        (self.0 >> SKY_SHIFT) as u8
    }

    /// Ambient occlusion factor in `[0, 1]`.
    #[inline]
    pub fn ao(self) -> f32 {
        ((self.0 >> AO_SHIFT) & 0xFF) as f32 / 255.0
    }

    /// Whether the block emits light at full brightness.
    #[inline]
    pub const fn emissive(self) -> bool {
        self.0 & EMISSIVE_BIT != 0
    }

    /// Whether the block is opaque.
    #[inline]
    pub const fn opaque(self) -> bool {
        self.0 & OPAQUE_BIT != 0
    }

    /// Whether the block is fully opaque, so light must not be sampled through it.
    #[inline]
    pub const fn full_opaque(self) -> bool {
        self.0 & FULL_OPAQUE_BIT != 0
    }

    /// Whether the block's own face is a full unit square.
    #[inline]
    pub const fn full_cube_face(self) -> bool {
        self.0 & FULL_CUBE_FACE_BIT != 0
    }
}

/// Packs blended sky and block light back into a lightmap coordinate.
///
/// The float channels are truncated towards zero.
#[inline]
pub fn lightmap_coord(sky: f32, block: f32) -> u32 {
    (((sky as u32) & 0xFF) << SKY_SHIFT) | ((block as u32) & 0xFF)
}

/// Read-only access to the light words of a mesh build's snapshot.
///
/// Implementations must return a stable view for the duration of one build.
/// The neighbor accessors default to stepping the position and calling
/// [`LightDataAccess::get`].
pub trait LightDataAccess {
    /// Returns the word for the block at `pos`.
    fn get(&self, pos: Point3<i32>) -> LightWord;

    /// Returns the word for the block one step from `pos` across `side`.
    fn get_offset(&self, pos: Point3<i32>, side: BlockSide) -> LightWord {
        self.get(side.step(pos))
    }

    /// Returns the word for the block diagonally adjacent to `pos` across `first` and `second`.
    fn get_diagonal(&self, pos: Point3<i32>, first: BlockSide, second: BlockSide) -> LightWord {
        self.get(second.step(first.step(pos)))
    }
}

impl<T: LightDataAccess + ?Sized> LightDataAccess for &T {
    fn get(&self, pos: Point3<i32>) -> LightWord {
        (**self).get(pos)
    }

    fn get_offset(&self, pos: Point3<i32>, side: BlockSide) -> LightWord {
        (**self).get_offset(pos, side)
    }

    fn get_diagonal(&self, pos: Point3<i32>, first: BlockSide, second: BlockSide) -> LightWord {
        (**self).get_diagonal(pos, first, second)
    }
}

/// A sparse light snapshot keyed by block position.
///
/// Positions that were never written read as [`SparseLightCache::fallback`],
/// which defaults to the unlit sentinel.
#[derive(Clone, Debug, Default)]
pub struct SparseLightCache {
    words: HashMap<Point3<i32>, LightWord>,
    fallback: LightWord,
}

impl SparseLightCache {
    /// Creates an empty snapshot whose missing entries read as unlit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty snapshot whose missing entries read as `fallback`.
    pub fn with_fallback(fallback: LightWord) -> Self {
        Self {
            words: HashMap::new(),
            fallback,
        }
    }

    /// Stores the word for `pos`, replacing any previous value.
    pub fn insert(&mut self, pos: Point3<i32>, word: LightWord) {
        self.words.insert(pos, word);
    }

    /// The value returned for positions with no stored word.
    pub fn fallback(&self) -> LightWord {
        self.fallback
    }

    /// Number of stored words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether no words are stored.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl LightDataAccess for SparseLightCache {
    fn get(&self, pos: Point3<i32>) -> LightWord {
        self.words.get(&pos).copied().unwrap_or(self.fallback)
    }
}
