//! Cached light and ambient occlusion for the four corners of one block face.

use cgmath::Point3;

use super::{
    data::{LightDataAccess, LightWord, LIGHTMAP_MASK, MAX_LIGHT_COORDINATE},
    neighbor_info::AoNeighborInfo,
};
use crate::engine_state::voxels::block::block_side::BlockSide;

const HAS_LIGHT_DATA: u8 = 0b01;
const HAS_UNPACKED_LIGHT_DATA: u8 = 0b10;

/// Light and occlusion for the four corners of one face of one block.
///
/// The data is computed lazily: [`AoFaceData::init_light_data`] fills the
/// packed lightmap words and occlusion factors, [`AoFaceData::unpack_light_data`]
/// splits the words into float channels for blending. Both stay valid until
/// [`AoFaceData::reset`] is called for the next block position.
#[derive(Clone, Debug, Default)]
pub struct AoFaceData {
    pub(crate) lm: [u32; 4],
    pub(crate) ao: [f32; 4],
    bl: [f32; 4],
    sl: [f32; 4],
    flags: u8,
}

/// A neighbor's contribution to a corner.
#[derive(Copy, Clone)]
struct Sample {
    lm: u32,
    ao: f32,
    em: bool,
}

impl Sample {
    fn of(word: LightWord) -> Self {
        Sample {
            lm: word.lightmap(),
            ao: word.ao(),
            em: word.emissive(),
        }
    }
}

impl AoFaceData {
    /// Computes corner light and occlusion for a face.
    ///
    /// # Arguments
    /// * `light` - The light snapshot of the current build
    /// * `pos` - The block whose face is being lit
    /// * `side` - The face direction
    /// * `offset` - Sample around the neighbor across `side` instead of around `pos`
    pub fn init_light_data<L: LightDataAccess + ?Sized>(
        &mut self,
        light: &L,
        pos: Point3<i32>,
        side: BlockSide,
        offset: bool,
    ) {
        let adj = if offset { side.step(pos) } else { pos };
        let adj_word = light.get(adj);

        // Light cannot pass through a fully opaque neighbor, so its own face
        // is lit with the origin block's value instead.
        let center = if offset && adj_word.full_opaque() {
            let origin_word = light.get(pos);
            Sample {
                lm: origin_word.lightmap(),
                ao: adj_word.ao(),
                em: origin_word.emissive(),
            }
        } else {
            Sample::of(adj_word)
        };

        let faces = AoNeighborInfo::get(side).faces;

        let edge_words = faces.map(|face| light.get_offset(adj, face));
        let edges = edge_words.map(Sample::of);
        let opaque = edge_words.map(LightWord::opaque);

        let diagonal = |a: usize, b: usize, edge: usize| {
            if opaque[a] && opaque[b] {
                edges[edge]
            } else {
                Sample::of(light.get_diagonal(adj, faces[a], faces[b]))
            }
        };

        let c0 = diagonal(3, 0, 0);
        let c1 = diagonal(2, 0, 0);
        let c2 = diagonal(2, 1, 1);
        let c3 = diagonal(3, 1, 1);

        let corners = [
            (edges[3], edges[0], c0),
            (edges[2], edges[0], c1),
            (edges[2], edges[1], c2),
            (edges[3], edges[1], c3),
        ];

        for (i, (a, b, c)) in corners.into_iter().enumerate() {
            self.ao[i] = (a.ao + b.ao + c.ao + center.ao) * 0.25;
            self.lm[i] = combine_corner(
                [a.lm, b.lm, c.lm, center.lm],
                [a.em, b.em, c.em, center.em],
            );
        }

        self.flags |= HAS_LIGHT_DATA;
    }

    /// Splits the packed corner words into block and sky light channels.
    pub fn unpack_light_data(&mut self) {
        for i in 0..4 {
            self.bl[i] = (self.lm[i] & 0xFF) as f32;
            self.sl[i] = ((self.lm[i] >> 16) & 0xFF) as f32;
        }

        self.flags |= HAS_UNPACKED_LIGHT_DATA;
    }

    /// Weighted sum of the corner sky light values.
    pub fn blended_sky_light(&self, weights: &[f32; 4]) -> f32 {
        weighted_sum(&self.sl, weights)
    }

    /// Weighted sum of the corner block light values.
    pub fn blended_block_light(&self, weights: &[f32; 4]) -> f32 {
        weighted_sum(&self.bl, weights)
    }

    /// Weighted sum of the corner occlusion factors.
    pub fn blended_shade(&self, weights: &[f32; 4]) -> f32 {
        weighted_sum(&self.ao, weights)
    }

    /// Whether [`AoFaceData::init_light_data`] has run since the last reset.
    #[inline]
    pub fn has_light_data(&self) -> bool {
        self.flags & HAS_LIGHT_DATA != 0
    }

    /// Whether [`AoFaceData::unpack_light_data`] has run since the last reset.
    #[inline]
    pub fn has_unpacked_light_data(&self) -> bool {
        self.flags & HAS_UNPACKED_LIGHT_DATA != 0
    }

    /// Marks the cached data stale.
    #[inline]
    pub fn reset(&mut self) {
        self.flags = 0;
    }

    /// The packed lightmap word of each corner.
    pub fn corner_lightmaps(&self) -> &[u32; 4] {
        &self.lm
    }

    /// The occlusion factor of each corner.
    pub fn corner_shade(&self) -> &[f32; 4] {
        &self.ao
    }
}

fn weighted_sum(values: &[f32; 4], weights: &[f32; 4]) -> f32 {
    values[0] * weights[0] + values[1] * weights[1] + values[2] * weights[2] + values[3] * weights[3]
}

/// Averages four lightmap words into one corner value.
///
/// Unlit inputs are raised to the dimmest lit input so that a single dark
/// neighbor does not bleed black into a lit corner, and emissive inputs count
/// as full brightness. The average is taken over the packed words: each
/// channel sums to at most 10 bits, so the shift never carries between them.
///
/// # Arguments
/// * `lm` - Lightmap words of the two edges, the diagonal and the center
/// * `em` - Emissive flag of each input
pub fn combine_corner(lm: [u32; 4], em: [bool; 4]) -> u32 {
    let mut lm = lm.map(|value| value & LIGHTMAP_MASK);

    if lm.contains(&0) {
        let min = lm.iter().copied().fold(0, min_non_zero);
        for value in lm.iter_mut() {
            *value = (*value).max(min);
        }
    }

    for (value, emissive) in lm.iter_mut().zip(em) {
        if emissive {
            *value = MAX_LIGHT_COORDINATE;
        }
    }

    ((lm[0] + lm[1] + lm[2] + lm[3]) >> 2) & LIGHTMAP_MASK
}

fn min_non_zero(a: u32, b: u32) -> u32 {
    match (a, b) {
        (0, b) => b,
        (a, 0) => a,
        (a, b) => a.min(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::light::data::SparseLightCache;

    const NO_EMISSION: [bool; 4] = [false; 4];

    #[test]
    fn combine_passes_equal_inputs_through() {
        let value = LightWord::new(200, 37).lightmap();
        assert_eq!(combine_corner([value; 4], NO_EMISSION), value);
    }

    #[test]
    fn combine_averages_channels_separately() {
        let a = LightWord::new(240, 0).lightmap();
        let b = LightWord::new(0, 240).lightmap();
        let lit = LightWord::new(16, 16).lightmap();

        // The zero channels are not the sentinel; only whole zero words are.
        let result = combine_corner([a, b, lit, lit], NO_EMISSION);
        assert_eq!(result & 0xFF, (240 + 16 + 16) / 4);
        assert_eq!(result >> 16, (240 + 16 + 16) / 4);
    }

    #[test]
    fn combine_raises_unlit_inputs() {
        let value = LightWord::new(120, 60).lightmap();
        let expected = combine_corner([value; 4], NO_EMISSION);

        assert_eq!(combine_corner([0, value, value, value], NO_EMISSION), expected);
        assert_eq!(combine_corner([value, value, 0, value], NO_EMISSION), expected);
    }

    #[test]
    fn combine_all_unlit_stays_unlit() {
        assert_eq!(combine_corner([0; 4], NO_EMISSION), 0);
    }

    #[test]
    fn emissive_inputs_count_as_full_brightness() {
        let dim = LightWord::new(16, 16).lightmap();
        let plain = combine_corner([dim; 4], NO_EMISSION);
        let lit = combine_corner([dim; 4], [false, true, false, false]);

        assert!(lit > plain);
        assert_eq!(
            lit,
            combine_corner([dim, MAX_LIGHT_COORDINATE, dim, dim], NO_EMISSION)
        );
    }

    fn flat_world(word: LightWord) -> SparseLightCache {
        SparseLightCache::with_fallback(word)
    }

    #[test]
    fn uniform_light_produces_uniform_corners() {
        let word = LightWord::new(144, 240).with_ao(1.0);
        let light = flat_world(word);
        let mut face = AoFaceData::default();

        face.init_light_data(&light, Point3::new(0, 64, 0), BlockSide::UP, true);
        face.unpack_light_data();

        assert!(face.has_light_data());
        assert!(face.has_unpacked_light_data());
        assert_eq!(face.corner_lightmaps(), &[word.lightmap(); 4]);
        assert_eq!(face.corner_shade(), &[1.0; 4]);
        assert_eq!(face.blended_block_light(&[0.25; 4]), 144.0);
        assert_eq!(face.blended_sky_light(&[0.25; 4]), 240.0);

        face.reset();
        assert!(!face.has_light_data());
        assert!(!face.has_unpacked_light_data());
    }

    #[test]
    fn fully_opaque_neighbor_uses_origin_light() {
        let origin = Point3::new(0, 0, 0);
        let mut light = flat_world(LightWord::new(32, 32).with_ao(1.0));
        light.insert(origin, LightWord::new(200, 200).with_ao(1.0));
        light.insert(
            Point3::new(0, 1, 0),
            LightWord::new(0, 0).with_ao(0.2).with_full_opaque(true),
        );

        let mut face = AoFaceData::default();
        face.init_light_data(&light, origin, BlockSide::UP, true);

        // Center takes the origin's light (200) but the neighbor's occlusion.
        let expected_lm = combine_corner(
            [
                LightWord::new(32, 32).lightmap(),
                LightWord::new(32, 32).lightmap(),
                LightWord::new(32, 32).lightmap(),
                LightWord::new(200, 200).lightmap(),
            ],
            NO_EMISSION,
        );
        assert_eq!(face.corner_lightmaps(), &[expected_lm; 4]);

        let ao = LightWord::UNLIT.with_ao(0.2).ao();
        let expected_ao = (1.0 + 1.0 + 1.0 + ao) * 0.25;
        for value in face.corner_shade() {
            assert!((value - expected_ao).abs() < 1e-6);
        }
    }

    #[test]
    fn opaque_edges_hide_the_diagonal() {
        let pos = Point3::new(0, 0, 0);
        let above = Point3::new(0, 1, 0);
        let bright = LightWord::new(240, 240).with_ao(1.0);
        let mut light = flat_world(LightWord::new(64, 64).with_ao(1.0));

        // UP faces are [EAST, WEST, NORTH, SOUTH]; corner 1 sits between
        // faces[2] (NORTH) and faces[0] (EAST).
        let east = BlockSide::EAST.step(above);
        let north = BlockSide::NORTH.step(above);
        let wall = LightWord::new(64, 64).with_ao(0.0).with_opaque(true);
        light.insert(east, wall);
        light.insert(north, wall);
        light.insert(BlockSide::NORTH.step(east), bright);

        let mut face = AoFaceData::default();
        face.init_light_data(&light, pos, BlockSide::UP, true);

        // The bright diagonal is never sampled: corner 1 uses the EAST edge twice.
        let expected = (0.0 + 0.0 + 0.0 + 1.0) * 0.25;
        assert!((face.corner_shade()[1] - expected).abs() < 1e-6);
        assert_eq!(face.corner_lightmaps()[1], LightWord::new(64, 64).lightmap());
    }
}
