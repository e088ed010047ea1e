use cgmath::Point3;
use proptest::prelude::*;
use voxel_mesh_core::{
    combine_corner, AoFaceData, AoNeighborInfo, BlockSide, LightWord, SparseLightCache,
    MAX_LIGHT_COORDINATE,
};

const NO_EMISSION: [bool; 4] = [false; 4];

fn arb_side() -> impl Strategy<Value = BlockSide> {
    (0usize..6).prop_map(|i| BlockSide::all()[i])
}

/// Any lightmap word, including the unlit sentinel.
fn arb_lightmap() -> impl Strategy<Value = u32> {
    (any::<u8>(), any::<u8>()).prop_map(|(block, sky)| LightWord::new(block, sky).lightmap())
}

/// A lightmap word that is never the unlit sentinel.
fn arb_lit_lightmap() -> impl Strategy<Value = u32> {
    (1u8..=255, any::<u8>()).prop_map(|(block, sky)| LightWord::new(block, sky).lightmap())
}

proptest! {
    // Four equal inputs come back unchanged
    #[test]
    fn combine_passthrough(value in arb_lightmap()) {
        prop_assert_eq!(combine_corner([value; 4], NO_EMISSION), value);
    }

    // One unlit input is raised to the others' value before averaging
    #[test]
    fn combine_zero_bleed(value in arb_lit_lightmap(), zero_at in 0usize..4) {
        let mut inputs = [value; 4];
        inputs[zero_at] = 0;
        prop_assert_eq!(
            combine_corner(inputs, NO_EMISSION),
            combine_corner([value; 4], NO_EMISSION)
        );
    }

    // An emissive input contributes the maximum coordinate whatever its value
    #[test]
    fn combine_emissive_override(
        inputs in prop::array::uniform4(arb_lit_lightmap()),
        emissive_at in 0usize..4,
    ) {
        let mut emission = NO_EMISSION;
        emission[emissive_at] = true;

        let mut replaced = inputs;
        replaced[emissive_at] = MAX_LIGHT_COORDINATE;

        prop_assert_eq!(
            combine_corner(inputs, emission),
            combine_corner(replaced, NO_EMISSION)
        );
    }

    // Each channel of the result lies within the channel's input range
    #[test]
    fn combine_channels_stay_in_range(inputs in prop::array::uniform4(arb_lit_lightmap())) {
        let result = combine_corner(inputs, NO_EMISSION);

        for shift in [0, 16] {
            let channel = |value: u32| (value >> shift) & 0xFF;
            let min = inputs.iter().copied().map(channel).min().unwrap();
            let max = inputs.iter().copied().map(channel).max().unwrap();
            prop_assert!(channel(result) >= min && channel(result) <= max);
        }
    }

    // Uniform light blends to itself at any point of any face
    #[test]
    fn uniform_light_blends_to_itself(
        block in any::<u8>(),
        sky in any::<u8>(),
        side in arb_side(),
        x in 0.0f32..=1.0,
        y in 0.0f32..=1.0,
        z in 0.0f32..=1.0,
    ) {
        let light = SparseLightCache::with_fallback(LightWord::new(block, sky).with_ao(1.0));
        let mut face = AoFaceData::default();
        face.init_light_data(&light, Point3::new(7, -3, 12), side, true);
        face.unpack_light_data();

        let weights = AoNeighborInfo::get(side).corner_weights(x, y, z);
        prop_assert!((weights.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        prop_assert!((face.blended_block_light(&weights) - block as f32).abs() < 1e-3);
        prop_assert!((face.blended_sky_light(&weights) - sky as f32).abs() < 1e-3);
        prop_assert!((face.blended_shade(&weights) - 1.0).abs() < 1e-5);
    }
}
