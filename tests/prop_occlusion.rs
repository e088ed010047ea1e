use cgmath::Point3;
use proptest::prelude::*;
use voxel_mesh_core::{
    BlockOcclusionCache, BlockSide, BlockState, BlockView, CullingShape, FaceShape,
};

/// A solid block presenting the same shape on every face.
#[derive(Clone, Debug)]
struct Solid(FaceShape);

impl BlockState<Column> for Solid {
    type Shape = FaceShape;

    fn is_side_invisible(&self, _other: &Self, _side: BlockSide) -> bool {
        false
    }

    fn is_opaque(&self) -> bool {
        true
    }

    fn culling_face(&self, _view: &Column, _pos: Point3<i32>, _side: BlockSide) -> FaceShape {
        self.0.clone()
    }
}

/// Two stacked blocks: `lower` at the origin, `upper` above it.
struct Column {
    lower: Solid,
    upper: Solid,
}

impl BlockView for Column {
    type State = Solid;

    fn block_state(&self, pos: Point3<i32>) -> Solid {
        if pos.y > 0 {
            self.upper.clone()
        } else {
            self.lower.clone()
        }
    }
}

fn arb_shape() -> impl Strategy<Value = FaceShape> {
    prop_oneof![
        1 => Just(FaceShape::full_cube()),
        1 => Just(FaceShape::empty()),
        8 => (0usize..=16, 0usize..=16, 0usize..=16, 0usize..=16)
            .prop_map(|(u0, v0, u1, v1)| FaceShape::from_rect(u0.min(u1), v0.min(v1), u0.max(u1), v0.max(v1))),
    ]
}

proptest! {
    // Cached answers match the direct comparison and the cache never exceeds its capacity
    #[test]
    fn cached_decisions_match_direct_comparison(
        capacity in 1usize..16,
        pairs in prop::collection::vec((arb_shape(), arb_shape()), 1..64),
    ) {
        let mut cache = BlockOcclusionCache::with_capacity(capacity);

        for (lower, upper) in pairs {
            let expected = if lower.is_empty() || upper.is_empty() {
                true
            } else if lower.is_full_cube() && upper.is_full_cube() {
                false
            } else {
                lower.protrudes_past(&upper)
            };

            let column = Column { lower: Solid(lower), upper: Solid(upper) };
            let state = column.lower.clone();
            let draw = cache.should_draw_side(&state, &column, Point3::new(0, 0, 0), BlockSide::UP);

            prop_assert_eq!(draw, expected);
            prop_assert!(cache.len() <= capacity);
        }
    }

    // Asking twice gives the same answer and does not grow the cache
    #[test]
    fn repeated_queries_hit(lower in arb_shape(), upper in arb_shape()) {
        let column = Column { lower: Solid(lower), upper: Solid(upper) };
        let state = column.lower.clone();
        let mut cache = BlockOcclusionCache::new();

        let first = cache.should_draw_side(&state, &column, Point3::new(0, 0, 0), BlockSide::UP);
        let size = cache.len();
        let second = cache.should_draw_side(&state, &column, Point3::new(0, 0, 0), BlockSide::UP);

        prop_assert_eq!(first, second);
        prop_assert_eq!(cache.len(), size);
        prop_assert!(size <= 1);
    }
}
