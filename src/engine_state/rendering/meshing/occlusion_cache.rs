//! # Occlusion Cache Module
//!
//! Decides whether the face between a block and its neighbor needs to be
//! meshed. Most faces are settled by cheap block-state checks; the remaining
//! shape comparisons are memoized in a bounded LRU cache, since the same few
//! shape pairs (slabs against stairs, fences against walls) repeat all over a
//! chunk.

use std::num::NonZeroUsize;

use cgmath::Point3;
use log::trace;
use lru::LruCache;

use crate::engine_state::voxels::block::{
    block_side::BlockSide, culling_shape::CullingShape, BlockState, BlockView,
};

/// Default number of memoized shape comparisons.
pub const DEFAULT_OCCLUSION_CACHE_CAPACITY: usize = 512;

/// An ordered pair of culling shapes.
///
/// The comparison is asymmetric ("does `self_shape` stick out past `other`"),
/// so `(a, b)` and `(b, a)` are separate entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ShapeComparison<S> {
    self_shape: S,
    other_shape: S,
}

/// Memoizes face visibility decisions for one mesh-build worker.
///
/// # Type Parameters
/// - `S`: The culling shape type of the world's block states
pub struct BlockOcclusionCache<S: CullingShape> {
    comparisons: LruCache<ShapeComparison<S>, bool>,
}

impl<S: CullingShape> BlockOcclusionCache<S> {
    /// Creates a cache holding up to 512 shape comparisons.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_OCCLUSION_CACHE_CAPACITY)
    }

    /// Creates a cache holding up to `capacity` shape comparisons (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            comparisons: LruCache::new(capacity),
        }
    }

    /// Returns whether the face of the block at `pos` on `side` must be drawn.
    ///
    /// # Arguments
    /// * `self_state` - The state of the block at `pos`
    /// * `view` - The world view the state was read from
    /// * `pos` - Position of the block whose face is tested
    /// * `side` - The face being tested
    ///
    /// # Returns
    /// `false` only if the neighbor across `side` hides the face completely.
    pub fn should_draw_side<V>(
        &mut self,
        self_state: &V::State,
        view: &V,
        pos: Point3<i32>,
        side: BlockSide,
    ) -> bool
    where
        V: BlockView + ?Sized,
        V::State: BlockState<V, Shape = S>,
    {
        let other_pos = side.step(pos);
        let other_state = view.block_state(other_pos);

        if self_state.is_side_invisible(&other_state, side) {
            return false;
        }

        if !other_state.is_opaque() {
            return true;
        }

        let self_shape = self_state.culling_face(view, pos, side);
        if self_shape.is_empty() {
            return true;
        }

        let other_shape = other_state.culling_face(view, other_pos, side.opposite());
        if other_shape.is_empty() {
            return true;
        }

        if self_shape.is_full_cube() && other_shape.is_full_cube() {
            return false;
        }

        self.lookup(self_shape, other_shape)
    }

    fn lookup(&mut self, self_shape: S, other_shape: S) -> bool {
        let comparison = ShapeComparison {
            self_shape,
            other_shape,
        };

        if let Some(&result) = self.comparisons.get(&comparison) {
            return result;
        }

        let result = comparison.self_shape.protrudes_past(&comparison.other_shape);

        if self.comparisons.push(comparison, result).is_some() {
            trace!("Occlusion cache full, evicted least recently used comparison");
        }

        result
    }

    /// Number of memoized comparisons.
    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    /// Whether no comparison has been memoized yet.
    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// Maximum number of memoized comparisons.
    pub fn capacity(&self) -> usize {
        self.comparisons.cap().get()
    }

    /// Whether the comparison of `self_shape` against `other_shape` is memoized.
    ///
    /// Does not change the recency order.
    pub fn contains(&self, self_shape: &S, other_shape: &S) -> bool {
        self.comparisons.contains(&ShapeComparison {
            self_shape: self_shape.clone(),
            other_shape: other_shape.clone(),
        })
    }

    /// Drops all memoized comparisons.
    pub fn clear(&mut self) {
        self.comparisons.clear();
    }
}

impl<S: CullingShape> Default for BlockOcclusionCache<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::engine_state::voxels::block::culling_shape::FaceShape;

    /// A block in the test world, with the same culling face on every side.
    #[derive(Clone, Debug)]
    struct TestBlock {
        material: &'static str,
        opaque: bool,
        transparent_group: bool,
        face: FaceShape,
    }

    impl TestBlock {
        fn air() -> Self {
            TestBlock {
                material: "air",
                opaque: false,
                transparent_group: false,
                face: FaceShape::empty(),
            }
        }

        fn solid(material: &'static str, face: FaceShape) -> Self {
            TestBlock {
                material,
                opaque: true,
                transparent_group: false,
                face,
            }
        }

        fn glass() -> Self {
            TestBlock {
                material: "glass",
                opaque: false,
                transparent_group: true,
                face: FaceShape::full_cube(),
            }
        }
    }

    impl BlockState<TestWorld> for TestBlock {
        type Shape = FaceShape;

        fn is_side_invisible(&self, other: &Self, _side: BlockSide) -> bool {
            self.transparent_group && other.transparent_group && self.material == other.material
        }

        fn is_opaque(&self) -> bool {
            self.opaque
        }

        fn culling_face(&self, _view: &TestWorld, _pos: Point3<i32>, _side: BlockSide) -> FaceShape {
            self.face.clone()
        }
    }

    #[derive(Default)]
    struct TestWorld {
        blocks: HashMap<Point3<i32>, TestBlock>,
    }

    impl BlockView for TestWorld {
        type State = TestBlock;

        fn block_state(&self, pos: Point3<i32>) -> TestBlock {
            self.blocks.get(&pos).cloned().unwrap_or_else(TestBlock::air)
        }
    }

    fn pair(block: TestBlock, neighbor: TestBlock) -> (TestWorld, TestBlock) {
        let mut world = TestWorld::default();
        world.blocks.insert(Point3::new(0, 0, 0), block.clone());
        world.blocks.insert(Point3::new(0, 1, 0), neighbor);
        (world, block)
    }

    #[test]
    fn full_cubes_hide_each_other_without_caching() {
        let stone = TestBlock::solid("stone", FaceShape::full_cube());
        let (world, state) = pair(stone.clone(), stone);
        let mut cache = BlockOcclusionCache::new();

        assert!(!cache.should_draw_side(&state, &world, Point3::new(0, 0, 0), BlockSide::UP));
        assert!(cache.is_empty());
    }

    #[test]
    fn cheap_checks_short_circuit() {
        let mut cache = BlockOcclusionCache::new();
        let origin = Point3::new(0, 0, 0);

        let (world, state) = pair(TestBlock::glass(), TestBlock::glass());
        assert!(!cache.should_draw_side(&state, &world, origin, BlockSide::UP));

        let (world, state) = pair(TestBlock::solid("stone", FaceShape::full_cube()), TestBlock::air());
        assert!(cache.should_draw_side(&state, &world, origin, BlockSide::UP));

        let (world, state) = pair(
            TestBlock::solid("torch", FaceShape::empty()),
            TestBlock::solid("stone", FaceShape::full_cube()),
        );
        assert!(cache.should_draw_side(&state, &world, origin, BlockSide::UP));

        let (world, state) = pair(
            TestBlock::solid("stone", FaceShape::full_cube()),
            TestBlock::solid("barrier", FaceShape::empty()),
        );
        assert!(cache.should_draw_side(&state, &world, origin, BlockSide::UP));

        assert!(cache.is_empty());
    }

    #[test]
    fn partial_shapes_are_compared_in_order() {
        let slab = FaceShape::from_rect(0, 0, 16, 8);
        let full = FaceShape::full_cube();
        let mut cache = BlockOcclusionCache::new();
        let origin = Point3::new(0, 0, 0);

        // A slab face behind a full face is hidden.
        let (world, state) = pair(
            TestBlock::solid("slab", slab.clone()),
            TestBlock::solid("stone", full.clone()),
        );
        assert!(!cache.should_draw_side(&state, &world, origin, BlockSide::UP));

        // A full face behind a slab face sticks out.
        let (world, state) = pair(
            TestBlock::solid("stone", full.clone()),
            TestBlock::solid("slab", slab.clone()),
        );
        assert!(cache.should_draw_side(&state, &world, origin, BlockSide::UP));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&slab, &full));
        assert!(cache.contains(&full, &slab));
    }

    /// The `i`-th of 768 distinct shape pairs.
    fn distinct_pair(i: usize) -> (FaceShape, FaceShape) {
        let cell = i % 256;
        let others = [
            FaceShape::from_rect(0, 0, 16, 8),
            FaceShape::from_rect(0, 0, 8, 16),
            FaceShape::from_rect(4, 4, 12, 12),
        ];

        (
            FaceShape::from_cells([(cell % 16, cell / 16)]),
            others[i / 256].clone(),
        )
    }

    #[test]
    fn cache_is_bounded_and_evicts_least_recent() {
        let mut cache = BlockOcclusionCache::<FaceShape>::new();
        let pairs: Vec<_> = (0..513).map(distinct_pair).collect();

        for (a, b) in &pairs[..512] {
            cache.lookup(a.clone(), b.clone());
        }
        assert_eq!(cache.len(), 512);

        // Touch the oldest entry so the second oldest becomes the eviction candidate.
        cache.lookup(pairs[0].0.clone(), pairs[0].1.clone());
        cache.lookup(pairs[512].0.clone(), pairs[512].1.clone());

        assert_eq!(cache.len(), 512);
        assert!(cache.contains(&pairs[0].0, &pairs[0].1));
        assert!(!cache.contains(&pairs[1].0, &pairs[1].1));
        assert!(cache.contains(&pairs[512].0, &pairs[512].1));
    }

    #[test]
    fn cached_results_match_direct_comparison() {
        let mut cache = BlockOcclusionCache::<FaceShape>::new();
        let (cell, slab) = distinct_pair(0);
        let (high_cell, _) = distinct_pair(200);

        // Cell (0, 0) lies inside the bottom slab, cell (8, 12) does not.
        assert!(!cache.lookup(cell.clone(), slab.clone()));
        assert!(cache.lookup(high_cell.clone(), slab.clone()));
        assert!(!cache.lookup(cell, slab.clone()));
        assert!(cache.lookup(high_cell, slab));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let cache = BlockOcclusionCache::<FaceShape>::with_capacity(0);
        assert_eq!(cache.capacity(), 1);
    }
}
