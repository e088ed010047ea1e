//! # Block Module
//!
//! Read-only views of block state used by face culling: the faces of a block,
//! the culling shape of each face, and the traits through which the mesher's
//! world snapshot is queried.

use cgmath::Point3;

pub mod block_side;
pub mod culling_shape;

use block_side::BlockSide;
use culling_shape::CullingShape;

/// A read-only view over the blocks visible to one mesh build.
pub trait BlockView {
    /// The block state type stored in this view.
    type State: BlockState<Self>;

    /// Returns the state of the block at `pos`.
    fn block_state(&self, pos: Point3<i32>) -> Self::State;
}

/// The culling-related properties of a block state.
///
/// # Type Parameters
/// - `V`: The view the state was read from, passed back when a culling face
///   depends on neighboring blocks
pub trait BlockState<V: ?Sized> {
    /// The culling shape type returned by [`BlockState::culling_face`].
    type Shape: CullingShape;

    /// Whether the face towards `other` is never visible (e.g. two panes of the same glass).
    fn is_side_invisible(&self, other: &Self, side: BlockSide) -> bool;

    /// Whether the block fully blocks light and vision.
    fn is_opaque(&self) -> bool;

    /// Returns the shape this block presents on `side`.
    fn culling_face(&self, view: &V, pos: Point3<i32>, side: BlockSide) -> Self::Shape;
}
