//! # Block Side Module
//!
//! This module defines the six faces of a voxel block and the integer offsets
//! used to step from a block to its neighbor across each face.

use cgmath::{Point3, Vector3};

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned its ordinal, which the lighting code uses to index
/// per-face caches. The order is: [DOWN, UP, NORTH, SOUTH, WEST, EAST]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The bottom face (facing negative Y)
    DOWN = 0,

    /// The top face (facing positive Y)
    UP = 1,

    /// The north face (facing negative Z)
    NORTH = 2,

    /// The south face (facing positive Z)
    SOUTH = 3,

    /// The west face (facing negative X)
    WEST = 4,

    /// The east face (facing positive X)
    EAST = 5,
}

/// The axis a face's normal points along.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Axis {
    /// The X axis (WEST / EAST)
    X,
    /// The Y axis (DOWN / UP)
    Y,
    /// The Z axis (NORTH / SOUTH)
    Z,
}

impl BlockSide {
    /// Returns an array containing all six block faces in ordinal order.
    pub const fn all() -> [BlockSide; 6] {
        [
            BlockSide::DOWN,
            BlockSide::UP,
            BlockSide::NORTH,
            BlockSide::SOUTH,
            BlockSide::WEST,
            BlockSide::EAST,
        ]
    }

    /// Index of this face in `all()`.
    #[inline]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Returns the face pointing the other way along the same axis.
    pub const fn opposite(self) -> BlockSide {
        match self {
            BlockSide::DOWN => BlockSide::UP,
            BlockSide::UP => BlockSide::DOWN,
            BlockSide::NORTH => BlockSide::SOUTH,
            BlockSide::SOUTH => BlockSide::NORTH,
            BlockSide::WEST => BlockSide::EAST,
            BlockSide::EAST => BlockSide::WEST,
        }
    }

    /// Returns the axis this face's normal lies on.
    pub const fn axis(self) -> Axis {
        match self {
            BlockSide::DOWN | BlockSide::UP => Axis::Y,
            BlockSide::NORTH | BlockSide::SOUTH => Axis::Z,
            BlockSide::WEST | BlockSide::EAST => Axis::X,
        }
    }

    /// Whether the outward normal points along the positive axis.
    pub const fn is_positive(self) -> bool {
        matches!(self, BlockSide::UP | BlockSide::SOUTH | BlockSide::EAST)
    }

    /// Returns the unit step from a block to its neighbor across this face.
    ///
    /// # Returns
    /// The outward normal of the face as an integer vector.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::DOWN => Vector3::new(0, -1, 0),
            BlockSide::UP => Vector3::new(0, 1, 0),
            BlockSide::NORTH => Vector3::new(0, 0, -1),
            BlockSide::SOUTH => Vector3::new(0, 0, 1),
            BlockSide::WEST => Vector3::new(-1, 0, 0),
            BlockSide::EAST => Vector3::new(1, 0, 0),
        }
    }

    /// Returns `pos` stepped one block across this face.
    #[inline]
    pub fn step(self, pos: Point3<i32>) -> Point3<i32> {
        pos + self.offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_faces_cancel_out() {
        for side in BlockSide::all() {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.offset() + side.opposite().offset(), Vector3::new(0, 0, 0));
            assert_eq!(side.axis(), side.opposite().axis());
            assert_ne!(side.is_positive(), side.opposite().is_positive());
        }
    }

    #[test]
    fn ordinals_follow_all() {
        for (i, side) in BlockSide::all().into_iter().enumerate() {
            assert_eq!(side.ordinal(), i);
        }
    }
}
