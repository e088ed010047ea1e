//! # Index Buffer Module
//!
//! Every chunk mesh is a list of quads, and every quad is drawn as the same
//! two triangles. Instead of storing indices per mesh, one shared buffer holds
//! the repeating pattern `{0, 1, 2, 2, 3, 0}` (offset by 4 per quad) and grows
//! on demand to cover the largest mesh drawn so far.
//!
//! ## Performance Considerations
//!
//! * Growth at least doubles the capacity, so regenerating the whole pattern
//!   on every growth is amortized
//! * The pattern is written straight into mapped memory, without a staging copy

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine_state::buffer_state::{BufferUsageHint, CommandList, MapFlags};

/// Indices emitted per quad.
pub const ELEMENTS_PER_PRIMITIVE: usize = 6;

/// Vertices consumed per quad.
pub const VERTICES_PER_PRIMITIVE: usize = 4;

/// Default number of extra quads reserved whenever the buffer grows.
pub const DEFAULT_GROWTH_SLACK: usize = 16384;

/// Errors raised by [`SharedQuadIndexBuffer`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexBufferError {
    /// More indices were requested than the index type can address.
    ///
    /// This is not retryable: the caller must split the work across several
    /// draws or buffers.
    #[error("requested {requested} indices, but {index_type:?} index buffers hold at most {max}")]
    CapacityExceeded {
        /// Number of indices requested.
        requested: usize,
        /// Maximum number of indices for the index type.
        max: usize,
        /// The index type of the buffer.
        index_type: IndexType,
    },
}

/// Width of the indices stored in a [`SharedQuadIndexBuffer`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    /// 16-bit indices, addressing at most 65536 vertices.
    #[default]
    Short,
    /// 32-bit indices.
    Integer,
}

impl IndexType {
    /// Size of one index in bytes.
    pub const fn bytes_per_element(self) -> usize {
        match self {
            IndexType::Short => 2,
            IndexType::Integer => 4,
        }
    }

    /// Maximum number of indices a buffer of this type can be asked for.
    pub const fn max_element_count(self) -> usize {
        match self {
            IndexType::Short => 64 * 1024,
            IndexType::Integer => i32::MAX as usize,
        }
    }

    /// Maximum number of quads a buffer of this type can cover.
    pub const fn max_primitive_count(self) -> usize {
        self.max_element_count() / VERTICES_PER_PRIMITIVE
    }

    /// The matching `wgpu` index format.
    pub const fn format(self) -> wgpu::IndexFormat {
        match self {
            IndexType::Short => wgpu::IndexFormat::Uint16,
            IndexType::Integer => wgpu::IndexFormat::Uint32,
        }
    }

    /// Writes the quad pattern for `primitive_count` quads into `region`.
    ///
    /// # Arguments
    /// * `region` - Destination bytes; at least `primitive_count` quads long
    /// * `primitive_count` - Number of quads to write
    pub fn write_pattern(self, region: &mut [u8], primitive_count: usize) {
        let stride = ELEMENTS_PER_PRIMITIVE * self.bytes_per_element();

        for (primitive, chunk) in region
            .chunks_exact_mut(stride)
            .take(primitive_count)
            .enumerate()
        {
            let base = (primitive * VERTICES_PER_PRIMITIVE) as u32;
            let indices = [base, base + 1, base + 2, base + 2, base + 3, base];

            match self {
                IndexType::Short => {
                    chunk.copy_from_slice(bytemuck::cast_slice(&indices.map(|index| index as u16)))
                }
                IndexType::Integer => chunk.copy_from_slice(bytemuck::cast_slice(&indices)),
            }
        }
    }
}

/// A growable index buffer shared by every quad mesh of one worker.
///
/// # Type Parameters
/// - `C`: The command list backend owning the buffer
///
/// # Examples
///
/// ```
/// use voxel_mesh_core::{HostCommandList, IndexType, SharedQuadIndexBuffer};
///
/// let mut commands = HostCommandList::new();
/// let mut indices = SharedQuadIndexBuffer::new(&mut commands, IndexType::Short);
///
/// indices.ensure_capacity(&mut commands, 24).unwrap();
/// assert!(indices.max_primitives() >= 4);
/// ```
pub struct SharedQuadIndexBuffer<C: CommandList> {
    buffer: C::Buffer,
    index_type: IndexType,
    max_primitives: usize,
    growth_slack: usize,
}

impl<C: CommandList> SharedQuadIndexBuffer<C> {
    /// Creates an empty index buffer.
    pub fn new(commands: &mut C, index_type: IndexType) -> Self {
        Self::with_growth_slack(commands, index_type, DEFAULT_GROWTH_SLACK)
    }

    /// Creates an empty index buffer that reserves `growth_slack` extra quads on growth.
    pub fn with_growth_slack(commands: &mut C, index_type: IndexType, growth_slack: usize) -> Self {
        Self {
            buffer: commands.create_buffer("Shared Quad Index Buffer"),
            index_type,
            max_primitives: 0,
            growth_slack,
        }
    }

    /// Makes sure the buffer holds at least `element_count` indices.
    ///
    /// # Arguments
    /// * `commands` - The command list owning the buffer
    /// * `element_count` - Number of indices the next draw will read
    ///
    /// # Returns
    /// An error if the index type cannot address that many indices. Requests
    /// within the current capacity leave the buffer untouched.
    pub fn ensure_capacity(&mut self, commands: &mut C, element_count: usize) -> Result<(), IndexBufferError> {
        let max = self.index_type.max_element_count();
        if element_count > max {
            return Err(IndexBufferError::CapacityExceeded {
                requested: element_count,
                max,
                index_type: self.index_type,
            });
        }

        let primitive_count = element_count / ELEMENTS_PER_PRIMITIVE;

        if primitive_count > self.max_primitives {
            self.grow(commands, self.next_size(primitive_count));
        }

        Ok(())
    }

    fn next_size(&self, primitive_count: usize) -> usize {
        (self.max_primitives * 2)
            .max(primitive_count.saturating_add(self.growth_slack))
            .min(self.index_type.max_primitive_count())
    }

    fn grow(&mut self, commands: &mut C, primitive_count: usize) {
        let index_type = self.index_type;
        let buffer_size = (primitive_count * ELEMENTS_PER_PRIMITIVE * index_type.bytes_per_element()) as u64;

        debug!(
            "Growing shared index buffer from {} to {} quads ({} bytes, {:?})",
            self.max_primitives, primitive_count, buffer_size, index_type
        );

        commands.allocate_storage(&mut self.buffer, buffer_size, BufferUsageHint::StaticDraw);
        commands.map_buffer_range(
            &mut self.buffer,
            0,
            buffer_size,
            MapFlags::INVALIDATE_BUFFER | MapFlags::WRITE | MapFlags::UNSYNCHRONIZED,
            |region| index_type.write_pattern(region, primitive_count),
        );

        self.max_primitives = primitive_count;
    }

    /// The backing buffer.
    pub fn buffer(&self) -> &C::Buffer {
        &self.buffer
    }

    /// The width of the stored indices.
    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    /// The `wgpu` index format to draw with.
    pub fn index_format(&self) -> wgpu::IndexFormat {
        self.index_type.format()
    }

    /// Number of quads the buffer currently covers.
    pub fn max_primitives(&self) -> usize {
        self.max_primitives
    }

    /// Releases the backing buffer.
    pub fn delete(self, commands: &mut C) {
        commands.delete_buffer(self.buffer);
    }
}
