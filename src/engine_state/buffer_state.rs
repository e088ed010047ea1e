//! # Buffer State Module
//!
//! This module defines the narrow GPU buffer contract used by the mesher and
//! two backends implementing it.
//!
//! ## Key Features
//!
//! * A [`CommandList`] trait covering buffer creation, storage allocation,
//!   scoped range mapping and deletion
//! * [`WgpuCommandList`], backed by a `wgpu` device and queue
//! * [`HostCommandList`], an in-memory backend that records every command,
//!   used by tests and headless runs
//!
//! ## Architecture
//!
//! Mapping is scoped: [`CommandList::map_buffer_range`] hands the writable
//! region to a closure and unmaps when the closure returns, so a buffer can
//! never be left mapped while the GPU might read it. Callers still have to
//! make sure no GPU work reads the buffer while an unsynchronized write is in
//! progress.
//!
//! ## Performance Considerations
//!
//! * Storage is allocated mapped, so the first write after an allocation goes
//!   straight into the new memory without a staging copy

use bitflags::bitflags;
use log::{trace, warn};
use wgpu::{Buffer, BufferDescriptor, BufferUsages, Device, Queue};

bitflags! {
    /// Access flags for [`CommandList::map_buffer_range`].
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct MapFlags: u32 {
        /// Previous contents of the buffer may be discarded.
        const INVALIDATE_BUFFER = 1 << 0;
        /// The region is mapped for writing.
        const WRITE = 1 << 1;
        /// The backend must not wait for pending GPU work before mapping.
        const UNSYNCHRONIZED = 1 << 2;
    }
}

/// How the contents of a buffer's storage are expected to change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BufferUsageHint {
    /// Written once, drawn many times.
    StaticDraw,
    /// Rewritten occasionally, drawn many times.
    DynamicDraw,
    /// Rewritten every frame.
    StreamDraw,
}

/// The GPU buffer operations needed by the mesher.
pub trait CommandList {
    /// Handle to a buffer created by this command list.
    type Buffer;

    /// Creates a buffer handle without storage.
    fn create_buffer(&mut self, label: &'static str) -> Self::Buffer;

    /// Replaces the buffer's storage with `size` bytes of undefined contents.
    fn allocate_storage(&mut self, buffer: &mut Self::Buffer, size: u64, usage: BufferUsageHint);

    /// Maps `length` bytes at `offset`, passes the region to `write`, then unmaps.
    ///
    /// # Arguments
    /// * `buffer` - The buffer to map; must have storage covering the range
    /// * `offset` - Byte offset of the range
    /// * `length` - Byte length of the range
    /// * `flags` - Requested access
    /// * `write` - Receives the mapped region
    ///
    /// # Returns
    /// Whatever `write` returns.
    fn map_buffer_range<R>(
        &mut self,
        buffer: &mut Self::Buffer,
        offset: u64,
        length: u64,
        flags: MapFlags,
        write: impl FnOnce(&mut [u8]) -> R,
    ) -> R;

    /// Releases the buffer and its storage.
    fn delete_buffer(&mut self, buffer: Self::Buffer);
}

/// A buffer owned by a [`WgpuCommandList`].
#[derive(Debug)]
pub struct WgpuBuffer {
    label: &'static str,
    buffer: Option<Buffer>,
    mapped: bool,
}

impl WgpuBuffer {
    /// The underlying `wgpu` buffer, if storage has been allocated.
    pub fn raw(&self) -> Option<&Buffer> {
        self.buffer.as_ref()
    }

    /// The buffer's debug label.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Whether the storage is still mapped from its allocation.
    pub fn is_mapped(&self) -> bool {
        self.mapped
    }
}

/// A [`CommandList`] recording into a `wgpu` device and queue.
///
/// # Examples
///
/// ```no_run
/// use voxel_mesh_core::{IndexType, SharedQuadIndexBuffer, WgpuCommandList};
///
/// # fn build(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<(), voxel_mesh_core::IndexBufferError> {
/// let mut commands = WgpuCommandList::new(device, queue);
/// let mut index_buffer = SharedQuadIndexBuffer::new(&mut commands, IndexType::Short);
/// index_buffer.ensure_capacity(&mut commands, 6 * 1024)?;
/// # Ok(())
/// # }
/// ```
pub struct WgpuCommandList<'a> {
    device: &'a Device,
    queue: &'a Queue,
}

impl<'a> WgpuCommandList<'a> {
    /// Creates a command list for `device` and `queue`.
    pub fn new(device: &'a Device, queue: &'a Queue) -> Self {
        Self { device, queue }
    }
}

impl CommandList for WgpuCommandList<'_> {
    type Buffer = WgpuBuffer;

    fn create_buffer(&mut self, label: &'static str) -> WgpuBuffer {
        WgpuBuffer {
            label,
            buffer: None,
            mapped: false,
        }
    }

    fn allocate_storage(&mut self, buffer: &mut WgpuBuffer, size: u64, usage: BufferUsageHint) {
        if let Some(old) = buffer.buffer.take() {
            old.destroy();
        }

        trace!("Allocating {} bytes for '{}' ({:?})", size, buffer.label, usage);

        buffer.buffer = Some(self.device.create_buffer(&BufferDescriptor {
            label: Some(buffer.label),
            size,
            usage: BufferUsages::INDEX | BufferUsages::COPY_DST,
            mapped_at_creation: true,
        }));
        buffer.mapped = true;
    }

    fn map_buffer_range<R>(
        &mut self,
        buffer: &mut WgpuBuffer,
        offset: u64,
        length: u64,
        flags: MapFlags,
        write: impl FnOnce(&mut [u8]) -> R,
    ) -> R {
        let Some(raw) = buffer.buffer.as_ref() else {
            warn!("Mapping '{}' before any storage was allocated", buffer.label);
            return write(&mut []);
        };

        if buffer.mapped {
            let result = {
                let mut view = raw.slice(offset..offset + length).get_mapped_range_mut();
                write(&mut *view)
            };
            raw.unmap();
            buffer.mapped = false;
            return result;
        }

        // Storage is only mapped right after allocation; later writes are
        // staged through the queue.
        if !flags.contains(MapFlags::INVALIDATE_BUFFER) {
            warn!(
                "'{}' is not mapped, previous contents of the range are not readable",
                buffer.label
            );
        }

        let mut staging = vec![0u8; length as usize];
        let result = write(&mut staging);
        self.queue.write_buffer(raw, offset, &staging);
        result
    }

    fn delete_buffer(&mut self, buffer: WgpuBuffer) {
        if let Some(raw) = buffer.buffer {
            raw.destroy();
        }
    }
}

/// A buffer owned by a [`HostCommandList`], stored in system memory.
#[derive(Clone, Debug)]
pub struct HostBuffer {
    label: &'static str,
    data: Vec<u8>,
    usage: Option<BufferUsageHint>,
}

impl HostBuffer {
    /// The buffer's contents.
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    /// The usage hint of the current storage, if any was allocated.
    pub fn usage(&self) -> Option<BufferUsageHint> {
        self.usage
    }

    /// The buffer's debug label.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

/// A command executed by a [`HostCommandList`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCommand {
    /// A buffer handle was created.
    CreateBuffer {
        /// Label of the buffer.
        label: &'static str,
    },
    /// Storage was (re)allocated.
    AllocateStorage {
        /// Label of the buffer.
        label: &'static str,
        /// New size in bytes.
        size: u64,
        /// Usage hint of the new storage.
        usage: BufferUsageHint,
    },
    /// A range was mapped.
    MapBufferRange {
        /// Label of the buffer.
        label: &'static str,
        /// Byte offset of the range.
        offset: u64,
        /// Byte length of the range.
        length: u64,
        /// Requested access.
        flags: MapFlags,
    },
    /// The mapped range was released.
    UnmapBuffer {
        /// Label of the buffer.
        label: &'static str,
    },
    /// A buffer was deleted.
    DeleteBuffer {
        /// Label of the buffer.
        label: &'static str,
    },
}

/// An in-memory [`CommandList`] that records the commands it executes.
#[derive(Debug, Default)]
pub struct HostCommandList {
    commands: Vec<HostCommand>,
    allocated_memory: u64,
}

impl HostCommandList {
    /// Creates an empty command list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command executed so far, in order.
    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    /// Forgets the recorded commands.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Bytes of storage currently held by live buffers.
    pub fn allocated_memory(&self) -> u64 {
        self.allocated_memory
    }
}

impl CommandList for HostCommandList {
    type Buffer = HostBuffer;

    fn create_buffer(&mut self, label: &'static str) -> HostBuffer {
        self.commands.push(HostCommand::CreateBuffer { label });

        HostBuffer {
            label,
            data: Vec::new(),
            usage: None,
        }
    }

    fn allocate_storage(&mut self, buffer: &mut HostBuffer, size: u64, usage: BufferUsageHint) {
        self.commands.push(HostCommand::AllocateStorage {
            label: buffer.label,
            size,
            usage,
        });

        self.allocated_memory = self.allocated_memory.saturating_sub(buffer.data.len() as u64) + size;

        buffer.data = vec![0; size as usize];
        buffer.usage = Some(usage);
    }

    fn map_buffer_range<R>(
        &mut self,
        buffer: &mut HostBuffer,
        offset: u64,
        length: u64,
        flags: MapFlags,
        write: impl FnOnce(&mut [u8]) -> R,
    ) -> R {
        self.commands.push(HostCommand::MapBufferRange {
            label: buffer.label,
            offset,
            length,
            flags,
        });

        let start = (offset as usize).min(buffer.data.len());
        let end = (offset + length).min(buffer.data.len() as u64) as usize;
        let result = write(&mut buffer.data[start..end]);

        self.commands.push(HostCommand::UnmapBuffer {
            label: buffer.label,
        });

        result
    }

    fn delete_buffer(&mut self, buffer: HostBuffer) {
        self.commands.push(HostCommand::DeleteBuffer {
            label: buffer.label,
        });
        self.allocated_memory = self.allocated_memory.saturating_sub(buffer.data.len() as u64);
    }
}
