use std::num::NonZeroU64;

use bytemuck::Pod;

use crate::rendering::frame_data::{PixelShaderData, VertexShaderData};

pub fn align_to(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

/// Offsets handed out by the heap during one frame.
#[derive(Debug, Clone)]
pub struct HeapCursor {
    alignment: u64,
    len: u64,
}

impl HeapCursor {
    pub fn new(alignment: u64) -> Self {
        Self {
            alignment: alignment.max(1),
            len: 0,
        }
    }

    /// Returns the aligned offset for a record of `size` bytes.
    pub fn reserve(&mut self, size: u64) -> u64 {
        let offset = align_to(self.len, self.alignment);
        self.len = offset + size;
        offset
    }

    /// Bytes used so far, including alignment gaps.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn reset(&mut self) {
        self.len = 0;
    }
}

/// Capacity to reallocate to when `required` bytes don't fit in `current`.
pub fn grown_capacity(current: u64, required: u64) -> u64 {
    if required <= current {
        current
    } else {
        required.next_power_of_two()
    }
}

/// One uniform buffer holding every draw's constants for a frame, addressed with
/// dynamic offsets.
///
/// Records are staged on the CPU and uploaded with a single write when the frame has
/// been packed, so no offset is reused before the GPU has read it.
pub struct ConstantBufferHeap {
    device: wgpu::Device,
    buffer: wgpu::Buffer,
    capacity: u64,
    staging: Vec<u8>,
    cursor: HeapCursor,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl ConstantBufferHeap {
    const MIN_CAPACITY: u64 = 1024;

    pub fn new(device: &wgpu::Device, initial_capacity: u64) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let capacity = align_to(initial_capacity.max(Self::MIN_CAPACITY), alignment);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Constant heap bind group layout"),
            entries: &[
                Self::layout_entry(0, size_of::<VertexShaderData>() as u64),
                Self::layout_entry(1, size_of::<PixelShaderData>() as u64),
            ],
        });

        let buffer = Self::create_buffer(device, capacity);
        let bind_group = Self::create_bind_group(device, &bind_group_layout, &buffer);

        Self {
            device: device.clone(),
            buffer,
            capacity,
            staging: Vec::with_capacity(capacity as usize),
            cursor: HeapCursor::new(alignment),
            bind_group_layout,
            bind_group,
        }
    }

    fn layout_entry(binding: u32, size: u64) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: NonZeroU64::new(size),
            },
            count: None,
        }
    }

    fn create_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Constant heap"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        let binding = |binding: u32, size: usize| wgpu::BindGroupEntry {
            binding,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: NonZeroU64::new(size as u64),
            }),
        };

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Constant heap bind group"),
            layout,
            entries: &[
                binding(0, size_of::<VertexShaderData>()),
                binding(1, size_of::<PixelShaderData>()),
            ],
        })
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn begin_frame(&mut self) {
        self.cursor.reset();
        self.staging.clear();
    }

    pub fn push<T: Pod>(&mut self, value: &T) -> wgpu::DynamicOffset {
        let bytes = bytemuck::bytes_of(value);
        let offset = self.cursor.reserve(bytes.len() as u64);

        self.staging.resize(offset as usize, 0);
        self.staging.extend_from_slice(bytes);

        offset as wgpu::DynamicOffset
    }

    /// Uploads everything pushed since `begin_frame`, growing the buffer first if needed.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        let used = align_to(self.cursor.len(), wgpu::COPY_BUFFER_ALIGNMENT);
        if used == 0 {
            return;
        }

        if used > self.capacity {
            let capacity = grown_capacity(self.capacity, used);
            log::info!(
                "Growing constant heap from {} to {} bytes",
                self.capacity,
                capacity
            );

            self.buffer = Self::create_buffer(&self.device, capacity);
            self.bind_group =
                Self::create_bind_group(&self.device, &self.bind_group_layout, &self.buffer);
            self.capacity = capacity;
        }

        self.staging.resize(used as usize, 0);
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_rounds_up() {
        assert_eq!(align_to(0, 256), 0);
        assert_eq!(align_to(1, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
    }

    #[test]
    fn reservations_are_aligned_and_disjoint() {
        let mut cursor = HeapCursor::new(256);

        let vertex = cursor.reserve(size_of::<VertexShaderData>() as u64);
        let pixel = cursor.reserve(size_of::<PixelShaderData>() as u64);
        let next = cursor.reserve(size_of::<VertexShaderData>() as u64);

        assert_eq!(vertex, 0);
        assert_eq!(pixel, 256);
        assert_eq!(next, 768);
        assert_eq!(cursor.len(), 1024);

        cursor.reset();
        assert_eq!(cursor.reserve(16), 0);
    }

    #[test]
    fn capacity_grows_to_the_next_power_of_two() {
        assert_eq!(grown_capacity(1024, 512), 1024);
        assert_eq!(grown_capacity(1024, 1025), 2048);
        assert_eq!(grown_capacity(256_000, 300_000), 524_288);
    }
}
