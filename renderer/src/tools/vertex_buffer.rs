use std::mem::size_of;

use anyhow::{Result, bail};
use log::debug;
use wgpu::RenderPass;

use crate::pods::Vertex;

/// A persistent vertex buffer that is rewritten as a whole on every upload.
#[derive(Debug)]
pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    /// Vertices written by the last upload.
    len: usize,
}

impl VertexBuffer {
    const VERTEX_SIZE: usize = size_of::<Vertex>();

    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Self::max_capacity(device));
        Self {
            buffer: Self::create_buffer(device, capacity),
            len: 0,
        }
    }

    /// The number of vertices the buffer can hold without growing.
    pub fn capacity(&self) -> usize {
        (self.buffer.size() as usize) / Self::VERTEX_SIZE
    }

    pub fn vertex_count(&self) -> usize {
        self.len
    }

    /// Replaces the buffer's contents with `vertices`.
    ///
    /// Previous contents are discarded, never partially updated. Grows the buffer if needed.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        vertices: &[Vertex],
    ) -> Result<()> {
        self.ensure_capacity(device, vertices.len())?;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(vertices));
        self.len = vertices.len();
        Ok(())
    }

    /// Binds the vertices of the last upload to slot 0.
    pub fn set(&self, pass: &mut RenderPass<'_>) {
        // Empty buffer slices are not allowed.
        if self.len == 0 {
            return;
        }
        let end = (self.len * Self::VERTEX_SIZE) as u64;
        pass.set_vertex_buffer(0, self.buffer.slice(..end));
    }

    fn ensure_capacity(&mut self, device: &wgpu::Device, required: usize) -> Result<()> {
        let current = self.capacity();
        if required <= current {
            return Ok(());
        }

        let max_vertices = Self::max_capacity(device);
        if required > max_vertices {
            bail!(
                "Vertex stream of {required} vertices exceeds the maximum buffer size of {max_vertices} vertices"
            );
        }

        let proposed = grown_capacity(current, required).min(max_vertices);

        debug!("Growing vertex buffer from {current} to {proposed} vertices, required: {required}");

        self.buffer = Self::create_buffer(device, proposed);
        Ok(())
    }

    fn max_capacity(device: &wgpu::Device) -> usize {
        usize::try_from(device.limits().max_buffer_size).unwrap_or(usize::MAX) / Self::VERTEX_SIZE
    }

    fn create_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Vertex Buffer"),
            size: (capacity * Self::VERTEX_SIZE) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}

/// Doubles `current` until `required` fits.
fn grown_capacity(current: usize, required: usize) -> usize {
    let mut proposed = current.max(1) << 1;
    loop {
        if proposed >= required {
            break;
        }
        proposed <<= 1;
        assert!(proposed != 0);
    }
    proposed
}
