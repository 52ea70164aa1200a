use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexStepMode};

use sprite_geometry::Color;

// We need this for Rust to store our data correctly for the shaders
#[repr(C)]
// This is so we can store this in a buffer
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Matrix4(pub [[f32; 4]; 4]);

const_assert_eq!(size_of::<Matrix4>(), 64);

impl From<glam::Mat4> for Matrix4 {
    fn from(m: glam::Mat4) -> Self {
        Self(m.to_cols_array_2d())
    }
}

/// One interleaved sprite vertex: position, color, texture coordinates.
///
/// Tightly packed, the color is normalized by the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [u8; 4],
    pub uv: [f32; 2],
}

const_assert_eq!(size_of::<Vertex>(), 20);
// `Queue::write_buffer` requires sizes aligned to `COPY_BUFFER_ALIGNMENT`, and we always write whole
// glyphs.
const_assert_eq!((size_of::<Vertex>() * 6) % wgpu::COPY_BUFFER_ALIGNMENT as usize, 0);

impl Vertex {
    pub fn new(position: (f32, f32), color: Color, uv: (f32, f32)) -> Self {
        Self {
            position: [position.0, position.1],
            color: color.into(),
            uv: [uv.0, uv.1],
        }
    }

    pub fn layout() -> VertexBufferLayout<'static> {
        const ATTRS: [VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Unorm8x4, 2 => Float32x2];

        VertexBufferLayout {
            array_stride: size_of::<Vertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &ATTRS,
        }
    }
}

pub trait AsBytes {
    fn as_bytes(&self) -> &[u8];
}

impl<T: Pod> AsBytes for T {
    fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
