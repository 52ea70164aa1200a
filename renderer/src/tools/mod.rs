mod pipeline;
pub mod texture_sampler;
mod vertex_buffer;

pub use pipeline::*;
pub use vertex_buffer::*;
