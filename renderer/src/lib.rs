//! Batches textured quads into as few draw calls as possible and renders them with wgpu.

mod config;
mod glyph;
mod glyph_sort;
mod pods;
mod render_batches;
mod sprite_batch;
mod sprite_renderer;
mod stats;
mod texture_bindings;
mod tools;

pub use config::SpriteRendererConfig;
pub use glyph::{Glyph, TextureId};
pub use glyph_sort::{GlyphSortType, sort_glyphs};
pub use pods::Vertex;
pub use render_batches::{RenderBatch, build_batches};
pub use sprite_batch::{
    DrawTarget, MAX_GLYPHS, SessionState, SpriteBatch, UploadId, VertexUpload,
};
pub use sprite_renderer::{REQUIRED_FEATURES, SpriteRenderer};
pub use texture_bindings::TextureBindings;

pub use sprite_geometry::{Color, Rect};
