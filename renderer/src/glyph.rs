//! A glyph is one textured quad submitted to a sprite batch.

use derive_more::{Display, From};
use sprite_geometry::{Color, Rect};

use crate::pods::Vertex;

/// An opaque texture handle.
///
/// Provided by whoever owns the textures. Only compared and used as a key to look up the bind
/// group at render time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, From, Display)]
#[display("Texture({_0})")]
pub struct TextureId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    pub top_left: Vertex,
    pub bottom_left: Vertex,
    pub bottom_right: Vertex,
    pub top_right: Vertex,
    pub texture: TextureId,
    pub depth: f32,
}

impl Glyph {
    pub const VERTICES: usize = 6;

    /// Places a glyph at `dest` showing the `uv` part of `texture`.
    ///
    /// Rects are not validated, negative sizes mirror the quad.
    pub fn new(dest: Rect, uv: Rect, texture: TextureId, depth: f32, color: Color) -> Self {
        let (left, bottom, right, top) = (dest.x, dest.y, dest.right(), dest.top());
        let (u_left, v_bottom, u_right, v_top) = (uv.x, uv.y, uv.right(), uv.top());

        Self {
            top_left: Vertex::new((left, top), color, (u_left, v_top)),
            bottom_left: Vertex::new((left, bottom), color, (u_left, v_bottom)),
            bottom_right: Vertex::new((right, bottom), color, (u_right, v_bottom)),
            top_right: Vertex::new((right, top), color, (u_right, v_top)),
            texture,
            depth,
        }
    }

    /// The two triangles of this glyph.
    pub fn vertices(&self) -> [Vertex; Self::VERTICES] {
        [
            self.top_left,
            self.bottom_left,
            self.bottom_right,
            self.bottom_right,
            self.top_right,
            self.top_left,
        ]
    }
}
