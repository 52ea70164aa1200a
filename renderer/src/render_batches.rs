//! Merges sorted glyphs into contiguous vertex ranges sharing a texture.

use std::ops::Range;

use crate::{
    glyph::{Glyph, TextureId},
    pods::Vertex,
};

/// A range of the vertex stream drawn with one texture in one draw call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderBatch {
    /// The first vertex.
    pub offset: u32,
    /// Number of vertices, always a multiple of six.
    pub count: u32,
    pub texture: TextureId,
}

impl RenderBatch {
    pub fn vertex_range(&self) -> Range<u32> {
        self.offset..self.offset + self.count
    }
}

/// Writes the vertices of the glyphs in `order` into `vertices` and the batches covering them into
/// `batches`.
///
/// Both outputs are cleared first. Their allocations are reused, so that calling this every frame
/// does not allocate once the largest frame was seen.
///
/// Adjacent glyphs with the same texture share a batch, so `order` is expected to be sorted. This
/// is a single pass over `order`.
pub fn build_batches(
    glyphs: &[Glyph],
    order: &[u32],
    vertices: &mut Vec<Vertex>,
    batches: &mut Vec<RenderBatch>,
) {
    vertices.clear();
    batches.clear();

    let Some(&first) = order.first() else {
        return;
    };

    vertices.reserve_exact(order.len() * Glyph::VERTICES);

    let mut current = RenderBatch {
        offset: 0,
        count: 0,
        texture: glyphs[first as usize].texture,
    };

    for &index in order {
        let glyph = &glyphs[index as usize];

        if glyph.texture != current.texture {
            let offset = current.offset + current.count;
            batches.push(current);
            current = RenderBatch {
                offset,
                count: 0,
                texture: glyph.texture,
            };
        }

        vertices.extend_from_slice(&glyph.vertices());
        current.count += Glyph::VERTICES as u32;
    }

    batches.push(current);

    debug_assert_eq!(vertices.len(), order.len() * Glyph::VERTICES);
}
