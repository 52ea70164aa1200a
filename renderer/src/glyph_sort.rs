use std::cmp::Ordering;

use crate::glyph::Glyph;

/// The order glyphs are batched and drawn in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum GlyphSortType {
    /// Group by texture. Produces the fewest batches, ignores depth.
    #[default]
    Texture,
    /// Nearest first, for opaque sprites.
    FrontToBack,
    /// Farthest first, required for alpha blending.
    BackToFront,
}

impl GlyphSortType {
    fn compare(self, a: &Glyph, b: &Glyph) -> Ordering {
        match self {
            GlyphSortType::Texture => a.texture.cmp(&b.texture),
            GlyphSortType::FrontToBack => a.depth.total_cmp(&b.depth),
            GlyphSortType::BackToFront => b.depth.total_cmp(&a.depth),
        }
    }
}

/// Sorts `order`, a list of indices into `glyphs`.
///
/// The sort is stable, glyphs comparing equal keep their submission order. Only the indices move.
pub fn sort_glyphs(glyphs: &[Glyph], order: &mut [u32], sort_type: GlyphSortType) {
    order.sort_by(|&a, &b| sort_type.compare(&glyphs[a as usize], &glyphs[b as usize]));
}
