use std::{
    ops::Range,
    sync::atomic::{AtomicU64, Ordering},
};

use anyhow::Result;
use derive_more::Display;
use sprite_geometry::{Color, Rect};

use crate::{
    glyph::{Glyph, TextureId},
    glyph_sort::{GlyphSortType, sort_glyphs},
    pods::Vertex,
    render_batches::{RenderBatch, build_batches},
};

/// The most glyphs one frame can hold, so that every vertex offset fits in a `u32`.
pub const MAX_GLYPHS: usize = u32::MAX as usize / Glyph::VERTICES;

/// Identifies the vertex stream of one `SpriteBatch::end()`.
///
/// Unique within the process, so a renderer can tell which batch its buffer holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
#[display("Upload({_0})")]
pub struct UploadId(u64);

impl UploadId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Receives the vertex stream of a finished batch.
pub trait VertexUpload {
    /// Replace everything uploaded before with `vertices`.
    fn upload(&mut self, id: UploadId, vertices: &[Vertex]) -> Result<()>;
}

/// Where render batches are drawn to.
pub trait DrawTarget {
    fn bind_texture(&mut self, texture: TextureId) -> Result<()>;
    /// Draw the vertices in `range` of the uploaded stream.
    fn draw(&mut self, range: Range<u32>);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing was submitted yet.
    #[default]
    Idle,
    /// Between `begin()` and `end()`, accepting glyphs.
    Open,
    /// Batches are built and can be rendered.
    Closed,
}

/// Collects the glyphs of one frame and turns them into as few draw calls as possible.
///
/// A frame is `begin()`, any number of `draw()` calls, `end()`, and then `render_batch()` as often
/// as needed. Calling these out of order panics.
#[derive(Debug, Default)]
pub struct SpriteBatch {
    state: SessionState,
    sort_type: GlyphSortType,

    /// The glyphs in submission order.
    glyphs: Vec<Glyph>,
    /// Indices into `glyphs`, sorted on `end()`.
    order: Vec<u32>,

    vertices: Vec<Vertex>,
    batches: Vec<RenderBatch>,
    /// Set by `end()` if there was anything to upload.
    upload: Option<UploadId>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new frame.
    ///
    /// Everything from the previous frame is discarded, including glyphs of a frame that was never
    /// ended. Allocations are kept.
    pub fn begin(&mut self, sort_type: GlyphSortType) {
        self.glyphs.clear();
        self.order.clear();
        self.vertices.clear();
        self.batches.clear();
        self.upload = None;
        self.sort_type = sort_type;
        self.state = SessionState::Open;
    }

    pub fn draw(&mut self, dest: Rect, uv: Rect, texture: TextureId, depth: f32, color: Color) {
        self.draw_glyph(Glyph::new(dest, uv, texture, depth, color));
    }

    pub fn draw_glyph(&mut self, glyph: Glyph) {
        self.expect_state(SessionState::Open, "draw");
        self.order.push(glyph_index(self.glyphs.len()));
        self.glyphs.push(glyph);
    }

    /// Sorts the glyphs, builds the render batches and uploads the vertices.
    ///
    /// Nothing is uploaded if no glyphs were drawn.
    #[tracing::instrument(skip_all)]
    pub fn end(&mut self, upload: &mut impl VertexUpload) -> Result<()> {
        self.expect_state(SessionState::Open, "end");

        sort_glyphs(&self.glyphs, &mut self.order, self.sort_type);
        build_batches(
            &self.glyphs,
            &self.order,
            &mut self.vertices,
            &mut self.batches,
        );
        self.state = SessionState::Closed;

        if self.vertices.is_empty() {
            return Ok(());
        }

        let id = UploadId::next();
        self.upload = Some(id);
        upload.upload(id, &self.vertices)
    }

    /// Issues one draw call per render batch.
    ///
    /// Does not change the batch and can be called multiple times after `end()`.
    pub fn render_batch(&self, target: &mut impl DrawTarget) -> Result<()> {
        self.expect_state(SessionState::Closed, "render_batch");

        for batch in &self.batches {
            target.bind_texture(batch.texture)?;
            target.draw(batch.vertex_range());
        }
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn sort_type(&self) -> GlyphSortType {
        self.sort_type
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// The batches of the last `end()`.
    pub fn batches(&self) -> &[RenderBatch] {
        &self.batches
    }

    /// The vertex stream of the last `end()`.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The vertex stream the last `end()` uploaded, `None` if there was nothing to upload.
    pub fn upload_id(&self) -> Option<UploadId> {
        self.upload
    }

    /// The glyphs in drawing order. Before `end()` this is submission order.
    pub fn sorted_glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.order.iter().map(|&i| &self.glyphs[i as usize])
    }

    fn expect_state(&self, expected: SessionState, operation: &str) {
        assert!(
            self.state == expected,
            "SpriteBatch::{operation}() called in state {:?}, expected {expected:?}",
            self.state
        );
    }
}

/// The index of the glyph appended to `len` glyphs.
fn glyph_index(len: usize) -> u32 {
    assert!(
        len < MAX_GLYPHS,
        "Too many glyphs in one batch, at most {MAX_GLYPHS} are supported"
    );
    len as u32
}
