//! The sprite renderer's configuration

#[derive(Debug, Clone)]
pub struct SpriteRendererConfig {
    pub target_format: wgpu::TextureFormat,
    /// `None` replaces the target's colors.
    pub blend: Option<wgpu::BlendState>,
    pub texture_filter: wgpu::FilterMode,
    /// The number of glyphs the vertex buffer is created for.
    pub initial_glyph_capacity: usize,
    /// Measure vertex upload times and log a summary when the renderer is dropped.
    pub measure: bool,
}

impl SpriteRendererConfig {
    pub const DEFAULT_GLYPH_CAPACITY: usize = 1024;

    pub fn new(target_format: wgpu::TextureFormat) -> Self {
        Self {
            target_format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            texture_filter: wgpu::FilterMode::Linear,
            initial_glyph_capacity: Self::DEFAULT_GLYPH_CAPACITY,
            measure: false,
        }
    }

    #[must_use]
    pub fn with_blend(mut self, blend: Option<wgpu::BlendState>) -> Self {
        self.blend = blend;
        self
    }

    #[must_use]
    pub fn with_texture_filter(mut self, filter: wgpu::FilterMode) -> Self {
        self.texture_filter = filter;
        self
    }

    #[must_use]
    pub fn with_initial_glyph_capacity(mut self, glyphs: usize) -> Self {
        self.initial_glyph_capacity = glyphs;
        self
    }

    #[must_use]
    pub fn with_measure(mut self, measure: bool) -> Self {
        self.measure = measure;
        self
    }
}
