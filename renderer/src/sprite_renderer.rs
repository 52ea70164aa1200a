//! Uploads sprite batches to the GPU and draws them.

use std::{mem::size_of, ops::Range, time::Instant};

use anyhow::{Context, Result, bail, ensure};
use log::info;

use crate::{
    config::SpriteRendererConfig,
    glyph::{Glyph, TextureId},
    pods::{AsBytes, Matrix4, Vertex},
    sprite_batch::{DrawTarget, SpriteBatch, UploadId, VertexUpload},
    stats::MeasureSeries,
    texture_bindings::TextureBindings,
    tools::{
        VertexBuffer, create_sprite_pipeline, texture_bind_group, texture_bind_group_layout,
        texture_sampler,
    },
};

/// The view projection matrix is passed as a push constant.
pub const REQUIRED_FEATURES: wgpu::Features = wgpu::Features::PUSH_CONSTANTS;
const PUSH_CONSTANTS_SIZE: u32 = size_of::<Matrix4>() as u32;

/// Draws [`SpriteBatch`]es with wgpu.
///
/// Owns the vertex buffer all batches are uploaded to, so it always holds the vertices of the
/// batch that was ended last. The buffer is created on the first upload and lives as long as the
/// renderer.
#[derive(Debug)]
pub struct SpriteRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: SpriteRendererConfig,

    layout: Option<SpriteLayout>,
    vertex_buffer: Option<VertexBuffer>,
    /// The stream `vertex_buffer` holds.
    uploaded: Option<UploadId>,
    textures: TextureBindings,

    upload_series: Option<MeasureSeries>,
}

/// Everything that depends on the vertex format and the shader.
#[derive(Debug)]
struct SpriteLayout {
    pipeline: wgpu::RenderPipeline,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl SpriteLayout {
    fn new(device: &wgpu::Device, config: &SpriteRendererConfig) -> Self {
        let shader = &device.create_shader_module(wgpu::include_wgsl!("sprite.wgsl"));

        let texture_bind_group_layout = texture_bind_group_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&texture_bind_group_layout],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::VERTEX,
                range: 0..PUSH_CONSTANTS_SIZE,
            }],
        });

        let target = wgpu::ColorTargetState {
            format: config.target_format,
            blend: config.blend,
            write_mask: wgpu::ColorWrites::ALL,
        };

        let pipeline = create_sprite_pipeline(device, shader, &pipeline_layout, target);

        info!("Created sprite pipeline for {:?}", config.target_format);

        Self {
            pipeline,
            texture_bind_group_layout,
            sampler: texture_sampler::clamping(device, config.texture_filter),
        }
    }
}

impl SpriteRenderer {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: SpriteRendererConfig,
    ) -> Result<Self> {
        if !device.features().contains(REQUIRED_FEATURES) {
            bail!("GPU Device must support {REQUIRED_FEATURES:?}");
        }
        let max_push_constant_size = device.limits().max_push_constant_size;
        if max_push_constant_size < PUSH_CONSTANTS_SIZE {
            bail!(
                "GPU Device must support push constants of {PUSH_CONSTANTS_SIZE} bytes, supported: {max_push_constant_size}"
            );
        }

        let upload_series = config
            .measure
            .then(|| MeasureSeries::new("Sprite vertex upload"));

        Ok(Self {
            device,
            queue,
            config,
            layout: None,
            vertex_buffer: None,
            uploaded: None,
            textures: TextureBindings::default(),
            upload_series,
        })
    }

    /// Creates the pipeline and the vertex layout. Does nothing if already done.
    ///
    /// [`Self::register_texture`] calls this, too.
    pub fn init_layout(&mut self) {
        if self.layout.is_some() {
            return;
        }
        self.layout = Some(SpriteLayout::new(&self.device, &self.config));
    }

    pub fn is_layout_initialized(&self) -> bool {
        self.layout.is_some()
    }

    pub fn config(&self) -> &SpriteRendererConfig {
        &self.config
    }

    /// Makes an externally owned texture available to sprites drawn with `texture`.
    ///
    /// Replaces a previous registration of `texture`.
    pub fn register_texture(&mut self, texture: TextureId, view: &wgpu::TextureView) {
        let layout = self
            .layout
            .get_or_insert_with(|| SpriteLayout::new(&self.device, &self.config));

        let bind_group = texture_bind_group(
            &self.device,
            &layout.texture_bind_group_layout,
            view,
            &layout.sampler,
        );

        self.textures.insert(texture, bind_group);
    }

    /// Returns `true` if `texture` was registered.
    pub fn unregister_texture(&mut self, texture: TextureId) -> bool {
        self.textures.remove(texture).is_some()
    }

    pub fn textures(&self) -> &TextureBindings {
        &self.textures
    }

    /// The number of vertices of the last upload.
    pub fn uploaded_vertices(&self) -> usize {
        self.vertex_buffer
            .as_ref()
            .map(VertexBuffer::vertex_count)
            .unwrap_or_default()
    }

    /// Draws `batch` into `pass`.
    ///
    /// `batch` must be the batch that was ended with this renderer last, and all its textures
    /// registered.
    #[tracing::instrument(skip_all)]
    pub fn render(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        batch: &SpriteBatch,
        view_projection: &glam::Mat4,
    ) -> Result<()> {
        let mut target = SpritePass::new(pass, &self.textures);

        // Empty batches don't upload, so the buffer may hold an earlier frame.
        if !batch.batches().is_empty() {
            let layout = self
                .layout
                .as_ref()
                .context("SpriteRenderer::init_layout() was not called")?;

            ensure!(
                batch.upload_id().is_some() && batch.upload_id() == self.uploaded,
                "Sprite batch {:?} was not the last one uploaded, the vertex buffer holds {:?}",
                batch.upload_id(),
                self.uploaded
            );
            debug_assert_eq!(self.uploaded_vertices(), batch.vertices().len());

            let pass = &mut *target.pass;
            pass.set_pipeline(&layout.pipeline);
            pass.set_push_constants(
                wgpu::ShaderStages::VERTEX,
                0,
                Matrix4::from(*view_projection).as_bytes(),
            );
            if let Some(vertex_buffer) = &self.vertex_buffer {
                vertex_buffer.set(pass);
            }
        }

        batch.render_batch(&mut target)
    }
}

impl VertexUpload for SpriteRenderer {
    fn upload(&mut self, id: UploadId, vertices: &[Vertex]) -> Result<()> {
        let start = Instant::now();

        let initial_capacity = self
            .config
            .initial_glyph_capacity
            .saturating_mul(Glyph::VERTICES);
        let vertex_buffer = self
            .vertex_buffer
            .get_or_insert_with(|| VertexBuffer::new(&self.device, initial_capacity));

        vertex_buffer
            .write(&self.device, &self.queue, vertices)
            .context("Uploading sprite vertices")?;
        self.uploaded = Some(id);

        if let Some(series) = &mut self.upload_series {
            series.add_sample(start.elapsed());
        }
        Ok(())
    }
}

/// A [`DrawTarget`] recording into a wgpu render pass.
struct SpritePass<'a, 'p> {
    pass: &'a mut wgpu::RenderPass<'p>,
    textures: &'a TextureBindings,
    bound: Option<TextureId>,
}

impl<'a, 'p> SpritePass<'a, 'p> {
    fn new(pass: &'a mut wgpu::RenderPass<'p>, textures: &'a TextureBindings) -> Self {
        Self {
            pass,
            textures,
            bound: None,
        }
    }
}

impl DrawTarget for SpritePass<'_, '_> {
    fn bind_texture(&mut self, texture: TextureId) -> Result<()> {
        if self.bound == Some(texture) {
            return Ok(());
        }
        let bind_group = self.textures.get(texture)?;
        self.pass.set_bind_group(0, bind_group, &[]);
        self.bound = Some(texture);
        Ok(())
    }

    fn draw(&mut self, range: Range<u32>) {
        self.pass.draw(range, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use sprite_geometry::{Color, Rect};

    use super::*;
    use crate::glyph_sort::GlyphSortType;

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// An adapter that accepts every call without a GPU.
    fn noop_adapter() -> wgpu::Adapter {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::NOOP,
            backend_options: wgpu::BackendOptions {
                noop: wgpu::NoopBackendOptions { enable: true },
                ..Default::default()
            },
            ..Default::default()
        });
        pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
            .unwrap()
    }

    fn noop_device() -> (wgpu::Device, wgpu::Queue) {
        let adapter = noop_adapter();
        pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            required_features: REQUIRED_FEATURES,
            required_limits: adapter.limits(),
            ..Default::default()
        }))
        .unwrap()
    }

    fn renderer(initial_glyph_capacity: usize) -> SpriteRenderer {
        let (device, queue) = noop_device();
        let config =
            SpriteRendererConfig::new(FORMAT).with_initial_glyph_capacity(initial_glyph_capacity);
        SpriteRenderer::new(device, queue, config).unwrap()
    }

    fn frame(renderer: &mut SpriteRenderer, glyphs: usize, texture: u32) -> SpriteBatch {
        let mut batch = SpriteBatch::new();
        batch.begin(GlyphSortType::Texture);
        for i in 0..glyphs {
            batch.draw(
                Rect::new(i as f32, 0.0, 8.0, 8.0),
                Rect::UNIT,
                TextureId(texture),
                0.0,
                Color::WHITE,
            );
        }
        batch.end(renderer).unwrap();
        batch
    }

    fn capacity(renderer: &SpriteRenderer) -> Option<usize> {
        renderer.vertex_buffer.as_ref().map(VertexBuffer::capacity)
    }

    fn texture_view(device: &wgpu::Device, usage: wgpu::TextureUsages) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: None,
                size: wgpu::Extent3d {
                    width: 4,
                    height: 4,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: FORMAT,
                usage,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn register(renderer: &mut SpriteRenderer, id: u32) {
        let view = texture_view(&renderer.device, wgpu::TextureUsages::TEXTURE_BINDING);
        renderer.register_texture(TextureId(id), &view);
    }

    /// Renders `batch` into a fresh target and submits the pass if that succeeded.
    fn render(renderer: &SpriteRenderer, batch: &SpriteBatch) -> Result<()> {
        let device = &renderer.device;
        let target = texture_view(device, wgpu::TextureUsages::RENDER_ATTACHMENT);
        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor::default());

        let result = {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations::default(),
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            renderer.render(&mut pass, batch, &glam::Mat4::IDENTITY)
        };

        if result.is_ok() {
            renderer.queue.submit([encoder.finish()]);
        }
        result
    }

    #[test]
    fn init_layout_can_be_called_repeatedly() {
        let mut renderer = renderer(1);
        assert!(!renderer.is_layout_initialized());

        renderer.init_layout();
        renderer.init_layout();
        assert!(renderer.is_layout_initialized());
    }

    #[test]
    fn register_texture_initializes_the_layout() {
        let mut renderer = renderer(1);
        register(&mut renderer, 3);

        assert!(renderer.is_layout_initialized());
        assert!(renderer.textures().contains(TextureId(3)));
        assert!(renderer.unregister_texture(TextureId(3)));
        assert!(!renderer.unregister_texture(TextureId(3)));
    }

    #[test]
    fn vertex_buffer_is_created_on_first_upload() {
        let mut renderer = renderer(2);
        assert_eq!(capacity(&renderer), None);

        frame(&mut renderer, 0, 1);
        assert_eq!(capacity(&renderer), None);
        assert_eq!(renderer.uploaded_vertices(), 0);

        frame(&mut renderer, 1, 1);
        assert_eq!(capacity(&renderer), Some(12));
        assert_eq!(renderer.uploaded_vertices(), 6);
    }

    #[test]
    fn vertex_buffer_doubles_and_is_rewritten_as_a_whole() {
        let mut renderer = renderer(1);

        let large = frame(&mut renderer, 100, 1);
        assert_eq!(capacity(&renderer), Some(768));
        assert_eq!(renderer.uploaded_vertices(), 600);
        assert_eq!(renderer.uploaded, large.upload_id());

        let small = frame(&mut renderer, 1, 1);
        assert_eq!(capacity(&renderer), Some(768));
        assert_eq!(renderer.uploaded_vertices(), 6);
        assert_eq!(renderer.uploaded, small.upload_id());
    }

    #[test]
    fn renders_the_last_uploaded_batch() {
        let mut renderer = renderer(16);
        register(&mut renderer, 1);
        register(&mut renderer, 2);

        let mut batch = SpriteBatch::new();
        batch.begin(GlyphSortType::Texture);
        for texture in [2, 1, 2] {
            batch.draw(Rect::UNIT, Rect::UNIT, TextureId(texture), 0.0, Color::WHITE);
        }
        batch.end(&mut renderer).unwrap();

        render(&renderer, &batch).unwrap();
        // Rendering does not consume the upload.
        render(&renderer, &batch).unwrap();
    }

    #[test]
    fn empty_batch_renders_without_layout() {
        let mut renderer = renderer(1);
        let batch = frame(&mut renderer, 0, 1);
        render(&renderer, &batch).unwrap();
    }

    #[test]
    fn render_requires_the_layout() {
        let mut renderer = renderer(1);
        let batch = frame(&mut renderer, 1, 1);

        let err = render(&renderer, &batch).unwrap_err();
        assert_eq!(err.to_string(), "SpriteRenderer::init_layout() was not called");
    }

    #[test]
    fn render_rejects_a_batch_that_was_not_uploaded_last() {
        let mut renderer = renderer(1);
        register(&mut renderer, 1);

        // Same vertex count, different uploads.
        let first = frame(&mut renderer, 1, 1);
        let second = frame(&mut renderer, 1, 1);

        let err = render(&renderer, &first).unwrap_err();
        assert!(err.to_string().contains("was not the last one uploaded"), "{err}");
        render(&renderer, &second).unwrap();
    }

    #[test]
    fn render_rejects_a_batch_ended_with_another_uploader() {
        let mut other = renderer(1);
        let mut renderer = renderer(1);
        register(&mut renderer, 1);

        frame(&mut renderer, 2, 1);
        let foreign = frame(&mut other, 2, 1);

        assert_eq!(renderer.uploaded_vertices(), foreign.vertices().len());
        assert!(render(&renderer, &foreign).is_err());
    }

    #[test]
    fn render_fails_for_unregistered_textures() {
        let mut renderer = renderer(1);
        register(&mut renderer, 1);

        let mut batch = SpriteBatch::new();
        batch.begin(GlyphSortType::Texture);
        batch.draw(Rect::UNIT, Rect::UNIT, TextureId(1), 0.0, Color::WHITE);
        batch.draw(Rect::UNIT, Rect::UNIT, TextureId(9), 0.0, Color::WHITE);
        batch.end(&mut renderer).unwrap();

        let err = render(&renderer, &batch).unwrap_err();
        assert_eq!(err.to_string(), "Texture(9) is not registered");
    }

    #[test]
    fn new_rejects_devices_without_push_constants() {
        let adapter = noop_adapter();
        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())).unwrap();

        let result = SpriteRenderer::new(device, queue, SpriteRendererConfig::new(FORMAT));
        assert!(result.is_err());
    }
}
