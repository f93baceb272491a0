use std::time::{Duration, Instant};

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, warn};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::types::{Antialiasing, ColorSpaceMode};

use super::context::{AdapterSummary, GpuContext};
use super::pipeline::{FractalPipeline, PipelineLayouts};
use super::uniforms::FractalUniforms;

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Everything the window needs to turn a [`FractalUniforms`] into a frame.
pub(crate) struct GpuState {
    context: GpuContext,
    _layouts: PipelineLayouts,
    pipeline: FractalPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    multisample_target: Option<MultisampleTarget>,
    last_fps_update: Instant,
    frames_since_last_update: u32,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        color_space: ColorSpaceMode,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, antialiasing, color_space)?;
        let layouts = PipelineLayouts::new(&context.device);
        let pipeline = FractalPipeline::new(
            &context.device,
            &layouts,
            context.surface_format,
            context.sample_count,
        );

        let uniform_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("fractal uniform buffer"),
                contents: FractalUniforms::default().as_bytes(),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("fractal uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let multisample_target = Self::multisample_target_for(&context);

        Ok(Self {
            context,
            _layouts: layouts,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            multisample_target,
            last_fps_update: Instant::now(),
            frames_since_last_update: 0,
        })
    }

    fn multisample_target_for(context: &GpuContext) -> Option<MultisampleTarget> {
        (context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn adapter(&self) -> &AdapterSummary {
        &self.context.adapter
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.multisample_target = Self::multisample_target_for(&self.context);
    }

    /// Uploads `uniforms` and draws one frame to the swapchain.
    pub(crate) fn render(&mut self, uniforms: &FractalUniforms) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, uniforms.as_bytes());

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });
        self.encode_draw(&mut encoder, &view);
        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        self.record_frame(uniforms);
        Ok(())
    }

    fn encode_draw(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(view)),
            None => (view, None),
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fractal pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: attachment_view,
                depth_slice: None,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.pipeline.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }

    fn record_frame(&mut self, uniforms: &FractalUniforms) {
        let now = Instant::now();
        self.frames_since_last_update += 1;
        let elapsed = now.saturating_duration_since(self.last_fps_update);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_last_update as f32 / elapsed.as_secs_f32();
            if fps < 20.0 {
                warn!(fps = fps.round(), iterations = uniforms.iterations, "frame rate is low");
            }
            debug!(
                fps = fps.round(),
                time = uniforms.time,
                variant = uniforms.variant,
                "render stats"
            );
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
        }
    }
}
