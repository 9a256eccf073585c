//! wgpu renderer module
//!
//! Draws the demo scene into the window surface and paints the egui overlay.
//! A surface texture is acquired by the first draw of a tick and presented by
//! [`WgpuRenderer::end_frame`]; a tick that draws nothing presents nothing.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use egui_wgpu::wgpu;
use log::{info, warn};
use wgpu::{
    BindGroup, Buffer, Device, DeviceDescriptor, Instance, InstanceDescriptor, Queue,
    RenderPipeline, Surface, SurfaceConfiguration, SurfaceTexture, TextureUsages, TextureView,
};
use winit::window::Window;

use crate::display::SurfaceId;
use crate::error::RendererError;
use crate::scene::{Camera, Scene, Viewport};
use crate::stage::StereoRenderer;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.05,
    a: 1.0,
};

// Vertices of the cube generated in the shader
const CUBE_VERTICES: u32 = 36;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SceneUniforms {
    mvp: [[f32; 4]; 4],
}

struct Frame {
    texture: SurfaceTexture,
    view: TextureView,
}

/// What a single scene pass does to the attachments before drawing.
#[derive(Clone, Copy)]
struct PassOps {
    clear_color: bool,
    clear_depth: bool,
}

pub struct WgpuRenderer {
    surface: Surface<'static>,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    depth_view: TextureView,
    pipeline: RenderPipeline,
    uniform_buffer: Buffer,
    uniform_bind_group: BindGroup,
    egui_renderer: egui_wgpu::Renderer,
    frame: Option<Frame>,
    viewport: Viewport,
    auto_clear: bool,
    surface_id: SurfaceId,
}

impl WgpuRenderer {
    pub async fn new(window: Arc<Window>) -> Result<Self, RendererError> {
        let size = window.inner_size();
        let surface_id = SurfaceId(u64::from(window.id()));

        let instance = Instance::new(InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::NoAdapter)?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter.request_device(&DeviceDescriptor::default(), None).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(RendererError::NoSurfaceFormat)?;

        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, config.width, config.height);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        Ok(Self {
            surface,
            device,
            queue,
            viewport: Viewport::full(config.width as f32, config.height as f32),
            config,
            depth_view,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            egui_renderer,
            frame: None,
            auto_clear: true,
            surface_id,
        })
    }

    /// Paints the overlay (if any) and presents the tick's surface texture.
    pub fn end_frame(&mut self, ui: Option<(&egui::Context, egui::FullOutput)>) {
        let frame = self.frame.take();

        if let Some((ctx, full_output)) = ui {
            for (id, delta) in &full_output.textures_delta.set {
                self.egui_renderer.update_texture(&self.device, &self.queue, *id, delta);
            }
            if let Some(frame) = &frame {
                let paint_jobs = ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
                self.paint_ui(&frame.view, &paint_jobs, full_output.pixels_per_point);
            }
            for id in &full_output.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        if let Some(frame) = frame {
            frame.texture.present();
        }
    }

    fn paint_ui(&mut self, view: &TextureView, paint_jobs: &[egui::ClippedPrimitive], pixels_per_point: f32) {
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point,
        };

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("UI Encoder"),
        });
        let uploads = self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            paint_jobs,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("UI Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            self.egui_renderer.render(&mut render_pass, paint_jobs, &screen_descriptor);
        }

        self.queue.submit(uploads.into_iter().chain(std::iter::once(encoder.finish())));
    }

    /// Makes sure this tick has a surface texture to draw into.
    fn acquire_frame(&mut self) -> bool {
        if self.frame.is_some() {
            return true;
        }
        match self.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
                self.frame = Some(Frame { texture, view });
                true
            }
            Err(e) => {
                warn!("Surface texture unavailable ({}), reconfiguring", e);
                self.surface.configure(&self.device, &self.config);
                false
            }
        }
    }

    /// Current viewport clipped to the surface; wgpu rejects viewports that
    /// leave the render target.
    fn clipped_viewport(&self) -> Viewport {
        let (surface_w, surface_h) = (self.config.width as f32, self.config.height as f32);
        let x = self.viewport.x.clamp(0.0, surface_w);
        let y = self.viewport.y.clamp(0.0, surface_h);
        Viewport::new(
            x,
            y,
            self.viewport.width.clamp(0.0, surface_w - x),
            self.viewport.height.clamp(0.0, surface_h - y),
        )
    }

    /// Encodes and submits one pass. Each pass is its own submission so the
    /// uniform write before it is not overwritten by a later eye.
    fn submit_pass(&mut self, ops: PassOps, mvp: Option<glam::Mat4>) {
        if !self.acquire_frame() {
            return;
        }
        if let Some(mvp) = mvp {
            let uniforms = SceneUniforms {
                mvp: mvp.to_cols_array_2d(),
            };
            self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        }
        let Some(frame) = &self.frame else {
            return;
        };

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Scene Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: if ops.clear_color {
                            wgpu::LoadOp::Clear(CLEAR_COLOR)
                        } else {
                            wgpu::LoadOp::Load
                        },
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: if ops.clear_depth {
                            wgpu::LoadOp::Clear(1.0)
                        } else {
                            wgpu::LoadOp::Load
                        },
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if mvp.is_some() {
                let viewport = self.clipped_viewport();
                if viewport.width > 0.0 && viewport.height > 0.0 {
                    render_pass.set_viewport(viewport.x, viewport.y, viewport.width, viewport.height, 0.0, 1.0);
                    render_pass.set_pipeline(&self.pipeline);
                    render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                    render_pass.draw(0..CUBE_VERTICES, 0..1);
                }
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

fn create_depth_view(device: &Device, width: u32, height: u32) -> TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

impl StereoRenderer for WgpuRenderer {
    fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.config.width && height == self.config.height {
            return;
        }
        // A texture from the old configuration must not outlive it.
        self.frame = None;
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_auto_clear(&mut self, auto_clear: bool) {
        self.auto_clear = auto_clear;
    }

    fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    fn clear(&mut self) {
        self.submit_pass(
            PassOps {
                clear_color: true,
                clear_depth: true,
            },
            None,
        );
    }

    fn clear_depth(&mut self) {
        self.submit_pass(
            PassOps {
                clear_color: false,
                clear_depth: true,
            },
            None,
        );
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) {
        let ops = PassOps {
            clear_color: self.auto_clear,
            clear_depth: self.auto_clear,
        };
        self.submit_pass(ops, Some(camera.model_view_projection(scene)));
    }
}
