//! GPU rendering pipeline using wgpu.
//!
//! The grid is uploaded once as three separate one-float vertex buffers
//! (x, height, z) plus a static line index buffer. Only the height buffer is
//! writable after setup: [`Renderer`] implements
//! [`HeightSink`](crate::terrain::HeightSink) by rewriting that buffer in
//! place, so a settled frame re-renders without touching the other buffers.

pub mod camera;

use std::sync::Arc;
use std::time::Instant;

use winit::window::Window;

use crate::terrain::{GridTopology, HeightSink};
use crate::ui::{SimStats, Ui, UiResponse};
use camera::OrbitCamera;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Shader uniforms: camera matrix plus the height range used for coloring.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    height_floor: f32,
    height_span: f32,
    _pad: [f32; 2],
}

const COORD_STRIDE: wgpu::BufferAddress = std::mem::size_of::<f32>() as wgpu::BufferAddress;

const X_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: 0,
    format: wgpu::VertexFormat::Float32,
}];
const HEIGHT_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: 1,
    format: wgpu::VertexFormat::Float32,
}];
const Z_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: 2,
    format: wgpu::VertexFormat::Float32,
}];

/// One vertex buffer per coordinate channel, each a tightly packed f32.
fn coordinate_layouts() -> [wgpu::VertexBufferLayout<'static>; 3] {
    [
        wgpu::VertexBufferLayout {
            array_stride: COORD_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &X_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: COORD_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &HEIGHT_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: COORD_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Z_ATTRIBUTES,
        },
    ]
}

fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
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
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// GPU renderer managing wgpu state and the wireframe pipeline.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    /// Current window size (for aspect ratio and resize handling)
    pub size: winit::dpi::PhysicalSize<u32>,

    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,

    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    // Grid buffers: x and z never change after upload, heights are rewritten
    // in place on every sync.
    x_buffer: Option<wgpu::Buffer>,
    height_buffer: Option<wgpu::Buffer>,
    z_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    num_indices: u32,
    num_vertices: u32,

    // Height range feeding the color ramp, updated on each sync.
    height_floor: f32,
    height_span: f32,
    grid_extent: f32,

    /// Orbital camera, reframed whenever a grid is uploaded
    pub camera: OrbitCamera,

    // egui
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,

    /// UI state
    pub ui: Ui,

    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl Renderer {
    /// Create a new renderer for the given window.
    ///
    /// # Errors
    ///
    /// Returns an error if GPU initialization fails.
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::debug!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                ..Default::default()
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Init egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx,
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: Some(DEPTH_FORMAT),
                ..Default::default()
            },
        );
        let ui = Ui::new();

        let (depth_texture, depth_view) = create_depth_texture(&device, size.width, size.height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Relief Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/relief.wgsl").into()),
        });

        let uniforms = Uniforms {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            height_floor: 0.0,
            height_span: 1.0,
            _pad: [0.0; 2],
        };
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            label: Some("Uniform Bind Group Layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("Uniform Bind Group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Wireframe Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Wireframe Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &coordinate_layouts(),
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            depth_texture,
            depth_view,
            pipeline,
            uniform_buffer,
            bind_group,
            x_buffer: None,
            height_buffer: None,
            z_buffer: None,
            index_buffer: None,
            num_indices: 0,
            num_vertices: 0,
            height_floor: 0.0,
            height_span: 1.0,
            grid_extent: 10.0,
            camera: OrbitCamera::default(),
            egui_state,
            egui_renderer,
            ui,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    /// Reframe the camera on the uploaded grid.
    pub fn reset_camera(&mut self) {
        self.camera = OrbitCamera::framing(self.grid_extent);
    }

    /// Let egui see a window event first; returns true when consumed.
    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Handle window resize.
    ///
    /// Reconfigures the surface and depth buffer for the new size.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            let (depth_texture, depth_view) =
                create_depth_texture(&self.device, new_size.width, new_size.height);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;
        }
    }

    /// Upload the static grid geometry and reframe the camera on it.
    ///
    /// The x, z and index buffers are immutable from here on; the height
    /// buffer starts at the topology's flat heights and is refreshed through
    /// [`HeightSink::write_heights`].
    pub fn upload_grid(&mut self, topology: &GridTopology) {
        use wgpu::util::DeviceExt;

        self.x_buffer = Some(self.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Grid X Buffer"),
                contents: bytemuck::cast_slice(&topology.xs),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
        self.height_buffer = Some(self.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Grid Height Buffer"),
                contents: bytemuck::cast_slice(&topology.ys),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            },
        ));
        self.z_buffer = Some(self.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Grid Z Buffer"),
                contents: bytemuck::cast_slice(&topology.zs),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
        self.index_buffer = Some(self.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Wireframe Index Buffer"),
                contents: bytemuck::cast_slice(&topology.line_indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        ));

        self.num_indices = topology.line_indices.len() as u32;
        self.num_vertices = topology.vertex_count() as u32;
        self.height_floor = 0.0;
        self.height_span = 1.0;
        self.grid_extent = topology.extent();
        self.camera = OrbitCamera::framing(self.grid_extent);

        log::info!(
            "uploaded grid: {} vertices, {} line segments",
            topology.vertex_count(),
            topology.line_count()
        );
    }

    /// Render a frame and build the UI overlay.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if surface acquisition fails.
    pub fn render(
        &mut self,
        window: &Window,
        stats: SimStats,
    ) -> Result<UiResponse, wgpu::SurfaceError> {
        // Update FPS counter
        self.frame_count += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.last_frame = now;
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let aspect = self.size.width as f32 / self.size.height as f32;
        let uniforms = Uniforms {
            view_proj: self.camera.view_projection(aspect).to_cols_array_2d(),
            height_floor: self.height_floor,
            height_span: self.height_span,
            _pad: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        // Begin egui frame
        let raw_input = self.egui_state.take_egui_input(window);
        let egui_ctx = self.egui_state.egui_ctx().clone();
        let mut ui_response = UiResponse::default();
        let full_output = egui_ctx.run(raw_input, |ctx| {
            ui_response = self.ui.render(ctx, &mut self.camera, stats, self.fps);
        });
        if ui_response.reset_camera {
            self.camera = OrbitCamera::framing(self.grid_extent);
        }

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.size.width, self.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.08,
                            g: 0.09,
                            b: 0.12,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // Convert to 'static lifetime for egui compatibility
            let mut render_pass = render_pass.forget_lifetime();

            if let (Some(x_buffer), Some(height_buffer), Some(z_buffer), Some(index_buffer)) = (
                &self.x_buffer,
                &self.height_buffer,
                &self.z_buffer,
                &self.index_buffer,
            ) {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.bind_group, &[]);
                render_pass.set_vertex_buffer(0, x_buffer.slice(..));
                render_pass.set_vertex_buffer(1, height_buffer.slice(..));
                render_pass.set_vertex_buffer(2, z_buffer.slice(..));
                render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.num_indices, 0, 0..1);
            }

            self.egui_renderer
                .render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(ui_response)
    }
}

impl HeightSink for Renderer {
    /// Rewrite the height vertex buffer in place and refresh the color range.
    fn write_heights(&mut self, heights: &[f32]) {
        let Some(height_buffer) = &self.height_buffer else {
            log::warn!("height sync before grid upload, ignoring");
            return;
        };
        if heights.len() as u32 != self.num_vertices {
            log::warn!(
                "height sync size mismatch: got {}, expected {}",
                heights.len(),
                self.num_vertices
            );
            return;
        }

        self.queue
            .write_buffer(height_buffer, 0, bytemuck::cast_slice(heights));

        let mut floor = f32::MAX;
        let mut ceil = f32::MIN;
        for &h in heights {
            floor = floor.min(h);
            ceil = ceil.max(h);
        }
        if floor <= ceil {
            self.height_floor = floor;
            self.height_span = if (ceil - floor).abs() < 0.0001 {
                1.0
            } else {
                ceil - floor
            };
        }
    }
}
