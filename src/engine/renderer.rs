use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use wgpu::SurfaceError;
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

use crate::grid::Item;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFilter {
    #[default]
    Linear,
    Nearest,
}

impl TextureFilter {
    fn mode(self) -> wgpu::FilterMode {
        match self {
            TextureFilter::Linear => wgpu::FilterMode::Linear,
            TextureFilter::Nearest => wgpu::FilterMode::Nearest,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

impl QuadVertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as u64,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Shared quad centered on the origin, in triangle-strip order.
pub fn quad_vertices(half_extent: f32) -> [QuadVertex; 4] {
    let h = half_extent;
    [
        QuadVertex {
            position: [-h, -h],
            tex_coords: [0.0, 1.0],
        },
        QuadVertex {
            position: [h, -h],
            tex_coords: [1.0, 1.0],
        },
        QuadVertex {
            position: [-h, h],
            tex_coords: [0.0, 0.0],
        },
        QuadVertex {
            position: [h, h],
            tex_coords: [1.0, 0.0],
        },
    ]
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ItemUniform {
    pub translation: [f32; 2],
    pub scale: f32,
    _padding: f32,
}

impl ItemUniform {
    pub fn from_item(item: &Item) -> Self {
        Self {
            translation: item.position.to_array(),
            scale: item.current_scale,
            _padding: 0.0,
        }
    }
}

/// 2x2 grey checker shown until an item's image arrives.
pub fn placeholder_pixels() -> RgbaImage {
    RgbaImage::from_fn(2, 2, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgba([96, 96, 104, 255])
        } else {
            image::Rgba([56, 56, 64, 255])
        }
    })
}

/// Turns shader compile errors or a captured validation error into a failure.
pub fn check_shader(info: &wgpu::CompilationInfo, validation: Option<wgpu::Error>) -> Result<()> {
    let errors: Vec<&str> = info
        .messages
        .iter()
        .filter(|msg| matches!(msg.message_type, wgpu::CompilationMessageType::Error))
        .map(|msg| msg.message.as_str())
        .collect();
    if !errors.is_empty() {
        bail!("quad shader failed to compile: {}", errors.join("; "));
    }
    if let Some(err) = validation {
        bail!("quad pipeline rejected by the device: {err}");
    }
    Ok(())
}

/// Rejects images the device cannot hold as a single 2D texture.
pub fn check_texture_size(width: u32, height: u32, max_dimension: u32) -> Result<()> {
    if width > max_dimension || height > max_dimension {
        bail!("image is {width}x{height}, device limit is {max_dimension}x{max_dimension}");
    }
    Ok(())
}

/// Destination for decoded item images.
pub trait TextureSink {
    fn upload_item_texture(&mut self, index: usize, image: &RgbaImage) -> Result<()>;
}

/// egui output to composite over the grid this frame.
pub struct GuiFrame<'a> {
    pub renderer: &'a mut egui_wgpu::Renderer,
    pub primitives: &'a [egui::ClippedPrimitive],
    pub textures_delta: &'a egui::TexturesDelta,
    pub screen: egui_wgpu::ScreenDescriptor,
}

struct ItemSlot {
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture: wgpu::Texture,
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    clear_color: wgpu::Color,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    quad_buffer: wgpu::Buffer,
    slots: Vec<ItemSlot>,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        item_count: usize,
        half_extent: f32,
        filter: TextureFilter,
    ) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .context("failed to create surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter found")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("swapgrid-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let Some(&fallback_format) = surface_caps.formats.first() else {
            bail!("surface reports no supported formats");
        };
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(fallback_format);
        let alpha_mode = surface_caps
            .alpha_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::CompositeAlphaMode::Opaque)
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Shader and pipeline validation errors are captured here.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("swapgrid-quad-shader"),
            source: wgpu::ShaderSource::Wgsl(QUAD_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("swapgrid-item-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("swapgrid-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("swapgrid-quad-pipeline"),
            layout: Some(&pipeline_layout),
            cache: None,
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[QuadVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let compile_info = shader.get_compilation_info().await;
        let validation = device.pop_error_scope().await;
        check_shader(&compile_info, validation)?;

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("swapgrid-quad-buffer"),
            contents: bytemuck::cast_slice(&quad_vertices(half_extent)),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("swapgrid-item-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter.mode(),
            min_filter: filter.mode(),
            ..Default::default()
        });

        let mut renderer = Self {
            surface,
            device,
            queue,
            config,
            size,
            clear_color: wgpu::Color {
                r: 0.08,
                g: 0.08,
                b: 0.1,
                a: 1.0,
            },
            pipeline,
            bind_group_layout,
            sampler,
            quad_buffer,
            slots: Vec::with_capacity(item_count),
        };

        let placeholder = placeholder_pixels();
        for index in 0..item_count {
            let slot = renderer.create_slot(index, &placeholder);
            renderer.slots.push(slot);
        }

        tracing::info!(
            target: "renderer",
            format = ?renderer.config.format,
            slots = item_count,
            "renderer ready"
        );
        Ok(renderer)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn create_slot(&self, index: usize, pixels: &RgbaImage) -> ItemSlot {
        let label = format!("swapgrid-item-uniform-{index}");
        let uniform = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label.as_str()),
            size: std::mem::size_of::<ItemUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let (texture, bind_group) = self.bind_texture(index, &uniform, pixels);
        ItemSlot {
            uniform,
            bind_group,
            texture,
        }
    }

    fn bind_texture(
        &self,
        index: usize,
        uniform: &wgpu::Buffer,
        pixels: &RgbaImage,
    ) -> (wgpu::Texture, wgpu::BindGroup) {
        let extent = wgpu::Extent3d {
            width: pixels.width().max(1),
            height: pixels.height().max(1),
            depth_or_array_layers: 1,
        };
        let texture_label = format!("swapgrid-item-texture-{index}");
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(texture_label.as_str()),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        if pixels.width() > 0 && pixels.height() > 0 {
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * pixels.width()),
                    rows_per_image: Some(pixels.height()),
                },
                extent,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let group_label = format!("swapgrid-item-bind-group-{index}");
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(group_label.as_str()),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        (texture, bind_group)
    }

    pub fn render(&mut self, items: &[Item], gui: Option<GuiFrame<'_>>) -> Result<(), SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        for (slot, item) in self.slots.iter().zip(items) {
            self.queue.write_buffer(
                &slot.uniform,
                0,
                bytemuck::bytes_of(&ItemUniform::from_item(item)),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("swapgrid-render-encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("swapgrid-item-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
            for slot in self.slots.iter().take(items.len()) {
                render_pass.set_bind_group(0, &slot.bind_group, &[]);
                render_pass.draw(0..4, 0..1);
            }
        }

        let mut gui_commands = Vec::new();
        if let Some(gui) = gui {
            for (id, delta) in &gui.textures_delta.set {
                gui.renderer
                    .update_texture(&self.device, &self.queue, *id, delta);
            }
            gui_commands = gui.renderer.update_buffers(
                &self.device,
                &self.queue,
                &mut encoder,
                gui.primitives,
                &gui.screen,
            );

            let mut gui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("swapgrid-gui-pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            gui.renderer.render(&mut gui_pass, gui.primitives, &gui.screen);
            drop(gui_pass);

            for id in &gui.textures_delta.free {
                gui.renderer.free_texture(id);
            }
        }

        self.queue
            .submit(gui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();
        Ok(())
    }

    /// Texture size currently bound for `index`, placeholder included.
    pub fn slot_texture_size(&self, index: usize) -> Option<(u32, u32)> {
        self.slots.get(index).map(|slot| {
            let size = slot.texture.size();
            (size.width, size.height)
        })
    }
}

impl TextureSink for Renderer {
    /// Replaces the slot's placeholder with the decoded image.
    fn upload_item_texture(&mut self, index: usize, image: &RgbaImage) -> Result<()> {
        let Some(slot) = self.slots.get(index) else {
            bail!("no texture slot {index}");
        };
        check_texture_size(
            image.width(),
            image.height(),
            self.device.limits().max_texture_dimension_2d,
        )?;
        let (texture, bind_group) = self.bind_texture(index, &slot.uniform, image);
        let slot = &mut self.slots[index];
        slot.texture = texture;
        slot.bind_group = bind_group;
        tracing::debug!(
            target: "renderer",
            index,
            width = image.width(),
            height = image.height(),
            "item texture uploaded"
        );
        Ok(())
    }
}

const QUAD_SHADER: &str = r#"
struct ItemUniform {
    translation: vec2<f32>,
    scale: f32,
};

@group(0) @binding(0) var<uniform> item: ItemUniform;
@group(0) @binding(1) var item_texture: texture_2d<f32>;
@group(0) @binding(2) var item_sampler: sampler;

struct VsIn {
    @location(0) position: vec2<f32>,
    @location(1) tex_coords: vec2<f32>,
};

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
};

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    out.position = vec4<f32>(in.position * item.scale + item.translation, 0.0, 1.0);
    out.tex_coords = in.tex_coords;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(item_texture, item_sampler, in.tex_coords);
}
"#;
