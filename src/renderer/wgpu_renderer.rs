use crate::assets::{IconSet, Shade, ICON_SIZE};
use crate::board::{Highlights, DEFAULT_SQUARE_SIZE};
use crate::position::{Piece, Position, Square, COLS, ROWS};
use crate::renderer::Renderer;
use image::RgbaImage;
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

// WGSL Shaders

const SQUARE_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.clip_position = vec4<f32>(input.position, 0.0, 1.0);
    output.color = input.color;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return input.color;
}
"#;

const ICON_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) tex_coords: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
}

@group(0) @binding(0)
var texture: texture_2d<f32>;
@group(0) @binding(1)
var texture_sampler: sampler;

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.clip_position = vec4<f32>(input.position, 0.0, 1.0);
    output.tex_coords = input.tex_coords;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(texture, texture_sampler, input.tex_coords);
}
"#;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SquareVertex {
    position: [f32; 2],
    color: [f32; 4],
}

impl SquareVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SquareVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct IconVertex {
    position: [f32; 2],
    tex_coords: [f32; 2],
}

impl IconVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<IconVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Color of the window area outside the tiled board.
const BACKDROP: wgpu::Color = wgpu::Color {
    r: 0.12,
    g: 0.12,
    b: 0.12,
    a: 1.0,
};

/// Pixel-space top-left corner of a square. The board is anchored at the
/// window's top-left corner.
fn square_origin(square: Square, square_size: u32) -> (f32, f32) {
    (
        (square.col as u32 * square_size) as f32,
        (square.row as u32 * square_size) as f32,
    )
}

/// Pixel-space top-left corner of the fixed-size icon centered in a square.
fn icon_origin(square: Square, square_size: u32) -> (f32, f32) {
    let inset = (square_size as f32 - ICON_SIZE as f32) / 2.0;
    let (x, y) = square_origin(square, square_size);
    (x + inset, y + inset)
}

/// Convert a pixel coordinate (origin top-left, y down) to normalized device
/// coordinates (origin center, y up).
fn to_ndc(window_size: (u32, u32), x: f32, y: f32) -> (f32, f32) {
    (
        x / window_size.0 as f32 * 2.0 - 1.0,
        1.0 - y / window_size.1 as f32 * 2.0,
    )
}

/// The linear-space color the square pipeline writes for a shade.
///
/// The surface format is sRGB and the icon textures are sampled as sRGB, so
/// flat squares have to be linearized by hand to land on the same on-screen
/// values as the icon backgrounds.
fn linear_color(shade: Shade) -> [f32; 4] {
    let srgb = shade.rgba();
    let channel = |c: u8| {
        let c = c as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(srgb[0]), channel(srgb[1]), channel(srgb[2]), 1.0]
}

pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    square_pipeline: wgpu::RenderPipeline,
    icon_pipeline: wgpu::RenderPipeline,

    index_buffer: wgpu::Buffer,

    icon_textures: HashMap<(Shade, Piece), (wgpu::Texture, wgpu::TextureView, wgpu::BindGroup)>,
    sampler: wgpu::Sampler,

    window_size: (u32, u32),
}

impl WgpuRenderer {
    pub async fn new(window: Arc<Window>, icons: &IconSet) -> Self {
        let mut window_size = window.inner_size();

        // Some platforms report 0x0 before the first configure event
        if window_size.width == 0 || window_size.height == 0 {
            window_size.width = COLS as u32 * DEFAULT_SQUARE_SIZE;
            window_size.height = ROWS as u32 * DEFAULT_SQUARE_SIZE;
        }

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: None,
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .unwrap();

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
            width: window_size.width,
            height: window_size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Create shaders
        let square_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Square Shader"),
            source: wgpu::ShaderSource::Wgsl(SQUARE_SHADER.into()),
        });

        let icon_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Icon Shader"),
            source: wgpu::ShaderSource::Wgsl(ICON_SHADER.into()),
        });

        // Create texture bind group layout
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some("texture_bind_group_layout"),
            });

        // Create pipelines
        let square_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Square Pipeline Layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });

        let square_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Square Pipeline"),
            layout: Some(&square_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &square_shader,
                entry_point: Some("vs_main"),
                buffers: &[SquareVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &square_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let icon_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Icon Pipeline Layout"),
                bind_group_layouts: &[&texture_bind_group_layout],
                push_constant_ranges: &[],
            });

        let icon_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Icon Pipeline"),
            layout: Some(&icon_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &icon_shader,
                entry_point: Some("vs_main"),
                buffers: &[IconVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &icon_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        // Create index buffer (shared across all quads)
        // Counter-clockwise winding: top-left, bottom-left, top-right, then top-right, bottom-left, bottom-right
        let indices: [u16; 6] = [0, 2, 1, 1, 2, 3];
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        // Create sampler
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let mut renderer = Self {
            surface,
            device,
            queue,
            config,
            square_pipeline,
            icon_pipeline,
            index_buffer,
            icon_textures: HashMap::new(),
            sampler,
            window_size: (window_size.width, window_size.height),
        };

        renderer.upload_icons(icons);
        renderer
    }

    /// Upload every composited icon bitmap to the GPU. The full key set is
    /// known up front, so all 36 textures are created here once instead of
    /// lazily during drawing.
    fn upload_icons(&mut self, icons: &IconSet) {
        for (&(shade, piece), img) in icons.iter() {
            let entry = self.upload_icon(shade, piece, img);
            self.icon_textures.insert((shade, piece), entry);
        }
        log::debug!("uploaded {} icon textures", self.icon_textures.len());
    }

    fn upload_icon(
        &self,
        shade: Shade,
        piece: Piece,
        img: &RgbaImage,
    ) -> (wgpu::Texture, wgpu::TextureView, wgpu::BindGroup) {
        let label = format!("{:?} {}", shade, piece);
        let dimensions = img.dimensions();

        let texture_size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{} Texture", label)),
            size: texture_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            img,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimensions.0),
                rows_per_image: Some(dimensions.1),
            },
            texture_size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.icon_pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
            label: Some(&format!("{} Bind Group", label)),
        });

        (texture, view, bind_group)
    }

    fn create_square_quad(&self, square: Square, shade: Shade, square_size: u32) -> [SquareVertex; 4] {
        let (x, y) = square_origin(square, square_size);
        let size = square_size as f32;
        let color = linear_color(shade);

        let (left, top) = to_ndc(self.window_size, x, y);
        let (right, bottom) = to_ndc(self.window_size, x + size, y + size);

        [
            SquareVertex { position: [left, top], color },
            SquareVertex { position: [right, top], color },
            SquareVertex { position: [left, bottom], color },
            SquareVertex { position: [right, bottom], color },
        ]
    }

    fn create_icon_quad(&self, square: Square, square_size: u32) -> [IconVertex; 4] {
        let (x, y) = icon_origin(square, square_size);
        let size = ICON_SIZE as f32;

        let (left, top) = to_ndc(self.window_size, x, y);
        let (right, bottom) = to_ndc(self.window_size, x + size, y + size);

        [
            IconVertex { position: [left, top], tex_coords: [0.0, 0.0] },
            IconVertex { position: [right, top], tex_coords: [1.0, 0.0] },
            IconVertex { position: [left, bottom], tex_coords: [0.0, 1.0] },
            IconVertex { position: [right, bottom], tex_coords: [1.0, 1.0] },
        ]
    }
}

impl Renderer for WgpuRenderer {
    fn draw_board(&mut self, position: &Position, highlights: &Highlights, square_size: u32) {
        let output = self.surface.get_current_texture().unwrap();
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKDROP),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // Draw squares
            render_pass.set_pipeline(&self.square_pipeline);
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

            for square in Square::all() {
                let shade = Shade::of_square(square, highlights.is_set(square));
                let vertices = self.create_square_quad(square, shade, square_size);

                let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Square Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });

                render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                render_pass.draw_indexed(0..6, 0, 0..1);
            }

            // Draw piece icons, keyed by the shade under them so the opaque
            // icon background matches the square exactly
            render_pass.set_pipeline(&self.icon_pipeline);

            for square in Square::all() {
                if let Some(piece) = position[square] {
                    let shade = Shade::of_square(square, highlights.is_set(square));
                    let (_, _, bind_group) = &self.icon_textures[&(shade, piece)];
                    let vertices = self.create_icon_quad(square, square_size);

                    let vertex_buffer =
                        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("Icon Vertex Buffer"),
                            contents: bytemuck::cast_slice(&vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        });

                    render_pass.set_bind_group(0, bind_group, &[]);
                    render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                    render_pass.draw_indexed(0..6, 0, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn resize(&mut self, new_size: (u32, u32)) {
        if new_size.0 > 0 && new_size.1 > 0 {
            self.window_size = new_size;
            self.config.width = new_size.0;
            self.config.height = new_size.1;
            self.surface.configure(&self.device, &self.config);
        }
    }
}
