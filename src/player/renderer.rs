//! Video surface renderer
//!
//! Builds the mesh and shader for one (layout, format) pair at construction
//! and draws the current video frame once per eye.

use wgpu::util::DeviceExt;

use super::error::RendererError;
use super::eye::{self, Eye, EyeWindows, TexCoordWindow};
use super::mesh::{Mesh, MeshVertex};
use super::props::{EyeUniforms, RenderProps};
use super::shader::{ShaderProgram, FRAGMENT_ENTRY, VERTEX_ENTRY};
use super::types::{Format, Layout};

/// Destination surface of a draw
#[derive(Clone, Copy)]
pub struct RenderTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl<'a> RenderTarget<'a> {
    pub fn new(view: &'a wgpu::TextureView, width: u32, height: u32) -> Self {
        Self {
            view,
            width,
            height,
        }
    }
}

/// Draws a video texture onto the quad or sphere for a fixed layout and format
///
/// Each eye owns one slot of a dynamic uniform buffer, so a left and a right
/// draw recorded into the same submission keep their own matrices and window.
/// Drawing the same eye twice before submitting shows the later uniforms in
/// both draws.
pub struct Renderer {
    layout: Layout,
    format: Format,
    windows: EyeWindows,

    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,

    // Per-eye uniforms, one aligned slot per eye
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,

    // Video texture + sampler, bound per draw
    texture_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    // Mesh buffers
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Renderer {
    /// Create a renderer drawing into surfaces of `target_format`
    ///
    /// Fails if the shader does not compile or link, or if GPU resources
    /// cannot be allocated. No partially built renderer is returned.
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        layout: Layout,
        format: Format,
    ) -> Result<Self, RendererError> {
        let mesh = Mesh::for_format(format);
        let program = ShaderProgram::compile(device, format)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        // Bind group 0: per-eye uniforms (dynamic offset)
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Player Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(EyeUniforms::SIZE),
                    },
                    count: None,
                }],
            });

        // Bind group 1: [0] video texture, [1] sampler
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Player Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
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
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Player Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Player Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: program.module(),
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[MeshVertex::buffer_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: program.module(),
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // The viewer sits inside the sphere; the 180° rear half is
                // masked in the fragment stage instead
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = EyeUniforms::SIZE.div_ceil(alignment) * alignment;
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Player Eye Uniform Buffer"),
            size: uniform_stride * Eye::BOTH.len() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Player Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(EyeUniforms::SIZE),
                }),
            }],
        });

        // Clamp so the 180° stretch and half-frame windows never bleed across edges
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Player Video Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Player Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Player Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        let out_of_memory = pollster::block_on(device.pop_error_scope());
        let validation = pollster::block_on(device.pop_error_scope());
        if let Some(error) = out_of_memory {
            return Err(RendererError::ResourceAllocation(error.to_string()));
        }
        if let Some(error) = validation {
            return Err(RendererError::ShaderCompilation(error.to_string()));
        }

        tracing::info!(
            "Player renderer ready: format={}, layout={}, {} vertices, {} triangles",
            format,
            layout,
            mesh.vertex_count(),
            mesh.cells.len()
        );

        Ok(Self {
            layout,
            format,
            windows: EyeWindows::for_layout(layout),
            program,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            texture_bind_group_layout,
            sampler,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
        })
    }

    /// Record one indexed draw of the video surface for an eye
    ///
    /// Writes only inside `props.transforms.viewport` and keeps whatever the
    /// target already holds elsewhere. Invalid props are rejected before any
    /// GPU state is touched; errors the GPU raises while recording (such as a
    /// destroyed texture view) come back as [`RendererError::DrawFailed`].
    pub fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &RenderTarget<'_>,
        props: &RenderProps<'_>,
        eye: Eye,
    ) -> Result<(), RendererError> {
        let transforms = &props.transforms;
        transforms.validate(target.width, target.height)?;

        let offset = eye.index() as u64 * self.uniform_stride;
        queue.write_buffer(
            &self.uniform_buffer,
            offset,
            bytemuck::bytes_of(&EyeUniforms::from(transforms)),
        );

        // GPU-side failures (e.g. a destroyed texture) are returned, not only logged
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Player Texture Bind Group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(props.texture),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Player Eye Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let viewport = transforms.viewport;
            render_pass.set_viewport(
                viewport.x as f32,
                viewport.y as f32,
                viewport.width as f32,
                viewport.height as f32,
                0.0,
                1.0,
            );
            render_pass.set_scissor_rect(viewport.x, viewport.y, viewport.width, viewport.height);

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[offset as u32]);
            render_pass.set_bind_group(1, &texture_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.index_count, 0, 0..1);
        }

        RendererError::from_draw_scope(pollster::block_on(device.pop_error_scope()))
    }

    /// Record a pass clearing the whole target
    pub fn clear(encoder: &mut wgpu::CommandEncoder, target: &RenderTarget<'_>, color: wgpu::Color) {
        let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Player Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    /// Layout fixed at construction
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Format fixed at construction
    pub fn format(&self) -> Format {
        self.format
    }

    /// Both eyes' sampling windows
    pub fn tex_coord_windows(&self) -> EyeWindows {
        self.windows
    }

    /// Sampling window for one eye
    pub fn window_for(&self, eye: Eye) -> TexCoordWindow {
        self.windows.for_eye(eye)
    }

    /// Per-eye aspect ratio of a video of the given size
    pub fn aspect_ratio(&self, video_width: u32, video_height: u32) -> Option<f32> {
        eye::try_aspect_ratio(self.layout, video_width, video_height)
    }

    /// Number of indices drawn per call
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// The compiled shader program
    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }
}
