//! wgpu consumer of the ring pool and trail lines.
//!
//! Each ring attribute lives in its own vertex buffer so a flush only writes
//! the dirty element range of each array.

use crate::rings::{RingAttribute, RingEventBuffer, RingUpload};
use crate::trails::TrailLineBuffer;
use crate::{RINGS_WGSL, TRAILS_WGSL};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniforms {
    resolution: [f32; 2],
    time: f32,
    pad: f32,
}

const START_POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const VELOCITY_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];
const DIRECTION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x2];
const START_TIME_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32];
const TRAIL_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

fn attribute_label(attr: RingAttribute) -> &'static str {
    match attr {
        RingAttribute::StartPosition => "ring start_position",
        RingAttribute::Velocity => "ring velocity",
        RingAttribute::Direction => "ring direction",
        RingAttribute::StartTime => "ring start_time",
    }
}

pub struct RingsRenderer {
    ring_pipeline: wgpu::RenderPipeline,
    trail_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    // RingAttribute::ALL order
    attribute_buffers: [wgpu::Buffer; 4],
    index_buffer: wgpu::Buffer,
    index_count: u32,
    trail_vb: wgpu::Buffer,
    trail_vertices: u32,
    clear_color: wgpu::Color,
}

impl RingsRenderer {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        rings: &RingEventBuffer,
        trails: &TrailLineBuffer,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("rings pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let attribute_buffers = RingAttribute::ALL.map(|attr| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(attribute_label(attr)),
                contents: rings.attribute_bytes(attr),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ring indices"),
            contents: bytemuck::cast_slice(rings.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        let trail_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("trail lines"),
            size: trails.capacity_bytes() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let ring_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("rings shader"),
            source: wgpu::ShaderSource::Wgsl(RINGS_WGSL.into()),
        });
        let trail_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("trails shader"),
            source: wgpu::ShaderSource::Wgsl(TRAILS_WGSL.into()),
        });

        let float2 = std::mem::size_of::<[f32; 2]>() as u64;
        let float1 = std::mem::size_of::<f32>() as u64;
        let ring_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: float2,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &START_POSITION_ATTRS,
            },
            wgpu::VertexBufferLayout {
                array_stride: float2,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &VELOCITY_ATTRS,
            },
            wgpu::VertexBufferLayout {
                array_stride: float2,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &DIRECTION_ATTRS,
            },
            wgpu::VertexBufferLayout {
                array_stride: float1,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &START_TIME_ATTRS,
            },
        ];
        let trail_buffers = [wgpu::VertexBufferLayout {
            array_stride: float2,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &TRAIL_ATTRS,
        }];

        let ring_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &ring_shader,
            &ring_buffers,
            wgpu::PrimitiveTopology::TriangleList,
            format,
            "rings pipeline",
        );
        let trail_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &trail_shader,
            &trail_buffers,
            wgpu::PrimitiveTopology::LineList,
            format,
            "trails pipeline",
        );

        log::info!(
            "[gpu] ring buffers ready: {} vertices, {} indices",
            rings.vertex_count(),
            rings.indices().len()
        );

        Self {
            ring_pipeline,
            trail_pipeline,
            uniform_buffer,
            bind_group,
            attribute_buffers,
            index_buffer,
            index_count: rings.indices().len() as u32,
            trail_vb,
            trail_vertices: 0,
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
        }
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    /// Writes the flushed ring ranges and the used part of the trail buffer.
    pub fn upload(
        &mut self,
        queue: &wgpu::Queue,
        rings: &mut RingEventBuffer,
        trails: &TrailLineBuffer,
    ) -> Option<RingUpload> {
        let upload = rings.flush();
        if let Some(up) = upload {
            for (attr, buffer) in RingAttribute::ALL.iter().zip(&self.attribute_buffers) {
                let bytes = rings.attribute_bytes(*attr);
                let range = up.range(*attr).bytes(rings.attribute_len(*attr));
                if range.is_empty() {
                    continue;
                }
                let offset = range.start as u64;
                queue.write_buffer(buffer, offset, &bytes[range]);
            }
            log::trace!("[gpu] ring upload {:?}", up.start_time.as_offset_count());
        }

        self.trail_vertices = trails.draw_range().end;
        let trail_bytes = trails.as_bytes();
        if !trail_bytes.is_empty() {
            queue.write_buffer(&self.trail_vb, 0, trail_bytes);
        }
        upload
    }

    /// Clears `view` and draws rings then trails. `resolution` is the size in
    /// pixels of the space input positions are expressed in.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        resolution: [f32; 2],
        time: f32,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms {
                resolution,
                time,
                pad: 0.0,
            }),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("rings encoder"),
        });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rings pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.bind_group, &[]);

            rpass.set_pipeline(&self.ring_pipeline);
            for (slot, buffer) in self.attribute_buffers.iter().enumerate() {
                rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
            }
            rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..self.index_count, 0, 0..1);

            if self.trail_vertices > 0 {
                rpass.set_pipeline(&self.trail_pipeline);
                rpass.set_vertex_buffer(0, self.trail_vb.slice(..));
                rpass.draw(0..self.trail_vertices, 0..1);
            }
        }
        queue.submit(Some(encoder.finish()));
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    buffers: &[wgpu::VertexBufferLayout],
    topology: wgpu::PrimitiveTopology,
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}
