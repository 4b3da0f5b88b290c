use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::coords::Vec2;
use crate::render::{RenderCtx, RenderTarget, TextureHandle, TextureStore};

use super::common::{premul_alpha_blend, triangle_list, uniform_layout_entry};

/// The three named parameters the plane program accepts.
///
/// `alpha` blends the output; `offset` bends the plane, most strongly at its
/// centre; `texture` selects the sampled image.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlaneMaterial {
    pub texture: TextureHandle,
    pub alpha: f32,
    pub offset: Vec2,
}

impl PlaneMaterial {
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture,
            alpha: 0.0,
            offset: Vec2::zero(),
        }
    }
}

/// Everything needed to draw the plane for one frame.
#[derive(Debug, Copy, Clone)]
pub struct PlaneDraw {
    pub view_proj: Mat4,
    pub model: Mat4,
    pub material: PlaneMaterial,
}

/// Textured, subdivided plane renderer.
///
/// The plane is a unit quad centred on the origin (+Y up) split into
/// `segments x segments` cells so the vertex shader can bend it.
pub struct PlaneRenderer {
    segments: u32,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    uniform_layout: Option<wgpu::BindGroupLayout>,
    uniform_bind_group: Option<wgpu::BindGroup>,
    uniform_buffer: Option<wgpu::Buffer>,

    vbo: Option<wgpu::Buffer>,
    ibo: Option<wgpu::Buffer>,
    index_count: u32,

    warned_missing_texture: bool,
}

impl PlaneRenderer {
    pub fn new(segments: u32) -> Self {
        Self {
            segments: segments.clamp(1, MAX_SEGMENTS),
            pipeline_format: None,
            pipeline: None,
            uniform_layout: None,
            uniform_bind_group: None,
            uniform_buffer: None,
            vbo: None,
            ibo: None,
            index_count: 0,
            warned_missing_texture: false,
        }
    }

    /// Draws the plane over the current contents of `target`.
    ///
    /// A fully transparent material is skipped. An unknown texture handle
    /// skips the draw with a one-time warning.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw: &PlaneDraw,
        textures: &TextureStore,
    ) {
        if draw.material.alpha <= 0.0 {
            return;
        }

        let Some(texture_bg) = textures.bind_group(draw.material.texture) else {
            if !self.warned_missing_texture {
                log::warn!("PlaneRenderer: unknown texture {:?}; draw skipped", draw.material.texture);
                self.warned_missing_texture = true;
            }
            return;
        };

        self.ensure_pipeline(ctx, textures.layout());
        self.ensure_geometry(ctx);
        self.ensure_uniform(ctx);

        let u = PlaneUniform {
            view_proj: draw.view_proj.to_cols_array_2d(),
            model: draw.model.to_cols_array_2d(),
            offset: draw.material.offset.to_array(),
            alpha: draw.material.alpha.clamp(0.0, 1.0),
            _pad: 0.0,
        };

        let Some(uniform_buffer) = self.uniform_buffer.as_ref() else { return };
        ctx.queue.write_buffer(uniform_buffer, 0, bytemuck::bytes_of(&u));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(uniform_bg) = self.uniform_bind_group.as_ref() else { return };
        let Some(vbo) = self.vbo.as_ref() else { return };
        let Some(ibo) = self.ibo.as_ref() else { return };

        let mut rpass = target.begin_load_pass("parallax plane pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, uniform_bg, &[]);
        rpass.set_bind_group(1, texture_bg, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, texture_layout: &wgpu::BindGroupLayout) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("parallax plane shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/plane.wgsl").into()),
        });

        let uniform_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("parallax plane uniform bgl"),
            entries: &[uniform_layout_entry::<PlaneUniform>(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("parallax plane pipeline layout"),
            bind_group_layouts: &[&uniform_layout, texture_layout],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("parallax plane pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[PlaneVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: triangle_list(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.uniform_layout = Some(uniform_layout);

        // Bind group depends on the layout; rebuild it.
        self.uniform_bind_group = None;
        self.uniform_buffer = None;
    }

    fn ensure_uniform(&mut self, ctx: &RenderCtx<'_>) {
        if self.uniform_bind_group.is_some() && self.uniform_buffer.is_some() {
            return;
        }
        let Some(layout) = self.uniform_layout.as_ref() else { return };

        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("parallax plane ubo"),
            size: std::mem::size_of::<PlaneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("parallax plane uniform bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        self.uniform_buffer = Some(buffer);
        self.uniform_bind_group = Some(bind_group);
    }

    fn ensure_geometry(&mut self, ctx: &RenderCtx<'_>) {
        if self.vbo.is_some() && self.ibo.is_some() {
            return;
        }

        let (vertices, indices) = plane_geometry(self.segments);

        self.vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("parallax plane vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("parallax plane ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
        self.index_count = indices.len() as u32;
    }
}

/// Upper bound keeping the vertex count inside `u16` indices.
const MAX_SEGMENTS: u32 = 128;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PlaneUniform {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    offset: [f32; 2],
    alpha: f32,
    _pad: f32, // 16-byte alignment
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct PlaneVertex {
    pos: [f32; 2], // -0.5..0.5, +Y up
    uv: [f32; 2],  // 0..1, +V down
}

impl PlaneVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2  // uv
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PlaneVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Builds a unit plane grid, row by row from the top edge.
fn plane_geometry(segments: u32) -> (Vec<PlaneVertex>, Vec<u16>) {
    let s = segments.clamp(1, MAX_SEGMENTS);
    let row = s + 1;

    let mut vertices = Vec::with_capacity((row * row) as usize);
    for iy in 0..=s {
        let v = iy as f32 / s as f32;
        for ix in 0..=s {
            let u = ix as f32 / s as f32;
            vertices.push(PlaneVertex {
                pos: [u - 0.5, 0.5 - v],
                uv: [u, v],
            });
        }
    }

    let mut indices = Vec::with_capacity((s * s * 6) as usize);
    for iy in 0..s {
        for ix in 0..s {
            let a = (ix + row * iy) as u16;
            let b = (ix + row * (iy + 1)) as u16;
            let c = (ix + 1 + row * (iy + 1)) as u16;
            let d = (ix + 1 + row * iy) as u16;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<PlaneUniform>() % 16, 0);
    }

    #[test]
    fn geometry_counts_match_segments() {
        let (v, i) = plane_geometry(20);
        assert_eq!(v.len(), 21 * 21);
        assert_eq!(i.len(), 20 * 20 * 6);
        assert!(i.iter().all(|&ix| (ix as usize) < v.len()));
    }

    #[test]
    fn geometry_spans_unit_square_with_top_left_uv() {
        let (v, _) = plane_geometry(4);
        let first = v[0];
        let last = v[v.len() - 1];
        assert_eq!(first.pos, [-0.5, 0.5]);
        assert_eq!(first.uv, [0.0, 0.0]);
        assert_eq!(last.pos, [0.5, -0.5]);
        assert_eq!(last.uv, [1.0, 1.0]);
    }

    #[test]
    fn segments_are_clamped_into_u16_range() {
        let (v, _) = plane_geometry(10_000);
        assert_eq!(v.len(), ((MAX_SEGMENTS + 1) * (MAX_SEGMENTS + 1)) as usize);
        assert!(v.len() <= u16::MAX as usize);
    }
}
