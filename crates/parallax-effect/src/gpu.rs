//! Engine-backed implementations of the effect's collaborator traits.

use parallax_engine::core::{AppControl, FrameCtx, WindowCtx};
use parallax_engine::device::Gpu;
use parallax_engine::paint::Color;
use parallax_engine::render::{
    PlaneDraw, PlaneMaterial, PlaneRenderer, QuadRenderer, TextureStore,
};
use winit::dpi::PhysicalSize;

use crate::error::{EffectError, EffectResult};
use crate::links::LinkList;
use crate::render_loop::FrameRenderer;
use crate::scene::Scene;
use crate::viewport::{RenderSurface, ViewportHost, ViewportManager};

const CLEAR: Color = Color {
    r: 0.055,
    g: 0.055,
    b: 0.063,
    a: 1.0,
};

impl ViewportHost for WindowCtx<'_> {
    fn logical_size(&self) -> (f32, f32) {
        WindowCtx::logical_size(self)
    }

    fn pixel_ratio(&self) -> f32 {
        self.scale_factor()
    }
}

impl RenderSurface for Gpu<'_> {
    fn resize_surface(&mut self, width: u32, height: u32) {
        self.resize(PhysicalSize::new(width, height));
    }

    fn surface_size(&self) -> (u32, u32) {
        let size = self.size();
        (size.width, size.height)
    }
}

/// GPU resources that outlive a single frame.
pub(crate) struct GpuResources {
    pub textures: TextureStore,
    pub plane: PlaneRenderer,
    pub quads: QuadRenderer,
}

impl GpuResources {
    pub fn new(device: &wgpu::Device, plane_segments: u32) -> Self {
        Self {
            textures: TextureStore::new(device),
            plane: PlaneRenderer::new(plane_segments),
            quads: QuadRenderer::new(),
        }
    }
}

/// Renders one frame into the window surface.
pub(crate) struct GpuFrameRenderer<'f, 'a, 'w> {
    pub frame: &'f mut FrameCtx<'a, 'w>,
    pub resources: &'f mut GpuResources,
}

impl FrameRenderer<PlaneMaterial> for GpuFrameRenderer<'_, '_, '_> {
    fn render(
        &mut self,
        scene: &Scene<PlaneMaterial>,
        viewport: &ViewportManager,
        links: &LinkList,
    ) -> EffectResult<()> {
        let camera = viewport.camera();
        let surface = RenderSurface::surface_size(&*self.frame.gpu);
        if camera.surface_size != surface {
            return Err(EffectError::StaleViewport {
                camera: camera.surface_size,
                surface,
            });
        }

        let draw = PlaneDraw {
            view_proj: camera.view_projection(),
            model: scene.model_matrix(),
            material: *scene.program(),
        };
        let quads = links.quads();

        let GpuResources {
            textures,
            plane,
            quads: bars,
        } = &mut *self.resources;
        let control = self.frame.render(CLEAR, |ctx, target| {
            plane.render(ctx, target, &draw, textures);
            bars.render(ctx, target, &quads);
        });

        match control {
            AppControl::Continue => Ok(()),
            AppControl::Exit => Err(EffectError::SurfaceLost),
        }
    }
}
