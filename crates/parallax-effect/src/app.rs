use anyhow::Context;
use image::RgbaImage;
use winit::dpi::LogicalSize;

use parallax_engine::coords::Vec2;
use parallax_engine::core::{App as EngineApp, AppControl, FrameCtx, SurfaceCtx};
use parallax_engine::device::{Gpu, GpuInit};
use parallax_engine::input::InputEvent;
use parallax_engine::render::{PlaneMaterial, TextureHandle};
use parallax_engine::window::{Runtime, RuntimeConfig};

use crate::assets::TextureSet;
use crate::config::EffectConfig;
use crate::error::{EffectError, EffectResult};
use crate::gpu::{GpuFrameRenderer, GpuResources};
use crate::links::{HoverEvent, LinkLayout, LinkList};
use crate::render_loop::{CancelToken, LoopState, RenderLoop};
use crate::scene::{Scene, ShaderParameters};
use crate::tracker::InputTracker;
use crate::viewport::ViewportManager;

// ── HoverReveal ───────────────────────────────────────────────────────────

/// Window builder for the reveal effect.
///
/// ```rust,ignore
/// HoverReveal::new()
///     .title("Work")
///     .default_texture(cover)
///     .link_texture(one)
///     .link_texture(two)
///     .run()?;
/// ```
///
/// One link bar is laid out per link texture; hovering bar `i` shows texture `i`.
pub struct HoverReveal {
    title:           String,
    width:           f64,
    height:          f64,
    config:          EffectConfig,
    layout:          LinkLayout,
    default_texture: Option<RgbaImage>,
    link_textures:   Vec<RgbaImage>,
}

impl HoverReveal {
    pub fn new() -> Self {
        Self {
            title:           "parallax".to_string(),
            width:           1280.0,
            height:          720.0,
            config:          EffectConfig::default(),
            layout:          LinkLayout::default(),
            default_texture: None,
            link_textures:   Vec::new(),
        }
    }

    /// Set the window title.
    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.title = t.into();
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width  = width;
        self.height = height;
        self
    }

    pub fn config(mut self, config: EffectConfig) -> Self {
        self.config = config;
        self
    }

    pub fn link_layout(mut self, layout: LinkLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Texture shown before any link is hovered.
    pub fn default_texture(mut self, image: RgbaImage) -> Self {
        self.default_texture = Some(image);
        self
    }

    /// Append a link and the texture it reveals.
    pub fn link_texture(mut self, image: RgbaImage) -> Self {
        self.link_textures.push(image);
        self
    }

    /// Open the window and run until it is closed.
    ///
    /// Fails if no default texture was given or if the window, GPU, or
    /// renderer cannot be created.
    pub fn run(self) -> anyhow::Result<()> {
        let default_texture = self.default_texture.ok_or_else(|| {
            EffectError::InitializationFailure("no default texture was provided".into())
        })?;

        let config = RuntimeConfig {
            title:        self.title,
            initial_size: LogicalSize::new(self.width, self.height),
        };
        let app = HoverRevealApp {
            config:          self.config,
            layout:          self.layout,
            default_texture: Some(default_texture),
            link_textures:   self.link_textures,
            cancel:          CancelToken::new(),
            effect:          None,
            failure:         None,
        };

        Runtime::run(config, GpuInit::default(), app)
    }
}

impl Default for HoverReveal {
    fn default() -> Self {
        Self::new()
    }
}

// ── HoverRevealApp ────────────────────────────────────────────────────────

/// Everything created once the GPU exists.
struct Effect {
    resources:   GpuResources,
    tracker:     InputTracker,
    viewport:    ViewportManager,
    scene:       Scene<PlaneMaterial>,
    links:       LinkList,
    render_loop: RenderLoop,
}

/// Implements `parallax_engine::core::App`; never seen by user code.
struct HoverRevealApp {
    config:          EffectConfig,
    layout:          LinkLayout,
    default_texture: Option<RgbaImage>,
    link_textures:   Vec<RgbaImage>,
    cancel:          CancelToken,
    effect:          Option<Effect>,
    /// Error that ended the render loop, handed to the runtime on exit.
    failure:         Option<EffectError>,
}

impl HoverRevealApp {
    fn start(&mut self, ctx: &mut SurfaceCtx<'_, '_>) -> EffectResult<Effect> {
        let mut resources = GpuResources::new(ctx.gpu.device(), self.config.plane_segments);

        let default_image = self.default_texture.take().ok_or_else(|| {
            EffectError::InitializationFailure("default texture already consumed".into())
        })?;
        let default = upload(&mut resources, ctx.gpu, &default_image)?;
        let links = std::mem::take(&mut self.link_textures)
            .iter()
            .map(|image| upload(&mut resources, ctx.gpu, image))
            .collect::<EffectResult<Vec<_>>>()?;
        let textures = TextureSet::new(default, links);

        let mut viewport = ViewportManager::from_host(&ctx.window, self.config.perspective)?;
        viewport.sync(&ctx.window, &mut *ctx.gpu);

        let scene = Scene::create_mesh(
            self.config.mesh_size,
            ShaderParameters::new(default),
            PlaneMaterial::new(default),
        );
        let links = LinkList::new(textures.len(), self.layout, viewport.descriptor());

        log::info!(
            "renderer ready: {} link textures, surface {:?}",
            textures.len(),
            viewport.camera().surface_size,
        );

        Ok(Effect {
            resources,
            tracker: InputTracker::new(textures),
            viewport,
            scene,
            links,
            render_loop: RenderLoop::new(&self.config, self.cancel.clone()),
        })
    }
}

fn upload(resources: &mut GpuResources, gpu: &Gpu<'_>, image: &RgbaImage) -> EffectResult<TextureHandle> {
    let (w, h) = image.dimensions();
    resources
        .textures
        .upload_rgba8(gpu.device(), gpu.queue(), w, h, image.as_raw())
        .map_err(|e| EffectError::InitializationFailure(format!("texture upload failed: {e:#}")))
}

fn dispatch(tracker: &mut InputTracker, events: Vec<HoverEvent>) {
    for event in events {
        let result = match event {
            HoverEvent::ContainerEnter => {
                tracker.on_hover_enter();
                Ok(())
            }
            HoverEvent::ContainerLeave => {
                tracker.on_hover_leave();
                Ok(())
            }
            HoverEvent::LinkEnter(i) => tracker.on_link_hover_enter(i).map(|_| ()),
            HoverEvent::LinkLeave(i) => tracker.on_link_hover_leave(i),
        };
        if let Err(e) = result {
            log::warn!("hover event {event:?} ignored: {e}");
        }
    }
}

impl EngineApp for HoverRevealApp {
    fn on_start(&mut self, ctx: &mut SurfaceCtx<'_, '_>) -> anyhow::Result<()> {
        let effect = self.start(ctx).context("hover reveal failed to start")?;
        self.effect = Some(effect);
        Ok(())
    }

    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        let Some(effect) = self.effect.as_mut() else {
            return AppControl::Continue;
        };

        match event {
            InputEvent::PointerMoved(p) => {
                effect.tracker.on_pointer_move(p.x, p.y);
                let events = effect.links.hit_test(Vec2::new(p.x, p.y));
                dispatch(&mut effect.tracker, events);
            }
            InputEvent::PointerLeft => {
                let events = effect.links.pointer_left();
                dispatch(&mut effect.tracker, events);
            }
            InputEvent::Focused(focused) => {
                log::debug!("window focused: {focused}");
            }
        }

        AppControl::Continue
    }

    fn on_resize(&mut self, ctx: &mut SurfaceCtx<'_, '_>) {
        let Some(effect) = self.effect.as_mut() else {
            let size = ctx.window.window.inner_size();
            ctx.gpu.resize(size);
            return;
        };

        if effect.viewport.sync(&ctx.window, &mut *ctx.gpu) {
            let events = effect.links.relayout(effect.viewport.descriptor());
            dispatch(&mut effect.tracker, events);
        }
    }

    fn on_close_requested(&mut self) -> AppControl {
        log::info!("close requested");
        self.cancel.cancel();
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(effect) = self.effect.as_mut() else {
            return AppControl::Exit;
        };

        let Effect {
            resources,
            tracker,
            viewport,
            scene,
            links,
            render_loop,
        } = effect;

        let mut renderer = GpuFrameRenderer {
            frame: &mut *ctx,
            resources,
        };
        match render_loop.tick(tracker, viewport, scene, links, &mut renderer) {
            Err(e @ EffectError::StaleViewport { .. }) => {
                log::warn!("{e}; frame skipped, resyncing viewport");
                if viewport.sync(&ctx.window, &mut *ctx.gpu) {
                    let events = links.relayout(viewport.descriptor());
                    dispatch(tracker, events);
                }
                AppControl::Continue
            }
            other => settle(other, &mut self.failure),
        }
    }

    fn take_error(&mut self) -> Option<anyhow::Error> {
        self.failure
            .take()
            .map(|e| anyhow::Error::new(e).context("render loop failed"))
    }
}

/// Maps a tick outcome to the runtime directive, keeping any error for
/// `take_error`.
fn settle(result: EffectResult<LoopState>, failure: &mut Option<EffectError>) -> AppControl {
    match result {
        Ok(LoopState::Running) => AppControl::Continue,
        Ok(LoopState::Stopped) => AppControl::Exit,
        Err(e) => {
            log::error!("render loop failed: {e}");
            *failure = Some(e);
            AppControl::Exit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::ViewportDescriptor;

    fn h(raw: u32) -> TextureHandle {
        TextureHandle::from_raw(raw)
    }

    fn centre(r: parallax_engine::coords::Rect) -> Vec2 {
        Vec2::new(r.origin.x + r.size.x / 2.0, r.origin.y + r.size.y / 2.0)
    }

    fn app() -> HoverRevealApp {
        HoverRevealApp {
            config:          EffectConfig::default(),
            layout:          LinkLayout::default(),
            default_texture: None,
            link_textures:   Vec::new(),
            cancel:          CancelToken::new(),
            effect:          None,
            failure:         None,
        }
    }

    // ── dispatch ──────────────────────────────────────────────────────────

    #[test]
    fn hover_events_drive_tracker() {
        let viewport = ViewportDescriptor::new(1000.0, 1000.0, 1.0, 1000.0);
        let mut links = LinkList::new(4, LinkLayout::default(), &viewport);
        // Only links 0 and 1 have textures.
        let mut tracker = InputTracker::new(TextureSet::new(h(9), vec![h(0), h(1)]));

        dispatch(&mut tracker, links.hit_test(centre(links.rects()[1])));
        assert!(tracker.hover().active);
        assert_eq!(tracker.active_texture(), h(1));

        // Link 3 is out of range: logged, texture kept, hover still tracked.
        dispatch(&mut tracker, links.hit_test(centre(links.rects()[3])));
        assert!(tracker.hover().active);
        assert_eq!(tracker.active_texture(), h(1));
        assert_eq!(tracker.take_snapshot().fade_nudges, 1);

        dispatch(&mut tracker, links.hit_test(Vec2::new(5.0, 5.0)));
        assert!(!tracker.hover().active);
        assert_eq!(tracker.active_texture(), h(1));
    }

    #[test]
    fn resize_away_from_pointer_clears_tracker_hover() {
        let mut links = LinkList::new(4, LinkLayout::default(), &ViewportDescriptor::new(1000.0, 1000.0, 1.0, 1000.0));
        let mut tracker = InputTracker::new(TextureSet::new(h(9), vec![h(0), h(1), h(2), h(3)]));

        dispatch(&mut tracker, links.hit_test(Vec2::new(700.0, 356.0)));
        assert!(tracker.hover().active);

        dispatch(&mut tracker, links.relayout(&ViewportDescriptor::new(400.0, 1000.0, 1.0, 1000.0)));
        assert!(!tracker.hover().active);
    }

    // ── exit ──────────────────────────────────────────────────────────────

    #[test]
    fn loop_outcomes_map_to_directives() {
        let mut failure = None;
        assert_eq!(settle(Ok(LoopState::Running), &mut failure), AppControl::Continue);
        assert_eq!(settle(Ok(LoopState::Stopped), &mut failure), AppControl::Exit);
        assert!(failure.is_none());
    }

    #[test]
    fn lost_surface_is_reported_to_runtime() {
        let mut app = app();
        assert_eq!(settle(Err(EffectError::SurfaceLost), &mut app.failure), AppControl::Exit);

        let err = app.take_error().expect("error kept for the runtime");
        assert!(format!("{err:#}").contains("rendering surface lost"), "{err:#}");
        assert!(app.take_error().is_none());
    }

    #[test]
    fn clean_close_reports_no_error() {
        let mut app = app();
        assert_eq!(app.on_close_requested(), AppControl::Continue);
        assert!(app.cancel.is_cancelled());
        assert!(app.take_error().is_none());
    }
}
