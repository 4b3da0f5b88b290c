//! Per-frame orchestration of tracker, smoothing, scene and links.

use std::cell::Cell;
use std::rc::Rc;

use parallax_engine::coords::Vec2;

use crate::config::EffectConfig;
use crate::error::EffectResult;
use crate::links::LinkList;
use crate::scene::{Scene, ShaderProgram};
use crate::smoothing::lerp;
use crate::tracker::InputTracker;
use crate::viewport::ViewportManager;

/// Lifecycle of the render loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// The host should schedule another tick.
    Running,
    /// Terminal; further ticks do nothing.
    Stopped,
}

/// Shared stop flag, checked at the start of every tick.
///
/// Clones observe the same flag. Single-threaded like the loop itself.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Submits one frame of the scene through the camera.
pub trait FrameRenderer<P> {
    fn render(
        &mut self,
        scene: &Scene<P>,
        viewport: &ViewportManager,
        links: &LinkList,
    ) -> EffectResult<()>;
}

/// Smoothed state that persists across ticks.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    damping: f32,
    drag_scale: f32,
    dimmed_link_opacity: f32,
    cancel: CancelToken,
    state: LoopState,
    offset: Vec2,
    alpha: f32,
    ticks: u64,
}

impl RenderLoop {
    /// A running loop with the mesh at the origin and alpha at zero.
    pub fn new(config: &EffectConfig, cancel: CancelToken) -> Self {
        Self {
            damping: config.damping,
            drag_scale: config.drag_scale,
            dimmed_link_opacity: config.dimmed_link_opacity,
            cancel,
            state: LoopState::Running,
            offset: Vec2::zero(),
            alpha: 0.0,
            ticks: 0,
        }
    }

    /// Advances one frame and submits it to `renderer`.
    ///
    /// Returns `Stopped` without rendering once the cancel token is set. A
    /// renderer error is returned as is; the smoothed state has already
    /// advanced and the loop stays `Running`.
    pub fn tick<P, R>(
        &mut self,
        tracker: &mut InputTracker,
        viewport: &ViewportManager,
        scene: &mut Scene<P>,
        links: &mut LinkList,
        renderer: &mut R,
    ) -> EffectResult<LoopState>
    where
        P: ShaderProgram,
        R: FrameRenderer<P>,
    {
        if self.state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }
        if self.cancel.is_cancelled() {
            self.state = LoopState::Stopped;
            log::info!("render loop stopped after {} ticks", self.ticks);
            return Ok(LoopState::Stopped);
        }

        let input = tracker.take_snapshot();
        let target = Vec2::new(input.pointer.target_x, input.pointer.target_y);
        let t = self.damping;

        self.offset = Vec2::new(
            lerp(self.offset.x, target.x, t),
            lerp(self.offset.y, target.y, t),
        );

        let drag = Vec2::new(
            (target.x - self.offset.x) * self.drag_scale,
            -(target.y - self.offset.y) * self.drag_scale,
        );

        for _ in 0..input.fade_nudges {
            self.alpha = lerp(self.alpha, 0.0, t);
        }
        let alpha_target = if input.hover.active { 1.0 } else { 0.0 };
        self.alpha = lerp(self.alpha, alpha_target, t).clamp(0.0, 1.0);

        scene.update_parameters(self.alpha, drag, input.texture);
        scene.set_position(self.offset.x, self.offset.y, viewport.descriptor());

        links.set_all_opacity(if input.hover.active {
            self.dimmed_link_opacity
        } else {
            1.0
        });

        log::trace!(
            "tick {}: offset ({:.2}, {:.2}) drag ({:.5}, {:.5}) alpha {:.4}",
            self.ticks,
            self.offset.x,
            self.offset.y,
            drag.x,
            drag.y,
            self.alpha,
        );
        self.ticks += 1;

        renderer.render(scene, viewport, links)?;
        Ok(LoopState::Running)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Mesh position in pointer space.
    pub fn smoothed_offset(&self) -> Vec2 {
        self.offset
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::TextureSet;
    use crate::error::EffectError;
    use crate::links::LinkLayout;
    use crate::scene::{ShaderParameters, to_render_space};
    use parallax_engine::render::TextureHandle;

    #[derive(Debug, Default)]
    struct NullProgram;

    impl ShaderProgram for NullProgram {
        fn set_parameters(&mut self, _: f32, _: Vec2, _: TextureHandle) {}
    }

    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<(ShaderParameters, Vec2)>,
        fail_with: Option<EffectError>,
    }

    impl FrameRenderer<NullProgram> for RecordingRenderer {
        fn render(
            &mut self,
            scene: &Scene<NullProgram>,
            _viewport: &ViewportManager,
            _links: &LinkList,
        ) -> EffectResult<()> {
            if let Some(err) = self.fail_with.clone() {
                return Err(err);
            }
            self.frames.push((*scene.parameters(), scene.mesh().position));
            Ok(())
        }
    }

    struct Rig {
        lp: RenderLoop,
        tracker: InputTracker,
        viewport: ViewportManager,
        scene: Scene<NullProgram>,
        links: LinkList,
        renderer: RecordingRenderer,
        cancel: CancelToken,
    }

    impl Rig {
        fn new() -> Self {
            let config = EffectConfig::default();
            let handles = (0..4).map(TextureHandle::from_raw).collect();
            let textures = TextureSet::new(TextureHandle::from_raw(99), handles);
            let viewport = ViewportManager::new(1000.0, 800.0, 1.0, config.perspective).unwrap();
            let scene = Scene::create_mesh(
                config.mesh_size,
                ShaderParameters::new(textures.default_texture()),
                NullProgram,
            );
            let links = LinkList::new(4, LinkLayout::default(), viewport.descriptor());
            let cancel = CancelToken::new();
            Self {
                lp: RenderLoop::new(&config, cancel.clone()),
                tracker: InputTracker::new(textures),
                viewport,
                scene,
                links,
                renderer: RecordingRenderer::default(),
                cancel,
            }
        }

        fn tick(&mut self) -> EffectResult<LoopState> {
            self.lp.tick(
                &mut self.tracker,
                &self.viewport,
                &mut self.scene,
                &mut self.links,
                &mut self.renderer,
            )
        }

        fn ticks(&mut self, n: usize) {
            for _ in 0..n {
                assert_eq!(self.tick(), Ok(LoopState::Running));
            }
        }
    }

    // ── alpha ─────────────────────────────────────────────────────────────

    #[test]
    fn hovered_alpha_follows_closed_form() {
        let mut rig = Rig::new();
        rig.tracker.on_hover_enter();
        for n in 1..=60 {
            rig.ticks(1);
            let expected = 1.0 - 0.9f32.powi(n);
            assert!((rig.lp.alpha() - expected).abs() < 1e-5, "n={n}");
        }
    }

    #[test]
    fn alpha_stays_in_unit_range_for_any_sequence() {
        let mut rig = Rig::new();
        // Deterministic pseudo-random hover toggling with link leaves mixed in.
        let mut seed = 0x2545_f491_u32;
        for _ in 0..2000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            match seed % 4 {
                0 => rig.tracker.on_hover_enter(),
                1 => rig.tracker.on_hover_leave(),
                2 => rig.tracker.on_link_hover_leave((seed as usize / 4) % 4).unwrap(),
                _ => {}
            }
            rig.ticks(1);
            let a = rig.lp.alpha();
            assert!((0.0..=1.0).contains(&a), "alpha {a}");
        }
    }

    #[test]
    fn link_leave_applies_one_extra_fade_step() {
        let mut rig = Rig::new();
        rig.tracker.on_hover_enter();
        rig.ticks(10);
        let before = rig.lp.alpha();

        rig.tracker.on_link_hover_leave(1).unwrap();
        rig.ticks(1);

        let expected = lerp(lerp(before, 0.0, 0.1), 1.0, 0.1);
        assert!((rig.lp.alpha() - expected).abs() < 1e-6);
    }

    // ── pointer ───────────────────────────────────────────────────────────

    #[test]
    fn smoothed_offset_converges_on_still_pointer() {
        let mut rig = Rig::new();
        rig.tracker.on_pointer_move(500.0, 300.0);

        let mut last_gap = f32::INFINITY;
        for _ in 0..200 {
            rig.ticks(1);
            let o = rig.lp.smoothed_offset();
            let gap = (Vec2::new(500.0, 300.0) - o).length();
            if last_gap > 1e-2 {
                assert!(gap < last_gap);
            }
            last_gap = gap;
        }
        let o = rig.lp.smoothed_offset();
        assert!((o.x - 500.0).abs() < 1e-3 && (o.y - 300.0).abs() < 1e-3, "{o:?}");
    }

    #[test]
    fn drag_vector_is_scaled_lag_with_flipped_y() {
        let mut rig = Rig::new();
        rig.tracker.on_pointer_move(100.0, 50.0);
        rig.ticks(1);

        assert_eq!(rig.lp.smoothed_offset(), Vec2::new(10.0, 5.0));
        let offset = rig.scene.parameters().offset;
        assert!((offset.x - 90.0 * 0.0005).abs() < 1e-7);
        assert!((offset.y + 45.0 * 0.0005).abs() < 1e-7);
    }

    #[test]
    fn mesh_is_placed_at_smoothed_offset_in_render_space() {
        let mut rig = Rig::new();
        rig.tracker.on_pointer_move(600.0, 200.0);
        rig.ticks(5);

        let o = rig.lp.smoothed_offset();
        let expected = to_render_space(o.x, o.y, rig.viewport.descriptor());
        assert_eq!(rig.scene.mesh().position, expected);
        assert_eq!(rig.renderer.frames.last().map(|f| f.1), Some(expected));
    }

    // ── links ─────────────────────────────────────────────────────────────

    #[test]
    fn hovering_link_two_renders_texture_three() {
        let mut rig = Rig::new();
        rig.tracker.on_hover_enter();
        rig.tracker.on_link_hover_enter(2).unwrap();
        rig.ticks(1);

        assert_eq!(rig.scene.parameters().texture, TextureHandle::from_raw(2));
        assert!(rig.links.opacities().iter().all(|&o| o == 0.2));
    }

    #[test]
    fn leaving_all_links_fades_out_and_restores_opacity() {
        let mut rig = Rig::new();
        rig.tracker.on_hover_enter();
        rig.tracker.on_link_hover_enter(0).unwrap();
        rig.ticks(40);
        let peak = rig.lp.alpha();

        rig.tracker.on_link_hover_leave(0).unwrap();
        rig.tracker.on_hover_leave();
        rig.ticks(1);
        assert!(rig.lp.alpha() < peak);
        assert!(rig.links.opacities().iter().all(|&o| o == 1.0));

        rig.ticks(200);
        assert!(rig.lp.alpha() < 1e-3);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn cancel_stops_without_rendering() {
        let mut rig = Rig::new();
        rig.ticks(3);
        rig.cancel.cancel();

        assert_eq!(rig.tick(), Ok(LoopState::Stopped));
        assert_eq!(rig.tick(), Ok(LoopState::Stopped));
        assert_eq!(rig.lp.state(), LoopState::Stopped);
        assert_eq!(rig.renderer.frames.len(), 3);
        assert_eq!(rig.lp.ticks(), 3);
    }

    #[test]
    fn renderer_error_propagates_and_loop_keeps_running() {
        let mut rig = Rig::new();
        let stale = EffectError::StaleViewport {
            camera: (800, 600),
            surface: (1000, 800),
        };
        rig.renderer.fail_with = Some(stale.clone());
        assert_eq!(rig.tick(), Err(stale));
        assert_eq!(rig.lp.state(), LoopState::Running);

        rig.renderer.fail_with = None;
        rig.ticks(1);
    }
}
