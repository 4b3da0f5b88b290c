//! Latest pointer and hover state, written by input events and read by the
//! render loop.

use parallax_engine::render::TextureHandle;

use crate::assets::TextureSet;
use crate::error::EffectResult;

/// Raw latest pointer position in logical pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PointerState {
    pub target_x: f32,
    pub target_y: f32,
}

/// Whether the pointer is over the link-list container.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct HoverState {
    pub active: bool,
}

/// Copy of the tracker's state handed to one render tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InputSnapshot {
    pub pointer: PointerState,
    pub hover: HoverState,
    pub texture: TextureHandle,
    /// Link-leave events since the previous snapshot; each one fades alpha by
    /// one extra smoothing step.
    pub fade_nudges: u32,
}

/// Records input as it arrives.
///
/// Events only overwrite fields; nothing is queued, so the render loop always
/// sees the latest pointer position and intermediate ones are lost.
#[derive(Debug, Clone)]
pub struct InputTracker {
    pointer: PointerState,
    hover: HoverState,
    textures: TextureSet,
    active_texture: TextureHandle,
    fade_nudges: u32,
}

impl InputTracker {
    /// Starts with the pointer at the origin, not hovered, showing the default texture.
    pub fn new(textures: TextureSet) -> Self {
        let active_texture = textures.default_texture();
        Self {
            pointer: PointerState::default(),
            hover: HoverState::default(),
            textures,
            active_texture,
            fade_nudges: 0,
        }
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.pointer = PointerState {
            target_x: x,
            target_y: y,
        };
    }

    /// Pointer entered the link-list container.
    pub fn on_hover_enter(&mut self) {
        self.hover.active = true;
    }

    /// Pointer left the link-list container.
    pub fn on_hover_leave(&mut self) {
        self.hover.active = false;
    }

    /// Pointer entered link `index`; its texture becomes the active one.
    ///
    /// On `InvalidIndex` the active texture is left unchanged.
    pub fn on_link_hover_enter(&mut self, index: usize) -> EffectResult<TextureHandle> {
        let texture = self.textures.for_link(index)?;
        self.active_texture = texture;
        log::trace!("link {index} entered, texture {texture:?}");
        Ok(texture)
    }

    /// Pointer left link `index`.
    ///
    /// Alpha is shared by all links, so leaving any link fades the whole
    /// effect by one extra step, even while another link is still hovered.
    pub fn on_link_hover_leave(&mut self, index: usize) -> EffectResult<()> {
        self.textures.for_link(index)?;
        self.fade_nudges = self.fade_nudges.saturating_add(1);
        Ok(())
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn hover(&self) -> HoverState {
        self.hover
    }

    pub fn active_texture(&self) -> TextureHandle {
        self.active_texture
    }

    /// Returns the current state and consumes pending fade nudges.
    pub fn take_snapshot(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot {
            pointer: self.pointer,
            hover: self.hover,
            texture: self.active_texture,
            fade_nudges: self.fade_nudges,
        };
        self.fade_nudges = 0;
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EffectError;

    fn h(raw: u32) -> TextureHandle {
        TextureHandle::from_raw(raw)
    }

    fn tracker() -> InputTracker {
        InputTracker::new(TextureSet::new(h(100), vec![h(0), h(1), h(2), h(3)]))
    }

    // ── pointer ───────────────────────────────────────────────────────────

    #[test]
    fn starts_at_origin_with_default_texture() {
        let t = tracker();
        assert_eq!(t.pointer(), PointerState::default());
        assert!(!t.hover().active);
        assert_eq!(t.active_texture(), h(100));
    }

    #[test]
    fn pointer_move_keeps_only_latest() {
        let mut t = tracker();
        t.on_pointer_move(10.0, 20.0);
        t.on_pointer_move(500.0, 300.0);
        assert_eq!(t.pointer(), PointerState { target_x: 500.0, target_y: 300.0 });
    }

    // ── hover ─────────────────────────────────────────────────────────────

    #[test]
    fn container_enter_and_leave_toggle_hover() {
        let mut t = tracker();
        t.on_hover_enter();
        assert!(t.hover().active);
        t.on_hover_leave();
        assert!(!t.hover().active);
    }

    #[test]
    fn link_two_selects_third_texture_exactly() {
        let mut t = tracker();
        assert_eq!(t.on_link_hover_enter(2), Ok(h(2)));
        assert_eq!(t.active_texture(), h(2));
        for other in [h(0), h(1), h(3), h(100)] {
            assert_ne!(t.active_texture(), other);
        }
    }

    #[test]
    fn last_entered_link_wins() {
        let mut t = tracker();
        t.on_link_hover_enter(0).unwrap();
        t.on_link_hover_enter(3).unwrap();
        assert_eq!(t.active_texture(), h(3));
    }

    #[test]
    fn out_of_range_link_fails_and_keeps_texture() {
        let mut t = tracker();
        t.on_link_hover_enter(1).unwrap();
        assert_eq!(
            t.on_link_hover_enter(4),
            Err(EffectError::InvalidIndex { index: 4, len: 4 })
        );
        assert_eq!(t.active_texture(), h(1));
        assert!(t.on_link_hover_leave(9).is_err());
        assert_eq!(t.take_snapshot().fade_nudges, 0);
    }

    // ── snapshot ──────────────────────────────────────────────────────────

    #[test]
    fn snapshot_consumes_fade_nudges() {
        let mut t = tracker();
        t.on_link_hover_leave(0).unwrap();
        t.on_link_hover_leave(1).unwrap();
        assert_eq!(t.take_snapshot().fade_nudges, 2);
        assert_eq!(t.take_snapshot().fade_nudges, 0);
    }
}
