/// Pointer movement in logical pixels (top-left origin, +Y down).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    pub x: f32,
    pub y: f32,
}

/// Platform-agnostic input event.
///
/// Only the pointer stream and focus are surfaced; the effect has no keyboard
/// or button interactions.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Window focus changed.
    Focused(bool),

    /// Pointer moved within the window.
    PointerMoved(PointerMoveEvent),

    /// Pointer left the window.
    PointerLeft,
}
