use anyhow::Result;

use crate::input::InputEvent;

use super::ctx::{FrameCtx, SurfaceCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// All callbacks run on the event-loop thread and never overlap, so
/// implementations own their state directly.
pub trait App {
    /// Called once after the window and GPU context exist, before the first frame.
    ///
    /// An error here aborts the runtime; no frame is ever rendered.
    fn on_start(&mut self, ctx: &mut SurfaceCtx<'_, '_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for every translated input event, between frames.
    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called when the drawable size or scale factor changed.
    ///
    /// Runs synchronously before the next `on_frame`. The default resizes the
    /// surface to the window's physical size.
    fn on_resize(&mut self, ctx: &mut SurfaceCtx<'_, '_>) {
        let size = ctx.window.window.inner_size();
        ctx.gpu.resize(size);
    }

    /// Called when the user asks to close the window.
    ///
    /// Returning `Continue` lets the app wind down on its own frames and exit
    /// from `on_frame` later.
    fn on_close_requested(&mut self) -> AppControl {
        AppControl::Exit
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Polled after a callback returns `Exit`; an error here makes
    /// `Runtime::run` fail instead of returning `Ok`.
    fn take_error(&mut self) -> Option<anyhow::Error> {
        None
    }
}
