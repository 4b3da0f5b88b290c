//! Coordinate and geometry types shared across engine renderers and the effect.
//!
//! Canonical CPU space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! The plane renderer works in a centre-origin, +Y up world space instead;
//! converting into it is the caller's job.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
