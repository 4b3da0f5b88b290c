//! Colors shared between the effect layer and renderers.
//!
//! Colors are linear premultiplied RGBA, matching the premultiplied blend state
//! every renderer in this crate uses.

mod color;

pub use color::Color;
