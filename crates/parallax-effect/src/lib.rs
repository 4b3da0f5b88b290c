//! Pointer-driven parallax reveal.
//!
//! A textured plane follows the pointer with exponential smoothing, bends in
//! the direction it is being dragged, and fades in while the pointer is over a
//! list of navigation links. Hovering a link picks the plane's texture.
//!
//! The core (`smoothing`, `tracker`, `viewport`, `scene`, `render_loop`,
//! `links`) is plain CPU state and reaches the GPU only through the traits in
//! `scene`, `viewport` and `render_loop`. [`HoverReveal`] wires it to
//! `parallax_engine`.

pub mod assets;
pub mod config;
pub mod error;
pub mod links;
pub mod render_loop;
pub mod scene;
pub mod smoothing;
pub mod tracker;
pub mod viewport;

mod app;
mod gpu;

pub use app::HoverReveal;
pub use assets::TextureSet;
pub use config::EffectConfig;
pub use error::{EffectError, EffectResult};
pub use render_loop::{CancelToken, LoopState, RenderLoop};
