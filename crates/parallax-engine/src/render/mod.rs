//! GPU rendering subsystem.
//!
//! Each renderer owns its GPU resources (pipelines, buffers) and creates them
//! lazily on first use, rebuilding when the surface format changes.
//!
//! Conventions:
//! - `quads` geometry is in logical pixels (top-left origin, +Y down), converted
//!   to NDC in the vertex shader using a viewport uniform.
//! - `plane` geometry is a unit quad in world space, transformed by a model
//!   matrix and a camera view-projection matrix.

mod common;
mod ctx;

pub mod plane;
pub mod quads;
pub mod texture;

pub use ctx::{RenderCtx, RenderTarget};
pub use plane::{PlaneDraw, PlaneMaterial, PlaneRenderer};
pub use quads::{Quad, QuadRenderer};
pub use texture::{TextureHandle, TextureStore};
