//! Parallax engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the effect layer:
//! window and event loop, surface management, input translation, and the
//! renderers for the textured plane and the link bars.

pub mod device;
pub mod window;
pub mod input;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
