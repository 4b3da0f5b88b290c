//! Effect error taxonomy.

use thiserror::Error;

/// Errors surfaced by the effect core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    /// Rendering surface, camera, or renderer could not be created.
    ///
    /// Fatal: the render loop never starts.
    #[error("initialization failed: {0}")]
    InitializationFailure(String),

    /// A hover event referenced a link with no mapped texture.
    #[error("link index {index} has no texture (only {len} links are mapped)")]
    InvalidIndex { index: usize, len: usize },

    /// A frame was about to render with a camera built for a different
    /// surface size.
    #[error("camera built for {camera:?} but surface is {surface:?}")]
    StaleViewport {
        camera: (u32, u32),
        surface: (u32, u32),
    },

    /// The rendering surface failed in a way that cannot be recovered.
    #[error("rendering surface lost")]
    SurfaceLost,
}

/// Result type for effect operations.
pub type EffectResult<T> = Result<T, EffectError>;
