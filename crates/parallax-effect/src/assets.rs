//! Preloaded textures and the link → texture mapping.

use parallax_engine::render::TextureHandle;

use crate::error::{EffectError, EffectResult};

/// Textures supplied by the asset collaborator.
///
/// `default` is shown before any link is hovered; `links[i]` belongs to the
/// link at index `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSet {
    default: TextureHandle,
    links: Vec<TextureHandle>,
}

impl TextureSet {
    pub fn new(default: TextureHandle, links: Vec<TextureHandle>) -> Self {
        Self { default, links }
    }

    pub fn default_texture(&self) -> TextureHandle {
        self.default
    }

    /// Texture mapped to link `index`.
    pub fn for_link(&self, index: usize) -> EffectResult<TextureHandle> {
        self.links.get(index).copied().ok_or(EffectError::InvalidIndex {
            index,
            len: self.links.len(),
        })
    }

    /// Number of mapped links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
