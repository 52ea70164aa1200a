use std::collections::{HashMap, hash_map};

use anyhow::{Result, anyhow};

use crate::glyph::TextureId;

/// The bind groups of the textures sprites are drawn with.
///
/// The textures themselves are owned by the caller, a bind group only keeps its view alive.
#[derive(Debug)]
pub struct TextureBindings<B = wgpu::BindGroup> {
    bind_groups: HashMap<TextureId, B>,
}

impl<B> Default for TextureBindings<B> {
    fn default() -> Self {
        Self {
            bind_groups: HashMap::new(),
        }
    }
}

impl<B> TextureBindings<B> {
    /// Registers the bind group of `texture`, returning the one it replaces.
    pub fn insert(&mut self, texture: TextureId, bind_group: B) -> Option<B> {
        self.bind_groups.insert(texture, bind_group)
    }

    pub fn remove(&mut self, texture: TextureId) -> Option<B> {
        self.bind_groups.remove(&texture)
    }

    pub fn contains(&self, texture: TextureId) -> bool {
        self.bind_groups.contains_key(&texture)
    }

    pub fn get(&self, texture: TextureId) -> Result<&B> {
        self.bind_groups
            .get(&texture)
            .ok_or_else(|| anyhow!("{texture} is not registered"))
    }

    pub fn len(&self) -> usize {
        self.bind_groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bind_groups.is_empty()
    }

    pub fn textures(&self) -> hash_map::Keys<'_, TextureId, B> {
        self.bind_groups.keys()
    }
}
