//! Material data: the loosely typed extension entry stored in the container
//! and the typed [`MaterialInstance`] rebuilt from it.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use cgmath::{Vector2, Vector4};
use image::RgbaImage;
use serde::Deserialize;

/// Index into the container's texture list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct TextureRef(pub usize);

/// Per-material extension payload.
///
/// Field names follow the container schema (`shader`, `renderQueue`,
/// `floatProperties`, `vectorProperties`, `textureProperties`, `keywordMap`,
/// `tagMap`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialExtensionEntry {
    pub name: String,
    pub shader: String,
    pub render_queue: i32,
    pub float_properties: BTreeMap<String, f32>,
    pub vector_properties: BTreeMap<String, [f32; 4]>,
    pub texture_properties: BTreeMap<String, TextureRef>,
    pub keyword_map: BTreeMap<String, bool>,
    pub tag_map: BTreeMap<String, String>,
}

impl Default for MaterialExtensionEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            shader: String::new(),
            // "use the shader's queue"
            render_queue: -1,
            float_properties: BTreeMap::new(),
            vector_properties: BTreeMap::new(),
            texture_properties: BTreeMap::new(),
            keyword_map: BTreeMap::new(),
            tag_map: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShaderHandle {
    pub name: String,
}

impl ShaderHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A decoded texture ready to be bound to a material.
///
/// `converted_for` names the material property the pixels were converted for,
/// `None` for the texture as stored in the container.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureHandle {
    pub texture: TextureRef,
    pub name: String,
    pub converted_for: Option<String>,
    pub image: Arc<RgbaImage>,
}

/// A texture property together with its UV transform.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureSlot {
    pub texture: Option<TextureHandle>,
    pub offset: Vector2<f32>,
    pub scale: Vector2<f32>,
}

impl Default for TextureSlot {
    fn default() -> Self {
        Self {
            texture: None,
            offset: Vector2::new(0.0, 0.0),
            scale: Vector2::new(1.0, 1.0),
        }
    }
}

/// Renderer-side material state.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialInstance {
    pub name: String,
    pub shader: ShaderHandle,
    pub render_queue: i32,
    pub floats: BTreeMap<String, f32>,
    pub vectors: BTreeMap<String, Vector4<f32>>,
    pub textures: BTreeMap<String, TextureSlot>,
    pub keywords: BTreeSet<String>,
    pub tags: BTreeMap<String, String>,
}

impl MaterialInstance {
    pub fn new(shader: ShaderHandle) -> Self {
        Self {
            name: String::new(),
            shader,
            render_queue: -1,
            floats: BTreeMap::new(),
            vectors: BTreeMap::new(),
            textures: BTreeMap::new(),
            keywords: BTreeSet::new(),
            tags: BTreeMap::new(),
        }
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    pub fn set_vector(&mut self, name: &str, value: Vector4<f32>) {
        self.vectors.insert(name.to_string(), value);
    }

    pub fn set_texture(&mut self, name: &str, texture: TextureHandle) {
        self.slot_mut(name).texture = Some(texture);
    }

    pub fn set_texture_offset(&mut self, name: &str, offset: Vector2<f32>) {
        self.slot_mut(name).offset = offset;
    }

    pub fn set_texture_scale(&mut self, name: &str, scale: Vector2<f32>) {
        self.slot_mut(name).scale = scale;
    }

    pub fn enable_keyword(&mut self, keyword: &str) {
        self.keywords.insert(keyword.to_string());
    }

    pub fn disable_keyword(&mut self, keyword: &str) {
        self.keywords.remove(keyword);
    }

    pub fn set_override_tag(&mut self, tag: &str, value: &str) {
        self.tags.insert(tag.to_string(), value.to_string());
    }

    pub fn texture(&self, name: &str) -> Option<&TextureHandle> {
        self.textures.get(name).and_then(|slot| slot.texture.as_ref())
    }

    fn slot_mut(&mut self, name: &str) -> &mut TextureSlot {
        self.textures.entry(name.to_string()).or_default()
    }
}
