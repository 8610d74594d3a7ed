//! Decoded container textures and their per-property conversions.

use std::sync::Arc;

use anyhow::Context;
use image::{ImageFormat, Rgba, RgbaImage, load_from_memory_with_format};

use crate::{
    data_structures::material::{TextureHandle, TextureRef},
    material::TextureTable,
    resources::view_bytes,
};

pub const METALLIC_GLOSS_MAP: &str = "_MetallicGlossMap";
pub const OCCLUSION_MAP: &str = "_OcclusionMap";

/// Textures of one container, indexed like the container's texture list.
/// Slots whose image could not be decoded stay empty.
#[derive(Clone, Debug, Default)]
pub struct ImageTextureTable {
    textures: Vec<Option<TextureHandle>>,
}

impl ImageTextureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes every texture of `document`. `buffers` holds the document's
    /// buffer contents by buffer index.
    pub fn from_document(document: &gltf::Document, buffers: &[Vec<u8>]) -> Self {
        let mut table = Self::new();
        for texture in document.textures() {
            let image = texture.source();
            let name = texture
                .name()
                .or(image.name())
                .map(str::to_string)
                .unwrap_or_else(|| format!("texture_{}", texture.index()));
            let decoded = match image.source() {
                gltf::image::Source::View { view, mime_type } => {
                    view_bytes(document, buffers, view.index())
                        .context("buffer view is out of range")
                        .and_then(|bytes| from_bytes(bytes, Some(mime_type)))
                }
                gltf::image::Source::Uri { uri, .. } => {
                    Err(anyhow::anyhow!("external image {} is not supported", uri))
                }
            };
            match decoded {
                Ok(pixels) => table.insert(TextureRef(texture.index()), name, pixels),
                Err(e) => log::warn!("texture {} ({}) skipped: {:#}", texture.index(), name, e),
            }
        }
        table
    }

    pub fn insert(&mut self, texture: TextureRef, name: impl Into<String>, image: RgbaImage) {
        if self.textures.len() <= texture.0 {
            self.textures.resize(texture.0 + 1, None);
        }
        self.textures[texture.0] = Some(TextureHandle {
            texture,
            name: name.into(),
            converted_for: None,
            image: Arc::new(image),
        });
    }

    /// Number of decoded textures.
    pub fn len(&self) -> usize {
        self.textures.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TextureTable for ImageTextureTable {
    fn get_texture(&self, texture: TextureRef) -> Option<TextureHandle> {
        self.textures.get(texture.0).cloned().flatten()
    }

    fn convert_for_property(&self, texture: &TextureHandle, property: &str) -> Option<TextureHandle> {
        let convert: fn(Rgba<u8>) -> Rgba<u8> = match property {
            // glTF: roughness in G, metallic in B. Target: metallic in RGB, smoothness in A.
            METALLIC_GLOSS_MAP => |Rgba([_, g, b, _])| Rgba([b, b, b, 255 - g]),
            // glTF: occlusion in R
            OCCLUSION_MAP => |Rgba([r, ..])| Rgba([r, r, r, 255]),
            _ => return None,
        };
        let mut image = (*texture.image).clone();
        for pixel in image.pixels_mut() {
            *pixel = convert(*pixel);
        }
        Some(TextureHandle {
            converted_for: Some(property.to_string()),
            image: Arc::new(image),
            ..texture.clone()
        })
    }
}

/// Decodes raw image file data. `mime_type` is a hint; without it the format
/// is guessed from the data.
pub fn from_bytes(bytes: &[u8], mime_type: Option<&str>) -> anyhow::Result<RgbaImage> {
    let format = mime_type
        .and_then(|mt| mt.split('/').last())
        .and_then(ImageFormat::from_extension);
    let img = match format {
        Some(format) => load_from_memory_with_format(bytes, format)?,
        None => image::load_from_memory(bytes)?,
    };
    Ok(img.to_rgba8())
}
