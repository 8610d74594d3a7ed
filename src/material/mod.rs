//! Material reconstruction.
//!
//! The reconstructor talks to three collaborators, all injected:
//!
//! - a [`ShaderRegistry`] resolving shader names
//! - a [`TextureTable`] resolving (and optionally converting) textures
//! - a [`FallbackMaterialFactory`] producing a material when the extension
//!   data cannot be used
//!
//! None of them is mutated; the registry and table must be fully populated
//! before reconstruction starts.

use std::collections::BTreeSet;

use crate::data_structures::material::{MaterialInstance, ShaderHandle, TextureHandle, TextureRef};

pub mod classifier;
pub mod reconstruct;

pub use classifier::{VectorProperty, classify, classify_property};
pub use reconstruct::MaterialReconstructor;

pub trait ShaderRegistry {
    fn find_shader(&self, name: &str) -> Option<ShaderHandle>;
}

pub trait TextureTable {
    fn get_texture(&self, texture: TextureRef) -> Option<TextureHandle>;

    /// Returns `texture` converted for use as `property`, or `None` when the
    /// property takes the texture as is.
    fn convert_for_property(&self, texture: &TextureHandle, property: &str) -> Option<TextureHandle>;
}

pub trait FallbackMaterialFactory {
    fn create_default_material(&self, material_index: usize) -> MaterialInstance;
}

impl<F> FallbackMaterialFactory for F
where
    F: Fn(usize) -> MaterialInstance,
{
    fn create_default_material(&self, material_index: usize) -> MaterialInstance {
        self(material_index)
    }
}

/// Resolves `texture` and binds it to `property`, converted when the table
/// has a conversion for that property. Returns whether anything was bound.
pub(crate) fn bind_texture(
    material: &mut MaterialInstance,
    textures: &dyn TextureTable,
    property: &str,
    texture: TextureRef,
) -> bool {
    let Some(original) = textures.get_texture(texture) else {
        log::debug!(
            "material {}: texture {} for {} is not loaded",
            material.name,
            texture.0,
            property
        );
        return false;
    };
    let bound = textures
        .convert_for_property(&original, property)
        .unwrap_or(original);
    material.set_texture(property, bound);
    true
}

/// In-memory shader registry keyed by name.
#[derive(Clone, Debug, Default)]
pub struct ShaderLibrary {
    shaders: BTreeSet<String>,
}

impl ShaderLibrary {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shaders: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>) {
        self.shaders.insert(name.into());
    }
}

impl ShaderRegistry for ShaderLibrary {
    fn find_shader(&self, name: &str) -> Option<ShaderHandle> {
        self.shaders.get(name).map(|n| ShaderHandle::new(n.as_str()))
    }
}

/// A table with no textures, for assets that carry none.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTextures;

impl TextureTable for NoTextures {
    fn get_texture(&self, _: TextureRef) -> Option<TextureHandle> {
        None
    }

    fn convert_for_property(&self, _: &TextureHandle, _: &str) -> Option<TextureHandle> {
        None
    }
}
