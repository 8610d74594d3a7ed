//! Rebuilds [`MaterialInstance`]s from extension entries.
//!
//! Reconstruction never fails. An entry whose shader cannot be resolved is
//! replaced by the fallback material and reported through `log`.

use std::collections::BTreeSet;

use crate::{
    data_structures::material::{MaterialExtensionEntry, MaterialInstance},
    material::{
        FallbackMaterialFactory, ShaderRegistry, TextureTable, bind_texture,
        classifier::{VectorProperty, classify},
    },
};

pub struct MaterialReconstructor<'a> {
    shaders: &'a dyn ShaderRegistry,
    textures: &'a dyn TextureTable,
    known_shaders: &'a BTreeSet<String>,
}

impl<'a> MaterialReconstructor<'a> {
    pub fn new(
        shaders: &'a dyn ShaderRegistry,
        textures: &'a dyn TextureTable,
        known_shaders: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            shaders,
            textures,
            known_shaders,
        }
    }

    /// Builds the material for slot `index` of an asset whose extension data
    /// is `entries`.
    ///
    /// An asset without any extension materials still has a default material
    /// at slot 0; it comes straight from `fallback`.
    pub fn reconstruct_material(
        &self,
        entries: &[MaterialExtensionEntry],
        index: usize,
        fallback: &dyn FallbackMaterialFactory,
    ) -> MaterialInstance {
        if index == 0 && entries.is_empty() {
            return fallback.create_default_material(index);
        }
        match entries.get(index) {
            Some(entry) => self.reconstruct(entry, index, fallback),
            None => {
                log::warn!(
                    "material {} has no extension entry ({} entries), using the default material",
                    index,
                    entries.len()
                );
                fallback.create_default_material(index)
            }
        }
    }

    /// Builds the material described by `entry`, or the fallback material for
    /// `index` when its shader is unknown.
    pub fn reconstruct(
        &self,
        entry: &MaterialExtensionEntry,
        index: usize,
        fallback: &dyn FallbackMaterialFactory,
    ) -> MaterialInstance {
        let Some(shader) = self.shaders.find_shader(&entry.shader) else {
            match self.missing_shader_level(&entry.shader) {
                log::Level::Error => log::error!(
                    "shader {} not found. Add it to the available shaders of this importer.",
                    entry.shader
                ),
                _ => log::info!("unknown shader {}.", entry.shader),
            }
            return fallback.create_default_material(index);
        };

        let mut material = MaterialInstance::new(shader);
        material.name = entry.name.clone();
        material.render_queue = entry.render_queue;

        for (name, value) in &entry.float_properties {
            material.set_float(name, *value);
        }
        for (name, value) in &entry.vector_properties {
            match classify(entry, name, *value) {
                VectorProperty::TextureTransform { offset, scale } => {
                    material.set_texture_offset(name, offset);
                    material.set_texture_scale(name, scale);
                }
                VectorProperty::PlainVector(v) => material.set_vector(name, v),
            }
        }
        for (name, texture) in &entry.texture_properties {
            bind_texture(&mut material, self.textures, name, *texture);
        }
        for (keyword, enabled) in &entry.keyword_map {
            if *enabled {
                material.enable_keyword(keyword);
            } else {
                material.disable_keyword(keyword);
            }
        }
        for (tag, value) in &entry.tag_map {
            material.set_override_tag(tag, value);
        }

        material
    }

    /// Severity of the diagnostic emitted when `shader` cannot be resolved.
    pub fn missing_shader_level(&self, shader: &str) -> log::Level {
        if self.known_shaders.contains(shader) {
            log::Level::Error
        } else {
            log::Level::Info
        }
    }
}
