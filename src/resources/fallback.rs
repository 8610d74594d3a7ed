//! Default materials built from the container's core glTF PBR materials.
//!
//! Used whenever a material slot has no usable extension entry.

use cgmath::Vector4;

use crate::{
    data_structures::material::{MaterialInstance, ShaderHandle, TextureRef},
    material::{FallbackMaterialFactory, TextureTable, bind_texture},
};

pub const STANDARD_SHADER: &str = "Standard";

const QUEUE_GEOMETRY: i32 = 2000;
const QUEUE_ALPHA_TEST: i32 = 2450;
const QUEUE_TRANSPARENT: i32 = 3000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// The subset of a glTF material the default material is built from.
#[derive(Clone, Debug, PartialEq)]
pub struct PbrMaterial {
    pub name: String,
    pub base_color: [f32; 4],
    pub base_color_texture: Option<TextureRef>,
    pub metallic: f32,
    pub roughness: f32,
    pub metallic_roughness_texture: Option<TextureRef>,
    pub normal_texture: Option<TextureRef>,
    pub emissive: [f32; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
}

impl Default for PbrMaterial {
    // glTF defaults
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            base_color: [1.0; 4],
            base_color_texture: None,
            metallic: 1.0,
            roughness: 1.0,
            metallic_roughness_texture: None,
            normal_texture: None,
            emissive: [0.0; 3],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
        }
    }
}

impl From<gltf::Material<'_>> for PbrMaterial {
    fn from(material: gltf::Material<'_>) -> Self {
        let pbr = material.pbr_metallic_roughness();
        let name = match (material.name(), material.index()) {
            (Some(name), _) => name.to_string(),
            (None, Some(index)) => format!("material_{}", index),
            (None, None) => "Default".to_string(),
        };
        let alpha_mode = match material.alpha_mode() {
            gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
            gltf::material::AlphaMode::Mask => AlphaMode::Mask,
            gltf::material::AlphaMode::Blend => AlphaMode::Blend,
        };
        Self {
            name,
            base_color: pbr.base_color_factor(),
            base_color_texture: pbr
                .base_color_texture()
                .map(|info| TextureRef(info.texture().index())),
            metallic: pbr.metallic_factor(),
            roughness: pbr.roughness_factor(),
            metallic_roughness_texture: pbr
                .metallic_roughness_texture()
                .map(|info| TextureRef(info.texture().index())),
            normal_texture: material
                .normal_texture()
                .map(|normal| TextureRef(normal.texture().index())),
            emissive: material.emissive_factor(),
            alpha_mode,
            alpha_cutoff: material.alpha_cutoff().unwrap_or(0.5),
        }
    }
}

/// [`FallbackMaterialFactory`] producing `Standard` materials from the
/// container's PBR materials. Slots past the end get the glTF default material.
pub struct PbrFallback<'a> {
    materials: &'a [PbrMaterial],
    textures: &'a dyn TextureTable,
}

impl<'a> PbrFallback<'a> {
    pub fn new(materials: &'a [PbrMaterial], textures: &'a dyn TextureTable) -> Self {
        Self {
            materials,
            textures,
        }
    }
}

impl FallbackMaterialFactory for PbrFallback<'_> {
    fn create_default_material(&self, material_index: usize) -> MaterialInstance {
        let default = PbrMaterial::default();
        let pbr = self.materials.get(material_index).unwrap_or(&default);

        let mut material = MaterialInstance::new(ShaderHandle::new(STANDARD_SHADER));
        material.name = pbr.name.clone();
        material.render_queue = QUEUE_GEOMETRY;
        material.set_vector("_Color", Vector4::from(pbr.base_color));
        material.set_float("_Metallic", pbr.metallic);
        material.set_float("_Glossiness", 1.0 - pbr.roughness);

        if let Some(texture) = pbr.base_color_texture {
            bind_texture(&mut material, self.textures, "_MainTex", texture);
        }
        if let Some(texture) = pbr.metallic_roughness_texture {
            if bind_texture(&mut material, self.textures, "_MetallicGlossMap", texture) {
                material.enable_keyword("_METALLICGLOSSMAP");
            }
        }
        if let Some(texture) = pbr.normal_texture {
            if bind_texture(&mut material, self.textures, "_BumpMap", texture) {
                material.enable_keyword("_NORMALMAP");
            }
        }
        if pbr.emissive != [0.0; 3] {
            let [r, g, b] = pbr.emissive;
            material.set_vector("_EmissionColor", Vector4::new(r, g, b, 1.0));
            material.enable_keyword("_EMISSION");
        }

        match pbr.alpha_mode {
            AlphaMode::Opaque => material.set_override_tag("RenderType", "Opaque"),
            AlphaMode::Mask => {
                material.set_float("_Cutoff", pbr.alpha_cutoff);
                material.enable_keyword("_ALPHATEST_ON");
                material.set_override_tag("RenderType", "TransparentCutout");
                material.render_queue = QUEUE_ALPHA_TEST;
            }
            AlphaMode::Blend => {
                material.enable_keyword("_ALPHABLEND_ON");
                material.set_override_tag("RenderType", "Transparent");
                material.render_queue = QUEUE_TRANSPARENT;
            }
        }
        material
    }
}
