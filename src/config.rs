//! Import configuration.
//!
//! Everything has a default, so an empty JSON object is a valid config file.

use std::{collections::BTreeSet, path::Path};

use anyhow::Context;
use serde::Deserialize;

/// Shader names that ship with the reference toolchain. A missing shader from
/// this list points at a broken project setup rather than a foreign asset.
pub const DEFAULT_KNOWN_SHADERS: [&str; 7] = [
    "Standard",
    "VRM/MToon",
    "UniGLTF/UniUnlit",
    "VRM/UnlitTexture",
    "VRM/UnlitCutout",
    "VRM/UnlitTransparent",
    "VRM/UnlitTransparentZWrite",
];

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpringBoneLimits {
    pub max_spring_bones: usize,
    pub max_root_bones: usize,
    /// Upper bound on the nodes of one root bone's subtree, root included.
    pub max_child_bones: usize,
    /// Reserved. Spring bone colliders are not modeled, so this limit is
    /// accepted in config files but never checked.
    pub max_spring_bone_colliders: usize,
    /// Reserved, see `max_spring_bone_colliders`.
    pub max_sphere_colliders: usize,
}

impl Default for SpringBoneLimits {
    fn default() -> Self {
        Self {
            max_spring_bones: 1,
            max_root_bones: 10,
            max_child_bones: 10,
            max_spring_bone_colliders: 10,
            max_sphere_colliders: 10,
        }
    }
}

/// Maximum length, in characters, of each metadata text field.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetaTextLimits {
    pub title: usize,
    pub version: usize,
    pub author: usize,
    pub contact_information: usize,
    pub reference: usize,
    pub description: usize,
    pub model_data_other_license_url: usize,
    pub script_other_license_url: usize,
}

impl Default for MetaTextLimits {
    fn default() -> Self {
        Self {
            title: 30,
            version: 30,
            author: 30,
            contact_information: 255,
            reference: 255,
            description: 500,
            model_data_other_license_url: 2048,
            script_other_license_url: 2048,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportConfig {
    /// Only used to pick the severity of "shader not found" diagnostics.
    pub known_shaders: BTreeSet<String>,
    /// Shaders the default registry resolves.
    pub available_shaders: BTreeSet<String>,
    pub spring_bone: SpringBoneLimits,
    pub meta: MetaTextLimits,
}

impl Default for ImportConfig {
    fn default() -> Self {
        let shaders: BTreeSet<String> = DEFAULT_KNOWN_SHADERS.iter().map(|s| s.to_string()).collect();
        Self {
            known_shaders: shaders.clone(),
            available_shaders: shaders,
            spring_bone: SpringBoneLimits::default(),
            meta: MetaTextLimits::default(),
        }
    }
}

impl ImportConfig {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("invalid import config")
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_json(&text)
    }
}
