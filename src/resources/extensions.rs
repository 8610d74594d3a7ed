//! Serde models of the VCI glTF extensions this crate reads.

use serde::{Deserialize, de::DeserializeOwned};

use crate::data_structures::material::MaterialExtensionEntry;

pub const META: &str = "VCAST_vci_meta";
pub const MATERIALS: &str = "VCAST_vci_material_unity";
pub const SCRIPTS: &str = "VCAST_vci_embedded_script";
pub const SPRING_BONES: &str = "VCAST_vci_spring_bone";
pub const ITEM: &str = "VCAST_vci_item";
pub const COLLIDER: &str = "VCAST_vci_collider";

/// Collider type rejected by the validator.
pub const MESH_COLLIDER_TYPE: &str = "mesh";

/// Material entries are kept raw so that one malformed entry does not take
/// the others down with it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Materials {
    pub materials: Vec<gltf::json::Value>,
}

impl Materials {
    /// Parses every entry. A malformed entry is replaced by a default entry
    /// with no shader, which keeps slot indices aligned and resolves to the
    /// fallback material.
    pub fn entries(self) -> Vec<MaterialExtensionEntry> {
        self.materials
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value(value).unwrap_or_else(|e| {
                    log::warn!("ignoring malformed material entry {}: {}", index, e);
                    MaterialExtensionEntry::default()
                })
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddedScripts {
    pub scripts: Vec<EmbeddedScript>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddedScript {
    pub name: String,
    pub mime_type: Option<String>,
    pub target_engine: Option<String>,
    /// Buffer view holding the source text.
    pub source: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpringBones {
    pub spring_bones: Vec<SpringBone>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SpringBone {
    /// glTF node indices; `null` and negative values mark empty slots.
    pub bones: Vec<Option<i64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Colliders {
    pub colliders: Vec<Collider>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Collider {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Deserializes an extension payload. Malformed payloads are logged and
/// treated as absent.
pub fn parse<T: DeserializeOwned>(name: &str, value: Option<&gltf::json::Value>) -> Option<T> {
    let value = value?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("ignoring malformed {} extension: {}", name, e);
            None
        }
    }
}
