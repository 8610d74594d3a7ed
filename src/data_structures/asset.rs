//! The decoded asset handed to the validator: scene graph, scripts, metadata
//! and the per-material extension entries.

use serde::Deserialize;

use crate::data_structures::{
    material::MaterialExtensionEntry,
    scene_graph::{NodeId, SceneGraph},
};

/// An embedded script. Scripts are identified by their name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script {
    pub name: String,
    pub source: String,
}

impl Script {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Descriptive metadata of an asset, as stored in the container.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VciMeta {
    pub title: String,
    pub version: String,
    pub author: String,
    pub contact_information: String,
    pub reference: String,
    pub description: String,
    pub model_data_license_type: String,
    pub model_data_other_license_url: String,
    pub script_license_type: String,
    pub script_other_license_url: String,
}

#[derive(Clone, Debug)]
pub struct VciAsset {
    pub graph: SceneGraph,
    pub root: NodeId,
    pub scripts: Vec<Script>,
    pub meta: Option<VciMeta>,
    pub materials: Vec<MaterialExtensionEntry>,
}

impl VciAsset {
    /// Wraps `graph` with no scripts, metadata or materials.
    pub fn new(graph: SceneGraph, root: NodeId) -> Self {
        Self {
            graph,
            root,
            scripts: Vec::new(),
            meta: None,
            materials: Vec::new(),
        }
    }
}
