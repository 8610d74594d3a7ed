use std::cell::RefCell;

use image::{ImageFormat, Rgba, RgbaImage};
use vci_import::{
    Component, NodeId, SceneGraph, VciAsset, VciMeta,
    data_structures::material::{MaterialInstance, ShaderHandle},
    material::ShaderRegistry,
};

/// Metadata that passes the default metadata check.
pub(crate) fn meta() -> VciMeta {
    VciMeta {
        title: "test item".to_string(),
        version: "1.0".to_string(),
        author: "tester".to_string(),
        ..Default::default()
    }
}

/// A graph with a single root carrying the root marker.
pub(crate) fn marked_root() -> (SceneGraph, NodeId) {
    let mut graph = SceneGraph::new();
    let root = graph.add_root("root");
    graph.add_component(root, Component::RootMarker).unwrap();
    (graph, root)
}

/// Wraps `graph` into an asset with valid metadata.
pub(crate) fn asset(graph: SceneGraph, root: NodeId) -> VciAsset {
    let mut asset = VciAsset::new(graph, root);
    asset.meta = Some(meta());
    asset
}

/// Appends a linear chain of `len` nodes below `parent` and returns them top down.
pub(crate) fn chain(graph: &mut SceneGraph, parent: NodeId, prefix: &str, len: usize) -> Vec<NodeId> {
    let mut ids = Vec::with_capacity(len);
    let mut current = parent;
    for i in 0..len {
        current = graph.add_child(current, format!("{prefix}{i}")).unwrap();
        ids.push(current);
    }
    ids
}

pub(crate) fn material(shader: &str, name: &str) -> MaterialInstance {
    let mut material = MaterialInstance::new(ShaderHandle::new(shader));
    material.name = name.to_string();
    material
}

/// Shader registry that records every lookup.
pub(crate) struct RecordingShaders {
    pub(crate) known: Vec<&'static str>,
    pub(crate) lookups: RefCell<Vec<String>>,
}

impl RecordingShaders {
    pub(crate) fn new(known: &[&'static str]) -> Self {
        Self {
            known: known.to_vec(),
            lookups: RefCell::new(Vec::new()),
        }
    }
}

impl ShaderRegistry for RecordingShaders {
    fn find_shader(&self, name: &str) -> Option<ShaderHandle> {
        self.lookups.borrow_mut().push(name.to_string());
        self.known
            .iter()
            .find(|known| **known == name)
            .map(|known| ShaderHandle::new(*known))
    }
}

pub(crate) fn png(pixel: [u8; 4]) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(2, 2, Rgba(pixel))
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Pads `data` with `fill` to a multiple of four bytes.
pub(crate) fn pad4(data: &mut Vec<u8>, fill: u8) {
    while data.len() % 4 != 0 {
        data.push(fill);
    }
}

/// Serializes a binary glTF container from a JSON document and a binary chunk.
pub(crate) fn glb(json: &serde_json::Value, bin: &[u8]) -> Vec<u8> {
    let mut json_chunk = serde_json::to_vec(json).unwrap();
    pad4(&mut json_chunk, b' ');
    let mut bin_chunk = bin.to_vec();
    pad4(&mut bin_chunk, 0);

    let mut total = 12 + 8 + json_chunk.len();
    if !bin_chunk.is_empty() {
        total += 8 + bin_chunk.len();
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json_chunk);
    if !bin_chunk.is_empty() {
        out.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin_chunk);
    }
    out
}
