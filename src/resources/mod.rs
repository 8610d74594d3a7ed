use std::{collections::HashMap, path::Path};

use anyhow::Context;

use crate::{
    data_structures::{
        asset::{Script, VciAsset, VciMeta},
        scene_graph::{Component, NodeId, SceneGraph, SpringBoneDefinition},
    },
    error::GraphError,
    resources::{
        extensions::{Colliders, EmbeddedScripts, Materials, SpringBone, SpringBones},
        fallback::PbrMaterial,
        texture::ImageTextureTable,
    },
};

/**
 * This module contains all logic for turning a VCI container into the data the
 * validator and the material reconstructor work on.
 */
pub mod extensions;
pub mod fallback;
pub mod texture;

/// Name of the synthetic root when the asset has no title.
pub const DEFAULT_ROOT_NAME: &str = "Root";

/// Everything decoded from one container.
pub struct LoadedVci {
    pub asset: VciAsset,
    pub textures: ImageTextureTable,
    /// Core glTF materials, one per material slot.
    pub pbr_materials: Vec<PbrMaterial>,
}

impl LoadedVci {
    /// Number of materials to build. A container without materials still
    /// gets one default material.
    pub fn material_slots(&self) -> usize {
        self.pbr_materials.len().max(1)
    }
}

pub fn load_binary(path: impl AsRef<Path>) -> anyhow::Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Decodes a glTF or GLB container carrying VCI extensions.
pub fn load_vci(bytes: &[u8]) -> anyhow::Result<LoadedVci> {
    let gltf = gltf::Gltf::from_slice(bytes).context("not a valid glTF container")?;

    // Load buffers
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                buffer_data.push(gltf.blob.clone().unwrap_or_default());
            }
            gltf::buffer::Source::Uri(uri) => {
                log::warn!("external buffer {} is not loaded", uri);
                buffer_data.push(Vec::new());
            }
        }
    }

    let meta: Option<VciMeta> = extensions::parse(extensions::META, root_extension(&gltf, extensions::META));
    let materials = extensions::parse::<Materials>(
        extensions::MATERIALS,
        root_extension(&gltf, extensions::MATERIALS),
    )
    .map(Materials::entries)
    .unwrap_or_default();
    let scripts = extensions::parse::<EmbeddedScripts>(
        extensions::SCRIPTS,
        root_extension(&gltf, extensions::SCRIPTS),
    )
    .map(|s| load_scripts(&gltf, &buffer_data, s))
    .unwrap_or_default();
    let spring_bones = extensions::parse::<SpringBones>(
        extensions::SPRING_BONES,
        root_extension(&gltf, extensions::SPRING_BONES),
    )
    .map(|s| s.spring_bones)
    .unwrap_or_default();

    let root_name = meta
        .as_ref()
        .map(|m| m.title.trim())
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_ROOT_NAME)
        .to_string();
    let (graph, root) = build_graph(&gltf, root_name, spring_bones)?;

    let textures = ImageTextureTable::from_document(&gltf, &buffer_data);
    let pbr_materials = gltf.materials().map(PbrMaterial::from).collect();

    let mut asset = VciAsset::new(graph, root);
    asset.scripts = scripts;
    asset.meta = meta;
    asset.materials = materials;

    log::debug!(
        "loaded {} nodes, {} scripts, {} extension materials, {} textures",
        asset.graph.len(),
        asset.scripts.len(),
        asset.materials.len(),
        textures.len()
    );
    Ok(LoadedVci {
        asset,
        textures,
        pbr_materials,
    })
}

/// The bytes of buffer view `view_index`, if the view and its buffer exist.
pub fn view_bytes<'a>(
    document: &gltf::Document,
    buffers: &'a [Vec<u8>],
    view_index: usize,
) -> Option<&'a [u8]> {
    let view = document.views().nth(view_index)?;
    let data = buffers.get(view.buffer().index())?;
    let end = view.offset().checked_add(view.length())?;
    data.get(view.offset()..end)
}

fn root_extension<'a>(document: &'a gltf::Document, name: &str) -> Option<&'a gltf::json::Value> {
    document.extensions()?.get(name)
}

fn load_scripts(document: &gltf::Document, buffers: &[Vec<u8>], scripts: EmbeddedScripts) -> Vec<Script> {
    scripts
        .scripts
        .into_iter()
        .map(|script| {
            let source = match script
                .source
                .and_then(|view| view_bytes(document, buffers, view))
            {
                Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                None => {
                    log::warn!("script {:?} has no readable source", script.name);
                    String::new()
                }
            };
            Script {
                name: script.name,
                source,
            }
        })
        .collect()
}

/// Builds the scene graph below a synthetic root that carries the root
/// marker. Scene root nodes become the root's children in scene order.
fn build_graph(
    document: &gltf::Document,
    root_name: String,
    spring_bones: Vec<SpringBone>,
) -> anyhow::Result<(SceneGraph, NodeId)> {
    let mut graph = SceneGraph::new();
    let root = graph.add_root(root_name);
    graph.add_component(root, Component::RootMarker)?;

    let mapped = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => add_scene_nodes(&mut graph, root, scene.nodes())?,
        None => {
            log::warn!("container has no scene");
            HashMap::new()
        }
    };

    // A node holds one spring bone definition at most, so any extra
    // definitions get their own holder node and fail validation there.
    for (k, spring_bone) in spring_bones.into_iter().enumerate() {
        let root_bones = spring_bone
            .bones
            .iter()
            .map(|bone| {
                let resolved = bone
                    .and_then(|index| usize::try_from(index).ok())
                    .and_then(|index| mapped.get(&index).copied());
                if resolved.is_none() {
                    log::warn!("spring bone {} has an unresolved root bone {:?}", k, bone);
                }
                resolved
            })
            .collect();
        let holder = match k {
            0 => root,
            _ => graph.add_child(root, format!("SpringBone{}", k))?,
        };
        graph.add_component(holder, Component::SpringBone(SpringBoneDefinition { root_bones }))?;
    }

    Ok((graph, root))
}

/// Adds `nodes` and their descendants below `root` in pre-order and returns
/// the glTF node index to graph node mapping.
fn add_scene_nodes<'a>(
    graph: &mut SceneGraph,
    root: NodeId,
    nodes: impl Iterator<Item = gltf::Node<'a>>,
) -> Result<HashMap<usize, NodeId>, GraphError> {
    let mut mapped = HashMap::new();
    let mut stack: Vec<(NodeId, gltf::Node<'a>)> = nodes.map(|node| (root, node)).collect();
    stack.reverse();

    while let Some((parent, node)) = stack.pop() {
        if mapped.contains_key(&node.index()) {
            log::warn!("node {} is referenced more than once, keeping the first", node.index());
            continue;
        }
        let name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node_{}", node.index()));
        let id = graph.add_child(parent, name)?;
        mapped.insert(node.index(), id);
        for component in node_components(&node) {
            graph.add_component(id, component)?;
        }
        let first_child = stack.len();
        stack.extend(node.children().map(|child| (id, child)));
        stack[first_child..].reverse();
    }
    Ok(mapped)
}

fn node_components(node: &gltf::Node<'_>) -> Vec<Component> {
    let Some(node_extensions) = node.extensions() else {
        return Vec::new();
    };
    let mut components = Vec::new();
    for (name, value) in node_extensions {
        match name.as_str() {
            extensions::ITEM => components.push(Component::SubItem),
            extensions::COLLIDER => {
                let colliders: Colliders =
                    extensions::parse(extensions::COLLIDER, Some(value)).unwrap_or_default();
                if colliders
                    .colliders
                    .iter()
                    .any(|c| c.kind == extensions::MESH_COLLIDER_TYPE)
                {
                    components.push(Component::DisallowedGeometryCollider);
                }
                components.push(Component::Other(name.clone()));
            }
            _ => components.push(Component::Other(name.clone())),
        }
    }
    components
}
