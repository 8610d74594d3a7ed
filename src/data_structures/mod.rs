//! Asset data structures: scene graph, materials and the decoded asset.
//!
//! - `scene_graph` holds the node arena, components and pre-order traversal
//! - `material` holds extension entries and reconstructed material instances
//! - `asset` bundles graph, scripts, metadata and material entries

pub mod asset;
pub mod material;
pub mod scene_graph;
