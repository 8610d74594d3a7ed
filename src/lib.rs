//! vci-import
//!
//! Structural validation and material reconstruction for VCI assets: glTF
//! containers whose extensions describe scripts, sub items, spring bones and
//! renderer-specific materials. The crate checks that an asset's hierarchy
//! obeys the VCI constraints before it is trusted, and turns the loosely typed
//! material extension data back into typed material state.
//!
//! High-level modules
//! - `config`: limits and shader lists, loadable from JSON
//! - `data_structures`: scene graph arena, asset and material models
//! - `error`: validation error kinds and graph errors
//! - `import`: the two-phase stage/finish pipeline
//! - `material`: property classification and material reconstruction
//! - `resources`: container decoding, textures and default materials
//! - `validator`: the ordered structural checks
//!

pub mod config;
pub mod data_structures;
pub mod error;
pub mod import;
pub mod material;
pub mod resources;
pub mod validator;

// Re-exports commonly used types for convenience in downstream code.
pub use config::ImportConfig;
pub use data_structures::asset::{Script, VciAsset, VciMeta};
pub use data_structures::scene_graph::{Component, NodeId, SceneGraph, SpringBoneDefinition};
pub use error::{ValidationError, ValidationErrorKind};
pub use validator::{Validator, validate};
