//! Two-phase import.
//!
//! [`stage`] decodes the container and populates the texture table.
//! [`finish`] runs once those resources are in place: it rebuilds every
//! material slot and then validates the asset. Keeping the phases apart lets
//! a host resolve textures (or anything else it needs) in between.

use std::path::Path;

use crate::{
    config::ImportConfig,
    data_structures::{asset::VciAsset, material::MaterialInstance},
    material::{MaterialReconstructor, ShaderLibrary, ShaderRegistry},
    resources::{self, LoadedVci, fallback::PbrFallback},
    validator::Validator,
};

/// A decoded container waiting for [`finish`].
pub struct StagedImport {
    loaded: LoadedVci,
}

impl StagedImport {
    pub fn asset(&self) -> &VciAsset {
        &self.loaded.asset
    }

    pub fn material_slots(&self) -> usize {
        self.loaded.material_slots()
    }
}

/// A validated asset with its materials, one per slot.
#[derive(Debug)]
pub struct ImportedVci {
    pub asset: VciAsset,
    pub materials: Vec<MaterialInstance>,
}

pub fn stage(bytes: &[u8]) -> anyhow::Result<StagedImport> {
    let loaded = resources::load_vci(bytes)?;
    Ok(StagedImport { loaded })
}

/// Rebuilds the materials of `staged` and validates it.
///
/// A validation failure is returned as an [`anyhow::Error`] wrapping the
/// [`ValidationError`](crate::error::ValidationError).
pub fn finish(
    staged: StagedImport,
    config: &ImportConfig,
    shaders: &dyn ShaderRegistry,
) -> anyhow::Result<ImportedVci> {
    let slots = staged.material_slots();
    let LoadedVci {
        asset,
        textures,
        pbr_materials,
    } = staged.loaded;

    let fallback = PbrFallback::new(&pbr_materials, &textures);
    let reconstructor = MaterialReconstructor::new(shaders, &textures, &config.known_shaders);
    let materials = (0..slots)
        .map(|index| reconstructor.reconstruct_material(&asset.materials, index, &fallback))
        .collect();

    Validator::new(config).validate(&asset)?;

    Ok(ImportedVci { asset, materials })
}

/// Reads, stages and finishes the container at `path`, resolving shaders
/// against `config.available_shaders`.
pub fn import_file(path: impl AsRef<Path>, config: &ImportConfig) -> anyhow::Result<ImportedVci> {
    let bytes = resources::load_binary(path)?;
    let staged = stage(&bytes)?;
    let shaders = ShaderLibrary::new(config.available_shaders.iter().cloned());
    finish(staged, config, &shaders)
}
