//! Structural validation of a decoded asset.
//!
//! [`Validator::validate`] runs a fixed sequence of checks and stops at the
//! first violation:
//!
//! 1. at most one root marker in the hierarchy
//! 2. script names (`main` first, non-empty, unique, no reserved characters)
//! 3. metadata, delegated to a [`MetadataValidator`]
//! 4. no disallowed components, inactive nodes included
//! 5. spring bone limits
//!
//! The order is part of the contract: the same asset always reports the same
//! error.

use std::collections::HashSet;

use crate::{
    config::{ImportConfig, MetaTextLimits, SpringBoneLimits},
    data_structures::{
        asset::{Script, VciAsset},
        scene_graph::{ComponentKind, SpringBoneDefinition},
    },
    error::{ValidationError, ValidationErrorKind},
};

/// The name the first script of an asset must carry.
pub const MAIN_SCRIPT_NAME: &str = "main";

/// Checks the asset metadata. Step 3 of [`Validator::validate`].
pub trait MetadataValidator {
    fn validate_metadata(&self, asset: &VciAsset) -> Result<(), ValidationError>;
}

impl<F> MetadataValidator for F
where
    F: Fn(&VciAsset) -> Result<(), ValidationError>,
{
    fn validate_metadata(&self, asset: &VciAsset) -> Result<(), ValidationError> {
        self(asset)
    }
}

/// Requires metadata with a title and bounds the length of every text field.
#[derive(Clone, Debug, Default)]
pub struct MetaTextValidator {
    limits: MetaTextLimits,
}

impl MetaTextValidator {
    pub fn new(limits: MetaTextLimits) -> Self {
        Self { limits }
    }
}

impl MetadataValidator for MetaTextValidator {
    fn validate_metadata(&self, asset: &VciAsset) -> Result<(), ValidationError> {
        let meta = asset.meta.as_ref().ok_or_else(|| {
            ValidationError::with_detail(ValidationErrorKind::InvalidMetaData, "metadata is missing")
        })?;
        if meta.title.trim().is_empty() {
            return Err(ValidationError::with_detail(
                ValidationErrorKind::InvalidMetaData,
                "title is empty",
            ));
        }

        let limits = &self.limits;
        let fields = [
            ("title", &meta.title, limits.title),
            ("version", &meta.version, limits.version),
            ("author", &meta.author, limits.author),
            (
                "contactInformation",
                &meta.contact_information,
                limits.contact_information,
            ),
            ("reference", &meta.reference, limits.reference),
            ("description", &meta.description, limits.description),
            (
                "modelDataOtherLicenseUrl",
                &meta.model_data_other_license_url,
                limits.model_data_other_license_url,
            ),
            (
                "scriptOtherLicenseUrl",
                &meta.script_other_license_url,
                limits.script_other_license_url,
            ),
        ];
        for (field, value, max) in fields {
            if value.chars().count() > max {
                return Err(ValidationError::with_detail(
                    ValidationErrorKind::InvalidMetaData,
                    format!("{field} is longer than {max} characters"),
                ));
            }
        }
        Ok(())
    }
}

pub struct Validator<M = MetaTextValidator> {
    limits: SpringBoneLimits,
    metadata: M,
}

impl Validator<MetaTextValidator> {
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            limits: config.spring_bone.clone(),
            metadata: MetaTextValidator::new(config.meta.clone()),
        }
    }
}

impl Default for Validator<MetaTextValidator> {
    fn default() -> Self {
        Self::new(&ImportConfig::default())
    }
}

impl<M: MetadataValidator> Validator<M> {
    /// Replaces the metadata check, keeping the spring bone limits.
    pub fn with_metadata_validator<N: MetadataValidator>(self, metadata: N) -> Validator<N> {
        Validator {
            limits: self.limits,
            metadata,
        }
    }

    pub fn validate(&self, asset: &VciAsset) -> Result<(), ValidationError> {
        check_root_markers(asset)?;
        check_scripts(&asset.scripts)?;
        self.metadata.validate_metadata(asset)?;
        check_disallowed_components(asset)?;
        self.check_spring_bones(asset)
    }

    fn check_spring_bones(&self, asset: &VciAsset) -> Result<(), ValidationError> {
        let definitions: Vec<&SpringBoneDefinition> = asset
            .graph
            .traverse(asset.root)
            .filter_map(|(_, node)| node.spring_bone())
            .collect();
        if definitions.is_empty() {
            return Ok(());
        }
        if definitions.len() > self.limits.max_spring_bones {
            return Err(ValidationErrorKind::TooManySpringBone.into());
        }

        for definition in definitions {
            self.check_spring_bone(asset, definition)?;
        }
        Ok(())
    }

    fn check_spring_bone(
        &self,
        asset: &VciAsset,
        definition: &SpringBoneDefinition,
    ) -> Result<(), ValidationError> {
        let root_bones = &definition.root_bones;
        if root_bones.is_empty() {
            return Err(ValidationErrorKind::RootBoneNotFound.into());
        }
        if root_bones.len() > self.limits.max_root_bones {
            return Err(ValidationErrorKind::TooManyRootBone.into());
        }

        for (i, root_bone) in root_bones.iter().enumerate() {
            // unresolved slots are tolerated
            let Some(root_bone) = *root_bone else {
                continue;
            };
            let mut descendants = 0;
            for (id, node) in asset.graph.traverse(root_bone) {
                if node.has_component(ComponentKind::SubItem) {
                    return Err(ValidationErrorKind::RootBoneContainsSubItem.into());
                }
                descendants += 1;
                if descendants > self.limits.max_child_bones {
                    return Err(ValidationErrorKind::TooManyRootBoneChild.into());
                }
                let nested = root_bones
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != i && *other == Some(id));
                if nested {
                    return Err(ValidationErrorKind::RootBoneNested.into());
                }
            }
        }
        Ok(())
    }
}

/// Validates `asset` with the default configuration.
pub fn validate(asset: &VciAsset) -> Result<(), ValidationError> {
    Validator::default().validate(asset)
}

fn check_root_markers(asset: &VciAsset) -> Result<(), ValidationError> {
    let markers = asset
        .graph
        .traverse(asset.root)
        .filter(|(_, node)| node.has_component(ComponentKind::RootMarker))
        .count();
    if markers > 1 {
        return Err(ValidationErrorKind::MultipleVciObject.into());
    }
    Ok(())
}

fn check_scripts(scripts: &[Script]) -> Result<(), ValidationError> {
    let Some(first) = scripts.first() else {
        return Ok(());
    };
    if first.name != MAIN_SCRIPT_NAME {
        return Err(ValidationErrorKind::FirstScriptNameNotValid.into());
    }
    if scripts.iter().any(|s| s.name.is_empty()) {
        return Err(ValidationErrorKind::NoScriptName.into());
    }
    let mut seen = HashSet::with_capacity(scripts.len());
    if !scripts.iter().all(|s| seen.insert(s.name.as_str())) {
        return Err(ValidationErrorKind::ScriptNameConfliction.into());
    }
    if let Some(script) = scripts.iter().find(|s| s.name.chars().any(is_reserved_char)) {
        return Err(ValidationError::with_detail(
            ValidationErrorKind::InvalidCharacter,
            script.name.clone(),
        ));
    }
    Ok(())
}

/// Characters no portable file name may contain, plus `.`: script names
/// become file names without an extension.
fn is_reserved_char(c: char) -> bool {
    matches!(c, '"' | '<' | '>' | '|' | ':' | '*' | '?' | '\\' | '/' | '.') || c < ' '
}

fn check_disallowed_components(asset: &VciAsset) -> Result<(), ValidationError> {
    let kind = ComponentKind::DisallowedGeometryCollider;
    match asset
        .graph
        .traverse(asset.root)
        .find(|(_, node)| node.has_component(kind))
    {
        Some((_, node)) => Err(ValidationError::with_detail(
            ValidationErrorKind::InvalidComponent,
            format!("{} on node \"{}\"", kind.type_name(), node.name),
        )),
        None => Ok(()),
    }
}
