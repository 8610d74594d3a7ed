//! Error types shared by the validator, the scene graph and the loader.
//!
//! Validation failures are reported as a single [`ValidationError`]: a closed
//! [`ValidationErrorKind`] plus an optional detail string. The kind carries a
//! stable numeric [`code`](ValidationErrorKind::code) and a default English
//! message; callers that localise their UI should key on the code instead.

use std::fmt;

use crate::data_structures::scene_graph::NodeId;

/// Every reason an asset can be rejected.
///
/// The selection-phase kinds are produced by front ends before an asset ever
/// reaches the validator. The collider kinds are reserved for collider limits
/// and are not emitted by [`crate::validator`] yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    // Selection
    NothingSelected,
    MultipleSelection,
    RootMarkerMissing,

    // Structure
    FirstScriptNameNotValid,
    NoScriptName,
    ScriptNameConfliction,
    InvalidCharacter,
    InvalidMetaData,
    MultipleVciObject,
    InvalidComponent,

    // Spring bones
    TooManySpringBone,
    RootBoneNotFound,
    TooManyRootBone,
    TooManyRootBoneChild,
    RootBoneContainsSubItem,
    RootBoneNested,

    // Spring bone colliders
    TooManySpringBoneCollider,
    TooManySphereCollider,
}

impl ValidationErrorKind {
    /// Numeric code grouped by phase: 1xx selection, 2xx structure, 4xx spring bones.
    pub fn code(self) -> u16 {
        use ValidationErrorKind::*;
        match self {
            NothingSelected => 100,
            MultipleSelection => 101,
            RootMarkerMissing => 102,

            FirstScriptNameNotValid => 200,
            NoScriptName => 201,
            ScriptNameConfliction => 202,
            InvalidCharacter => 203,
            InvalidMetaData => 204,
            MultipleVciObject => 205,
            InvalidComponent => 206,

            TooManySpringBone => 400,
            RootBoneNotFound => 401,
            TooManyRootBone => 402,
            TooManyRootBoneChild => 403,
            RootBoneContainsSubItem => 404,
            RootBoneNested => 405,

            TooManySpringBoneCollider => 410,
            TooManySphereCollider => 411,
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ValidationErrorKind::*;
        let msg = match self {
            NothingSelected => "no object is selected",
            MultipleSelection => "more than one object is selected",
            RootMarkerMissing => "the selected object has no root marker",
            FirstScriptNameNotValid => "the first script must be named \"main\"",
            NoScriptName => "a script has no name",
            ScriptNameConfliction => "two scripts share the same name",
            InvalidCharacter => "a script name contains an invalid character",
            InvalidMetaData => "the asset metadata is invalid",
            MultipleVciObject => "more than one root marker exists in the hierarchy",
            InvalidComponent => "the hierarchy contains a component that is not allowed",
            TooManySpringBone => "too many spring bone definitions",
            RootBoneNotFound => "a spring bone definition has no root bones",
            TooManyRootBone => "a spring bone definition has too many root bones",
            TooManyRootBoneChild => "a spring bone root bone has too many descendants",
            RootBoneContainsSubItem => "a spring bone root bone contains a sub item",
            RootBoneNested => "a spring bone root bone is nested inside another root bone",
            TooManySpringBoneCollider => "too many spring bone colliders",
            TooManySphereCollider => "too many sphere colliders",
        };
        f.write_str(msg)
    }
}

/// The first constraint an asset violated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub detail: Option<String>,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_detail(kind: ValidationErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }

    pub fn code(&self) -> u16 {
        self.kind.code()
    }
}

impl From<ValidationErrorKind> for ValidationError {
    fn from(kind: ValidationErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({})", self.kind, detail),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Misuse of the [`SceneGraph`](crate::data_structures::scene_graph::SceneGraph) builder API.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("node {0} does not exist in this graph")]
    UnknownNode(NodeId),
    #[error("node {node} already carries a {component} component")]
    DuplicateComponent {
        node: NodeId,
        component: &'static str,
    },
}
