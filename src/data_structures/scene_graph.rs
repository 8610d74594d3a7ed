//! Scene graph and hierarchical scene organization.
//!
//! Provides an arena-backed tree of [`Node`]s with the components attached to
//! them. Parents own their children through the arena; every cross reference
//! (parent links, spring bone root bones) is a plain [`NodeId`] so the graph
//! never forms ownership cycles.

use std::fmt;

use crate::error::GraphError;

/// Index of a node inside its [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A spring bone chain definition.
///
/// `root_bones` may contain empty slots: importers keep the position of a bone
/// reference that could not be resolved instead of compacting the list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpringBoneDefinition {
    pub root_bones: Vec<Option<NodeId>>,
}

impl SpringBoneDefinition {
    pub fn new(root_bones: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            root_bones: root_bones.into_iter().map(Some).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    /// Marks the logical root of an asset.
    RootMarker,
    SpringBone(SpringBoneDefinition),
    /// An attachable sub object (grabbable item).
    SubItem,
    /// Arbitrary mesh colliders are rejected by the validator.
    DisallowedGeometryCollider,
    Other(String),
}

/// Discriminant of [`Component`] without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    RootMarker,
    SpringBone,
    SubItem,
    DisallowedGeometryCollider,
    Other,
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::RootMarker => ComponentKind::RootMarker,
            Component::SpringBone(_) => ComponentKind::SpringBone,
            Component::SubItem => ComponentKind::SubItem,
            Component::DisallowedGeometryCollider => ComponentKind::DisallowedGeometryCollider,
            Component::Other(_) => ComponentKind::Other,
        }
    }

    /// Name used in user-facing error details.
    pub fn type_name(&self) -> &str {
        match self {
            Component::Other(tag) => tag,
            other => other.kind().type_name(),
        }
    }
}

impl ComponentKind {
    pub fn type_name(self) -> &'static str {
        match self {
            ComponentKind::RootMarker => "RootMarker",
            ComponentKind::SpringBone => "SpringBone",
            ComponentKind::SubItem => "SubItem",
            ComponentKind::DisallowedGeometryCollider => "MeshCollider",
            ComponentKind::Other => "Other",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    /// Inactive nodes still take part in validation.
    pub active: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    components: Vec<Component>,
}

impl Node {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            active: true,
            parent,
            children: Vec::new(),
            components: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.components.iter().any(|c| c.kind() == kind)
    }

    pub fn spring_bone(&self) -> Option<&SpringBoneDefinition> {
        self.components.iter().find_map(|c| match c {
            Component::SpringBone(def) => Some(def),
            _ => None,
        })
    }
}

/// Arena owning every node of one asset.
///
/// Nodes can only be created as new roots or below an existing node, which
/// keeps the arena a forest by construction.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_root(&mut self, name: impl Into<String>) -> NodeId {
        self.push(Node::new(name.into(), None))
    }

    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, GraphError> {
        if self.node(parent).is_none() {
            return Err(GraphError::UnknownNode(parent));
        }
        let id = self.push(Node::new(name.into(), Some(parent)));
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Attaches `component` to `node`. A node holds at most one component of
    /// each kind except [`Component::Other`].
    pub fn add_component(&mut self, node: NodeId, component: Component) -> Result<(), GraphError> {
        let target = self
            .nodes
            .get_mut(node.index())
            .ok_or(GraphError::UnknownNode(node))?;
        let kind = component.kind();
        if kind != ComponentKind::Other && target.has_component(kind) {
            return Err(GraphError::DuplicateComponent {
                node,
                component: kind.type_name(),
            });
        }
        target.components.push(component);
        Ok(())
    }

    pub fn set_active(&mut self, node: NodeId, active: bool) -> Result<(), GraphError> {
        let target = self
            .nodes
            .get_mut(node.index())
            .ok_or(GraphError::UnknownNode(node))?;
        target.active = active;
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn has_component(&self, id: NodeId, kind: ComponentKind) -> bool {
        self.node(id).is_some_and(|n| n.has_component(kind))
    }

    /// Pre-order walk starting at `root`: the root first, then every child
    /// subtree from left to right. An unknown `root` yields nothing.
    pub fn traverse(&self, root: NodeId) -> Traverse<'_> {
        let stack = match self.node(root) {
            Some(_) => vec![root],
            None => Vec::new(),
        };
        Traverse { graph: self, stack }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }
}

/// Lazy pre-order iterator returned by [`SceneGraph::traverse`].
pub struct Traverse<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.graph.nodes[id.index()];
        // reversed so the leftmost child is popped first
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, node))
    }
}
