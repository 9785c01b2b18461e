//! Arena representation of an instance dependency tree.
//!
//! Nodes live in a flat vector and refer to each other by [`NodeId`]. The
//! resolver's aggregating loop is the only writer, so nodes need no locking.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::{Alias, InstanceName};
use super::image::{ImageIdentity, ImageMetadata};

/// Index of a node inside a [`Topology`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Why a node is part of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOrigin {
    /// The instance the user asked to start.
    Root,
    /// Bound by an explicit dependency link.
    Linked,
    /// A new dependency instance started for an unbound alias.
    Started,
    /// An equivalent instance reused instead of starting a duplicate.
    Shared,
}

/// One instance in the dependency tree.
#[derive(Debug, Clone)]
pub struct InstanceNode {
    pub instance: InstanceName,
    pub metadata: ImageMetadata,
    pub origin: NodeOrigin,
    pub parent: Option<NodeId>,
    /// Alias under which the parent refers to this node.
    pub alias: Option<Alias>,
    pub children: BTreeMap<Alias, NodeId>,
    /// Declared aliases left unbound; the executor reports them if required.
    pub unresolved: Vec<Alias>,
    pub running: bool,
    pub shared: bool,
    /// Whether the executor starts this instance.
    pub starts: bool,
}

impl InstanceNode {
    #[must_use]
    pub fn identity(&self) -> ImageIdentity {
        self.metadata.identity()
    }
}

/// Dependency information handed to the instance executor, per alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyInfo {
    pub org: String,
    pub name: String,
    #[serde(rename = "ver")]
    pub version: String,
    #[serde(rename = "instanceName")]
    pub instance_name: InstanceName,
    #[serde(rename = "isRoot")]
    pub is_root: bool,
}

impl DependencyInfo {
    #[must_use]
    pub fn new(identity: &ImageIdentity, instance: &InstanceName, is_root: bool) -> Self {
        Self {
            org: identity.organization.clone(),
            name: identity.name.clone(),
            version: identity.version.clone(),
            instance_name: instance.clone(),
            is_root,
        }
    }
}

/// One node of the tree as handed to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedInstance {
    pub instance_name: InstanceName,
    pub org: String,
    pub name: String,
    #[serde(rename = "ver")]
    pub version: String,
    pub running: bool,
    pub shared: bool,
    pub starts: bool,
    /// Alias to the instance bound to it.
    pub dependencies: BTreeMap<Alias, InstanceName>,
    pub unresolved: Vec<Alias>,
}

/// Instance dependency tree rooted at node 0.
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<InstanceNode>,
}

impl Topology {
    /// Create a tree holding only the root instance.
    #[must_use]
    pub fn new(instance: InstanceName, metadata: ImageMetadata) -> Self {
        Self {
            nodes: vec![InstanceNode {
                instance,
                metadata,
                origin: NodeOrigin::Root,
                parent: None,
                alias: None,
                children: BTreeMap::new(),
                unresolved: Vec::new(),
                running: false,
                shared: false,
                starts: true,
            }],
        }
    }

    #[must_use]
    pub const fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn root(&self) -> &InstanceNode {
        &self.nodes[0]
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &InstanceNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut InstanceNode {
        &mut self.nodes[id.0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes with their ids, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &InstanceNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Insert `node` as the child of `parent` under `alias`.
    pub(crate) fn attach(&mut self, parent: NodeId, alias: Alias, mut node: InstanceNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.alias = Some(alias.clone());
        self.nodes.push(node);
        self.nodes[parent.0].children.insert(alias, id);
        id
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).parent, move |p| self.node(*p).parent)
    }

    /// First node started under `identity` that is neither `from` nor one of
    /// its ancestors.
    #[must_use]
    pub fn find_started(&self, identity: &ImageIdentity, from: NodeId) -> Option<NodeId> {
        let lineage: Vec<NodeId> = std::iter::once(from).chain(self.ancestors(from)).collect();
        self.iter()
            .find(|(id, n)| {
                n.starts
                    && n.origin != NodeOrigin::Root
                    && !lineage.contains(id)
                    && &n.identity() == identity
            })
            .map(|(id, _)| id)
    }

    /// Alias to dependency information for the direct children of `id`.
    #[must_use]
    pub fn dependency_info(&self, id: NodeId) -> BTreeMap<Alias, DependencyInfo> {
        self.node(id)
            .children
            .iter()
            .map(|(alias, child)| {
                let child = self.node(*child);
                (
                    alias.clone(),
                    DependencyInfo::new(&child.identity(), &child.instance, false),
                )
            })
            .collect()
    }

    /// Instances the executor has to start, root first.
    #[must_use]
    pub fn instances_to_start(&self) -> Vec<&InstanceName> {
        self.nodes
            .iter()
            .filter(|n| n.starts)
            .map(|n| &n.instance)
            .collect()
    }

    /// Every node in tree order, root first.
    #[must_use]
    pub fn plan(&self) -> Vec<PlannedInstance> {
        self.nodes
            .iter()
            .map(|node| {
                let identity = node.identity();
                PlannedInstance {
                    instance_name: node.instance.clone(),
                    org: identity.organization,
                    name: identity.name,
                    version: identity.version,
                    running: node.running,
                    shared: node.shared,
                    starts: node.starts,
                    dependencies: node
                        .children
                        .iter()
                        .map(|(alias, child)| (alias.clone(), self.node(*child).instance.clone()))
                        .collect(),
                    unresolved: node.unresolved.clone(),
                }
            })
            .collect()
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = self.node(id);
        let indent = "  ".repeat(depth);
        let label = match &node.alias {
            Some(alias) => format!("{alias}: "),
            None => String::new(),
        };
        let mut flags = Vec::new();
        if node.running {
            flags.push("running");
        }
        if node.shared {
            flags.push("shared");
        }
        if node.starts {
            flags.push("start");
        }
        writeln!(
            f,
            "{indent}{label}{} ({}) [{}]",
            node.instance,
            node.identity(),
            flags.join(", ")
        )?;
        for child in node.children.values() {
            self.fmt_node(f, *child, depth + 1)?;
        }
        for alias in &node.unresolved {
            writeln!(f, "{indent}  {alias}: <unresolved>")?;
        }
        Ok(())
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root_id(), 0)
    }
}
