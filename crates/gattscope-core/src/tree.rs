//! Attribute tree projection.
//!
//! A read-only hierarchical snapshot derived from the store: the local
//! adapter root first, then one root per connected device, each device
//! subtree mirroring its discovered GATT hierarchy. Snapshots are
//! immutable; the store rebuilds and re-publishes the whole tree on
//! every mutation, so consumers never observe a partially updated
//! hierarchy.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{CharacteristicProperties, InstanceId};

/// Node kind. Only container kinds carry a meaningful expanded flag;
/// a descriptor is always a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    Adapter,
    Device,
    Service,
    Characteristic,
    Descriptor,
}

impl AttributeKind {
    pub fn is_container(self) -> bool {
        !matches!(self, Self::Descriptor)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Adapter => "adapter",
            Self::Device => "device",
            Self::Service => "service",
            Self::Characteristic => "characteristic",
            Self::Descriptor => "descriptor",
        }
    }
}

/// One node of the projected tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeNode {
    pub instance_id: InstanceId,
    pub kind: AttributeKind,
    pub name: String,
    /// GATT UUID, for service/characteristic/descriptor nodes.
    pub uuid: Option<Uuid>,
    /// Current value, for characteristics and descriptors.
    pub value: Option<Vec<u8>>,
    /// Access properties, for characteristics.
    pub properties: Option<CharacteristicProperties>,
    pub expanded: bool,
    /// Ordered children (discovery order). Empty for leaves.
    pub children: Vec<AttributeNode>,
}

impl AttributeNode {
    /// Find a node in this subtree by id.
    pub fn find(&self, id: &InstanceId) -> Option<&AttributeNode> {
        if &self.instance_id == id {
            return Some(self);
        }
        // Prune branches that cannot contain the id.
        if !id.is_descendant_of(&self.instance_id) {
            return None;
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Ordered forest of adapter and device subtrees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeTree {
    pub roots: Vec<AttributeNode>,
}

impl AttributeTree {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find a node anywhere in the forest by id.
    pub fn find(&self, id: &InstanceId) -> Option<&AttributeNode> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    /// Depth-first pre-order traversal of the *visible* forest: a
    /// node's children are visible only while the node is expanded.
    pub fn visible(&self) -> Visible<'_> {
        let mut stack: Vec<&AttributeNode> = self.roots.iter().collect();
        stack.reverse();
        Visible { stack }
    }

    /// Visible traversal in reverse pre-order.
    pub fn visible_rev(&self) -> impl Iterator<Item = &AttributeNode> {
        let mut nodes: Vec<&AttributeNode> = self.visible().collect();
        nodes.reverse();
        nodes.into_iter()
    }

    /// Number of currently visible nodes.
    pub fn visible_len(&self) -> usize {
        self.visible().count()
    }

    /// Position of `id` within the visible pre-order, if visible.
    pub fn visible_position(&self, id: &InstanceId) -> Option<usize> {
        self.visible().position(|node| &node.instance_id == id)
    }
}

/// Iterator over the visible pre-order; see [`AttributeTree::visible`].
pub struct Visible<'a> {
    stack: Vec<&'a AttributeNode>,
}

impl<'a> Iterator for Visible<'a> {
    type Item = &'a AttributeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if node.expanded {
            self.stack.extend(node.children.iter().rev());
        }
        Some(node)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Hand-built trees shared by the tree and navigation tests.

    use super::*;

    pub fn leaf(id: &str, kind: AttributeKind) -> AttributeNode {
        AttributeNode {
            instance_id: InstanceId::from(id),
            kind,
            name: id.to_owned(),
            uuid: None,
            value: None,
            properties: None,
            expanded: false,
            children: Vec::new(),
        }
    }

    pub fn node(
        id: &str,
        kind: AttributeKind,
        expanded: bool,
        children: Vec<AttributeNode>,
    ) -> AttributeNode {
        AttributeNode {
            instance_id: InstanceId::from(id),
            kind,
            name: id.to_owned(),
            uuid: None,
            value: None,
            properties: None,
            expanded,
            children,
        }
    }

    /// Adapter(expanded) + Device A(expanded) with one collapsed
    /// service holding a characteristic and descriptor.
    pub fn sample_tree() -> AttributeTree {
        AttributeTree {
            roots: vec![
                node("a0.local", AttributeKind::Adapter, true, vec![node(
                    "a0.local.s0",
                    AttributeKind::Service,
                    false,
                    vec![leaf("a0.local.s0.c0", AttributeKind::Characteristic)],
                )]),
                node("a0.d1", AttributeKind::Device, true, vec![node(
                    "a0.d1.s1",
                    AttributeKind::Service,
                    false,
                    vec![node(
                        "a0.d1.s1.c1",
                        AttributeKind::Characteristic,
                        false,
                        vec![leaf("a0.d1.s1.c1.d0", AttributeKind::Descriptor)],
                    )],
                )]),
            ],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::fixtures::{leaf, node, sample_tree};
    use super::*;

    fn visible_ids(tree: &AttributeTree) -> Vec<String> {
        tree.visible()
            .map(|n| n.instance_id.as_str().to_owned())
            .collect()
    }

    #[test]
    fn visible_skips_collapsed_subtrees() {
        let tree = sample_tree();
        assert_eq!(visible_ids(&tree), vec![
            "a0.local",
            "a0.local.s0",
            "a0.d1",
            "a0.d1.s1",
        ]);
    }

    #[test]
    fn expanding_a_service_reveals_characteristics() {
        let mut tree = sample_tree();
        tree.roots[1].children[0].expanded = true;
        assert_eq!(visible_ids(&tree), vec![
            "a0.local",
            "a0.local.s0",
            "a0.d1",
            "a0.d1.s1",
            "a0.d1.s1.c1",
        ]);
    }

    #[test]
    fn visible_rev_is_exact_reverse() {
        let tree = sample_tree();
        let forward: Vec<_> = tree.visible().map(|n| &n.instance_id).collect();
        let mut backward: Vec<_> = tree.visible_rev().map(|n| &n.instance_id).collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn find_locates_hidden_nodes() {
        let tree = sample_tree();
        // Collapsed nodes are still part of the data model.
        let descriptor = tree.find(&InstanceId::from("a0.d1.s1.c1.d0")).unwrap();
        assert_eq!(descriptor.kind, AttributeKind::Descriptor);
        assert!(tree.find(&InstanceId::from("a0.d9")).is_none());
    }

    #[test]
    fn visible_position_reflects_pre_order() {
        let tree = sample_tree();
        assert_eq!(tree.visible_position(&InstanceId::from("a0.d1")), Some(2));
        assert_eq!(
            tree.visible_position(&InstanceId::from("a0.d1.s1.c1")),
            None
        );
    }

    #[test]
    fn descriptor_is_never_a_container() {
        assert!(!AttributeKind::Descriptor.is_container());
        assert!(AttributeKind::Characteristic.is_container());
    }

    #[test]
    fn collapsed_root_hides_entire_subtree() {
        let tree = AttributeTree {
            roots: vec![node("a0.local", AttributeKind::Adapter, false, vec![leaf(
                "a0.local.s0",
                AttributeKind::Service,
            )])],
        };
        assert_eq!(tree.visible_len(), 1);
    }
}
