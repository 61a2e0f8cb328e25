//! Keyboard navigation over an attribute-tree snapshot.
//!
//! Pure functions: they take a tree snapshot plus the current
//! selection and compute a [`NavRequest`] for the owner to apply.
//! Nothing here mutates the tree, and every unmet precondition is a
//! no-op (`None`), never an error.
//!
//! Traversal follows the visible pre-order (collapsed subtrees are
//! skipped). Navigation does not wrap: moving past either end of the
//! visible sequence leaves the selection where it is.

use crate::model::InstanceId;
use crate::tree::{AttributeNode, AttributeTree};

/// A selection or expansion change requested by the navigation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRequest {
    Select(InstanceId),
    SetExpanded(InstanceId, bool),
}

/// Compute the next selection for a move-down (`backward = false`) or
/// move-up (`backward = true`) event.
///
/// With no current selection, the first node of the traversal is
/// selected — for a backward move that is the *last* visible node.
/// A selection that is not currently visible yields a no-op.
pub fn next_selection(
    tree: &AttributeTree,
    selected: Option<&InstanceId>,
    backward: bool,
) -> Option<NavRequest> {
    let order: Vec<&AttributeNode> = if backward {
        tree.visible_rev().collect()
    } else {
        tree.visible().collect()
    };

    let Some(selected) = selected else {
        return order
            .first()
            .map(|node| NavRequest::Select(node.instance_id.clone()));
    };

    let position = order.iter().position(|node| &node.instance_id == selected)?;
    order
        .get(position + 1)
        .map(|node| NavRequest::Select(node.instance_id.clone()))
}

/// Compute the reaction to a move-right (`expand = true`) or
/// move-left (`expand = false`) event.
///
/// Expand: no-op without a selection, on descriptors, and on nodes
/// without children; an already-expanded node advances the selection
/// instead (move-down semantics).
///
/// Collapse: an expanded node collapses; a collapsed (or leaf) node
/// at characteristic depth or deeper moves the selection to its
/// parent; anything else is a no-op.
pub fn expand_selection(
    tree: &AttributeTree,
    selected: Option<&InstanceId>,
    expand: bool,
) -> Option<NavRequest> {
    let id = selected?;
    if expand && id.is_descriptor() {
        return None;
    }

    let item = tree.find(id)?;

    if expand {
        if item.children.is_empty() {
            return None;
        }
        if item.expanded {
            return next_selection(tree, selected, false);
        }
        return Some(NavRequest::SetExpanded(id.clone(), true));
    }

    if !item.expanded {
        if id.characteristic().is_some() {
            return id.parent().map(NavRequest::Select);
        }
        return None;
    }

    Some(NavRequest::SetExpanded(id.clone(), false))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tree::fixtures::sample_tree;

    fn id(path: &str) -> InstanceId {
        InstanceId::from(path)
    }

    fn select(path: &str) -> Option<NavRequest> {
        Some(NavRequest::Select(id(path)))
    }

    // Visible order of the fixture:
    //   a0.local, a0.local.s0, a0.d1, a0.d1.s1

    #[test]
    fn move_down_without_selection_selects_first_visible() {
        let tree = sample_tree();
        assert_eq!(next_selection(&tree, None, false), select("a0.local"));
    }

    #[test]
    fn move_up_without_selection_selects_last_visible() {
        let tree = sample_tree();
        assert_eq!(next_selection(&tree, None, true), select("a0.d1.s1"));
    }

    #[test]
    fn move_down_walks_the_visible_pre_order() {
        let tree = sample_tree();
        assert_eq!(
            next_selection(&tree, Some(&id("a0.local")), false),
            select("a0.local.s0")
        );
        assert_eq!(
            next_selection(&tree, Some(&id("a0.local.s0")), false),
            select("a0.d1")
        );
    }

    #[test]
    fn move_down_from_device_selects_its_first_service() {
        // Adapter(expanded) → Device d1(expanded) → Service s1
        // (collapsed), selection on the device.
        let tree = sample_tree();
        assert_eq!(
            next_selection(&tree, Some(&id("a0.d1")), false),
            select("a0.d1.s1")
        );
    }

    #[test]
    fn no_wrap_at_either_end() {
        let tree = sample_tree();
        assert_eq!(next_selection(&tree, Some(&id("a0.d1.s1")), false), None);
        assert_eq!(next_selection(&tree, Some(&id("a0.local")), true), None);
    }

    #[test]
    fn repeated_move_down_terminates_at_the_last_visible_node() {
        let tree = sample_tree();
        let mut selected: Option<InstanceId> = None;
        for _ in 0..tree.visible_len() {
            if let Some(NavRequest::Select(next)) =
                next_selection(&tree, selected.as_ref(), false)
            {
                selected = Some(next);
            }
        }
        // Deterministic terminal position; further moves are no-ops.
        assert_eq!(selected, Some(id("a0.d1.s1")));
        assert_eq!(next_selection(&tree, selected.as_ref(), false), None);
    }

    #[test]
    fn invisible_selection_is_a_no_op() {
        // The characteristic exists but its service is collapsed.
        let tree = sample_tree();
        assert_eq!(next_selection(&tree, Some(&id("a0.d1.s1.c1")), false), None);
    }

    #[test]
    fn expand_without_selection_is_a_no_op() {
        let tree = sample_tree();
        assert_eq!(expand_selection(&tree, None, true), None);
        assert_eq!(expand_selection(&tree, None, false), None);
    }

    #[test]
    fn expand_collapsed_service_requests_expansion() {
        let tree = sample_tree();
        assert_eq!(
            expand_selection(&tree, Some(&id("a0.d1.s1")), true),
            Some(NavRequest::SetExpanded(id("a0.d1.s1"), true))
        );
    }

    #[test]
    fn expand_leaf_is_a_no_op() {
        // Characteristic c0 has no descriptors.
        let mut tree = sample_tree();
        tree.roots[0].children[0].expanded = true;
        assert_eq!(expand_selection(&tree, Some(&id("a0.local.s0.c0")), true), None);
    }

    #[test]
    fn expand_descriptor_is_a_no_op() {
        let tree = sample_tree();
        assert_eq!(
            expand_selection(&tree, Some(&id("a0.d1.s1.c1.d0")), true),
            None
        );
    }

    #[test]
    fn expand_already_expanded_node_advances_selection() {
        // Device A is expanded with children: move-right falls through
        // to move-down and selects Service S1 without touching S1's
        // expansion state.
        let tree = sample_tree();
        assert_eq!(
            expand_selection(&tree, Some(&id("a0.d1")), true),
            next_selection(&tree, Some(&id("a0.d1")), false)
        );
        assert_eq!(
            expand_selection(&tree, Some(&id("a0.d1")), true),
            select("a0.d1.s1")
        );
    }

    #[test]
    fn collapse_expanded_node_requests_collapse() {
        let tree = sample_tree();
        assert_eq!(
            expand_selection(&tree, Some(&id("a0.d1")), false),
            Some(NavRequest::SetExpanded(id("a0.d1"), false))
        );
    }

    #[test]
    fn collapse_descriptor_selects_parent_characteristic() {
        let tree = sample_tree();
        assert_eq!(
            expand_selection(&tree, Some(&id("a0.d1.s1.c1.d0")), false),
            select("a0.d1.s1.c1")
        );
    }

    #[test]
    fn collapse_collapsed_characteristic_selects_parent_service() {
        let tree = sample_tree();
        assert_eq!(
            expand_selection(&tree, Some(&id("a0.d1.s1.c1")), false),
            select("a0.d1.s1")
        );
    }

    #[test]
    fn collapse_collapsed_service_is_a_no_op() {
        // Service depth is above the characteristic segment, so a
        // collapsed service does not move the selection.
        let tree = sample_tree();
        assert_eq!(expand_selection(&tree, Some(&id("a0.d1.s1")), false), None);
    }

    #[test]
    fn missing_node_is_a_no_op() {
        let tree = sample_tree();
        assert_eq!(expand_selection(&tree, Some(&id("a0.d9")), true), None);
        assert_eq!(expand_selection(&tree, Some(&id("a0.d9")), false), None);
    }
}
