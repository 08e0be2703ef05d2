//! Help surface wiring: sections, anchors into the embedded popup frame, and
//! the smaller set of update kinds this page cares about.

use page_core::{AnchorTarget, ClassRule, ControlKind, ControlNode, ControlTree, PageState};
use shared::{domain::NodeId, protocol::UpdateKind};

pub const BODY: &str = "help-body";

pub fn build_tree() -> ControlTree {
    let mut tree = ControlTree::new();
    tree.insert(ControlNode::new(BODY, ControlKind::Display));
    tree.insert(ControlNode::new("section-collecting", ControlKind::Display));
    tree.insert(ControlNode::new("section-limbo", ControlKind::Display));
    tree.insert(ControlNode::new("section-buckets", ControlKind::Display));
    tree
}

/// Anchors as (origin element, target): table-of-contents entries stay
/// internal, "see this control" links cross into the popup frame.
pub fn anchors() -> Vec<(NodeId, AnchorTarget)> {
    vec![
        (
            NodeId::new("toc-buckets"),
            AnchorTarget::Internal {
                node: NodeId::new("section-buckets"),
            },
        ),
        (
            NodeId::new("help-anchor-limbo"),
            AnchorTarget::CrossFrame {
                node: NodeId::new("tab-limbo"),
            },
        ),
        (
            NodeId::new("help-anchor-work-offline"),
            AnchorTarget::CrossFrame {
                node: NodeId::new("root-work-offline"),
            },
        ),
    ]
}

pub fn class_rules() -> Vec<ClassRule> {
    vec![ClassRule::new("seasonal", |state: &PageState| {
        state.flag("config.seasonal")
    })]
}

/// The help page tracks config and presentation signals; stats deltas go to
/// the generic default handler.
pub fn accept(kind: UpdateKind) -> bool {
    !matches!(kind, UpdateKind::UpdateStats | UpdateKind::UpdateTabStats)
}
