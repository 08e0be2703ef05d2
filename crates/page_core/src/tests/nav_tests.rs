use shared::{domain::NodeId, protocol::Update};

use crate::nav::{
    AnchorTarget, HistoryEntry, LayoutMode, NavigationBridge, COLUMNS_MIN_WIDTH,
};

#[test]
fn layout_threshold_is_exact() {
    assert_eq!(LayoutMode::for_width(COLUMNS_MIN_WIDTH), LayoutMode::Columns);
    assert_eq!(
        LayoutMode::for_width(COLUMNS_MIN_WIDTH - 1),
        LayoutMode::Linear
    );
}

#[test]
fn resize_rederives_the_mode_every_time() {
    let mut nav = NavigationBridge::new(COLUMNS_MIN_WIDTH);
    assert_eq!(nav.layout(), LayoutMode::Columns);
    assert_eq!(nav.resize(COLUMNS_MIN_WIDTH - 1), LayoutMode::Linear);
    assert_eq!(nav.resize(COLUMNS_MIN_WIDTH), LayoutMode::Columns);
}

#[test]
fn internal_targets_focus_locally_and_record_history() {
    let mut nav = NavigationBridge::new(COLUMNS_MIN_WIDTH);
    let effect = nav.navigate(
        &NodeId::new("anchor-limbo"),
        AnchorTarget::Internal {
            node: NodeId::new("section-limbo"),
        },
    );
    assert_eq!(effect.focus_local, Some(NodeId::new("section-limbo")));
    assert!(effect.relay.is_none());
    assert!(effect.pushed_history);
    assert_eq!(nav.depth(), 1);
}

#[test]
fn cross_frame_in_columns_never_pollutes_history() {
    let mut nav = NavigationBridge::new(COLUMNS_MIN_WIDTH);
    let effect = nav.navigate(
        &NodeId::new("help-anchor"),
        AnchorTarget::CrossFrame {
            node: NodeId::new("control-limbo"),
        },
    );
    assert!(effect.focus_local.is_none());
    assert!(matches!(effect.relay, Some(Update::FocusNode { .. })));
    assert!(!effect.pushed_history);
    assert_eq!(nav.depth(), 0);
}

#[test]
fn cross_frame_in_linear_records_history() {
    let mut nav = NavigationBridge::new(COLUMNS_MIN_WIDTH - 1);
    let effect = nav.navigate(
        &NodeId::new("help-anchor"),
        AnchorTarget::CrossFrame {
            node: NodeId::new("control-limbo"),
        },
    );
    assert!(effect.pushed_history);
    assert_eq!(nav.depth(), 1);
    assert_eq!(
        nav.pop_virtual(),
        Some(HistoryEntry {
            origin: NodeId::new("help-anchor")
        })
    );
}

#[test]
fn pop_returns_entries_newest_first() {
    let mut nav = NavigationBridge::new(COLUMNS_MIN_WIDTH);
    nav.push_virtual(HistoryEntry {
        origin: NodeId::new("first"),
    });
    nav.push_virtual(HistoryEntry {
        origin: NodeId::new("second"),
    });
    assert_eq!(nav.pop_virtual().expect("entry").origin, NodeId::new("second"));
    assert_eq!(nav.pop_virtual().expect("entry").origin, NodeId::new("first"));
    assert!(nav.pop_virtual().is_none());
}

#[test]
fn highlight_helper_clears_with_none() {
    assert!(matches!(
        NavigationBridge::highlight(Some(NodeId::new("n"))),
        Update::HighlightNode { node_id: Some(_) }
    ));
    assert!(matches!(
        NavigationBridge::highlight(None),
        Update::HighlightNode { node_id: None }
    ));
}
