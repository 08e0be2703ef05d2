use serde_json::json;

use crate::{
    classes::{ClassRule, ConditionalClassEngine},
    controls::{ControlKind, ControlNode, ControlTree},
    page::PageState,
};

fn rules() -> Vec<ClassRule> {
    vec![
        ClassRule::new("collecting", |state: &PageState| {
            state.flag("config.root.collecting")
        }),
        ClassRule::new("offline", |state: &PageState| {
            state.flag("config.root.workOffline")
        }),
        ClassRule::new("has-limbo", |state: &PageState| {
            state.count("stats.inLimbo") > 0
        }),
    ]
}

fn state(collecting: bool, offline: bool, in_limbo: u64) -> PageState {
    PageState {
        config: json!({ "root": { "collecting": collecting, "workOffline": offline } }),
        stats: json!({ "inLimbo": in_limbo }),
        ..PageState::default()
    }
}

#[test]
fn evaluation_is_a_pure_function_of_state() {
    let engine = ConditionalClassEngine::new("body", rules());
    let state = state(true, false, 3);
    let first = engine.evaluate(&state);
    let second = engine.evaluate(&state);
    assert_eq!(first, second);
    assert_eq!(first["collecting"], true);
    assert_eq!(first["offline"], false);
    assert_eq!(first["has-limbo"], true);
}

#[test]
fn recompute_is_idempotent_on_the_tree() {
    let engine = ConditionalClassEngine::new("body", rules());
    let mut tree = ControlTree::new();
    tree.insert(ControlNode::new("body", ControlKind::Display));

    let state = state(false, true, 0);
    engine.recompute(&mut tree, &state);
    let after_first: Vec<String> = tree
        .node("body")
        .expect("node")
        .classes()
        .iter()
        .cloned()
        .collect();
    engine.recompute(&mut tree, &state);
    let after_second: Vec<String> = tree
        .node("body")
        .expect("node")
        .classes()
        .iter()
        .cloned()
        .collect();
    assert_eq!(after_first, after_second);
    assert_eq!(after_first, vec!["offline".to_owned()]);
}

#[test]
fn unowned_markers_are_left_untouched() {
    let engine = ConditionalClassEngine::new("body", rules());
    let mut tree = ControlTree::new();
    let mut body = ControlNode::new("body", ControlKind::Display);
    body.set_class("seasonal-theme", true);
    tree.insert(body);

    engine.recompute(&mut tree, &state(true, false, 0));
    let body = tree.node("body").expect("node");
    assert!(body.has_class("seasonal-theme"));
    assert!(body.has_class("collecting"));
    assert!(!body.has_class("offline"));
}
