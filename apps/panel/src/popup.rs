//! Popup surface wiring: bound controls, stat displays and class rules.

use page_core::{ClassRule, ControlKind, ControlNode, ControlTree, PageState, Path};
use shared::protocol::UpdateKind;

/// The class-rule target; visibility CSS keys off this node's markers.
pub const BODY: &str = "body";

fn bound(tree: &mut ControlTree, id: &str, kind: ControlKind, path: &str) {
    if let Ok(path) = Path::parse(path) {
        tree.insert(ControlNode::bound(id, kind, path));
    }
}

pub fn build_tree() -> ControlTree {
    let mut tree = ControlTree::new();
    tree.insert(ControlNode::new(BODY, ControlKind::Display));

    // Global capture settings.
    bound(&mut tree, "root-collecting", ControlKind::Checkbox, "config.root.collecting");
    bound(&mut tree, "root-work-offline", ControlKind::Checkbox, "config.root.workOffline");
    bound(&mut tree, "root-bucket", ControlKind::Text, "config.root.bucket");
    bound(&mut tree, "auto-limbo-collect", ControlKind::Checkbox, "config.autoPopInLimboCollect");
    bound(&mut tree, "auto-limbo-discard", ControlKind::Checkbox, "config.autoPopInLimboDiscard");
    bound(&mut tree, "history-enabled", ControlKind::Checkbox, "config.history");

    // This tab's overrides. Tri-state renders "some children differ".
    bound(&mut tree, "tab-collecting", ControlKind::TriState, "tabconfig.collecting");
    bound(&mut tree, "tab-work-offline", ControlKind::Checkbox, "tabconfig.workOffline");
    bound(&mut tree, "tab-limbo", ControlKind::TriState, "tabconfig.limbo");
    bound(&mut tree, "tab-bucket", ControlKind::Text, "tabconfig.bucket");

    // Read-only usage counters.
    bound(&mut tree, "stat-collected", ControlKind::Display, "stats.collected");
    bound(&mut tree, "stat-collected-size", ControlKind::Display, "stats.collectedSize");
    bound(&mut tree, "stat-queued", ControlKind::Display, "stats.queued");
    bound(&mut tree, "stat-in-limbo", ControlKind::Display, "stats.inLimbo");
    bound(&mut tree, "stat-in-limbo-size", ControlKind::Display, "stats.inLimboSize");
    bound(&mut tree, "stat-failed", ControlKind::Display, "stats.failed");
    bound(&mut tree, "tabstat-collected", ControlKind::Display, "tabstats.collected");
    bound(&mut tree, "tabstat-in-limbo", ControlKind::Display, "tabstats.inLimbo");

    tree
}

pub fn class_rules() -> Vec<ClassRule> {
    vec![
        ClassRule::new("collecting", |state: &PageState| {
            state.flag("config.root.collecting")
        }),
        ClassRule::new("offline", |state: &PageState| {
            state.flag("config.root.workOffline")
        }),
        ClassRule::new("tab-offline", |state: &PageState| {
            state.flag("tabconfig.workOffline")
        }),
        ClassRule::new("has-limbo", |state: &PageState| {
            state.count("stats.inLimbo") > 0
        }),
        ClassRule::new("has-failures", |state: &PageState| {
            state.count("stats.failed") > 0
        }),
        ClassRule::new("verbose", |state: &PageState| {
            state.flag("config.popUiVerbose")
        }),
    ]
}

/// The popup folds every update kind locally.
pub fn accept(_kind: UpdateKind) -> bool {
    true
}
