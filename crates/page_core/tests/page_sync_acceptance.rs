//! End-to-end acceptance: page controllers against a real store, covering
//! fold consistency, reset/stale semantics, tab scoping, optimistic-edit
//! convergence and cross-frame focus delivery.

use std::sync::Arc;

use page_core::{
    dispatch::accept_all, AlwaysAllow, AlwaysDeny, AnchorTarget, ClassRule, ControlKind,
    ControlNode, ControlTree, FixedHostTabs, PageController, PageSetup, PageState, Path, StoreBus,
    SubEvent,
};
use shared::{
    domain::{NodeId, TabId, WindowId},
    protocol::{Envelope, PageRequest, PageResponse, Update},
    state::Stats,
};
use store::{Settings, Store};

const WIDE: u32 = 1400;
const NARROW: u32 = 800;

fn panel_tree() -> ControlTree {
    let mut tree = ControlTree::new();
    tree.insert(ControlNode::new("body", ControlKind::Display));
    tree.insert(ControlNode::bound(
        "cfg-work-offline",
        ControlKind::Checkbox,
        Path::parse("config.root.workOffline").expect("path"),
    ));
    tree.insert(ControlNode::bound(
        "tab-bucket",
        ControlKind::Text,
        Path::parse("tabconfig.bucket").expect("path"),
    ));
    tree.insert(ControlNode::bound(
        "stat-collected",
        ControlKind::Display,
        Path::parse("stats.collected").expect("path"),
    ));
    tree.insert(ControlNode::bound(
        "stat-collected-size",
        ControlKind::Display,
        Path::parse("stats.collectedSize").expect("path"),
    ));
    tree.insert(ControlNode::bound(
        "tabstat-collected",
        ControlKind::Display,
        Path::parse("tabstats.collected").expect("path"),
    ));
    tree
}

fn class_rules() -> Vec<ClassRule> {
    vec![ClassRule::new("offline", |state: &PageState| {
        state.flag("config.root.workOffline")
    })]
}

async fn start_page(
    store: &Arc<Store>,
    name: &'static str,
    tab_id: TabId,
    window_id: WindowId,
    width: u32,
) -> PageController {
    PageController::start(PageSetup {
        name,
        bus: Arc::new(StoreBus::new(store.handle())),
        host_tabs: Arc::new(FixedHostTabs { tab_id, window_id }),
        tree: panel_tree(),
        class_target: "body".into(),
        class_rules: class_rules(),
        accept: accept_all,
        viewport_width: width,
    })
    .await
    .expect("page start")
}

#[tokio::test]
async fn fold_consistency_matches_the_store_after_any_delivery_burst() {
    let store = Store::new(&Settings::default());
    let mut page = start_page(&store, "popup", TabId(1), WindowId(1), WIDE).await;

    store.record_collected(TabId(1), 100, 1024).await;
    store.record_collected(TabId(1), 400, 3072).await;
    store.record_collected(TabId(2), 9, 9).await;
    page.drain().await;

    assert_eq!(page.state().count("stats.collected"), 509);
    assert_eq!(page.state().count("stats.collectedSize"), 4105);
    // Tab-scoped deltas for tab 2 must not have touched this page.
    assert_eq!(page.state().count("tabstats.collected"), 500);
    assert_eq!(page.tree().display_text("stat-collected"), Some("509"));
    assert_eq!(page.tree().display_text("stat-collected-size"), Some("4.0 KiB"));
}

#[tokio::test]
async fn reset_supersedes_updates_emitted_before_the_refetch() {
    let store = Store::new(&Settings::default());
    let mut page = start_page(&store, "popup", TabId(1), WindowId(1), WIDE).await;

    store.record_collected(TabId(1), 5, 5000).await;
    store.reset_transport();
    page.drain().await;
    assert_eq!(page.state().count("stats.collected"), 5);

    // A delivery with a pre-refetch sequence is void, whatever it claims.
    let stale_seq = store.seq().await;
    let bogus = Stats {
        collected: 999,
        ..Stats::default()
    };
    page.handle_event(SubEvent::Deliver(Envelope {
        seq: stale_seq,
        update: Update::UpdateStats { stats: Some(bogus) },
    }))
    .await;
    assert_eq!(page.state().count("stats.collected"), 5);

    // Strictly-after deliveries still apply.
    let fresh = Stats {
        collected: 6,
        ..Stats::default()
    };
    page.handle_event(SubEvent::Deliver(Envelope {
        seq: stale_seq + 1,
        update: Update::UpdateStats { stats: Some(fresh) },
    }))
    .await;
    assert_eq!(page.state().count("stats.collected"), 6);
}

#[tokio::test]
async fn tab_scoped_updates_respect_each_pages_tracked_tab() {
    let store = Store::new(&Settings::default());
    let mut page_three = start_page(&store, "popup-3", TabId(3), WindowId(1), WIDE).await;
    let mut page_seven = start_page(&store, "popup-7", TabId(7), WindowId(2), WIDE).await;

    let PageResponse::TabConfig { mut tabconfig, .. } = store
        .call(PageRequest::GetTabConfig { tab_id: TabId(7) })
        .await
        .expect("get")
    else {
        panic!("unexpected response variant");
    };
    tabconfig.own.bucket = "seven".into();
    store
        .call(PageRequest::SetTabConfig {
            tab_id: TabId(7),
            tabconfig,
        })
        .await
        .expect("set");

    page_three.drain().await;
    page_seven.drain().await;

    assert_eq!(
        page_three.state().get("tabconfig.bucket"),
        Some(&serde_json::json!("default"))
    );
    assert_eq!(
        page_seven.state().get("tabconfig.bucket"),
        Some(&serde_json::json!("seven"))
    );
}

#[tokio::test]
async fn null_scope_updates_reach_every_page() {
    let store = Store::new(&Settings::default());
    let mut page_three = start_page(&store, "popup-3", TabId(3), WindowId(1), WIDE).await;
    let mut page_seven = start_page(&store, "popup-7", TabId(7), WindowId(2), WIDE).await;

    let PageResponse::Config { mut config, .. } =
        store.call(PageRequest::GetConfig).await.expect("get")
    else {
        panic!("unexpected response variant");
    };
    config.root.bucket = "archive".into();
    store
        .call(PageRequest::SetConfig { config })
        .await
        .expect("set");
    store.announce_tab_defaults().await;

    page_three.drain().await;
    page_seven.drain().await;

    // Neither tab has an override, so both refetched the new inherited value.
    assert_eq!(
        page_three.state().get("tabconfig.bucket"),
        Some(&serde_json::json!("archive"))
    );
    assert_eq!(
        page_seven.state().get("tabconfig.bucket"),
        Some(&serde_json::json!("archive"))
    );
}

#[tokio::test]
async fn optimistic_edits_converge_on_every_page_via_the_echo() {
    let store = Store::new(&Settings::default());
    let mut popup = start_page(&store, "popup", TabId(1), WindowId(1), WIDE).await;
    let mut help = start_page(&store, "help", TabId(1), WindowId(1), WIDE).await;

    popup.toggle("cfg-work-offline").await;
    assert!(popup.state().flag("config.root.workOffline"));

    help.drain().await;
    assert!(help.state().flag("config.root.workOffline"));
    assert!(help.tree().node("body").expect("body").has_class("offline"));

    popup.drain().await;
    assert!(popup.state().flag("config.root.workOffline"));
}

#[tokio::test]
async fn payload_free_updates_mean_refetch_not_apply_empty() {
    let store = Store::new(&Settings::default());
    let mut page = start_page(&store, "popup", TabId(1), WindowId(1), WIDE).await;

    store.record_collected(TabId(1), 42, 42).await;
    let seq = store.seq().await;
    // Deliver only a payload-free delta; the page must refetch, not blank out.
    page.handle_event(SubEvent::Deliver(Envelope {
        seq: seq + 1,
        update: Update::UpdateStats { stats: None },
    }))
    .await;
    assert_eq!(page.state().count("stats.collected"), 42);
}

#[tokio::test]
async fn switch_tab_retargets_and_refetches_tab_state() {
    let store = Store::new(&Settings::default());
    let mut page = start_page(&store, "popup", TabId(3), WindowId(1), WIDE).await;

    let PageResponse::TabConfig { mut tabconfig, .. } = store
        .call(PageRequest::GetTabConfig { tab_id: TabId(5) })
        .await
        .expect("get")
    else {
        panic!("unexpected response variant");
    };
    tabconfig.own.bucket = "five".into();
    store
        .call(PageRequest::SetTabConfig {
            tab_id: TabId(5),
            tabconfig,
        })
        .await
        .expect("set");

    store.switch_tab(WindowId(1), TabId(5)).await;
    page.drain().await;

    assert_eq!(page.context().tab_id(), TabId(5));
    assert_eq!(
        page.state().get("tabconfig.bucket"),
        Some(&serde_json::json!("five"))
    );

    // A switch in another window is not ours.
    store.switch_tab(WindowId(9), TabId(8)).await;
    page.drain().await;
    assert_eq!(page.context().tab_id(), TabId(5));
}

#[tokio::test]
async fn declined_confirmation_issues_no_request() {
    let store = Store::new(&Settings::default());
    let mut page = start_page(&store, "popup", TabId(1), WindowId(1), WIDE).await;

    popup_edit_offline(&store, &mut page).await;
    let seq_before = store.seq().await;

    assert!(!page.reset_config(&AlwaysDeny).await);
    assert_eq!(store.seq().await, seq_before);
    let PageResponse::Config { config, .. } =
        store.call(PageRequest::GetConfig).await.expect("get")
    else {
        panic!("unexpected response variant");
    };
    assert!(config.root.work_offline);

    assert!(page.reset_config(&AlwaysAllow).await);
    let PageResponse::Config { config, .. } =
        store.call(PageRequest::GetConfig).await.expect("get")
    else {
        panic!("unexpected response variant");
    };
    assert!(!config.root.work_offline);
}

async fn popup_edit_offline(store: &Arc<Store>, page: &mut PageController) {
    page.toggle("cfg-work-offline").await;
    page.drain().await;
    let PageResponse::Config { config, .. } =
        store.call(PageRequest::GetConfig).await.expect("get")
    else {
        panic!("unexpected response variant");
    };
    assert!(config.root.work_offline);
}

#[tokio::test]
async fn cross_frame_navigation_focuses_the_sibling() {
    let store = Store::new(&Settings::default());
    let mut help = start_page(&store, "help", TabId(1), WindowId(1), NARROW).await;
    let mut popup = start_page(&store, "popup", TabId(1), WindowId(1), WIDE).await;

    let target = AnchorTarget::CrossFrame {
        node: NodeId::new("cfg-work-offline"),
    };
    help.preview_anchor(&target).await;
    popup.drain().await;
    assert_eq!(
        popup.tree().highlighted(),
        Some(&NodeId::new("cfg-work-offline"))
    );
    help.clear_preview().await;
    popup.drain().await;
    assert_eq!(popup.tree().highlighted(), None);

    help.click_anchor(&NodeId::new("help-anchor-limbo"), target).await;

    popup.drain().await;
    assert_eq!(
        popup.tree().focused(),
        Some(&NodeId::new("cfg-work-offline"))
    );

    // Narrow layout: the cross-frame jump is a history entry; back refocuses
    // its origin.
    help.back();
    assert_eq!(
        help.tree().focused(),
        Some(&NodeId::new("help-anchor-limbo"))
    );
}
