//! Per-page top-level controller: owns the page's subscription, context,
//! binders, class engine and navigation bridge, and folds broadcast updates
//! over them in arrival order.

use std::sync::Arc;

use serde_json::Value;
use shared::{
    domain::{NodeId, TabId, WindowId},
    protocol::{Envelope, PageRequest, PageResponse, Update, UpdateKind},
    state::{Config, TabConfig},
};
use tracing::{debug, info, warn};

use crate::{
    binder::UiBinder,
    bus::{MessageBus, SubEvent, Subscription},
    classes::{ClassRule, ConditionalClassEngine},
    controls::{ControlTree, ControlValue, TriState},
    dispatch::{Admit, UpdateFilter},
    nav::{AnchorTarget, LayoutMode, NavigationBridge},
    path::{get_path, Path},
    rules,
    tabs::{HostTabs, TabRouter},
};

/// Gate for destructive, user-confirmation-required actions.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

pub struct AlwaysAllow;

impl Confirm for AlwaysAllow {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

pub struct AlwaysDeny;

impl Confirm for AlwaysDeny {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// The page's local cache of every state kind, as path-addressable values.
/// Always replaced wholesale by a snapshot or by folding one update; never
/// partially mutated in place.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    pub config: Value,
    pub stats: Value,
    pub tabconfig: Value,
    pub tabstats: Value,
}

impl PageState {
    fn namespace(&self, name: &str) -> Option<&Value> {
        match name {
            "config" => Some(&self.config),
            "stats" => Some(&self.stats),
            "tabconfig" => Some(&self.tabconfig),
            "tabstats" => Some(&self.tabstats),
            _ => None,
        }
    }

    /// Resolve a full dotted path (`config.root.workOffline`).
    pub fn get(&self, dotted: &str) -> Option<&Value> {
        let path = Path::parse(dotted).ok()?;
        let root = self.namespace(path.head())?;
        let rel = path.strip_head()?;
        get_path(root, &rel)
    }

    pub fn flag(&self, dotted: &str) -> bool {
        self.get(dotted).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn count(&self, dotted: &str) -> u64 {
        self.get(dotted).and_then(Value::as_u64).unwrap_or_default()
    }
}

/// Explicit per-page context: tab scope, working state copies, visibility.
pub struct PageContext {
    pub router: TabRouter,
    pub state: PageState,
    pub viewport_width: u32,
    pub visible: bool,
}

impl PageContext {
    pub fn tab_id(&self) -> TabId {
        self.router.tab_id()
    }

    pub fn window_id(&self) -> WindowId {
        self.router.window_id()
    }
}

/// Everything needed to bring one page up.
pub struct PageSetup {
    pub name: &'static str,
    pub bus: Arc<dyn MessageBus>,
    pub host_tabs: Arc<dyn HostTabs>,
    pub tree: ControlTree,
    pub class_target: String,
    pub class_rules: Vec<ClassRule>,
    pub accept: fn(UpdateKind) -> bool,
    pub viewport_width: u32,
}

pub struct PageController {
    name: &'static str,
    bus: Arc<dyn MessageBus>,
    sub: Subscription,
    ctx: PageContext,
    tree: ControlTree,
    config_binder: Option<UiBinder>,
    stats_binder: Option<UiBinder>,
    tabconfig_binder: Option<UiBinder>,
    tabstats_binder: Option<UiBinder>,
    classes: ConditionalClassEngine,
    nav: NavigationBridge,
    filter: UpdateFilter,
}

impl PageController {
    /// Bring the page up: subscribe, resolve the tab scope, fetch all four
    /// snapshots, bind controls, derive classes, then yield once to let
    /// layout settle before marking the page visible.
    pub async fn start(setup: PageSetup) -> anyhow::Result<Self> {
        let PageSetup {
            name,
            bus,
            host_tabs,
            tree,
            class_target,
            class_rules,
            accept,
            viewport_width,
        } = setup;

        let mut sub = bus
            .subscribe()
            .await
            .map_err(|err| anyhow::anyhow!("page '{name}' could not subscribe: {err}"))?;
        match sub.next().await {
            Some(SubEvent::Connected { .. }) => {}
            _ => anyhow::bail!("page '{name}' subscription closed before connecting"),
        }

        let router = TabRouter::resolve(host_tabs.as_ref()).await;
        let mut page = Self {
            name,
            bus,
            sub,
            ctx: PageContext {
                router,
                state: PageState::default(),
                viewport_width,
                visible: false,
            },
            tree,
            config_binder: None,
            stats_binder: None,
            tabconfig_binder: None,
            tabstats_binder: None,
            classes: ConditionalClassEngine::new(class_target, class_rules),
            nav: NavigationBridge::new(viewport_width),
            filter: UpdateFilter::new(accept),
        };

        page.refetch_all().await;
        page.recompute_classes();
        // Let layout settle before revealing, so the page never flashes
        // unbound controls.
        tokio::task::yield_now().await;
        page.ctx.visible = true;
        info!(page = name, tab = page.ctx.tab_id().0, "page visible");
        Ok(page)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    pub fn state(&self) -> &PageState {
        &self.ctx.state
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    pub fn layout(&self) -> LayoutMode {
        self.nav.layout()
    }

    pub fn nav(&self) -> &NavigationBridge {
        &self.nav
    }

    /// Process one subscription event; false once the transport is gone.
    pub async fn pump(&mut self) -> bool {
        let Some(event) = self.sub.next().await else {
            return false;
        };
        self.handle_event(event).await;
        true
    }

    /// Drain without blocking: process events until the subscription would
    /// wait. Demos and tests use this to reach a settled state.
    pub async fn drain(&mut self) {
        loop {
            let next = tokio::time::timeout(std::time::Duration::from_millis(10), self.sub.next());
            match next.await {
                Ok(Some(event)) => self.handle_event(event).await,
                Ok(None) | Err(_) => break,
            }
        }
    }

    pub async fn handle_event(&mut self, event: SubEvent) {
        match event {
            SubEvent::Connected { will_reset } => {
                if will_reset {
                    info!(page = self.name, "transport reset; refetching snapshots");
                    self.refetch_all().await;
                }
            }
            SubEvent::Deliver(envelope) => self.fold_update(envelope).await,
        }
        self.recompute_classes();
    }

    /// Fixed routing order: admission checks, then tab routing, then state
    /// folds, then presentation signals. Unaccepted kinds go to the generic
    /// default handler.
    async fn fold_update(&mut self, envelope: Envelope) {
        match self.filter.admit(&envelope, self.ctx.tab_id()) {
            Admit::Stale => {
                debug!(
                    page = self.name,
                    seq = envelope.seq,
                    kind = envelope.update.kind_name(),
                    "superseded delivery discarded"
                );
            }
            Admit::OtherTab => {
                debug!(
                    page = self.name,
                    kind = envelope.update.kind_name(),
                    "delivery scoped to another tab"
                );
            }
            Admit::Fallback => self.default_handler(envelope.update),
            Admit::Local => match envelope.update {
                Update::SwitchTab { window_id, tab_id } => {
                    if self.ctx.router.on_switch_tab(window_id, tab_id) {
                        self.fetch_tab_config().await;
                        self.fetch_tab_stats().await;
                    }
                }
                Update::UpdateConfig { config } => match config {
                    Some(config) => self.apply_config(&config),
                    None => self.fetch_config().await,
                },
                Update::UpdateStats { stats } => match stats {
                    Some(stats) => self.apply_value("stats", &stats),
                    None => self.fetch_stats().await,
                },
                Update::UpdateTabConfig { tabconfig, .. } => match tabconfig {
                    Some(tabconfig) => self.apply_value("tabconfig", &tabconfig),
                    None => self.fetch_tab_config().await,
                },
                Update::UpdateTabStats { tabstats, .. } => match tabstats {
                    Some(tabstats) => self.apply_value("tabstats", &tabstats),
                    None => self.fetch_tab_stats().await,
                },
                Update::PopupResized => {
                    // Sibling geometry changed; re-derive our layout mode
                    // from the current viewport, never from a cached mode.
                    self.nav.resize(self.ctx.viewport_width);
                }
                Update::HighlightNode { node_id } => self.tree.set_highlight(node_id),
                Update::FocusNode { node_id } => self.tree.focus(node_id),
            },
        }
    }

    /// Generic fallback: forward-compatible no-op passthrough.
    fn default_handler(&self, update: Update) {
        debug!(
            page = self.name,
            kind = update.kind_name(),
            "update left to the default handler"
        );
    }

    async fn refetch_all(&mut self) {
        self.fetch_config().await;
        self.fetch_stats().await;
        self.fetch_tab_config().await;
        self.fetch_tab_stats().await;
    }

    async fn fetch_config(&mut self) {
        match self.bus.call(PageRequest::GetConfig).await {
            Ok(PageResponse::Config { seq, config }) => {
                self.filter.set_watermark(UpdateKind::UpdateConfig, seq);
                self.apply_config(&config);
            }
            Ok(_) => warn!(page = self.name, "unexpected response to getConfig"),
            Err(err) => warn!(
                page = self.name,
                error = %err,
                "getConfig failed; keeping last-known-good state"
            ),
        }
    }

    async fn fetch_stats(&mut self) {
        match self.bus.call(PageRequest::GetStats).await {
            Ok(PageResponse::Stats { seq, stats }) => {
                self.filter.set_watermark(UpdateKind::UpdateStats, seq);
                self.apply_value("stats", &stats);
            }
            Ok(_) => warn!(page = self.name, "unexpected response to getStats"),
            Err(err) => warn!(
                page = self.name,
                error = %err,
                "getStats failed; keeping last-known-good state"
            ),
        }
    }

    async fn fetch_tab_config(&mut self) {
        let tab_id = self.ctx.tab_id();
        match self.bus.call(PageRequest::GetTabConfig { tab_id }).await {
            Ok(PageResponse::TabConfig { seq, tabconfig }) => {
                self.filter.set_watermark(UpdateKind::UpdateTabConfig, seq);
                self.apply_value("tabconfig", &tabconfig);
            }
            Ok(_) => warn!(page = self.name, "unexpected response to getTabConfig"),
            Err(err) => warn!(
                page = self.name,
                tab = tab_id.0,
                error = %err,
                "getTabConfig failed; keeping last-known-good state"
            ),
        }
    }

    async fn fetch_tab_stats(&mut self) {
        let tab_id = self.ctx.tab_id();
        match self.bus.call(PageRequest::GetTabStats { tab_id }).await {
            Ok(PageResponse::TabStats { seq, tabstats }) => {
                self.filter.set_watermark(UpdateKind::UpdateTabStats, seq);
                self.apply_value("tabstats", &tabstats);
            }
            Ok(_) => warn!(page = self.name, "unexpected response to getTabStats"),
            Err(err) => warn!(
                page = self.name,
                tab = tab_id.0,
                error = %err,
                "getTabStats failed; keeping last-known-good state"
            ),
        }
    }

    fn apply_config(&mut self, config: &Config) {
        self.apply_value("config", config);
    }

    fn apply_value<T: serde::Serialize>(&mut self, namespace: &'static str, state: &T) {
        let value = match serde_json::to_value(state) {
            Ok(value) => value,
            Err(err) => {
                warn!(page = self.name, namespace, error = %err, "state not serializable");
                return;
            }
        };
        let (binder, slot) = match namespace {
            "config" => (&mut self.config_binder, &mut self.ctx.state.config),
            "stats" => (&mut self.stats_binder, &mut self.ctx.state.stats),
            "tabconfig" => (&mut self.tabconfig_binder, &mut self.ctx.state.tabconfig),
            "tabstats" => (&mut self.tabstats_binder, &mut self.ctx.state.tabstats),
            _ => return,
        };
        *slot = value.clone();
        match binder {
            Some(binder) => binder.apply(&mut self.tree, value),
            None => *binder = Some(UiBinder::bind(namespace, &mut self.tree, value)),
        }
    }

    fn recompute_classes(&mut self) {
        self.classes.recompute(&mut self.tree, &self.ctx.state);
    }

    /// A user changed a control's value. Optimistic: folded locally and
    /// pushed upstream without awaiting acknowledgement; never rolled back.
    pub async fn edit(&mut self, node_id: &str, input: ControlValue) {
        self.fold_edit(node_id, EditAction::Set(input)).await;
    }

    /// A user toggled a checkbox or tri-state control.
    pub async fn toggle(&mut self, node_id: &str) {
        self.fold_edit(node_id, EditAction::Toggle).await;
    }

    /// Programmatic tri-state write; the only way to reach indeterminate.
    /// Render-side only, so nothing is pushed upstream.
    pub fn set_tri(&mut self, node_id: &str, tri: TriState) {
        let binder = match self
            .tree
            .node(node_id)
            .and_then(|node| node.path())
            .map(|path| path.head())
        {
            Some("config") => self.config_binder.as_mut(),
            Some("tabconfig") => self.tabconfig_binder.as_mut(),
            _ => None,
        };
        let Some(binder) = binder else {
            warn!(page = self.name, control = node_id, "tri-state write on unbound control ignored");
            return;
        };
        if let Err(err) = binder.set_tri(&mut self.tree, node_id, tri) {
            warn!(page = self.name, control = node_id, error = %err, "tri-state write rejected");
        }
    }

    async fn fold_edit(&mut self, node_id: &str, action: EditAction) {
        let Some(namespace) = self
            .tree
            .node(node_id)
            .and_then(|node| node.path())
            .map(|path| path.head().to_owned())
        else {
            warn!(page = self.name, control = node_id, "edit on unbound control ignored");
            return;
        };

        let request = match namespace.as_str() {
            "config" => {
                let rules_fn = rules::config_rules();
                let Some(binder) = self.config_binder.as_mut() else {
                    return;
                };
                let outcome = match action {
                    EditAction::Set(input) => {
                        binder.user_edit(&mut self.tree, node_id, input, &rules_fn)
                    }
                    EditAction::Toggle => binder.toggle(&mut self.tree, node_id, &rules_fn),
                };
                match outcome {
                    Ok(working) => {
                        self.ctx.state.config = working.clone();
                        match serde_json::from_value::<Config>(working) {
                            Ok(config) => Some(PageRequest::SetConfig { config }),
                            Err(err) => {
                                warn!(page = self.name, error = %err, "working config no longer deserializes; edit not pushed");
                                None
                            }
                        }
                    }
                    Err(err) => {
                        warn!(page = self.name, control = node_id, error = %err, "edit rejected");
                        None
                    }
                }
            }
            "tabconfig" => {
                let impure = self.ctx.state.flag("config.workOfflineImpure");
                let rules_fn = rules::tab_config_rules(impure);
                let Some(binder) = self.tabconfig_binder.as_mut() else {
                    return;
                };
                let outcome = match action {
                    EditAction::Set(input) => {
                        binder.user_edit(&mut self.tree, node_id, input, &rules_fn)
                    }
                    EditAction::Toggle => binder.toggle(&mut self.tree, node_id, &rules_fn),
                };
                match outcome {
                    Ok(working) => {
                        self.ctx.state.tabconfig = working.clone();
                        match serde_json::from_value::<TabConfig>(working) {
                            Ok(tabconfig) => Some(PageRequest::SetTabConfig {
                                tab_id: self.ctx.tab_id(),
                                tabconfig,
                            }),
                            Err(err) => {
                                warn!(page = self.name, error = %err, "working tabconfig no longer deserializes; edit not pushed");
                                None
                            }
                        }
                    }
                    Err(err) => {
                        warn!(page = self.name, control = node_id, error = %err, "edit rejected");
                        None
                    }
                }
            }
            other => {
                warn!(
                    page = self.name,
                    control = node_id,
                    namespace = other,
                    "namespace is display-only; edit ignored"
                );
                None
            }
        };

        if let Some(request) = request {
            self.push(request).await;
        }
        self.recompute_classes();
    }

    /// Fire-and-forget upstream push: failures are logged and swallowed, the
    /// UI keeps its last-known-good state and re-converges on the store's
    /// next echo.
    async fn push(&self, request: PageRequest) {
        if let Err(err) = self.bus.call(request).await {
            warn!(page = self.name, error = %err, "upstream push failed");
        }
    }

    /// Reset all configuration to defaults. Requires explicit affirmative
    /// confirmation; declining issues no request.
    pub async fn reset_config(&mut self, confirm: &dyn Confirm) -> bool {
        if !confirm.confirm("Reset all configuration to defaults?") {
            info!(page = self.name, "config reset declined");
            return false;
        }
        self.push(PageRequest::ResetConfig).await;
        true
    }

    pub async fn reset_persistent_stats(&mut self, confirm: &dyn Confirm) -> bool {
        if !confirm.confirm("Reset persistent statistics?") {
            info!(page = self.name, "stats reset declined");
            return false;
        }
        self.push(PageRequest::ResetPersistentStats).await;
        true
    }

    /// An intercepted anchor click.
    pub async fn click_anchor(&mut self, origin: &NodeId, target: AnchorTarget) {
        let effect = self.nav.navigate(origin, target);
        if let Some(node) = effect.focus_local {
            self.tree.focus(node);
        }
        if let Some(update) = effect.relay {
            self.push(PageRequest::RelayUpdate { update }).await;
        }
    }

    /// Hover preview over a cross-frame anchor: highlight the sibling's
    /// target without navigating. Internal anchors preview nothing.
    pub async fn preview_anchor(&mut self, target: &AnchorTarget) {
        if let AnchorTarget::CrossFrame { node } = target {
            self.push(PageRequest::RelayUpdate {
                update: NavigationBridge::highlight(Some(node.clone())),
            })
            .await;
        }
    }

    pub async fn clear_preview(&mut self) {
        self.push(PageRequest::RelayUpdate {
            update: NavigationBridge::highlight(None),
        })
        .await;
    }

    /// Virtual back: refocus the origin of the newest history entry.
    pub fn back(&mut self) {
        if let Some(entry) = self.nav.pop_virtual() {
            self.tree.focus(entry.origin);
        }
    }

    /// The page's own viewport changed.
    pub async fn resize_viewport(&mut self, width: u32) {
        self.ctx.viewport_width = width;
        self.nav.resize(width);
        self.push(PageRequest::RelayUpdate {
            update: Update::PopupResized,
        })
        .await;
    }
}

enum EditAction {
    Set(ControlValue),
    Toggle,
}
