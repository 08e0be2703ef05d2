//! Reference authoritative store: the single writer of truth for
//! Config/Stats/TabConfig/TabStats.
//!
//! Pages talk to it over two channels: direct request/response calls, and a
//! broadcast of sequence-stamped update envelopes. Every accepted write is
//! echoed back to all subscribers, including the page that made it; that echo
//! is what re-converges optimistic local edits.

use std::{collections::HashMap, sync::Arc};

use shared::{
    domain::{TabId, WindowId},
    error::{ApiError, ErrorCode},
    protocol::{Envelope, PageRequest, PageResponse, Update, UpdateKind},
    state::{CaptureSettings, Config, Stats, TabConfig, TabStats},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

pub mod settings;

pub use settings::{load_settings, Settings};

/// Items on the store-to-pages broadcast channel.
#[derive(Debug, Clone)]
pub enum BusSignal {
    Deliver(Envelope),
    /// Transport reset marker: receivers must silently re-establish and
    /// refetch snapshots before trusting further deliveries.
    Reset,
}

struct StoreState {
    config: Config,
    default_config: Config,
    stats: Stats,
    tab_configs: HashMap<TabId, TabConfig>,
    tab_stats: HashMap<TabId, TabStats>,
    seq: u64,
}

pub struct Store {
    inner: Mutex<StoreState>,
    signals: broadcast::Sender<BusSignal>,
}

impl Store {
    pub fn new(settings: &Settings) -> Arc<Self> {
        let config = settings.initial_config();
        let (signals, _) = broadcast::channel(settings.broadcast_capacity);
        Arc::new(Self {
            inner: Mutex::new(StoreState {
                config: config.clone(),
                default_config: config,
                stats: Stats::default(),
                tab_configs: HashMap::new(),
                tab_stats: HashMap::new(),
                seq: 0,
            }),
            signals,
        })
    }

    pub fn handle(self: &Arc<Self>) -> StoreHandle {
        StoreHandle {
            store: Arc::clone(self),
        }
    }

    pub fn subscribe_signals(&self) -> broadcast::Receiver<BusSignal> {
        self.signals.subscribe()
    }

    /// Current emission sequence.
    pub async fn seq(&self) -> u64 {
        self.inner.lock().await.seq
    }

    pub async fn call(&self, request: PageRequest) -> Result<PageResponse, ApiError> {
        let mut guard = self.inner.lock().await;
        match request {
            PageRequest::GetConfig => Ok(PageResponse::Config {
                seq: guard.seq,
                config: guard.config.clone(),
            }),
            PageRequest::SetConfig { config } => {
                validate_scope("config.root", &config.root)?;
                guard.config = config;
                let update = Update::UpdateConfig {
                    config: Some(guard.config.clone()),
                };
                self.emit(&mut guard, update);
                Ok(PageResponse::Ack)
            }
            PageRequest::GetStats => Ok(PageResponse::Stats {
                seq: guard.seq,
                stats: guard.stats.clone(),
            }),
            PageRequest::GetTabConfig { tab_id } => {
                let tabconfig = guard
                    .tab_configs
                    .get(&tab_id)
                    .cloned()
                    .unwrap_or_else(|| TabConfig::inherited(&guard.config.root));
                Ok(PageResponse::TabConfig {
                    seq: guard.seq,
                    tabconfig,
                })
            }
            PageRequest::SetTabConfig { tab_id, tabconfig } => {
                validate_scope("tabconfig", &tabconfig.own)?;
                validate_scope("tabconfig.children", &tabconfig.children)?;
                guard.tab_configs.insert(tab_id, tabconfig.clone());
                let update = Update::UpdateTabConfig {
                    tab_id: Some(tab_id),
                    tabconfig: Some(tabconfig),
                };
                self.emit(&mut guard, update);
                Ok(PageResponse::Ack)
            }
            PageRequest::GetTabStats { tab_id } => {
                let tabstats = guard.tab_stats.get(&tab_id).cloned().unwrap_or_default();
                Ok(PageResponse::TabStats {
                    seq: guard.seq,
                    tabstats,
                })
            }
            PageRequest::ResetConfig => {
                guard.config = guard.default_config.clone();
                let update = Update::UpdateConfig {
                    config: Some(guard.config.clone()),
                };
                self.emit(&mut guard, update);
                Ok(PageResponse::Ack)
            }
            PageRequest::ResetPersistentStats => {
                guard.stats.collected = 0;
                guard.stats.collected_size = 0;
                guard.stats.failed = 0;
                let update = Update::UpdateStats {
                    stats: Some(guard.stats.clone()),
                };
                self.emit(&mut guard, update);
                Ok(PageResponse::Ack)
            }
            PageRequest::RelayUpdate { update } => {
                match update.kind() {
                    UpdateKind::PopupResized
                    | UpdateKind::HighlightNode
                    | UpdateKind::FocusNode
                    | UpdateKind::SwitchTab => {
                        self.emit(&mut guard, update);
                        Ok(PageResponse::Ack)
                    }
                    UpdateKind::UpdateConfig
                    | UpdateKind::UpdateStats
                    | UpdateKind::UpdateTabConfig
                    | UpdateKind::UpdateTabStats => Err(ApiError::new(
                        ErrorCode::Validation,
                        "state updates are store-originated and cannot be relayed",
                    )),
                }
            }
        }
    }

    /// The host moved the active tab of a window.
    pub async fn switch_tab(&self, window_id: WindowId, tab_id: TabId) {
        let mut guard = self.inner.lock().await;
        self.emit(&mut guard, Update::SwitchTab { window_id, tab_id });
    }

    /// Record captured items against a tab, bumping both the global and the
    /// per-tab counters, and broadcast both deltas.
    pub async fn record_collected(&self, tab_id: TabId, items: u64, bytes: u64) {
        let mut guard = self.inner.lock().await;
        guard.stats.collected += items;
        guard.stats.collected_size += bytes;
        let entry = guard.tab_stats.entry(tab_id).or_default();
        entry.collected += items;
        entry.collected_size += bytes;
        let tabstats = entry.clone();
        let stats = guard.stats.clone();
        self.emit(&mut guard, Update::UpdateStats { stats: Some(stats) });
        self.emit(
            &mut guard,
            Update::UpdateTabStats {
                tab_id: Some(tab_id),
                tabstats: Some(tabstats),
            },
        );
    }

    /// Broadcast a payload-free stats delta: subscribers must refetch.
    pub async fn announce_stats(&self) {
        let mut guard = self.inner.lock().await;
        self.emit(&mut guard, Update::UpdateStats { stats: None });
    }

    /// Effective per-tab defaults changed for every tab at once: a null-scope,
    /// payload-free delta telling each page to refetch its own tab's config.
    pub async fn announce_tab_defaults(&self) {
        let mut guard = self.inner.lock().await;
        self.emit(
            &mut guard,
            Update::UpdateTabConfig {
                tab_id: None,
                tabconfig: None,
            },
        );
    }

    /// Simulate a transport reset: every subscription re-establishes with
    /// `will_reset == true` and must refetch snapshots.
    pub fn reset_transport(&self) {
        info!("transport reset signalled to all subscriptions");
        let _ = self.signals.send(BusSignal::Reset);
    }

    fn emit(&self, state: &mut StoreState, update: Update) {
        state.seq += 1;
        debug!(seq = state.seq, kind = update.kind_name(), "broadcast");
        let _ = self.signals.send(BusSignal::Deliver(Envelope {
            seq: state.seq,
            update,
        }));
    }
}

/// Cloneable page-facing endpoint of one store.
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<Store>,
}

impl StoreHandle {
    pub async fn call(&self, request: PageRequest) -> Result<PageResponse, ApiError> {
        self.store.call(request).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusSignal> {
        self.store.subscribe_signals()
    }
}

fn validate_scope(scope: &str, settings: &CaptureSettings) -> Result<(), ApiError> {
    if settings.bucket.trim().is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("{scope}: bucket must not be empty"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
