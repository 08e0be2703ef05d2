//! Resolution and tracking of the tab a page instance is scoped to.

use async_trait::async_trait;
use shared::domain::{TabId, WindowId};
use tracing::{info, warn};

/// The host's notion of which tab a page was opened against. Some embeddings
/// (observed on mobile hosts) provide none.
#[async_trait]
pub trait HostTabs: Send + Sync {
    async fn active_tab(&self) -> anyhow::Result<Option<(TabId, WindowId)>>;
}

/// Host without tab support.
pub struct MissingHostTabs;

#[async_trait]
impl HostTabs for MissingHostTabs {
    async fn active_tab(&self) -> anyhow::Result<Option<(TabId, WindowId)>> {
        Ok(None)
    }
}

/// Fixed resolution, for demos and tests.
pub struct FixedHostTabs {
    pub tab_id: TabId,
    pub window_id: WindowId,
}

#[async_trait]
impl HostTabs for FixedHostTabs {
    async fn active_tab(&self) -> anyhow::Result<Option<(TabId, WindowId)>> {
        Ok(Some((self.tab_id, self.window_id)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TabRouter {
    tab_id: TabId,
    window_id: WindowId,
    synthetic: bool,
}

impl TabRouter {
    /// Resolve the page's tab scope at load. Hosts that provide no tab, and
    /// resolution failures, fall back to the synthetic scope so the page
    /// stays functional in a degraded, non-tab-specific mode.
    pub async fn resolve(host: &dyn HostTabs) -> TabRouter {
        match host.active_tab().await {
            Ok(Some((tab_id, window_id))) => Self {
                tab_id,
                window_id,
                synthetic: false,
            },
            Ok(None) => {
                info!("host provided no active tab; using synthetic scope");
                Self::synthetic()
            }
            Err(err) => {
                warn!(error = %err, "active tab resolution failed; using synthetic scope");
                Self::synthetic()
            }
        }
    }

    pub fn synthetic() -> TabRouter {
        Self {
            tab_id: TabId::SYNTHETIC,
            window_id: WindowId::SYNTHETIC,
            synthetic: true,
        }
    }

    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Fold a `switchTab` update. Returns true when the page was retargeted
    /// and must refetch its tab-scoped state.
    pub fn on_switch_tab(&mut self, window_id: WindowId, tab_id: TabId) -> bool {
        if window_id != self.window_id {
            return false;
        }
        if tab_id == self.tab_id {
            return false;
        }
        info!(
            old_tab = self.tab_id.0,
            new_tab = tab_id.0,
            "retargeting page to switched tab"
        );
        self.tab_id = tab_id;
        true
    }
}
