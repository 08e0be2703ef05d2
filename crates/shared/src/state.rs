//! Typed state records owned by the authoritative store.
//!
//! Field names serialize camelCase so the binder's dotted paths read the way
//! they appear in the UI markup (`config.root.workOffline`).

use serde::{Deserialize, Serialize};

/// One scope of capture behavior. `Config.root`, a tab's own settings and a
/// tab's `children` are each one instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureSettings {
    pub collecting: bool,
    pub work_offline: bool,
    pub problematic_notify: bool,
    pub limbo: bool,
    pub neg_limbo: bool,
    pub stash_limbo: bool,
    pub bucket: String,
    pub snapshottable: bool,
    pub replayable: bool,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            collecting: true,
            work_offline: false,
            problematic_notify: true,
            limbo: false,
            neg_limbo: false,
            stash_limbo: false,
            bucket: "default".into(),
            snapshottable: true,
            replayable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub root: CaptureSettings,
    pub work_offline_impure: bool,
    pub auto_pop_in_limbo_collect: bool,
    pub auto_pop_in_limbo_discard: bool,
    pub history: bool,
    pub seasonal: bool,
    pub pop_ui_verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: CaptureSettings::default(),
            work_offline_impure: false,
            auto_pop_in_limbo_collect: false,
            auto_pop_in_limbo_discard: false,
            history: true,
            seasonal: true,
            pop_ui_verbose: true,
        }
    }
}

/// Per-tab overrides: the tab's own settings flattened at top level plus the
/// settings inherited by tabs opened from this one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabConfig {
    #[serde(flatten)]
    pub own: CaptureSettings,
    pub children: CaptureSettings,
}

impl TabConfig {
    /// Config for a tab that has no overrides yet: both scopes start from the
    /// global root settings.
    pub fn inherited(root: &CaptureSettings) -> Self {
        Self {
            own: root.clone(),
            children: root.clone(),
        }
    }
}

/// Global usage counters. Fields with the reserved `Size` suffix are byte
/// totals; everything else is an item count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub collected: u64,
    pub collected_size: u64,
    pub queued: u64,
    pub queued_size: u64,
    pub failed: u64,
    pub in_limbo: u64,
    pub in_limbo_size: u64,
    pub problematic: u64,
    pub unstashed: u64,
    pub scheduled_low: u64,
    pub scheduled_high: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabStats {
    pub collected: u64,
    pub collected_size: u64,
    pub queued: u64,
    pub failed: u64,
    pub in_limbo: u64,
    pub in_limbo_size: u64,
    pub problematic: u64,
}
