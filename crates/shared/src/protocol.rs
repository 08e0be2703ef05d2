use serde::{Deserialize, Serialize};

use crate::{
    domain::{NodeId, TabId, WindowId},
    state::{Config, Stats, TabConfig, TabStats},
};

/// Request/response calls a page makes against the authoritative store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PageRequest {
    GetConfig,
    SetConfig {
        config: Config,
    },
    GetStats,
    GetTabConfig {
        tab_id: TabId,
    },
    SetTabConfig {
        tab_id: TabId,
        tabconfig: TabConfig,
    },
    GetTabStats {
        tab_id: TabId,
    },
    ResetConfig,
    ResetPersistentStats,
    /// Ask the store to rebroadcast a presentation update to every live
    /// subscription. Delivery path for cross-frame navigation.
    RelayUpdate {
        update: Update,
    },
}

/// Snapshot responses carry the store's emission sequence at the moment the
/// snapshot was taken, so pages can discard older deliveries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PageResponse {
    Config { seq: u64, config: Config },
    Stats { seq: u64, stats: Stats },
    TabConfig { seq: u64, tabconfig: TabConfig },
    TabStats { seq: u64, tabstats: TabStats },
    Ack,
}

/// Broadcast deltas pushed from the store to all live subscriptions.
///
/// A `None` payload means "re-fetch via request/response", never "apply empty
/// state". A `None` tab scope means the update applies to every page
/// regardless of its tracked tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Update {
    UpdateConfig {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        config: Option<Config>,
    },
    UpdateStats {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stats: Option<Stats>,
    },
    UpdateTabConfig {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tab_id: Option<TabId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tabconfig: Option<TabConfig>,
    },
    UpdateTabStats {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tab_id: Option<TabId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tabstats: Option<TabStats>,
    },
    SwitchTab {
        window_id: WindowId,
        tab_id: TabId,
    },
    PopupResized,
    HighlightNode {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_id: Option<NodeId>,
    },
    FocusNode {
        node_id: NodeId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    UpdateConfig,
    UpdateStats,
    UpdateTabConfig,
    UpdateTabStats,
    SwitchTab,
    PopupResized,
    HighlightNode,
    FocusNode,
}

impl Update {
    pub fn kind(&self) -> UpdateKind {
        match self {
            Update::UpdateConfig { .. } => UpdateKind::UpdateConfig,
            Update::UpdateStats { .. } => UpdateKind::UpdateStats,
            Update::UpdateTabConfig { .. } => UpdateKind::UpdateTabConfig,
            Update::UpdateTabStats { .. } => UpdateKind::UpdateTabStats,
            Update::SwitchTab { .. } => UpdateKind::SwitchTab,
            Update::PopupResized => UpdateKind::PopupResized,
            Update::HighlightNode { .. } => UpdateKind::HighlightNode,
            Update::FocusNode { .. } => UpdateKind::FocusNode,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind() {
            UpdateKind::UpdateConfig => "updateConfig",
            UpdateKind::UpdateStats => "updateStats",
            UpdateKind::UpdateTabConfig => "updateTabConfig",
            UpdateKind::UpdateTabStats => "updateTabStats",
            UpdateKind::SwitchTab => "switchTab",
            UpdateKind::PopupResized => "popupResized",
            UpdateKind::HighlightNode => "highlightNode",
            UpdateKind::FocusNode => "focusNode",
        }
    }

    /// The tab this update is restricted to, if any.
    pub fn tab_scope(&self) -> Option<TabId> {
        match self {
            Update::UpdateTabConfig { tab_id, .. } | Update::UpdateTabStats { tab_id, .. } => {
                *tab_id
            }
            _ => None,
        }
    }
}

/// A broadcast update stamped with the store's emission sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub seq: u64,
    pub update: Update,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_tags_match_wire_names() {
        let update = Update::UpdateTabConfig {
            tab_id: Some(TabId(7)),
            tabconfig: None,
        };
        let wire = serde_json::to_value(&update).expect("serialize");
        assert_eq!(wire["type"], "updateTabConfig");
        assert_eq!(wire["payload"]["tabId"], 7);
        assert!(wire["payload"].get("tabconfig").is_none());
    }

    #[test]
    fn absent_payload_round_trips_as_none() {
        let wire = serde_json::json!({ "type": "updateConfig", "payload": {} });
        let update: Update = serde_json::from_value(wire).expect("deserialize");
        assert!(matches!(update, Update::UpdateConfig { config: None }));
    }

    #[test]
    fn null_scope_means_every_tab() {
        let update = Update::UpdateTabStats {
            tab_id: None,
            tabstats: None,
        };
        assert_eq!(update.tab_scope(), None);
    }
}
