//! Virtual navigation and history synchronization between a parent page and
//! an embedded sibling frame.
//!
//! Internal anchor targets focus locally and record a virtual history entry
//! keyed by the originating element's synthetic id. Cross-frame targets never
//! navigate: they yield a focus broadcast for the sibling, and record history
//! only in `Linear` layout, where the two documents are not simultaneously
//! visible.

use shared::{domain::NodeId, protocol::Update};
use tracing::debug;

/// Minimum viewport width for side-by-side column layout. At exactly this
/// width the layout is `Columns`; one unit below, `Linear`.
pub const COLUMNS_MIN_WIDTH: u32 = 1250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Columns,
    Linear,
}

impl LayoutMode {
    pub fn for_width(width: u32) -> LayoutMode {
        if width >= COLUMNS_MIN_WIDTH {
            LayoutMode::Columns
        } else {
            LayoutMode::Linear
        }
    }
}

/// Where an intercepted anchor points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorTarget {
    /// An element of this logical document.
    Internal { node: NodeId },
    /// An element of the embedded sibling document.
    CrossFrame { node: NodeId },
}

/// Virtual history entry, keyed by the element the navigation originated
/// from, so "back" can return focus there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub origin: NodeId,
}

/// Everything a navigation decided, as pure data: the controller applies the
/// local focus, relays the update, and nothing here touches a real document.
#[derive(Debug, Clone, PartialEq)]
pub struct NavEffect {
    pub focus_local: Option<NodeId>,
    pub relay: Option<Update>,
    pub pushed_history: bool,
}

#[derive(Debug)]
pub struct NavigationBridge {
    layout: LayoutMode,
    history: Vec<HistoryEntry>,
}

impl NavigationBridge {
    pub fn new(viewport_width: u32) -> Self {
        Self {
            layout: LayoutMode::for_width(viewport_width),
            history: Vec::new(),
        }
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    /// Re-derive the layout mode from the current viewport width. Called on
    /// every resize; the mode is never cached stale.
    pub fn resize(&mut self, width: u32) -> LayoutMode {
        self.layout = LayoutMode::for_width(width);
        self.layout
    }

    pub fn navigate(&mut self, origin: &NodeId, target: AnchorTarget) -> NavEffect {
        match target {
            AnchorTarget::Internal { node } => {
                self.push_virtual(HistoryEntry {
                    origin: origin.clone(),
                });
                debug!(origin = origin.as_str(), node = node.as_str(), "internal navigation");
                NavEffect {
                    focus_local: Some(node),
                    relay: None,
                    pushed_history: true,
                }
            }
            AnchorTarget::CrossFrame { node } => {
                let pushed = self.layout == LayoutMode::Linear;
                if pushed {
                    self.push_virtual(HistoryEntry {
                        origin: origin.clone(),
                    });
                }
                debug!(
                    origin = origin.as_str(),
                    node = node.as_str(),
                    pushed_history = pushed,
                    "cross-frame navigation"
                );
                NavEffect {
                    focus_local: None,
                    relay: Some(Update::FocusNode { node_id: node }),
                    pushed_history: pushed,
                }
            }
        }
    }

    /// Highlight preview for a cross-frame anchor; `None` clears.
    pub fn highlight(node: Option<NodeId>) -> Update {
        Update::HighlightNode { node_id: node }
    }

    pub fn push_virtual(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    /// Pop the newest virtual entry; the caller refocuses its origin.
    pub fn pop_virtual(&mut self) -> Option<HistoryEntry> {
        self.history.pop()
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }
}
