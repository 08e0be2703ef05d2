use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(TabId);
id_newtype!(WindowId);

impl TabId {
    /// Synthetic scope used when the host provides no active tab.
    pub const SYNTHETIC: TabId = TabId(0);
}

impl WindowId {
    pub const SYNTHETIC: WindowId = WindowId(0);
}

/// Synthetic id of a focusable/highlightable element in a page's control tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
