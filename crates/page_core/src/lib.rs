//! Page-side core: everything one UI surface needs to stay synchronized with
//! the authoritative store.
//!
//! A page owns exactly one [`bus::Subscription`], a [`controls::ControlTree`]
//! of toolkit-neutral controls, one [`binder::UiBinder`] per state namespace,
//! a [`classes::ConditionalClassEngine`], a [`nav::NavigationBridge`], and the
//! [`page::PageController`] folding broadcast updates over all of them.

pub mod binder;
pub mod bus;
pub mod classes;
pub mod controls;
pub mod dispatch;
pub mod format;
pub mod nav;
pub mod page;
pub mod path;
pub mod rules;
pub mod tabs;

pub use binder::{BinderError, UiBinder};
pub use bus::{BusError, MessageBus, MissingMessageBus, StoreBus, SubEvent, Subscription};
pub use classes::{ClassRule, ConditionalClassEngine};
pub use controls::{ControlKind, ControlNode, ControlTree, ControlValue, TriState};
pub use dispatch::{accept_all, Admit, UpdateFilter};
pub use nav::{AnchorTarget, HistoryEntry, LayoutMode, NavEffect, NavigationBridge, COLUMNS_MIN_WIDTH};
pub use page::{AlwaysAllow, AlwaysDeny, Confirm, PageContext, PageController, PageSetup, PageState};
pub use path::{get_path, set_path, Path, PathError, StateError};
pub use tabs::{FixedHostTabs, HostTabs, MissingHostTabs, TabRouter};

#[cfg(test)]
mod tests;
