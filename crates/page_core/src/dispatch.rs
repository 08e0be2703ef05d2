//! Admission control for broadcast deliveries.
//!
//! Every delivery passes through three checks, in order: the per-kind
//! snapshot watermark (a delivery at or below its kind's watermark was
//! superseded by a later snapshot fetch), the page's accept predicate
//! (rejected kinds go to the generic default handler), and the tab scope.

use shared::{
    domain::TabId,
    protocol::{Envelope, UpdateKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admit {
    /// Route to the local handler for its kind.
    Local,
    /// Not accepted by this page; hand to the generic default handler.
    Fallback,
    /// Superseded by a snapshot; discard.
    Stale,
    /// Scoped to a tab this page does not track; discard.
    OtherTab,
}

#[derive(Debug, Default, Clone, Copy)]
struct Watermarks {
    config: u64,
    stats: u64,
    tab_config: u64,
    tab_stats: u64,
}

pub struct UpdateFilter {
    accept: fn(UpdateKind) -> bool,
    watermarks: Watermarks,
}

impl UpdateFilter {
    pub fn new(accept: fn(UpdateKind) -> bool) -> Self {
        Self {
            accept,
            watermarks: Watermarks::default(),
        }
    }

    /// Record the sequence a snapshot of `kind`'s state was taken at. Older
    /// deliveries of that kind are superseded from here on.
    pub fn set_watermark(&mut self, kind: UpdateKind, seq: u64) {
        match kind {
            UpdateKind::UpdateConfig => self.watermarks.config = seq,
            UpdateKind::UpdateStats => self.watermarks.stats = seq,
            UpdateKind::UpdateTabConfig => self.watermarks.tab_config = seq,
            UpdateKind::UpdateTabStats => self.watermarks.tab_stats = seq,
            _ => {}
        }
    }

    fn watermark_for(&self, kind: UpdateKind) -> Option<u64> {
        match kind {
            UpdateKind::UpdateConfig => Some(self.watermarks.config),
            UpdateKind::UpdateStats => Some(self.watermarks.stats),
            UpdateKind::UpdateTabConfig => Some(self.watermarks.tab_config),
            UpdateKind::UpdateTabStats => Some(self.watermarks.tab_stats),
            _ => None,
        }
    }

    pub fn admit(&self, envelope: &Envelope, tracked_tab: TabId) -> Admit {
        let kind = envelope.update.kind();
        if let Some(watermark) = self.watermark_for(kind) {
            if envelope.seq <= watermark {
                return Admit::Stale;
            }
        }
        if !(self.accept)(kind) {
            return Admit::Fallback;
        }
        if let Some(scope) = envelope.update.tab_scope() {
            if scope != tracked_tab {
                return Admit::OtherTab;
            }
        }
        Admit::Local
    }
}

/// Accept predicate for pages that handle every kind locally.
pub fn accept_all(_kind: UpdateKind) -> bool {
    true
}
