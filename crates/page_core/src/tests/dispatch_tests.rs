use shared::{
    domain::{TabId, WindowId},
    protocol::{Envelope, Update, UpdateKind},
};

use crate::dispatch::{accept_all, Admit, UpdateFilter};

fn envelope(seq: u64, update: Update) -> Envelope {
    Envelope { seq, update }
}

fn stats_only(kind: UpdateKind) -> bool {
    matches!(kind, UpdateKind::UpdateStats)
}

#[test]
fn deliveries_at_or_below_the_watermark_are_stale() {
    let mut filter = UpdateFilter::new(accept_all);
    filter.set_watermark(UpdateKind::UpdateStats, 5);

    let stale = envelope(5, Update::UpdateStats { stats: None });
    assert_eq!(filter.admit(&stale, TabId(1)), Admit::Stale);

    let fresh = envelope(6, Update::UpdateStats { stats: None });
    assert_eq!(filter.admit(&fresh, TabId(1)), Admit::Local);
}

#[test]
fn watermarks_are_tracked_per_kind() {
    let mut filter = UpdateFilter::new(accept_all);
    filter.set_watermark(UpdateKind::UpdateStats, 10);

    // A config delivery below the stats watermark is still fresh.
    let config = envelope(7, Update::UpdateConfig { config: None });
    assert_eq!(filter.admit(&config, TabId(1)), Admit::Local);
}

#[test]
fn unaccepted_kinds_fall_back_to_the_default_handler() {
    let filter = UpdateFilter::new(stats_only);
    let config = envelope(1, Update::UpdateConfig { config: None });
    assert_eq!(filter.admit(&config, TabId(1)), Admit::Fallback);
}

#[test]
fn tab_scoped_deliveries_respect_the_tracked_tab() {
    let filter = UpdateFilter::new(accept_all);

    let other = envelope(
        1,
        Update::UpdateTabConfig {
            tab_id: Some(TabId(7)),
            tabconfig: None,
        },
    );
    assert_eq!(filter.admit(&other, TabId(3)), Admit::OtherTab);
    assert_eq!(filter.admit(&other, TabId(7)), Admit::Local);

    let all_tabs = envelope(
        2,
        Update::UpdateTabConfig {
            tab_id: None,
            tabconfig: None,
        },
    );
    assert_eq!(filter.admit(&all_tabs, TabId(3)), Admit::Local);
    assert_eq!(filter.admit(&all_tabs, TabId(7)), Admit::Local);
}

#[test]
fn presentation_kinds_never_go_stale() {
    let mut filter = UpdateFilter::new(accept_all);
    filter.set_watermark(UpdateKind::UpdateConfig, 100);
    filter.set_watermark(UpdateKind::UpdateStats, 100);

    let focus = envelope(
        1,
        Update::SwitchTab {
            window_id: WindowId(1),
            tab_id: TabId(2),
        },
    );
    assert_eq!(filter.admit(&focus, TabId(1)), Admit::Local);
}
