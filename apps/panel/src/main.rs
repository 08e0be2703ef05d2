use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use page_core::{
    Confirm, ControlValue, FixedHostTabs, PageController, PageSetup, StoreBus, TriState,
};
use shared::domain::{TabId, WindowId};
use store::{load_settings, Store};

mod help;
mod popup;

#[derive(Parser, Debug)]
#[command(about = "Run the popup and help surfaces against a local store")]
struct Args {
    /// Tab the surfaces are opened against.
    #[arg(long, default_value_t = 1)]
    tab: i64,
    /// Window owning that tab.
    #[arg(long, default_value_t = 1)]
    window: i64,
    /// Viewport width of the help page, in units.
    #[arg(long, default_value_t = 1400)]
    width: u32,
    /// Answer destructive-action confirmations with yes.
    #[arg(long)]
    yes: bool,
}

struct CliConfirm {
    assume_yes: bool,
}

impl Confirm for CliConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        println!("{prompt} [{}]", if self.assume_yes { "yes" } else { "no" });
        self.assume_yes
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let settings = load_settings();
    tracing::info!(bucket = %settings.default_bucket, "store settings loaded");
    let store = Store::new(&settings);
    let tab_id = TabId(args.tab);
    let window_id = WindowId(args.window);

    let mut popup = PageController::start(PageSetup {
        name: "popup",
        bus: Arc::new(StoreBus::new(store.handle())),
        host_tabs: Arc::new(FixedHostTabs { tab_id, window_id }),
        tree: popup::build_tree(),
        class_target: popup::BODY.into(),
        class_rules: popup::class_rules(),
        accept: popup::accept,
        viewport_width: args.width,
    })
    .await?;

    let mut help = PageController::start(PageSetup {
        name: "help",
        bus: Arc::new(StoreBus::new(store.handle())),
        host_tabs: Arc::new(FixedHostTabs { tab_id, window_id }),
        tree: help::build_tree(),
        class_target: help::BODY.into(),
        class_rules: help::class_rules(),
        accept: help::accept,
        viewport_width: args.width,
    })
    .await?;

    println!(
        "pages up: popup tab={} / help layout={:?}",
        popup.context().tab_id().0,
        help.layout()
    );

    // Background activity: the archiving core collects a few items.
    store.record_collected(tab_id, 120, 3 * 1024 * 1024).await;
    store.record_collected(tab_id, 1400, 48 * 1024 * 1024).await;
    popup.drain().await;
    help.drain().await;
    print_stats(&popup);

    // A local edit on the popup, echoed back through the store to both pages.
    popup.toggle("root-work-offline").await;
    popup
        .edit("tab-bucket", ControlValue::Text("research".into()))
        .await;
    popup.drain().await;
    help.drain().await;
    println!(
        "after edits: workOffline={} bucket={:?} body classes={:?}",
        popup.state().flag("config.root.workOffline"),
        popup.state().get("tabconfig.bucket"),
        popup
            .tree()
            .node(popup::BODY)
            .map(|node| node.classes().iter().cloned().collect::<Vec<_>>())
    );

    // Some child tabs diverged from this tab's own setting: render the mixed
    // marker (reachable only programmatically, never by a user toggle).
    popup.set_tri("tab-collecting", TriState::Indeterminate);
    println!(
        "tab-collecting markers={:?}",
        popup
            .tree()
            .node("tab-collecting")
            .map(|node| node.classes().iter().cloned().collect::<Vec<_>>())
    );

    // Help-page anchors: hover previews highlight the sibling control, a
    // click focuses it (or jumps locally for internal targets).
    for (origin, target) in help::anchors() {
        help.preview_anchor(&target).await;
        help.click_anchor(&origin, target).await;
    }
    help.clear_preview().await;
    popup.drain().await;
    println!(
        "navigation: help history depth={} popup focused={:?}",
        help.nav().depth(),
        popup.tree().focused().map(|node| node.as_str().to_owned())
    );

    // Destructive action behind an explicit confirmation.
    let confirm = CliConfirm {
        assume_yes: args.yes,
    };
    if popup.reset_persistent_stats(&confirm).await {
        popup.drain().await;
        print_stats(&popup);
    }

    Ok(())
}

fn print_stats(popup: &PageController) {
    println!(
        "stats: collected={} ({}) queued={} limbo={} ({}) failed={} | this tab: {}",
        popup.tree().display_text("stat-collected").unwrap_or("-"),
        popup
            .tree()
            .display_text("stat-collected-size")
            .unwrap_or("-"),
        popup.tree().display_text("stat-queued").unwrap_or("-"),
        popup.tree().display_text("stat-in-limbo").unwrap_or("-"),
        popup
            .tree()
            .display_text("stat-in-limbo-size")
            .unwrap_or("-"),
        popup.tree().display_text("stat-failed").unwrap_or("-"),
        popup.tree().display_text("tabstat-collected").unwrap_or("-"),
    );
}
