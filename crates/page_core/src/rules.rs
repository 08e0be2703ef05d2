//! Cross-field derivation rules applied to a working copy before the upstream
//! push. The edited control and every path returned here are marked locally
//! dirty by the binder.

use serde_json::Value;

use crate::path::{get_path, set_path, Path};

/// Tab fields mirrored into `children.*` of the same name.
const MIRRORED_TAB_FIELDS: [&str; 9] = [
    "collecting",
    "workOffline",
    "problematicNotify",
    "limbo",
    "negLimbo",
    "stashLimbo",
    "bucket",
    "snapshottable",
    "replayable",
];

fn flag(state: &Value, path: &Path) -> bool {
    get_path(state, path).and_then(Value::as_bool).unwrap_or(false)
}

/// Write `value` at `path` and record the path, unless it already holds that
/// value.
fn force(state: &mut Value, path: Path, value: Value, changed: &mut Vec<Path>) {
    if get_path(state, &path) == Some(&value) {
        return;
    }
    if set_path(state, &path, value).is_ok() {
        changed.push(path);
    }
}

/// Rules for edits under the `config` namespace.
pub fn config_rules() -> impl Fn(&mut Value, &Path) -> Vec<Path> {
    |config: &mut Value, edited: &Path| {
        let mut changed = Vec::new();
        if edited.leaf() == "workOffline" && flag(config, &Path::field("workOfflineImpure")) {
            let offline = flag(config, edited);
            force(
                config,
                edited.sibling("collecting"),
                Value::Bool(!offline),
                &mut changed,
            );
        }
        if edited.segments() == ["autoPopInLimboCollect"] && flag(config, edited) {
            force(
                config,
                Path::field("autoPopInLimboDiscard"),
                Value::Bool(false),
                &mut changed,
            );
        }
        if edited.segments() == ["autoPopInLimboDiscard"] && flag(config, edited) {
            force(
                config,
                Path::field("autoPopInLimboCollect"),
                Value::Bool(false),
                &mut changed,
            );
        }
        changed
    }
}

/// Rules for edits under the `tabconfig` namespace. `work_offline_impure`
/// comes from the page's current Config.
pub fn tab_config_rules(work_offline_impure: bool) -> impl Fn(&mut Value, &Path) -> Vec<Path> {
    move |tabconfig: &mut Value, edited: &Path| {
        let mut changed = Vec::new();
        let segments = edited.segments();

        if segments.len() == 1 {
            let field = edited.leaf().to_owned();
            if MIRRORED_TAB_FIELDS.contains(&field.as_str()) {
                if let Some(value) = get_path(tabconfig, edited).cloned() {
                    force(
                        tabconfig,
                        Path::field("children").child(&field),
                        value,
                        &mut changed,
                    );
                }
            }
            if field == "workOffline" && work_offline_impure {
                let offline = flag(tabconfig, edited);
                force(
                    tabconfig,
                    Path::field("collecting"),
                    Value::Bool(!offline),
                    &mut changed,
                );
                force(
                    tabconfig,
                    Path::field("children").child("collecting"),
                    Value::Bool(!offline),
                    &mut changed,
                );
            }
        } else if segments == ["children", "workOffline"] && work_offline_impure {
            let offline = flag(tabconfig, edited);
            force(
                tabconfig,
                edited.sibling("collecting"),
                Value::Bool(!offline),
                &mut changed,
            );
        }

        changed
    }
}

/// No cross-field derivation; display namespaces and tests.
pub fn no_rules() -> impl Fn(&mut Value, &Path) -> Vec<Path> {
    |_state: &mut Value, _edited: &Path| Vec::new()
}
