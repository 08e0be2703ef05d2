use std::{env, fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use shared::state::Config;

#[derive(Debug, Clone)]
pub struct Settings {
    pub default_bucket: String,
    pub collecting_by_default: bool,
    pub work_offline_impure: bool,
    pub broadcast_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_bucket: "default".into(),
            collecting_by_default: true,
            work_offline_impure: false,
            broadcast_capacity: 1024,
        }
    }
}

impl Settings {
    /// Seed the store's Config (and the target of `resetConfig`).
    pub fn initial_config(&self) -> Config {
        let mut config = Config::default();
        config.root.bucket = self.default_bucket.clone();
        config.root.collecting = self.collecting_by_default;
        config.work_offline_impure = self.work_offline_impure;
        config
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    default_bucket: Option<String>,
    collecting_by_default: Option<bool>,
    work_offline_impure: Option<bool>,
    broadcast_capacity: Option<usize>,
}

fn apply_file(settings: &mut Settings, file: SettingsFile) {
    if let Some(v) = file.default_bucket {
        settings.default_bucket = v;
    }
    if let Some(v) = file.collecting_by_default {
        settings.collecting_by_default = v;
    }
    if let Some(v) = file.work_offline_impure {
        settings.work_offline_impure = v;
    }
    if let Some(v) = file.broadcast_capacity {
        settings.broadcast_capacity = v;
    }
}

/// Defaults, overlaid with `panel.toml` if present, overlaid with
/// `PANEL__*` environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("panel.toml") {
        if let Ok(file) = toml::from_str::<SettingsFile>(&raw) {
            apply_file(&mut settings, file);
        }
    }

    if let Ok(v) = env::var("PANEL__DEFAULT_BUCKET") {
        settings.default_bucket = v;
    }
    if let Ok(v) = env::var("PANEL__COLLECTING_BY_DEFAULT") {
        if let Ok(parsed) = v.parse::<bool>() {
            settings.collecting_by_default = parsed;
        }
    }
    if let Ok(v) = env::var("PANEL__WORK_OFFLINE_IMPURE") {
        if let Ok(parsed) = v.parse::<bool>() {
            settings.work_offline_impure = parsed;
        }
    }
    if let Ok(v) = env::var("PANEL__BROADCAST_CAPACITY") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.broadcast_capacity = parsed;
        }
    }

    settings
}

pub fn load_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let file: SettingsFile = toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
    let mut settings = Settings::default();
    apply_file(&mut settings, file);
    Ok(settings)
}
