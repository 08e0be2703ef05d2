//! Presentation-only formatting for display bindings. Formatted strings are
//! never round-tripped back into state.

use serde_json::Value;

use crate::path::Path;

/// Numeric leaves whose final segment ends with this suffix are byte totals.
pub const SIZE_SUFFIX: &str = "Size";

pub fn human_bytes(n: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    if n < 1024 {
        return format!("{n} B");
    }
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

pub fn human_count(n: u64) -> String {
    if n < 1000 {
        n.to_string()
    } else if n < 1_000_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else if n < 1_000_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else {
        format!("{:.1}G", n as f64 / 1_000_000_000.0)
    }
}

/// Render one state leaf for a display-only control.
pub fn display_leaf(path: &Path, value: &Value) -> String {
    match value {
        Value::Number(number) => {
            let n = number.as_u64().unwrap_or_default();
            if path.leaf().ends_with(SIZE_SUFFIX) {
                human_bytes(n)
            } else {
                human_count(n)
            }
        }
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
