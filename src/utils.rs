// Utility functions
use regex::Regex;
use std::sync::LazyLock;

static ISO_DURATION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?$").ok());

/// Minutes in a recipe duration of the form `PT#H#M`.
pub fn parse_duration_minutes(iso: &str) -> Option<u32> {
    let caps = ISO_DURATION.as_ref()?.captures(iso.trim())?;
    if caps.get(1).is_none() && caps.get(2).is_none() {
        return None;
    }
    let field = |i: usize| match caps.get(i) {
        Some(m) => m.as_str().parse::<u32>().ok(),
        None => Some(0),
    };
    field(1)?.checked_mul(60)?.checked_add(field(2)?)
}

/// Human-readable byte size, e.g. "1.5 MB".
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}
