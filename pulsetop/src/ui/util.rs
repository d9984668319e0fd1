//! Small UI helpers: human-readable sizes, percentages, truncation.

pub fn human(b: u64) -> String {
    const K: f64 = 1024.0;
    if b < 1024 {
        return format!("{b} B");
    }
    let units = ["KB", "MB", "GB", "TB"];
    let mut size = b as f64;
    let mut unit = 0;
    while size >= K && unit < units.len() {
        size /= K;
        unit += 1;
    }
    format!("{size:.1} {}", units[unit - 1])
}

pub fn pct(v: f64) -> String {
    format!("{v:.1}%")
}

pub fn truncate_middle(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max {
        return s.to_string();
    }
    if max <= 3 {
        return "...".into();
    }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = s.chars().take(left).collect();
    let tail: String = s.chars().skip(n - right).collect();
    format!("{head}...{tail}")
}
