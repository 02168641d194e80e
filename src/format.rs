use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

/// kB to the decimal-gigabyte figure shown in the memory gauge.
pub fn kb_to_gigabytes(kb: u64) -> f64 {
    kb as f64 / 1024.0 * 0.001
}

/// `used/total` memory label, e.g. `7.81G/15.9G`.
pub fn format_memory(used_kb: u64, total_kb: u64) -> String {
    format!(
        "{:.2}G/{:.1}G",
        kb_to_gigabytes(used_kb),
        kb_to_gigabytes(total_kb)
    )
}

/// Uptime as hours, minutes and seconds, e.g. `26h3m7s`, `4m0s`, `12s`.
pub fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}%"),
        None => "n/a".to_string(),
    }
}
