//! Small text helpers for log lines and summary tables.

/// Shorten large counts for log lines: `950`, `12.3K`, `1.4M`.
///
/// ```
/// use hostagg::utils::format_count;
/// assert_eq!(format_count(950), "950");
/// assert_eq!(format_count(12_345), "12.3K");
/// assert_eq!(format_count(1_400_000), "1.4M");
/// ```
pub fn format_count(count: usize) -> String {
    match count {
        0..=999 => count.to_string(),
        1_000..=999_999 => format!("{:.1}K", count as f64 / 1e3),
        _ => format!("{:.1}M", count as f64 / 1e6),
    }
}

/// Fit `text` into a table column of `width` characters, marking the cut
/// with `...`.
pub fn truncate(text: &str, width: usize) -> String {
    match text.char_indices().nth(width) {
        None => text.to_string(),
        Some(_) if width <= 3 => "...".to_string(),
        Some(_) => {
            // Byte offset of the last kept character
            let cut = text
                .char_indices()
                .nth(width - 3)
                .map_or(text.len(), |(i, _)| i);
            format!("{}...", &text[..cut])
        }
    }
}
