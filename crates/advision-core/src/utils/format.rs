/// Format a percentage with a fixed number of decimals, e.g. `12.5%`
pub fn format_percent(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{:.*}%", decimals, value)
    } else {
        "n/a".to_string()
    }
}

/// Collapse whitespace and cut text to `max_chars`, adding an ellipsis if needed.
/// Used for one-line previews of documents and chat replies.
pub fn shorten(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else if max_chars <= 3 {
        collapsed.chars().take(max_chars).collect()
    } else {
        let cut: String = collapsed.chars().take(max_chars - 3).collect();
        format!("{}...", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(12.345, 1), "12.3%");
        assert_eq!(format_percent(-4.0, 2), "-4.00%");
        assert_eq!(format_percent(f64::NAN, 1), "n/a");
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("Refund policy", 20), "Refund policy");
        assert_eq!(shorten("Refunds are issued\nwithin 30 days", 14), "Refunds are...");
        assert_eq!(shorten("abcdef", 2), "ab");
        assert_eq!(shorten("  spaced   out  ", 20), "spaced out");
    }
}
