//! Display helpers for queue listings
//!
//! Widths are counted in characters, never bytes, so multi-byte titles are
//! trimmed on character boundaries.

use melody_core::Track;
use std::fmt::Write;

/// Rendering used when there is nothing queued
pub const EMPTY_QUEUE: &str = "Empty queue!";

const ELLIPSIS: &str = "...";

/// Shorten `title` so it never renders wider than `max_len` characters
///
/// Titles shorter than `max_len` come back unchanged; anything else keeps its
/// first `max_len - 3` characters followed by `...`.
pub fn trim_title(title: &str, max_len: usize) -> String {
    if title.chars().count() < max_len {
        return title.to_string();
    }

    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let mut trimmed: String = title.chars().take(keep).collect();
    trimmed.push_str(ELLIPSIS);
    trimmed
}

/// `minutes:seconds` with zero-padded seconds; minutes may exceed 59
pub fn format_seconds(total_seconds: u64) -> String {
    let (minutes, seconds) = (total_seconds / 60, total_seconds % 60);
    format!("{minutes}:{seconds:02}")
}

/// Glyph for a boolean flag
pub fn bool_glyph(value: bool) -> &'static str {
    if value {
        "✅"
    } else {
        "❌"
    }
}

/// Render a queue listing
///
/// ```text
///  1) First title                              3:00
///  2) Second title                             2:05
///
/// Loop queue: ❌ | Loop track: ✅
/// ```
pub fn format_queue(
    tracks: &[Track],
    loop_queue: bool,
    loop_track: bool,
    max_title_length: usize,
) -> String {
    if tracks.is_empty() {
        return EMPTY_QUEUE.to_string();
    }

    let mut out = String::new();
    for (i, track) in tracks.iter().enumerate() {
        let title = trim_title(&track.title, max_title_length);
        // `{:<width$}` pads by chars, matching trim_title
        let _ = writeln!(
            out,
            "{:>2}) {:<width$} {:>10}",
            i + 1,
            title,
            format_seconds(track.duration_secs),
            width = max_title_length
        );
    }

    let _ = write!(
        out,
        "\nLoop queue: {} | Loop track: {}",
        bool_glyph(loop_queue),
        bool_glyph(loop_track)
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_long_title() {
        let trimmed = trim_title(&"a".repeat(50), 40);
        assert_eq!(trimmed.chars().count(), 40);
        assert!(trimmed.ends_with("..."));
        assert!(trimmed.starts_with(&"a".repeat(37)));
    }

    #[test]
    fn trim_short_title_unchanged() {
        assert_eq!(trim_title("short", 40), "short");
    }

    #[test]
    fn trim_title_at_exact_width() {
        let trimmed = trim_title(&"b".repeat(40), 40);
        assert_eq!(trimmed.chars().count(), 40);
        assert!(trimmed.ends_with("..."));

        assert_eq!(trim_title(&"b".repeat(39), 40), "b".repeat(39));
    }

    #[test]
    fn trim_counts_characters_not_bytes() {
        let title = "é".repeat(45);
        let trimmed = trim_title(&title, 40);
        assert_eq!(trimmed.chars().count(), 40);
    }

    #[test]
    fn format_seconds_examples() {
        assert_eq!(format_seconds(125), "2:05");
        assert_eq!(format_seconds(3600), "60:00");
        assert_eq!(format_seconds(0), "0:00");
        assert_eq!(format_seconds(59), "0:59");
    }

    #[test]
    fn empty_queue_sentinel() {
        assert_eq!(format_queue(&[], true, true, 40), EMPTY_QUEUE);
    }

    #[test]
    fn queue_rows_and_footer() {
        let tracks = vec![
            Track::new("a", "First", "u", 180),
            Track::new("b", "x".repeat(60), "u", 125),
        ];
        let listing = format_queue(&tracks, false, true, 40);
        let lines: Vec<&str> = listing.lines().collect();

        assert!(lines[0].starts_with(" 1) First"));
        assert!(lines[0].ends_with("3:00"));
        assert!(lines[1].starts_with(" 2) "));
        assert!(lines[1].contains(&format!("{}...", "x".repeat(37))));
        assert!(lines[1].ends_with("2:05"));
        // Both rows line up
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
        assert_eq!(lines[3], "Loop queue: ❌ | Loop track: ✅");
    }
}
