//! Human-readable output for command results.

use crate::domain::Note;
use crate::marker;

/// Prints the matched notes in a readable listing.
pub fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("No notes matched.");
        return;
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("FOUND {} NOTE(S)", notes.len());
    println!("{}", "=".repeat(60));

    for (i, note) in notes.iter().enumerate() {
        println!();
        println!("NOTE #{}", i + 1);
        println!("Title: {}", note.title());
        println!("Created: {}", note.created().format("%Y-%m-%d %H:%M"));
        println!("Modified: {}", note.modified().format("%Y-%m-%d %H:%M"));
        println!("Preview: {}", truncate_str(note.body(), 100));
        println!("{}", "-".repeat(60));
    }
}

/// Prints match statistics: total qualifying notes vs. extracted.
pub fn print_stats(total: usize, extracted: usize, limit: usize) {
    println!();
    println!("STATISTICS");
    println!("  Matching notes: {total}");
    println!("  Extracted: {extracted} (limit {limit})");
    if total > extracted {
        println!("  Not extracted: {}", total - extracted);
    }
}

/// Prints the marking summary after a `--mark` run.
pub fn print_mark_summary(summary: &marker::MarkSummary) {
    println!();
    println!(
        "Marked {} note(s), skipped {} already-marked",
        summary.marked, summary.skipped
    );
}

/// Truncates a string to a maximum number of characters, adding an
/// ellipsis if needed. Newlines collapse to spaces for preview display.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    let flat: String = s
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut out: String = flat.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_pass_through() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn long_strings_get_ellipsis() {
        assert_eq!(truncate_str("hello world", 5), "hello...");
    }

    #[test]
    fn newlines_collapse_in_previews() {
        assert_eq!(truncate_str("a\nb\rc", 10), "a b c");
    }
}
