//! Normalisation: deterministic cleanup of pasted text before parsing.
//!
//! Text pasted from word processors, chat apps and web pages carries noise
//! that is invisible to the user but breaks line-based parsing: CRLF endings,
//! zero-width characters, trailing tabs, and runs of blank lines.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so every later rule can split on `\n`.
//! Invisible characters are removed before trimming so a line holding only a
//! zero-width space becomes blank and takes part in blank-line collapsing.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalisation rules to raw pasted text.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip invisible Unicode (BOM, zero-width spaces/joiners, soft hyphens)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 2+ consecutive blank lines into one
/// 5. Drop leading and trailing blank lines
///
/// The result is empty iff the input had no visible characters.
pub fn normalize(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim_matches('\n').to_string()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove invisible Unicode characters ──────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse blank-line runs ─────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "\u{FEFF}hello\u{200B}world\u{00AD}";
        assert_eq!(remove_invisible_chars(input), "helloworld");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("  hello \t\nworld  "),
            "  hello\nworld"
        );
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn whitespace_only_lines_collapse() {
        assert_eq!(normalize("a\n   \n\t\n\u{200B}\nb"), "a\n\nb");
    }

    #[test]
    fn blank_input_normalises_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\n"), "");
        assert_eq!(normalize("\r\n\u{FEFF}\r\n"), "");
    }

    #[test]
    fn full_pipeline() {
        let input = "\n\nTitle  \r\n\r\n\r\n\r\nBody text\u{200D}\r\n\n";
        assert_eq!(normalize(input), "Title\n\nBody text");
    }
}
