//! Inline emphasis: split a line group into [`InlineRun`]s.
//!
//! Recognises paired `*`/`_` delimiters of length 1 (italic), 2 (bold) and
//! 3 (both). It is a deliberately small subset of CommonMark's delimiter
//! algorithm:
//!
//! * an opener must be followed by non-whitespace, a closer preceded by it;
//! * `_` between two alphanumerics (`snake_case`) is always literal;
//! * a closer pairs with the nearest open delimiter of the same character and
//!   the same length; openers skipped over stay literal;
//! * runs of four or more delimiter characters are literal;
//! * `\*` and `\_` produce a literal delimiter character.
//!
//! Anything unmatched is emitted as plain text, so tokenising never fails.

use crate::model::{plain_text, Emphasis, InlineRun};

#[derive(Debug, Clone)]
enum Piece {
    Text(String),
    Delim {
        ch: char,
        len: usize,
        can_open: bool,
        can_close: bool,
    },
}

/// Tokenise `text` into emphasis runs.
///
/// Adjacent runs with equal emphasis are merged and empty runs are dropped,
/// so concatenating the run texts yields `text` minus matched delimiters.
pub fn tokenize(text: &str) -> Vec<InlineRun> {
    let pieces = scan(text);
    let partners = pair_delimiters(&pieces);
    emit(&pieces, &partners)
}

/// Visible text of `text` with matched emphasis delimiters removed.
pub fn strip_emphasis(text: &str) -> String {
    plain_text(&tokenize(text))
}

fn is_delim(c: char) -> bool {
    c == '*' || c == '_'
}

/// Split into literal text and candidate delimiter runs.
fn scan(text: &str) -> Vec<Piece> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces = Vec::new();
    let mut buf = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' && chars.get(i + 1).copied().is_some_and(is_delim) {
            buf.push(chars[i + 1]);
            i += 2;
            continue;
        }

        if !is_delim(c) {
            buf.push(c);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i] == c {
            i += 1;
        }
        let len = i - start;
        let prev = start.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i).copied();

        let mut can_open = next.is_some_and(|n| !n.is_whitespace());
        let mut can_close = prev.is_some_and(|p| !p.is_whitespace());
        if c == '_' {
            can_open &= !prev.is_some_and(char::is_alphanumeric);
            can_close &= !next.is_some_and(char::is_alphanumeric);
        }

        if len > 3 || (!can_open && !can_close) {
            buf.extend(std::iter::repeat_n(c, len));
            continue;
        }

        if !buf.is_empty() {
            pieces.push(Piece::Text(std::mem::take(&mut buf)));
        }
        pieces.push(Piece::Delim {
            ch: c,
            len,
            can_open,
            can_close,
        });
    }

    if !buf.is_empty() {
        pieces.push(Piece::Text(buf));
    }
    pieces
}

/// Match closers to openers. `partners[i]` is the index of the delimiter
/// paired with piece `i`, if any.
fn pair_delimiters(pieces: &[Piece]) -> Vec<Option<usize>> {
    let mut partners = vec![None; pieces.len()];
    let mut open: Vec<usize> = Vec::new();

    for (i, piece) in pieces.iter().enumerate() {
        let Piece::Delim {
            ch,
            len,
            can_open,
            can_close,
        } = *piece
        else {
            continue;
        };

        if can_close {
            let found = open.iter().rposition(|&j| {
                matches!(pieces[j], Piece::Delim { ch: oc, len: ol, .. } if oc == ch && ol == len)
            });
            if let Some(pos) = found {
                let opener = open[pos];
                partners[opener] = Some(i);
                partners[i] = Some(opener);
                open.truncate(pos);
                continue;
            }
        }

        if can_open {
            open.push(i);
        }
    }

    partners
}

fn emit(pieces: &[Piece], partners: &[Option<usize>]) -> Vec<InlineRun> {
    let mut runs: Vec<InlineRun> = Vec::new();
    let mut bold = 0usize;
    let mut italic = 0usize;

    for (i, piece) in pieces.iter().enumerate() {
        let emphasis = Emphasis::from_flags(bold > 0, italic > 0);
        match (piece, partners[i]) {
            (Piece::Text(t), _) => push_run(&mut runs, t, emphasis),
            (Piece::Delim { ch, len, .. }, None) => {
                let literal: String = std::iter::repeat_n(*ch, *len).collect();
                push_run(&mut runs, &literal, emphasis);
            }
            (Piece::Delim { len, .. }, Some(partner)) => {
                let opening = partner > i;
                let (b, it) = match *len {
                    1 => (0, 1),
                    2 => (1, 0),
                    _ => (1, 1),
                };
                if opening {
                    bold += b;
                    italic += it;
                } else {
                    bold -= b;
                    italic -= it;
                }
            }
        }
    }

    runs
}

fn push_run(runs: &mut Vec<InlineRun>, text: &str, emphasis: Emphasis) {
    if text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.emphasis == emphasis => last.text.push_str(text),
        _ => runs.push(InlineRun::new(text, emphasis)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(text: &str) -> Vec<(String, Emphasis)> {
        tokenize(text)
            .into_iter()
            .map(|r| (r.text, r.emphasis))
            .collect()
    }

    fn r(text: &str, e: Emphasis) -> (String, Emphasis) {
        (text.to_string(), e)
    }

    #[test]
    fn plain_text_is_single_run() {
        assert_eq!(runs("just words"), vec![r("just words", Emphasis::None)]);
    }

    #[test]
    fn bold_in_sentence() {
        assert_eq!(
            runs("This is **great** food."),
            vec![
                r("This is ", Emphasis::None),
                r("great", Emphasis::Bold),
                r(" food.", Emphasis::None),
            ]
        );
    }

    #[test]
    fn italic_with_both_delimiters() {
        assert_eq!(
            runs("*a* and _b_"),
            vec![
                r("a", Emphasis::Italic),
                r(" and ", Emphasis::None),
                r("b", Emphasis::Italic),
            ]
        );
    }

    #[test]
    fn triple_is_both() {
        assert_eq!(runs("***wow***"), vec![r("wow", Emphasis::Both)]);
    }

    #[test]
    fn nested_italic_inside_bold() {
        assert_eq!(
            runs("**bold *both* bold**"),
            vec![
                r("bold ", Emphasis::Bold),
                r("both", Emphasis::Both),
                r(" bold", Emphasis::Bold),
            ]
        );
    }

    #[test]
    fn unmatched_opener_is_literal() {
        assert_eq!(
            runs("**never closed"),
            vec![r("**never closed", Emphasis::None)]
        );
        assert_eq!(runs("a * b * c"), vec![r("a * b * c", Emphasis::None)]);
    }

    #[test]
    fn intraword_underscore_is_literal() {
        assert_eq!(
            runs("call snake_case_name now"),
            vec![r("call snake_case_name now", Emphasis::None)]
        );
    }

    #[test]
    fn long_delimiter_runs_are_literal() {
        assert_eq!(runs("****"), vec![r("****", Emphasis::None)]);
    }

    #[test]
    fn escaped_delimiters() {
        assert_eq!(runs(r"\*not\*"), vec![r("*not*", Emphasis::None)]);
    }

    #[test]
    fn mismatched_lengths_degrade() {
        let out = tokenize("**a* b");
        assert_eq!(plain_text(&out), "**a* b");
    }

    #[test]
    fn strip_emphasis_keeps_visible_text() {
        assert_eq!(strip_emphasis("My **Great** _Recipe_"), "My Great Recipe");
    }

    #[test]
    fn empty_input_yields_no_runs() {
        assert!(tokenize("").is_empty());
    }
}
