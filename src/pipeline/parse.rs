//! Parser: raw pasted text → [`ParsedDocument`].
//!
//! This is a line-oriented heuristic grammar, not a markdown engine. Each
//! normalised line is classified by its leading marker, then consecutive
//! lines are grouped into blocks:
//!
//! ```text
//! "# Title"          → Heading (level = number of #, clamped 1..=6)
//! "- item" / "1. x"  → List item (kind fixed by the first item)
//! "> quoted"         → Blockquote (consecutive lines joined by a space)
//! "[[image: hint]]"  → ImagePlaceholder
//! "---"              → block boundary (thematic break, no block)
//! ""                 → block boundary
//! anything else      → Paragraph text
//! ```
//!
//! Every ambiguous input has a fallback rule, so parsing only fails when
//! there is nothing to parse at all.

use crate::config::PipelineConfig;
use crate::error::ParseError;
use crate::model::{plain_text, Block, InlineRun, ParsedDocument};
use crate::pipeline::inline::{strip_emphasis, tokenize};
use crate::pipeline::keywords::extract_keywords;
use crate::pipeline::normalize::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#+)\s+(.*)$").unwrap());

static RE_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?:-\s*){3,}|(?:\*\s*){3,}|(?:_\s*){3,})$").unwrap());

static RE_UNORDERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*+•](?:\s+(.*))?$").unwrap());

static RE_ORDERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,9}[.)](?:\s+(.*))?$").unwrap());

static RE_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>\s?(.*)$").unwrap());

static RE_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\[\[?\s*(?:image|img)\s*(?::\s*(?P<hint>[^\[\]]*?))?\s*\]\]?$").unwrap()
});

/// One classified input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Heading { level: usize, text: &'a str },
    ListItem { ordered: bool, text: &'a str },
    Quote(&'a str),
    Image(Option<&'a str>),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let line = line.trim_start();
    if line.is_empty() || RE_RULE.is_match(line) {
        return Line::Blank;
    }
    if let Some(caps) = RE_IMAGE.captures(line) {
        let hint = caps
            .name("hint")
            .map(|m| m.as_str().trim())
            .filter(|h| !h.is_empty());
        return Line::Image(hint);
    }
    if let Some(caps) = RE_HEADING.captures(line) {
        let text = caps.get(2).map_or("", |m| m.as_str());
        // Optional closing run (`## Title ##`), but keep `C#`.
        let unclosed = text.trim_end_matches('#');
        let text = if unclosed.len() < text.len() && unclosed.ends_with(char::is_whitespace) {
            unclosed
        } else {
            text
        };
        return Line::Heading {
            level: caps[1].len(),
            text: text.trim(),
        };
    }
    if let Some(caps) = RE_UNORDERED.captures(line) {
        return Line::ListItem {
            ordered: false,
            text: caps.get(1).map_or("", |m| m.as_str()),
        };
    }
    if let Some(caps) = RE_ORDERED.captures(line) {
        return Line::ListItem {
            ordered: true,
            text: caps.get(1).map_or("", |m| m.as_str()),
        };
    }
    if let Some(caps) = RE_QUOTE.captures(line) {
        return Line::Quote(caps.get(1).map_or("", |m| m.as_str()));
    }
    Line::Text(line)
}

/// Parse raw document text into blocks plus title and keywords.
///
/// # Errors
/// - [`ParseError::Empty`] when `raw` has no visible characters.
/// - [`ParseError::NoContent`] when no block survives grouping.
pub fn parse(raw: &str, config: &PipelineConfig) -> Result<ParsedDocument, ParseError> {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return Err(ParseError::Empty);
    }

    let lines: Vec<Line<'_>> = normalized.lines().map(classify).collect();

    // ── Title: only the first line is a candidate ────────────────────────
    let (title, consumed) = detect_title(&lines, config);
    let body = if consumed { &lines[1..] } else { &lines[..] };

    let mut grouper = Grouper::new(title.clone());
    for line in body {
        grouper.feed(line);
    }
    let mut blocks = grouper.finish();

    if consumed {
        if let Some(ref t) = title {
            if !blocks.first().is_some_and(Block::is_heading) {
                blocks.insert(0, Block::heading(1, t.clone()));
            }
        }
    }

    if blocks.is_empty() {
        return Err(ParseError::NoContent);
    }

    let heading_texts = blocks.iter().filter_map(|b| match b {
        Block::Heading { text, .. } => Some(text.as_str()),
        _ => None,
    });
    let keywords = extract_keywords(title.as_deref().into_iter().chain(heading_texts), config);

    debug!(
        "Parsed {} blocks, title={:?}, {} keywords",
        blocks.len(),
        title,
        keywords.len()
    );

    Ok(ParsedDocument::new(title, keywords, blocks))
}

/// Decide the title from the first line.
///
/// Returns the title and whether the line was consumed (plain-text titles
/// are; heading titles stay in the body as their own block).
fn detect_title(lines: &[Line<'_>], config: &PipelineConfig) -> (Option<String>, bool) {
    let (text, consumed) = match lines.first() {
        Some(Line::Text(t)) => (*t, true),
        Some(Line::Heading { text, .. }) => (*text, false),
        _ => return (None, false),
    };

    let title = strip_emphasis(text.trim()).trim().to_string();
    if title.is_empty() || title.chars().count() > config.title_max_chars {
        return (None, false);
    }
    (Some(title), consumed)
}

/// Accumulates consecutive lines into blocks.
struct Grouper<'a> {
    blocks: Vec<Block>,
    paragraph: Vec<&'a str>,
    list: Option<(bool, Vec<&'a str>)>,
    quote: Vec<&'a str>,
    /// Nearest preceding heading text; fallback hint for bare image tokens.
    last_heading: Option<String>,
}

impl<'a> Grouper<'a> {
    fn new(title: Option<String>) -> Self {
        Self {
            blocks: Vec::new(),
            paragraph: Vec::new(),
            list: None,
            quote: Vec::new(),
            last_heading: title,
        }
    }

    fn feed(&mut self, line: &Line<'a>) {
        match *line {
            Line::Blank => self.flush_all(),
            Line::Heading { level, text } => {
                self.flush_all();
                let text = strip_emphasis(text).trim().to_string();
                if !text.is_empty() {
                    self.last_heading = Some(text.clone());
                    self.blocks.push(Block::heading(level, text));
                }
            }
            Line::ListItem { ordered, text } => {
                self.flush_paragraph();
                self.flush_quote();
                if self.list.as_ref().is_some_and(|(o, _)| *o != ordered) {
                    self.flush_list();
                }
                self.list
                    .get_or_insert_with(|| (ordered, Vec::new()))
                    .1
                    .push(text);
            }
            Line::Quote(text) => {
                self.flush_paragraph();
                self.flush_list();
                self.quote.push(text);
            }
            Line::Image(hint) => {
                self.flush_all();
                let keyword_hint = hint
                    .map(|h| h.to_string())
                    .or_else(|| self.last_heading.clone());
                self.blocks.push(Block::ImagePlaceholder { keyword_hint });
            }
            Line::Text(text) => {
                self.flush_list();
                self.flush_quote();
                self.paragraph.push(text.trim());
            }
        }
    }

    fn flush_all(&mut self) {
        self.flush_paragraph();
        self.flush_list();
        self.flush_quote();
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let joined = self.paragraph.join(" ");
        self.paragraph.clear();
        if let Some(runs) = visible_runs(&joined) {
            self.blocks.push(Block::Paragraph { runs });
        }
    }

    fn flush_list(&mut self) {
        let Some((ordered, texts)) = self.list.take() else {
            return;
        };
        let items: Vec<Vec<InlineRun>> = texts
            .iter()
            .filter_map(|t| visible_runs(t.trim()))
            .collect();
        if !items.is_empty() {
            self.blocks.push(Block::List { ordered, items });
        }
    }

    fn flush_quote(&mut self) {
        if self.quote.is_empty() {
            return;
        }
        let joined = self
            .quote
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        self.quote.clear();
        let text = strip_emphasis(&joined).trim().to_string();
        if !text.is_empty() {
            self.blocks.push(Block::Blockquote { text });
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_all();
        self.blocks
    }
}

/// Tokenise `text`, returning `None` when nothing visible remains.
fn visible_runs(text: &str) -> Option<Vec<InlineRun>> {
    let runs = tokenize(text);
    if plain_text(&runs).trim().is_empty() {
        None
    } else {
        Some(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Emphasis;

    fn parse_default(raw: &str) -> ParsedDocument {
        parse(raw, &PipelineConfig::default()).expect("parse should succeed")
    }

    #[test]
    fn recipe_example() {
        let doc = parse_default("My Recipe\n\nThis is **great** food.\n\n- step one\n- step two");
        assert_eq!(doc.title(), Some("My Recipe"));
        assert_eq!(
            doc.blocks(),
            &[
                Block::heading(1, "My Recipe"),
                Block::Paragraph {
                    runs: vec![
                        InlineRun::plain("This is "),
                        InlineRun::new("great", Emphasis::Bold),
                        InlineRun::plain(" food."),
                    ]
                },
                Block::List {
                    ordered: false,
                    items: vec![
                        vec![InlineRun::plain("step one")],
                        vec![InlineRun::plain("step two")],
                    ]
                },
            ]
        );
        assert_eq!(doc.keywords(), &["recipe".to_string()]);
    }

    #[test]
    fn empty_input_is_an_error() {
        let config = PipelineConfig::default();
        assert_eq!(parse("", &config), Err(ParseError::Empty));
        assert_eq!(parse("   \n\n", &config), Err(ParseError::Empty));
    }

    #[test]
    fn marker_only_input_has_no_content() {
        let config = PipelineConfig::default();
        assert_eq!(parse("-\n*\n1.", &config), Err(ParseError::NoContent));
        assert_eq!(parse("> \n---", &config), Err(ParseError::NoContent));
    }

    #[test]
    fn heading_levels_are_clamped() {
        let doc = parse_default("Intro\n\n######### Deep heading\n\n## Second");
        // Body already starts with a heading, so the title is not re-emitted.
        assert_eq!(doc.blocks()[0], Block::heading(6, "Deep heading"));
        assert_eq!(doc.blocks()[1], Block::heading(2, "Second"));
    }

    #[test]
    fn hash_without_space_is_paragraph() {
        let doc = parse_default("Intro\n\n#hashtag life");
        assert_eq!(
            doc.blocks()[1],
            Block::Paragraph {
                runs: vec![InlineRun::plain("#hashtag life")]
            }
        );
    }

    #[test]
    fn heading_first_line_supplies_title_without_duplicate() {
        let doc = parse_default("# Garden *Notes*\n\nSome text.");
        assert_eq!(doc.title(), Some("Garden Notes"));
        assert_eq!(doc.blocks().len(), 2);
        assert_eq!(doc.blocks()[0], Block::heading(1, "Garden Notes"));
    }

    #[test]
    fn title_not_duplicated_when_body_starts_with_heading() {
        let doc = parse_default("Weekly Update\n## Highlights\nAll good.");
        assert_eq!(doc.title(), Some("Weekly Update"));
        assert_eq!(doc.blocks()[0], Block::heading(2, "Highlights"));
        assert!(!doc
            .blocks()
            .iter()
            .any(|b| *b == Block::heading(1, "Weekly Update")));
    }

    #[test]
    fn long_first_line_is_not_a_title() {
        let long = "word ".repeat(40);
        let doc = parse_default(&long);
        assert_eq!(doc.title(), None);
        assert!(matches!(doc.blocks()[0], Block::Paragraph { .. }));
    }

    #[test]
    fn list_first_line_is_not_a_title() {
        let doc = parse_default("- milk\n- eggs");
        assert_eq!(doc.title(), None);
        assert_eq!(doc.blocks().len(), 1);
    }

    #[test]
    fn ordered_list_and_kind_switch() {
        let doc = parse_default("Steps\n\n1. mix\n2) bake\n- serve");
        assert_eq!(
            doc.blocks()[1],
            Block::List {
                ordered: true,
                items: vec![vec![InlineRun::plain("mix")], vec![InlineRun::plain("bake")]]
            }
        );
        assert_eq!(
            doc.blocks()[2],
            Block::List {
                ordered: false,
                items: vec![vec![InlineRun::plain("serve")]]
            }
        );
    }

    #[test]
    fn text_line_terminates_list() {
        let doc = parse_default("Shopping\n\n- milk\nThat is all.");
        assert!(matches!(doc.blocks()[1], Block::List { .. }));
        assert_eq!(
            doc.blocks()[2],
            Block::Paragraph {
                runs: vec![InlineRun::plain("That is all.")]
            }
        );
    }

    #[test]
    fn quote_lines_are_joined() {
        let doc = parse_default("Wisdom\n\n> Stay hungry,\n> stay **foolish**.");
        assert_eq!(
            doc.blocks()[1],
            Block::Blockquote {
                text: "Stay hungry, stay foolish.".into()
            }
        );
    }

    #[test]
    fn paragraph_lines_are_joined_with_space() {
        let doc = parse_default("Notes\n\nfirst line\n  second line");
        assert_eq!(
            doc.blocks()[1],
            Block::Paragraph {
                runs: vec![InlineRun::plain("first line second line")]
            }
        );
    }

    #[test]
    fn image_tokens() {
        let doc = parse_default(
            "Chocolate Cake\n\n[[image: cake slice]]\n\n## Frosting Tips\n\n[[IMAGE]]\n\n[img:]",
        );
        let hints: Vec<Option<&str>> = doc
            .blocks()
            .iter()
            .filter_map(|b| match b {
                Block::ImagePlaceholder { keyword_hint } => Some(keyword_hint.as_deref()),
                _ => None,
            })
            .collect();
        assert_eq!(
            hints,
            vec![
                Some("cake slice"),
                Some("Frosting Tips"),
                Some("Frosting Tips")
            ]
        );
    }

    #[test]
    fn bare_image_before_any_heading_uses_title() {
        let doc = parse_default("Summer Salad\n\n[[image]]\nFresh.");
        assert_eq!(
            doc.blocks()[1],
            Block::ImagePlaceholder {
                keyword_hint: Some("Summer Salad".into())
            }
        );
    }

    #[test]
    fn bare_image_without_title_has_no_hint() {
        let doc = parse_default("[[image]]\n\nhello");
        assert_eq!(
            doc.blocks()[0],
            Block::ImagePlaceholder { keyword_hint: None }
        );
    }

    #[test]
    fn keywords_come_from_title_and_headings_only() {
        let doc = parse_default(
            "Sourdough Baking Guide\n\nBody words like flour never count.\n\n## Starter Feeding",
        );
        assert_eq!(
            doc.keywords(),
            &["sourdough", "baking", "guide", "starter", "feeding"]
        );
    }

    #[test]
    fn keyword_cap_applies() {
        let words: Vec<String> = (0..20).map(|i| format!("keyword{i:02}")).collect();
        let raw = format!("{}\n\nbody\n\n## {}", words[..10].join(" "), words[10..].join(" "));
        let doc = parse_default(&raw);
        assert!(doc.keywords().len() <= 10);
    }

    #[test]
    fn malformed_emphasis_degrades_to_text() {
        let doc = parse_default("Title\n\nsome **unclosed and *odd");
        assert_eq!(
            doc.blocks()[1],
            Block::Paragraph {
                runs: vec![InlineRun::plain("some **unclosed and *odd")]
            }
        );
    }

    #[test]
    fn thematic_break_is_a_boundary() {
        let doc = parse_default("Title\n\none\n---\ntwo");
        assert_eq!(doc.blocks().len(), 3);
    }

    #[test]
    fn parsing_is_deterministic() {
        let raw = "A Title\n\n> q\n\n- a\n- b\n\n[[image]]\n\ntext *x*";
        assert_eq!(parse_default(raw), parse_default(raw));
    }

    #[test]
    fn classify_lines() {
        assert_eq!(classify("   "), Line::Blank);
        assert_eq!(
            classify("## Title ##"),
            Line::Heading {
                level: 2,
                text: "Title"
            }
        );
        assert_eq!(
            classify("  * item"),
            Line::ListItem {
                ordered: false,
                text: "item"
            }
        );
        assert_eq!(
            classify("# Learning C#"),
            Line::Heading {
                level: 1,
                text: "Learning C#"
            }
        );
        assert_eq!(classify("*emphasis* first"), Line::Text("*emphasis* first"));
        assert_eq!(classify("[image: a b]"), Line::Image(Some("a b")));
        assert_eq!(classify(">quote"), Line::Quote("quote"));
    }
}
