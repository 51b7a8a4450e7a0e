//! HTML generation: [`ParsedDocument`] → body HTML plus excerpt.
//!
//! Output is a flat sequence of block elements with no whitespace between
//! them, which is what blog platforms store in their `body_html` field.
//!
//! All user text goes through `html-escape` *before* any tag is added, so
//! nothing a user pastes can open or close an element. Image placeholders
//! become `<img src="{{image}}">`; the mediator swaps the token for a real
//! URL (or removes the element) once the upload outcome is known.

use crate::config::PipelineConfig;
use crate::error::GenerationError;
use crate::model::{plain_text, Block, Emphasis, InlineRun, ParsedDocument};
use crate::output::RenderedArticle;
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::debug;

/// Render `doc` to HTML and compute its excerpt.
///
/// # Errors
/// [`GenerationError::EmptyDocument`] if the document has no blocks. The
/// parser never produces one, so this only fires for hand-built documents.
pub fn render(
    doc: &ParsedDocument,
    config: &PipelineConfig,
) -> Result<RenderedArticle, GenerationError> {
    if doc.blocks().is_empty() {
        return Err(GenerationError::EmptyDocument);
    }

    let mut html = String::with_capacity(256);
    for block in doc.blocks() {
        render_block(&mut html, block, doc, config);
    }

    let excerpt = excerpt(doc, config.excerpt_max_chars);
    debug!(
        "Rendered {} blocks → {} bytes HTML, excerpt {} chars",
        doc.blocks().len(),
        html.len(),
        excerpt.chars().count()
    );

    Ok(RenderedArticle { html, excerpt })
}

fn render_block(out: &mut String, block: &Block, doc: &ParsedDocument, config: &PipelineConfig) {
    match block {
        Block::Heading { level, text } => {
            out.push_str(&format!("<h{level}>{}</h{level}>", encode_text(text)));
        }
        Block::Paragraph { runs } => {
            out.push_str("<p>");
            push_runs(out, runs);
            out.push_str("</p>");
        }
        Block::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            out.push_str(&format!("<{tag}>"));
            for item in items {
                out.push_str("<li>");
                push_runs(out, item);
                out.push_str("</li>");
            }
            out.push_str(&format!("</{tag}>"));
        }
        Block::ImagePlaceholder { keyword_hint } => {
            let alt = keyword_hint
                .as_deref()
                .or_else(|| doc.primary_keyword())
                .unwrap_or("");
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">",
                config.image_token,
                encode_double_quoted_attribute(alt)
            ));
        }
        Block::Blockquote { text } => {
            out.push_str(&format!("<blockquote>{}</blockquote>", encode_text(text)));
        }
    }
}

/// Append escaped runs with their emphasis markup. `Both` nests bold inside italic.
fn push_runs(out: &mut String, runs: &[InlineRun]) {
    for run in runs {
        let text = encode_text(&run.text);
        match run.emphasis {
            Emphasis::None => out.push_str(&text),
            Emphasis::Bold => out.push_str(&format!("<strong>{text}</strong>")),
            Emphasis::Italic => out.push_str(&format!("<em>{text}</em>")),
            Emphasis::Both => out.push_str(&format!("<em><strong>{text}</strong></em>")),
        }
    }
}

/// Escaped excerpt from the first paragraph, else the title, else empty.
fn excerpt(doc: &ParsedDocument, max_chars: usize) -> String {
    let source = doc
        .blocks()
        .iter()
        .find_map(|b| match b {
            Block::Paragraph { runs } => Some(plain_text(runs)),
            _ => None,
        })
        .or_else(|| doc.title().map(str::to_string))
        .unwrap_or_default();

    encode_text(&truncate_at_word(source.trim(), max_chars)).into_owned()
}

/// Cut `text` to at most `max_chars` characters at a word boundary,
/// appending `…` when anything was removed.
///
/// A single word longer than the limit is cut mid-word.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let at_boundary = text
        .chars()
        .nth(max_chars)
        .is_some_and(char::is_whitespace);

    let head = if at_boundary {
        cut.as_str()
    } else {
        match cut.rfind(char::is_whitespace) {
            Some(i) if i > 0 => &cut[..i],
            _ => cut.as_str(),
        }
    };

    format!("{}…", head.trim_end().trim_end_matches([',', ';', ':']))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parse::parse;

    fn render_raw(raw: &str) -> RenderedArticle {
        let config = PipelineConfig::default();
        let doc = parse(raw, &config).expect("parse");
        render(&doc, &config).expect("render")
    }

    #[test]
    fn recipe_example_html() {
        let out = render_raw("My Recipe\n\nThis is **great** food.\n\n- step one\n- step two");
        assert_eq!(
            out.html,
            "<h1>My Recipe</h1>\
             <p>This is <strong>great</strong> food.</p>\
             <ul><li>step one</li><li>step two</li></ul>"
        );
        assert_eq!(out.excerpt, "This is great food.");
    }

    #[test]
    fn empty_document_is_rejected() {
        let doc = ParsedDocument::new(None, vec![], vec![]);
        assert_eq!(
            render(&doc, &PipelineConfig::default()),
            Err(GenerationError::EmptyDocument)
        );
    }

    #[test]
    fn user_text_cannot_inject_markup() {
        let out = render_raw("Title\n\n<script>alert(1)</script> & **<b>**\n\n> <img src=x>");
        assert!(!out.html.contains("<script>"));
        assert!(out.html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; "));
        assert!(out.html.contains("<strong>&lt;b&gt;</strong>"));
        assert!(out.html.contains("<blockquote>&lt;img src=x&gt;</blockquote>"));
    }

    #[test]
    fn emphasis_nesting() {
        let out = render_raw("T\n\n*i* ***both***");
        assert!(out
            .html
            .contains("<p><em>i</em> <em><strong>both</strong></em></p>"));
    }

    #[test]
    fn ordered_list_and_heading_levels() {
        let out = render_raw("Guide\n\n### Steps\n1. one\n2. two");
        assert_eq!(
            out.html,
            "<h3>Steps</h3><ol><li>one</li><li>two</li></ol>"
        );
    }

    #[test]
    fn image_alt_uses_hint_then_keyword() {
        let out = render_raw("Lemon Tart\n\n[[image: tart \"slice\"]]\n\ntext");
        assert!(out
            .html
            .contains("<img src=\"{{image}}\" alt=\"tart &quot;slice&quot;\">"));

        let config = PipelineConfig::default();
        let doc = ParsedDocument::new(
            None,
            vec!["lemon".into()],
            vec![Block::ImagePlaceholder { keyword_hint: None }],
        );
        let out = render(&doc, &config).unwrap();
        assert_eq!(out.html, "<img src=\"{{image}}\" alt=\"lemon\">");
    }

    #[test]
    fn image_without_any_hint_has_empty_alt() {
        let doc = ParsedDocument::new(
            None,
            vec![],
            vec![Block::ImagePlaceholder { keyword_hint: None }],
        );
        let out = render(&doc, &PipelineConfig::default()).unwrap();
        assert_eq!(out.html, "<img src=\"{{image}}\" alt=\"\">");
    }

    #[test]
    fn custom_image_token() {
        let config = PipelineConfig::builder()
            .image_token("__IMG__")
            .build()
            .unwrap();
        let doc = ParsedDocument::new(
            None,
            vec![],
            vec![Block::ImagePlaceholder {
                keyword_hint: Some("x".into()),
            }],
        );
        assert_eq!(
            render(&doc, &config).unwrap().html,
            "<img src=\"__IMG__\" alt=\"x\">"
        );
    }

    #[test]
    fn excerpt_falls_back_to_title() {
        let out = render_raw("Only A Title\n\n- item");
        assert_eq!(out.excerpt, "Only A Title");
    }

    #[test]
    fn excerpt_is_truncated_at_word_and_escaped() {
        let body = "Fish & chips ".repeat(20);
        let out = render_raw(&format!("Title\n\n{body}"));
        assert!(out.excerpt.ends_with('…'));
        assert!(out.excerpt.contains("&amp;"));
        assert!(!out.excerpt.contains("&a…"));
    }

    #[test]
    fn truncate_rules() {
        assert_eq!(truncate_at_word("short", 10), "short");
        assert_eq!(truncate_at_word("hello brave world", 11), "hello brave…");
        assert_eq!(truncate_at_word("hello brave world", 9), "hello…");
        assert_eq!(truncate_at_word("one, two", 5), "one…");
        assert_eq!(truncate_at_word("abcdefghij", 4), "abcd…");
    }

    #[test]
    fn rendering_is_idempotent() {
        let raw = "Doc\n\n[[image]]\n\n> q\n\n- *a*\n- b";
        assert_eq!(render_raw(raw), render_raw(raw));
    }
}
