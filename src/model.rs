//! Block model: the in-memory shape of one parsed document.
//!
//! Entities only. The parser builds these, the generator reads them, and
//! nothing mutates a [`ParsedDocument`] after construction.

use serde::{Deserialize, Serialize};

/// Emphasis applied to an [`InlineRun`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    #[default]
    None,
    Bold,
    Italic,
    /// Bold and italic at once (`***text***`).
    Both,
}

impl Emphasis {
    /// Combine the bold/italic flags active at a point in the text.
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Emphasis::None,
            (true, false) => Emphasis::Bold,
            (false, true) => Emphasis::Italic,
            (true, true) => Emphasis::Both,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, Emphasis::Bold | Emphasis::Both)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, Emphasis::Italic | Emphasis::Both)
    }
}

/// A span of text carrying one emphasis tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRun {
    pub text: String,
    pub emphasis: Emphasis,
}

impl InlineRun {
    pub fn new(text: impl Into<String>, emphasis: Emphasis) -> Self {
        Self {
            text: text.into(),
            emphasis,
        }
    }

    /// A run with no emphasis.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Emphasis::None)
    }
}

/// Concatenate the text of `runs`, dropping formatting.
pub fn plain_text(runs: &[InlineRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// One structural unit of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Section heading; `level` is always within 1..=6.
    Heading { level: u8, text: String },

    /// Body text. Never empty.
    Paragraph { runs: Vec<InlineRun> },

    /// Bulleted or numbered list; each item is a run sequence.
    List {
        ordered: bool,
        items: Vec<Vec<InlineRun>>,
    },

    /// Where an uploaded image should appear.
    ImagePlaceholder { keyword_hint: Option<String> },

    /// Quoted text, consecutive `>` lines joined by a space.
    Blockquote { text: String },
}

impl Block {
    /// Build a heading, clamping `level` into 1..=6.
    pub fn heading(level: usize, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 6) as u8,
            text: text.into(),
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }

    /// Visible text of the block, formatting stripped.
    ///
    /// List items are joined with a newline; placeholders have none.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { text, .. } | Block::Blockquote { text } => text.clone(),
            Block::Paragraph { runs } => plain_text(runs),
            Block::List { items, .. } => items
                .iter()
                .map(|item| plain_text(item))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::ImagePlaceholder { .. } => String::new(),
        }
    }
}

/// The immutable result of parsing one raw document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    title: Option<String>,
    keywords: Vec<String>,
    blocks: Vec<Block>,
}

impl ParsedDocument {
    pub fn new(title: Option<String>, keywords: Vec<String>, blocks: Vec<Block>) -> Self {
        Self {
            title,
            keywords,
            blocks,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Deduplicated keywords in first-seen order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// First keyword, used for image naming and as fallback alt text.
    pub fn primary_keyword(&self) -> Option<&str> {
        self.keywords.first().map(String::as_str)
    }

    /// Number of image placeholders in the body.
    pub fn image_placeholder_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::ImagePlaceholder { .. }))
            .count()
    }
}
