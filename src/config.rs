//! Configuration for the parse → render → publish pipeline.
//!
//! Every threshold the heuristics use lives in [`PipelineConfig`], built via
//! [`PipelineConfigBuilder`]. The defaults are tuned for pasted blog posts;
//! callers only override what they care about.

use crate::error::PipelineError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Default stop-words removed during keyword extraction.
///
/// Only words of four letters or more are listed: shorter words are already
/// filtered by the default `keyword_min_len`.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "also", "been", "before", "being", "below",
    "between", "both", "could", "does", "doing", "down", "during", "each", "every", "from",
    "further", "have", "having", "here", "into", "just", "like", "make", "more", "most", "much",
    "once", "only", "other", "ours", "ourselves", "over", "same", "should", "some", "such",
    "than", "that", "their", "theirs", "them", "themselves", "then", "there", "these", "they",
    "this", "those", "through", "under", "until", "very", "were", "what", "when", "where",
    "which", "while", "whom", "will", "with", "would", "your", "yours", "yourself",
];

/// Placeholder left in `<img src="…">` until the mediator knows the real URL.
pub const DEFAULT_IMAGE_TOKEN: &str = "{{image}}";

/// Configuration for one publishing pipeline.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2blog::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .max_keywords(5)
///     .excerpt_max_chars(120)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Longest first line (in characters) still accepted as the title. Default: 120.
    ///
    /// Anything longer is almost certainly the first sentence of the body.
    pub title_max_chars: usize,

    /// Minimum keyword length in characters. Default: 4.
    pub keyword_min_len: usize,

    /// Maximum number of keywords kept (and sent as tags). Default: 10.
    pub max_keywords: usize,

    /// Excerpt length cap in characters, before the ellipsis. Default: 160.
    ///
    /// 160 matches what search engines show for a meta description.
    pub excerpt_max_chars: usize,

    /// Lower-case words ignored by keyword extraction.
    pub stop_words: Vec<String>,

    /// Token the generator writes into unresolved `<img src>`. Default: `{{image}}`.
    pub image_token: String,

    /// Largest accepted image payload in bytes. Default: 5 MiB.
    pub max_image_bytes: usize,

    /// Optional observer for pipeline stage events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            title_max_chars: 120,
            keyword_min_len: 4,
            max_keywords: 10,
            excerpt_max_chars: 160,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            image_token: DEFAULT_IMAGE_TOKEN.to_string(),
            max_image_bytes: 5 * 1024 * 1024,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("title_max_chars", &self.title_max_chars)
            .field("keyword_min_len", &self.keyword_min_len)
            .field("max_keywords", &self.max_keywords)
            .field("excerpt_max_chars", &self.excerpt_max_chars)
            .field("stop_words", &self.stop_words.len())
            .field("image_token", &self.image_token)
            .field("max_image_bytes", &self.max_image_bytes)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn PublishProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whether `word` (already lower-cased) is a stop-word.
    pub(crate) fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.iter().any(|w| w == word)
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn title_max_chars(mut self, n: usize) -> Self {
        self.config.title_max_chars = n;
        self
    }

    pub fn keyword_min_len(mut self, n: usize) -> Self {
        self.config.keyword_min_len = n.max(1);
        self
    }

    /// `0` disables keyword extraction entirely.
    pub fn max_keywords(mut self, n: usize) -> Self {
        self.config.max_keywords = n;
        self
    }

    pub fn excerpt_max_chars(mut self, n: usize) -> Self {
        self.config.excerpt_max_chars = n;
        self
    }

    /// Replace the stop-word list. Words are lower-cased on the way in.
    pub fn stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.stop_words = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        self
    }

    pub fn image_token(mut self, token: impl Into<String>) -> Self {
        self.config.image_token = token.into();
        self
    }

    pub fn max_image_bytes(mut self, n: usize) -> Self {
        self.config.max_image_bytes = n;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, PipelineError> {
        let c = &self.config;
        if c.title_max_chars == 0 {
            return Err(PipelineError::InvalidConfig(
                "title_max_chars must be ≥ 1".into(),
            ));
        }
        if c.excerpt_max_chars == 0 {
            return Err(PipelineError::InvalidConfig(
                "excerpt_max_chars must be ≥ 1".into(),
            ));
        }
        if c.max_image_bytes == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_image_bytes must be ≥ 1".into(),
            ));
        }
        if c.image_token.is_empty() || c.image_token.contains(['"', '<', '>']) {
            return Err(PipelineError::InvalidConfig(format!(
                "image_token must be non-empty and attribute-safe, got {:?}",
                c.image_token
            )));
        }
        Ok(self.config)
    }
}
