//! Values produced by the generator and the mediator.

use crate::model::ParsedDocument;
use serde::{Deserialize, Serialize};

/// Output of [`crate::pipeline::render::render`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedArticle {
    /// Body HTML; image `src` attributes still hold the unresolved token.
    pub html: String,
    /// Escaped plain-text summary, at most `excerpt_max_chars` plus `…`.
    pub excerpt: String,
}

/// A parsed and rendered document that has not touched the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedArticle {
    /// Title actually used: the document's own, or the caller's default.
    pub title: String,
    pub document: ParsedDocument,
    pub rendered: RenderedArticle,
}

/// The article handed to [`crate::capability::ArticlePublisher::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub body_html: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
}

/// Timing and size figures for one publish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishStats {
    pub block_count: usize,
    pub keyword_count: usize,
    pub html_bytes: usize,
    /// Parse plus render.
    pub prepare_duration_ms: u64,
    /// Zero when no image was supplied.
    pub upload_duration_ms: u64,
    pub publish_duration_ms: u64,
}

/// What a successful [`crate::publish::publish`] returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutput {
    /// Public URL of the new article.
    pub url: String,
    /// Hosted image URL, when an image was uploaded.
    pub image_url: Option<String>,
    pub title: String,
    pub tags: Vec<String>,
    pub stats: PublishStats,
}
