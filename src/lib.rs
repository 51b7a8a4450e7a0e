//! # doc2blog
//!
//! Turn a loosely formatted pasted document into semantic, SEO-aware blog
//! HTML and publish it, image included, to an external blog platform.
//!
//! ## Why this crate?
//!
//! People paste blog posts out of word processors, notes apps and chat
//! windows. The text is *almost* markdown: a title on the first line, some
//! `#` headings, bullet lists, the odd `**bold**`. A strict markdown engine
//! either rejects that or renders it literally. This crate uses a forgiving
//! line-oriented grammar where every ambiguous input has a fallback, so
//! parsing only fails on empty input.
//!
//! ## Pipeline Overview
//!
//! ```text
//! raw text
//!  │
//!  ├─ 1. Normalize  line endings, invisible chars, blank-line runs
//!  ├─ 2. Parse      title + blocks + inline emphasis + keywords
//!  ├─ 3. Render     escaped HTML, excerpt, unresolved {{image}} tokens
//!  ├─ 4. Upload     optional image → hosted URL (fail-closed)
//!  └─ 5. Publish    Article → platform → public URL
//! ```
//!
//! Steps 1–3 are pure. Steps 4–5 go through the [`ImageUploader`] and
//! [`ArticlePublisher`] capabilities, each called at most once.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2blog::{publish, HttpBlogClient, HttpClientConfig, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads DOC2BLOG_API_URL / DOC2BLOG_API_TOKEN / DOC2BLOG_TIMEOUT_SECS
//!     let client = HttpBlogClient::new(HttpClientConfig::from_env()?)?;
//!     let config = PipelineConfig::default();
//!
//!     let text = "My Recipe\n\nThis is **great** food.\n\n- step one\n- step two";
//!     let output = publish(text, None, "Untitled", &client, &client, &config).await?;
//!     println!("{}", output.url);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `http`  | on      | [`HttpBlogClient`], a reqwest adapter for both capabilities |
//! | `cli`   | on      | Enables the `doc2blog` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable both when embedding the pipeline with your own platform client:
//! ```toml
//! doc2blog = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod capability;
#[cfg(feature = "http")]
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod publish;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use capability::{ArticlePublisher, ImageUploader};
#[cfg(feature = "http")]
pub use client::{HttpBlogClient, HttpClientConfig};
pub use config::{PipelineConfig, PipelineConfigBuilder, DEFAULT_IMAGE_TOKEN};
pub use error::{GenerationError, ParseError, PipelineError, PublishError, UploadError};
pub use model::{Block, Emphasis, InlineRun, ParsedDocument};
pub use output::{Article, PreparedArticle, PublishOutput, PublishStats, RenderedArticle};
pub use pipeline::image::ImageKind;
pub use pipeline::parse::parse;
pub use pipeline::render::render;
pub use progress::{NoopProgressCallback, ProgressCallback, PublishProgressCallback};
pub use publish::{
    prepare, publish, publish_sync, read_document, resolve_images, strip_unresolved_images,
};
