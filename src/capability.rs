//! External capabilities the mediator depends on.
//!
//! The core never talks to a blog platform directly. It consumes two narrow
//! operations through these traits. The `http` feature provides
//! [`crate::client::HttpBlogClient`]; tests use in-memory fakes.
//!
//! Both traits are object-safe (`async_trait`) so one adapter can be shared
//! across concurrent requests as `Arc<dyn …>`.

use crate::error::{PublishError, UploadError};
use crate::output::Article;
use async_trait::async_trait;

/// Hosts an image and returns its public URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Upload `bytes` under `filename`; `keyword_hint` becomes the alt text.
    async fn upload(
        &self,
        bytes: &[u8],
        filename: &str,
        keyword_hint: &str,
    ) -> Result<String, UploadError>;
}

/// Creates an article and returns its public URL.
#[async_trait]
pub trait ArticlePublisher: Send + Sync {
    async fn create(&self, article: &Article) -> Result<String, PublishError>;
}
