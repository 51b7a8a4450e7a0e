//! `reqwest` implementation of the upload and publish capabilities.
//!
//! Talks to a generic JSON blog API:
//!
//! ```text
//! POST {base}/images    { filename, alt, content_type, attachment }  → { "url": … }
//! POST {base}/articles  { article: { title, body_html, … } }         → { "url": … }
//! ```
//!
//! Error bodies are reduced to the platform's own message (`error` or
//! `message` field when the body is JSON) and passed through unchanged.
//! Exactly one request is sent per call; retries are the caller's business.

use crate::capability::{ArticlePublisher, ImageUploader};
use crate::error::{PipelineError, PublishError, UploadError};
use crate::output::Article;
use crate::pipeline::image::sniff_format;
use async_trait::async_trait;
use base64::Engine;
use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable holding the API base URL.
pub const ENV_API_URL: &str = "DOC2BLOG_API_URL";
/// Environment variable holding the bearer token.
pub const ENV_API_TOKEN: &str = "DOC2BLOG_API_TOKEN";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "DOC2BLOG_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`HttpBlogClient`].
#[derive(Clone)]
pub struct HttpClientConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    /// Sent as `Authorization: Bearer …` when set.
    pub token: Option<String>,
    /// Per-request timeout. Default: 30.
    pub timeout_secs: u64,
    /// `false` creates drafts. Default: `true`.
    pub published: bool,
}

impl fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("published", &self.published)
            .finish()
    }
}

impl HttpClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            published: true,
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    /// Read `DOC2BLOG_API_URL`, `DOC2BLOG_API_TOKEN` and `DOC2BLOG_TIMEOUT_SECS`.
    ///
    /// # Errors
    /// [`PipelineError::InvalidConfig`] if the URL is unset or the timeout
    /// is not a positive integer.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipelineError> {
        let base_url = lookup(ENV_API_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| PipelineError::InvalidConfig(format!("{ENV_API_URL} is not set")))?;

        let mut config = Self::new(base_url.trim());

        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.is_empty()) {
            config.token = Some(token);
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(PipelineError::InvalidConfig(format!(
                        "{ENV_TIMEOUT_SECS} must be a positive integer, got {raw:?}"
                    )))
                }
            };
        }

        Ok(config)
    }
}

/// Blog platform client implementing [`ImageUploader`] and [`ArticlePublisher`].
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpBlogClient {
    http: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpBlogClient {
    /// Build a client with the configured timeout.
    pub fn new(config: HttpClientConfig) -> Result<Self, PipelineError> {
        if config.base_url.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "API base URL must not be empty".to_string(),
            ));
        }
        if config.timeout_secs == 0 {
            return Err(PipelineError::InvalidConfig(
                "timeout_secs must be ≥ 1".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("doc2blog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PipelineError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let req = self.http.post(format!("{}/{path}", self.config.base_url));
        match self.config.token {
            Some(ref token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn transport_message(&self, e: &reqwest::Error) -> String {
        if e.is_timeout() {
            format!("request timed out after {}s", self.config.timeout_secs)
        } else {
            e.to_string()
        }
    }
}

#[async_trait]
impl ImageUploader for HttpBlogClient {
    async fn upload(
        &self,
        bytes: &[u8],
        filename: &str,
        keyword_hint: &str,
    ) -> Result<String, UploadError> {
        let body = image_request(bytes, filename, keyword_hint);
        debug!("POST /images {} ({} bytes)", filename, bytes.len());

        let response = self
            .post("images")
            .json(&body)
            .send()
            .await
            .map_err(|e| UploadError::Transport(self.transport_message(&e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UploadError::Transport(self.transport_message(&e)))?;

        if !status.is_success() {
            return Err(UploadError::Rejected(error_message(status, &text)));
        }

        let url = parse_url(&text).map_err(UploadError::Transport)?;
        info!("Image hosted at {}", url);
        Ok(url)
    }
}

#[async_trait]
impl ArticlePublisher for HttpBlogClient {
    async fn create(&self, article: &Article) -> Result<String, PublishError> {
        let body = article_request(article, self.config.published);
        debug!(
            "POST /articles '{}' ({} bytes HTML, published={})",
            article.title,
            article.body_html.len(),
            self.config.published
        );

        let response = self
            .post("articles")
            .json(&body)
            .send()
            .await
            .map_err(|e| PublishError::Transport(self.transport_message(&e)))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response
            .text()
            .await
            .map_err(|e| PublishError::Transport(self.transport_message(&e)))?;

        if !status.is_success() {
            return Err(publish_error(status, retry_after.as_deref(), &text));
        }

        parse_url(&text).map_err(PublishError::Transport)
    }
}

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    filename: &'a str,
    alt: &'a str,
    content_type: &'static str,
    attachment: String,
}

#[derive(Debug, Serialize)]
struct ArticleRequest<'a> {
    article: ArticleBody<'a>,
}

#[derive(Debug, Serialize)]
struct ArticleBody<'a> {
    title: &'a str,
    body_html: &'a str,
    summary_html: &'a str,
    /// Comma-separated, the form most blog APIs accept.
    tags: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ImageRef<'a>>,
    published: bool,
}

#[derive(Debug, Serialize)]
struct ImageRef<'a> {
    src: &'a str,
    alt: &'a str,
}

#[derive(Debug, Deserialize)]
struct UrlResponse {
    url: String,
}

fn image_request<'a>(bytes: &[u8], filename: &'a str, alt: &'a str) -> ImageRequest<'a> {
    ImageRequest {
        filename,
        alt,
        content_type: sniff_format(bytes)
            .map(|k| k.mime_type())
            .unwrap_or("application/octet-stream"),
        attachment: base64::engine::general_purpose::STANDARD.encode(bytes),
    }
}

fn article_request(article: &Article, published: bool) -> ArticleRequest<'_> {
    ArticleRequest {
        article: ArticleBody {
            title: &article.title,
            body_html: &article.body_html,
            summary_html: &article.excerpt,
            tags: article.tags.join(", "),
            image: article.image_url.as_deref().map(|src| ImageRef {
                src,
                alt: &article.title,
            }),
            published,
        },
    }
}

fn parse_url(body: &str) -> Result<String, String> {
    serde_json::from_str::<UrlResponse>(body)
        .map(|r| r.url)
        .map_err(|e| format!("unexpected response from blog API: {e}"))
}

/// The platform's own message: JSON `error`/`message` field, else the raw
/// body, else the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(serde_json::Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

fn publish_error(status: StatusCode, retry_after: Option<&str>, body: &str) -> PublishError {
    let message = error_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PublishError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => PublishError::RateLimited {
            message,
            retry_after_secs: retry_after.and_then(|v| v.trim().parse().ok()),
        },
        _ => PublishError::Rejected(message),
    }
}
