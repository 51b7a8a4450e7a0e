//! Publishing mediator: parse → render → upload → publish.
//!
//! This is the only module that awaits anything. The two capabilities are
//! called strictly in order (the article must carry the final image URL) and
//! at most once each; nothing is retried.
//!
//! ## Failure policy
//!
//! Parse and render failures abort before any external call. An upload
//! failure aborts the whole publish rather than posting an article with a
//! missing image. A publish failure is returned with the platform's own
//! message untouched.

use crate::capability::{ArticlePublisher, ImageUploader};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::output::{Article, PreparedArticle, PublishOutput, PublishStats};
use crate::pipeline::{image, parse, render};
use std::io::ErrorKind;
use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Parse, render, upload the optional image, and create the article.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `raw`: Pasted document text
/// * `image`: Optional image bytes; `None` and an empty slice mean the same
/// * `default_title`: Used when the document has no title of its own
/// * `publisher` / `uploader`: Platform capabilities
/// * `config`: Pipeline configuration
///
/// # Errors
/// Any [`PipelineError`]. On error, no article was created.
pub async fn publish(
    raw: impl AsRef<str>,
    image: Option<&[u8]>,
    default_title: &str,
    publisher: &dyn ArticlePublisher,
    uploader: &dyn ImageUploader,
    config: &PipelineConfig,
) -> Result<PublishOutput, PipelineError> {
    let result = run_publish(raw.as_ref(), image, default_title, publisher, uploader, config).await;

    if let Err(ref e) = result {
        warn!("Publish failed at {} stage: {}", e.stage(), e);
        if let Some(ref cb) = config.progress_callback {
            cb.on_failed(e.stage(), &e.to_string());
        }
    }

    result
}

async fn run_publish(
    raw: &str,
    image_bytes: Option<&[u8]>,
    default_title: &str,
    publisher: &dyn ArticlePublisher,
    uploader: &dyn ImageUploader,
    config: &PipelineConfig,
) -> Result<PublishOutput, PipelineError> {
    info!("Starting publish: {} bytes of text", raw.len());

    // ── Step 1: Parse + render ───────────────────────────────────────────
    let prepare_start = Instant::now();
    let prepared = prepare(raw, default_title, config)?;
    let prepare_duration_ms = prepare_start.elapsed().as_millis() as u64;

    let PreparedArticle {
        title,
        document,
        rendered,
    } = prepared;

    // ── Step 2: Validate the image before touching the network ───────────
    let image_bytes = image_bytes.filter(|bytes| !bytes.is_empty());
    let kind = image_bytes
        .map(|bytes| image::validate_image(bytes, config))
        .transpose()?;

    // ── Step 3: Upload, or drop the placeholders ─────────────────────────
    let upload_start = Instant::now();
    let (body_html, image_url) = match (image_bytes, kind) {
        (Some(bytes), Some(kind)) => {
            let keyword = document.primary_keyword().unwrap_or("image");
            let filename = image::image_file_name(keyword, kind, unix_millis());
            debug!("Uploading {} ({} bytes)", filename, bytes.len());
            if let Some(ref cb) = config.progress_callback {
                cb.on_upload_start(&filename);
            }

            let url = uploader
                .upload(bytes, &filename, keyword)
                .await
                .map_err(PipelineError::Upload)?;

            if let Some(ref cb) = config.progress_callback {
                cb.on_image_uploaded(&url);
            }
            (
                resolve_images(&rendered.html, &config.image_token, &url),
                Some(url),
            )
        }
        _ => (
            strip_unresolved_images(&rendered.html, &config.image_token),
            None,
        ),
    };
    let upload_duration_ms = if image_bytes.is_some() {
        upload_start.elapsed().as_millis() as u64
    } else {
        0
    };

    // ── Step 4: Assemble and publish ─────────────────────────────────────
    let article = Article {
        title,
        body_html,
        excerpt: rendered.excerpt,
        tags: document.keywords().to_vec(),
        image_url,
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_publish_start(&article.title);
    }
    let publish_start = Instant::now();
    let url = publisher
        .create(&article)
        .await
        .map_err(PipelineError::Publish)?;
    let publish_duration_ms = publish_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_published(&url);
    }

    let stats = PublishStats {
        block_count: document.blocks().len(),
        keyword_count: document.keywords().len(),
        html_bytes: article.body_html.len(),
        prepare_duration_ms,
        upload_duration_ms,
        publish_duration_ms,
    };

    info!(
        "Published '{}' → {} ({}ms upload, {}ms publish)",
        article.title, url, stats.upload_duration_ms, stats.publish_duration_ms
    );

    Ok(PublishOutput {
        url,
        image_url: article.image_url,
        title: article.title,
        tags: article.tags,
        stats,
    })
}

/// Parse and render without any side effects.
///
/// Used for previews and `--dry-run`. The returned HTML still contains
/// unresolved image tokens.
pub fn prepare(
    raw: &str,
    default_title: &str,
    config: &PipelineConfig,
) -> Result<PreparedArticle, PipelineError> {
    let document = parse::parse(raw, config)?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_parsed(document.blocks().len(), document.keywords().len());
    }

    let rendered = render::render(&document, config)?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_rendered(rendered.html.len());
    }

    let title = document.title().unwrap_or(default_title).to_string();
    debug!(
        "Prepared '{}': {} blocks, {} image placeholders, {} bytes HTML",
        title,
        document.blocks().len(),
        document.image_placeholder_count(),
        rendered.html.len()
    );

    Ok(PreparedArticle {
        title,
        document,
        rendered,
    })
}

/// Synchronous wrapper around [`publish`].
///
/// Creates a temporary tokio runtime internally, so it must not be called
/// from inside an async context.
pub fn publish_sync(
    raw: impl AsRef<str>,
    image: Option<&[u8]>,
    default_title: &str,
    publisher: &dyn ArticlePublisher,
    uploader: &dyn ImageUploader,
    config: &PipelineConfig,
) -> Result<PublishOutput, PipelineError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PipelineError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(publish(raw, image, default_title, publisher, uploader, config))
}

/// Read a UTF-8 document from disk.
pub fn read_document(path: impl AsRef<Path>) -> Result<String, PipelineError> {
    let path = path.as_ref().to_path_buf();

    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(PipelineError::DocumentNotFound { path });
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(PipelineError::PermissionDenied { path });
        }
        Err(source) => return Err(PipelineError::ReadFailed { path, source }),
    };

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    String::from_utf8(bytes).map_err(|_| PipelineError::InvalidEncoding { path })
}

/// Point every `<img>` whose `src` is still `token` at `url`.
pub fn resolve_images(html: &str, token: &str, url: &str) -> String {
    let needle = format!("<img src=\"{token}\"");
    let replacement = format!(
        "<img src=\"{}\"",
        html_escape::encode_double_quoted_attribute(url)
    );
    html.replace(&needle, &replacement)
}

/// Remove every `<img>` element whose `src` is still `token`.
pub fn strip_unresolved_images(html: &str, token: &str) -> String {
    let needle = format!("<img src=\"{token}\"");
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find(&needle) {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        match after.find('>') {
            Some(end) => rest = &after[end + 1..],
            None => {
                rest = "";
                break;
            }
        }
    }

    out.push_str(rest);
    out
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOKEN: &str = "{{image}}";

    #[test]
    fn strip_removes_only_unresolved_images() {
        let html = "<p>a</p><img src=\"{{image}}\" alt=\"x\"><img src=\"https://cdn/b.png\" alt=\"b\"><p>c</p>";
        assert_eq!(
            strip_unresolved_images(html, TOKEN),
            "<p>a</p><img src=\"https://cdn/b.png\" alt=\"b\"><p>c</p>"
        );
    }

    #[test]
    fn strip_handles_multiple_and_none() {
        let html = "<img src=\"{{image}}\" alt=\"\"><p>x</p><img src=\"{{image}}\" alt=\"y\">";
        assert_eq!(strip_unresolved_images(html, TOKEN), "<p>x</p>");
        assert_eq!(strip_unresolved_images("<p>x</p>", TOKEN), "<p>x</p>");
    }

    #[test]
    fn token_inside_text_is_not_touched() {
        // Escaped text can contain the token but never a raw `<img src=`.
        let html = "<p>write {{image}} here</p>";
        assert_eq!(strip_unresolved_images(html, TOKEN), html);
        assert_eq!(resolve_images(html, TOKEN, "https://x"), html);
    }

    #[test]
    fn resolve_substitutes_every_token_and_escapes_url() {
        let html = "<img src=\"{{image}}\" alt=\"a\"><img src=\"{{image}}\" alt=\"b\">";
        assert_eq!(
            resolve_images(html, TOKEN, "https://cdn/x.png?a=1&b=\"2\""),
            "<img src=\"https://cdn/x.png?a=1&amp;b=&quot;2&quot;\" alt=\"a\">\
             <img src=\"https://cdn/x.png?a=1&amp;b=&quot;2&quot;\" alt=\"b\">"
        );
    }

    #[test]
    fn prepare_uses_default_title_when_missing() {
        let config = PipelineConfig::default();
        let prepared = prepare("- one\n- two", "Untitled", &config).unwrap();
        assert_eq!(prepared.title, "Untitled");
        assert!(prepared.document.title().is_none());

        let prepared = prepare("Real Title\n\nBody", "Untitled", &config).unwrap();
        assert_eq!(prepared.title, "Real Title");
    }

    #[test]
    fn prepare_propagates_parse_errors() {
        let err = prepare("  \n ", "Untitled", &PipelineConfig::default()).unwrap_err();
        assert_eq!(err.stage(), "parse");
    }

    #[test]
    fn read_document_ok_and_errors() {
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("post.txt");
        std::fs::write(&good, "Title\n\nBody").unwrap();
        assert_eq!(read_document(&good).unwrap(), "Title\n\nBody");

        let missing = dir.path().join("nope.txt");
        assert!(matches!(
            read_document(&missing),
            Err(PipelineError::DocumentNotFound { .. })
        ));

        let binary = dir.path().join("bin.dat");
        let mut f = std::fs::File::create(&binary).unwrap();
        f.write_all(&[0xff, 0xfe, 0x00, 0xc3]).unwrap();
        assert!(matches!(
            read_document(&binary),
            Err(PipelineError::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn read_document_on_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(dir.path()).unwrap_err();
        assert_eq!(err.stage(), "input");
    }

    #[test]
    fn unix_millis_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(unix_millis() > 1_577_836_800_000);
    }
}
