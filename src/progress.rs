//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn PublishProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to be told when
//! each stage of a publish finishes. The CLI drives its spinner from these
//! events; a web host could forward them over a WebSocket instead.
//!
//! # Example
//!
//! ```rust
//! use doc2blog::{PipelineConfig, PublishProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     published: AtomicUsize,
//! }
//!
//! impl PublishProgressCallback for CountingCallback {
//!     fn on_published(&self, url: &str) {
//!         self.published.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("live at {url}");
//!     }
//! }
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { published: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the mediator as one publish moves through its stages.
///
/// Implementations must be `Send + Sync`: one callback may observe many
/// concurrent requests. All methods default to no-ops.
pub trait PublishProgressCallback: Send + Sync {
    /// The document parsed into `block_count` blocks.
    fn on_parsed(&self, block_count: usize, keyword_count: usize) {
        let _ = (block_count, keyword_count);
    }

    /// HTML was generated (`html_len` bytes, placeholders still unresolved).
    fn on_rendered(&self, html_len: usize) {
        let _ = html_len;
    }

    /// The image upload is about to be sent.
    fn on_upload_start(&self, filename: &str) {
        let _ = filename;
    }

    /// The image is hosted at `url`.
    fn on_image_uploaded(&self, url: &str) {
        let _ = url;
    }

    /// The article is about to be sent to the platform.
    fn on_publish_start(&self, title: &str) {
        let _ = title;
    }

    /// The article is live at `url`.
    fn on_published(&self, url: &str) {
        let _ = url;
    }

    /// A stage failed; the pipeline stops after this call.
    ///
    /// `stage` is one of `parse`, `render`, `upload`, `publish`.
    fn on_failed(&self, stage: &str, error: &str) {
        let _ = (stage, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PublishProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn PublishProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl PublishProgressCallback for RecordingCallback {
        fn on_parsed(&self, block_count: usize, _keyword_count: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("parsed:{block_count}"));
        }

        fn on_published(&self, url: &str) {
            self.events.lock().unwrap().push(format!("published:{url}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_parsed(3, 2);
        cb.on_rendered(120);
        cb.on_upload_start("cake-1.png");
        cb.on_image_uploaded("https://cdn.example/cake.png");
        cb.on_publish_start("Cake");
        cb.on_published("https://blog.example/cake");
        cb.on_failed("publish", "boom");
    }

    #[test]
    fn overridden_methods_receive_events_and_defaults_stay_silent() {
        let cb = RecordingCallback::default();
        cb.on_parsed(4, 1);
        cb.on_rendered(99);
        cb.on_published("https://blog.example/a");
        assert_eq!(
            *cb.events.lock().unwrap(),
            vec!["parsed:4", "published:https://blog.example/a"]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_parsed(1, 0);
        cb.on_published("u");
    }
}
