//! Pipeline stages for document-to-HTML publishing.
//!
//! Each submodule implements exactly one transformation step and is pure:
//! no I/O, no shared state. The only suspending work (upload, publish) lives
//! in [`crate::publish`].
//!
//! ## Data Flow
//!
//! ```text
//! raw text ──▶ normalize ──▶ parse ──▶ render ──▶ (mediator)
//!              (cleanup)    │  ▲       (HTML +
//!                           │  │        excerpt)
//!                           ▼  │
//!                   inline + keywords
//! ```
//!
//! 1. [`normalize`]: line endings, invisible characters, blank-line runs
//! 2. [`parse`]: classify lines and group them into blocks
//! 3. [`inline`]: `*`/`_` emphasis runs inside paragraphs and list items
//! 4. [`keywords`]: SEO tags from the title and headings
//! 5. [`render`]: escaped HTML with unresolved image tokens
//! 6. [`image`]: format sniffing, size checks and upload filenames

pub mod image;
pub mod inline;
pub mod keywords;
pub mod normalize;
pub mod parse;
pub mod render;
