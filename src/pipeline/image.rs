//! Image checks and upload filenames.
//!
//! Only the leading magic bytes are inspected; the image is never decoded.
//! Anything that does not sniff as one of the four web raster formats is
//! rejected before the uploader sees it.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use ::image::ImageFormat;
use once_cell::sync::Lazy;
use regex::Regex;

/// Raster formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
    WebP,
    Gif,
}

impl ImageKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::WebP => "image/webp",
            ImageKind::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::WebP => "webp",
            ImageKind::Gif => "gif",
        }
    }
}

/// Identify `bytes` by magic number. `None` for anything outside the allow-list.
pub fn sniff_format(bytes: &[u8]) -> Option<ImageKind> {
    match ::image::guess_format(bytes).ok()? {
        ImageFormat::Jpeg => Some(ImageKind::Jpeg),
        ImageFormat::Png => Some(ImageKind::Png),
        ImageFormat::WebP => Some(ImageKind::WebP),
        ImageFormat::Gif => Some(ImageKind::Gif),
        _ => None,
    }
}

/// Check format and size of a non-empty image payload.
///
/// # Errors
/// - [`PipelineError::ImageTooLarge`] above `config.max_image_bytes`
/// - [`PipelineError::InvalidImage`] for unrecognised or disallowed formats
pub fn validate_image(bytes: &[u8], config: &PipelineConfig) -> Result<ImageKind, PipelineError> {
    if bytes.len() > config.max_image_bytes {
        return Err(PipelineError::ImageTooLarge {
            size: bytes.len(),
            max: config.max_image_bytes,
        });
    }

    match ::image::guess_format(bytes) {
        Ok(format) => sniff_format(bytes).ok_or_else(|| PipelineError::InvalidImage {
            reason: format!("{format:?} is not an accepted format"),
        }),
        Err(_) => Err(PipelineError::InvalidImage {
            reason: "unrecognised file signature".to_string(),
        }),
    }
}

static RE_NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

/// Lower-case `text` and replace every run of non-alphanumerics with `-`.
pub fn slugify(text: &str) -> String {
    RE_NON_ALNUM
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Upload filename: `"{slug}-{unix_millis}.{ext}"`, slug defaulting to `image`.
pub fn image_file_name(keyword: &str, kind: ImageKind, unix_millis: u128) -> String {
    let slug = slugify(keyword);
    let slug = if slug.is_empty() { "image" } else { slug.as_str() };
    format!("{slug}-{unix_millis}.{}", kind.extension())
}
