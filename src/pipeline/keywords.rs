//! Keyword extraction from the title and headings.
//!
//! Headings are where authors put the words a post is *about*, so they make
//! better SEO tags than body text. The result is ordered (first-seen wins),
//! deduplicated and capped.

use crate::config::PipelineConfig;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

/// Collect keywords from `sources` (title first, then headings in order).
///
/// A word qualifies when it is at least `keyword_min_len` characters long,
/// is not purely numeric and is not a stop-word. Words are lower-cased.
pub fn extract_keywords<'a, I>(sources: I, config: &PipelineConfig) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut keywords: Vec<String> = Vec::new();
    if config.max_keywords == 0 {
        return keywords;
    }

    for source in sources {
        for m in RE_WORD.find_iter(source) {
            let word = m.as_str().to_lowercase();
            if word.chars().count() < config.keyword_min_len
                || word.chars().all(|c| c.is_numeric())
                || config.is_stop_word(&word)
                || keywords.contains(&word)
            {
                continue;
            }
            keywords.push(word);
            if keywords.len() == config.max_keywords {
                return keywords;
            }
        }
    }

    keywords
}
