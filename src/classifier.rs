//! Substring-based profile URL classification.
//!
//! This is not a URI parser: the rules below only look for known domains and
//! cut path segments out of the raw string.

use crate::model::{Platform, PlatformSelector};
use crate::InsightError;

/// Work out which platform a profile URL belongs to and what to pass its adapter
pub fn classify(url: &str) -> Result<PlatformSelector, InsightError> {
    let url = url.trim();

    let (platform, identifier) = if let Some(rest) = after(url, "instagram.com/") {
        (Platform::Instagram, first_segment(rest))
    } else if url.contains("instagram.com") {
        (Platform::Instagram, "")
    } else if url.contains("youtube.com") {
        (Platform::YouTube, url)
    } else if url.contains("twitter.com") || url.contains("x.com") {
        (Platform::Twitter, last_segment(url))
    } else if url.contains("tiktok.com") {
        let handle = after(url, "/@").map(first_segment).unwrap_or("");
        (Platform::TikTok, handle)
    } else {
        return Err(InsightError::InvalidInput(format!(
            "'{}' is not a supported profile URL",
            url
        )));
    };

    if identifier.is_empty() {
        return Err(InsightError::InvalidInput(format!(
            "no {} username found in '{}'",
            platform, url
        )));
    }

    Ok(PlatformSelector {
        platform,
        identifier: identifier.to_string(),
    })
}

fn after<'a>(haystack: &'a str, needle: &str) -> Option<&'a str> {
    haystack
        .find(needle)
        .map(|pos| &haystack[pos + needle.len()..])
}

fn strip_query(s: &str) -> &str {
    s.split(['?', '#']).next().unwrap_or("")
}

fn first_segment(path: &str) -> &str {
    strip_query(path).split('/').next().unwrap_or("")
}

fn last_segment(url: &str) -> &str {
    strip_query(url)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or("")
}
