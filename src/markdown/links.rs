//! Link safety checks for rendered markdown
//!
//! A link or image destination survives rendering only when it is relative
//! or uses one of [`SAFE_SCHEMES`]. Browsers ignore embedded whitespace and
//! control characters in a scheme, so those are stripped before the check.

use once_cell::sync::Lazy;
use regex::Regex;

/// URL schemes allowed in rendered links and images
pub const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Matches an absolute URL's scheme, e.g. `https:` or `javascript:`
static SCHEME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):").expect("Invalid URL scheme regex pattern")
});

/// Returns the scheme of `url`, lowercased, or None for a relative URL.
pub fn url_scheme(url: &str) -> Option<String> {
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    SCHEME_REGEX
        .captures(&cleaned)
        .map(|caps| caps[1].to_ascii_lowercase())
}

/// Whether a link destination may be kept in rendered output.
pub fn is_safe_url(url: &str) -> bool {
    match url_scheme(url) {
        Some(scheme) => SAFE_SCHEMES.contains(&scheme.as_str()),
        None => true,
    }
}
