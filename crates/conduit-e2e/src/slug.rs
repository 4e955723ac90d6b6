//! URL slug derivation for article titles.
//!
//! Conduit routes a published article to `/#/article/<slug>`. The slug is
//! predicted client-side so the editor can wait for the right URL.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("non-word regex is valid"));

static HYPHEN_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-{2,}").expect("hyphen-run regex is valid"));

/// Slug for `title`: lowercase, whitespace runs to `-`, non-word characters
/// dropped, repeated `-` collapsed, outer `-` trimmed.
#[must_use]
pub fn article_slug(title: &str) -> String {
    let lower = title.to_lowercase();
    let hyphenated = WHITESPACE.replace_all(&lower, "-");
    let stripped = NON_WORD.replace_all(&hyphenated, "");
    let collapsed = HYPHEN_RUNS.replace_all(&stripped, "-");
    let slug = collapsed.strip_prefix('-').unwrap_or(&collapsed);
    slug.strip_suffix('-').unwrap_or(slug).to_string()
}

/// `text` trimmed with every whitespace run reduced to one space
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Route for the article page of `title`
#[must_use]
pub fn article_route(title: &str) -> String {
    format!("/#/article/{}", article_slug(title))
}

/// URL regex that matches the article page of `slug` anywhere in the URL
#[must_use]
pub fn article_url_pattern(slug: &str) -> String {
    format!(".*article.*{}.*", regex::escape(slug))
}
