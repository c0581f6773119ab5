//! HTML post-processing for fetched docs pages.
//!
//! Docs pages arrive with site-relative links and images; rendered inside
//! the app they need absolute URLs against the docs origin. In-page
//! anchors, already-absolute URLs, and non-navigational schemes pass
//! through untouched. Headings with ids additionally get a sanitized
//! `data-section-key` attribute so interactive sections can persist their
//! per-page state under a stable storage key.
//!
//! Pure string/regex transforms over pre-shaped HTML; no DOM parsing.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use url::Url;

use waymark_core::ContentKey;

static LINK_ATTR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(href|src)="([^"]*)""#).unwrap());

static HEADING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<h([1-6])([^>]*\bid="([^"]+)"[^>]*)>"#).unwrap());

/// Whether a URL should be left exactly as written.
fn keep_as_is(target: &str) -> bool {
    target.is_empty()
        || target.starts_with('#')
        || target.starts_with("//")
        || target.starts_with("mailto:")
        || target.starts_with("data:")
        || target.contains("://")
}

/// Rewrite relative `href`/`src` attribute values to absolute URLs
/// against `base`. Unjoinable values are kept as written.
pub fn rewrite_links(html: &str, base: &Url) -> String {
    LINK_ATTR_REGEX
        .replace_all(html, |caps: &Captures<'_>| {
            let attr = &caps[1];
            let target = &caps[2];
            if keep_as_is(target) {
                return caps[0].to_string();
            }
            match base.join(target) {
                Ok(absolute) => format!(r#"{attr}="{absolute}""#),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Tag every id-carrying heading with a `data-section-key` attribute
/// derived from the page key and the heading id.
pub fn inject_section_markers(html: &str, page_key: &ContentKey) -> String {
    HEADING_REGEX
        .replace_all(html, |caps: &Captures<'_>| {
            let level = &caps[1];
            let attrs = &caps[2];
            let id = &caps[3];
            let key = ContentKey::new(format!("{page_key}/{id}"));
            format!(r#"<h{level}{attrs} data-section-key="{key}">"#)
        })
        .into_owned()
}

/// Full post-processing for one fetched page.
pub fn process_page(html: &str, base: &Url, page_key: &ContentKey) -> String {
    inject_section_markers(&rewrite_links(html, base), page_key)
}
