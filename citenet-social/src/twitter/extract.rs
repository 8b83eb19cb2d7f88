//! Author extraction from embedded-tweet URLs.
//!
//! Article bodies embed tweets by URL, and those URLs arrive with tracking
//! parameters attached (`?ref_src=...`). The query string is stripped before
//! matching so the handle never absorbs tracking junk. An unresolvable
//! author is `None` — no placeholder string ever enters the citation index.

use std::sync::OnceLock;

use regex::Regex;

fn author_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"twitter\.com/(\w+)").expect("author regex"))
}

/// Drop everything from the first `?` on, normalising embedded-tweet URLs
/// that differ only in tracking parameters.
pub fn strip_query(url: &str) -> &str {
    match url.split_once('?') {
        Some((head, _)) => head,
        None => url,
    }
}

/// Extract the tweet author's handle from an embedded-tweet URL.
///
/// The handle is the first path segment after `twitter.com/`.
///
/// ```rust
/// use citenet_social::twitter::extract::author_from_url;
///
/// let url = "https://twitter.com/WHO/status/123?ref_src=abc";
/// assert_eq!(author_from_url(Some(url)).as_deref(), Some("WHO"));
/// assert_eq!(author_from_url(None), None);
/// ```
pub fn author_from_url(url: Option<&str>) -> Option<String> {
    let url = strip_query(url?);
    author_regex()
        .captures(url)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_handle_from_status_url() {
        let url = "https://twitter.com/WHO/status/1217043229427761152?ref_src=twsrc%5Etfw";
        assert_eq!(author_from_url(Some(url)).as_deref(), Some("WHO"));
    }

    #[test]
    fn query_string_never_corrupts_handle() {
        // Without stripping, the regex could latch onto a twitter.com
        // appearing inside a tracking parameter.
        let url = "https://example.com/page?embed=twitter.com/notreal";
        assert_eq!(author_from_url(Some(url)), None);
    }

    #[test]
    fn missing_and_foreign_urls_are_unknown() {
        assert_eq!(author_from_url(None), None);
        assert_eq!(author_from_url(Some("https://example.com/no-match")), None);
    }

    #[test]
    fn bare_profile_url_still_matches() {
        assert_eq!(
            author_from_url(Some("twitter.com/nytimes")).as_deref(),
            Some("nytimes")
        );
    }

    #[test]
    fn strip_query_is_idempotent_on_clean_urls() {
        assert_eq!(strip_query("twitter.com/a/status/1"), "twitter.com/a/status/1");
        assert_eq!(strip_query("twitter.com/a/status/1?x=1&y=2"), "twitter.com/a/status/1");
    }
}
