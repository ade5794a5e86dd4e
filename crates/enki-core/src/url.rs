//! URL slicing helpers
//!
//! These functions avoid allocations and work directly on string slices.

/// URL cut at the first `?`.
#[inline]
pub fn strip_query(url: &str) -> &str {
    match url.find('?') {
        Some(pos) => &url[..pos],
        None => url,
    }
}

/// URL cut at the first `#`.
#[inline]
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(pos) => &url[..pos],
        None => url,
    }
}

/// The strings a URL is checked as: full, without query, without fragment.
#[inline]
pub fn match_candidates(url: &str) -> [&str; 3] {
    [url, strip_query(url), strip_fragment(url)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("https://a.com/x?y=1#z"), "https://a.com/x");
        assert_eq!(strip_query("https://a.com/x"), "https://a.com/x");
    }

    #[test]
    fn test_strip_fragment() {
        assert_eq!(strip_fragment("https://a.com/x?y=1#z"), "https://a.com/x?y=1");
        assert_eq!(strip_fragment("https://a.com/x#a?b"), "https://a.com/x");
    }

    #[test]
    fn test_match_candidates() {
        assert_eq!(
            match_candidates("https://a.com/?q#h"),
            ["https://a.com/?q#h", "https://a.com/", "https://a.com/?q"]
        );
    }
}
