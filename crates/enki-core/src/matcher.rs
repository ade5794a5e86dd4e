//! In-process URL matcher
//!
//! Decides whether a page should be redirected without going through the
//! host's rule table. Used by the content side to catch single-page-app
//! navigations that never produce a main-frame request.

use log::{debug, warn};
use regex::Regex;

use crate::pattern::CompiledPattern;
use crate::settings::Settings;
use crate::url::match_candidates;

struct MatcherEntry {
    pattern: String,
    regex: Regex,
}

/// Compiled blocklist.
#[derive(Default)]
pub struct Matcher {
    entries: Vec<MatcherEntry>,
}

impl Matcher {
    /// Compile a pattern list. Patterns whose regex fails to build are
    /// skipped with a warning.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        for pattern in patterns {
            let compiled = CompiledPattern::compile(pattern.as_ref());
            match compiled.to_regex() {
                Ok(regex) => entries.push(MatcherEntry {
                    pattern: compiled.pattern,
                    regex,
                }),
                Err(e) => warn!("Skipping pattern: {}", e),
            }
        }
        Self { entries }
    }

    /// Matcher over `patterns` and `filters` together.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.blocklist_patterns())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First pattern matching the URL, its query-less form, or its
    /// fragment-less form.
    pub fn matching_pattern(&self, url: &str) -> Option<&str> {
        let candidates = match_candidates(url);
        let entry = self
            .entries
            .iter()
            .find(|entry| candidates.iter().any(|c| entry.regex.is_match(c)))?;
        debug!("'{}' matched pattern '{}'", url, entry.pattern);
        Some(entry.pattern.as_str())
    }

    pub fn should_redirect(&self, url: &str) -> bool {
        self.matching_pattern(url).is_some()
    }
}

/// True for the error the host raises while the extension is being torn
/// down or reloaded. Callers suppress these instead of logging them.
pub fn is_context_invalidated(message: &str) -> bool {
    message
        .to_ascii_lowercase()
        .contains("extension context invalidated")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matcher() {
        let matcher = Matcher::new(Vec::<String>::new());
        assert!(matcher.is_empty());
        assert!(!matcher.should_redirect("https://www.instagram.com/reels/abc/"));
    }

    #[test]
    fn test_full_url_match() {
        let matcher = Matcher::new(["*instagram.com/reels/*"]);
        assert_eq!(matcher.len(), 1);
        assert!(matcher.should_redirect("https://www.instagram.com/reels/abc/"));
        assert!(!matcher.should_redirect("https://www.instagram.com/"));
    }

    #[test]
    fn test_query_and_fragment_stripped_variants() {
        let matcher = Matcher::new(["https://www.youtube.com/feed/trending"]);
        assert!(matcher.should_redirect("https://www.youtube.com/feed/trending"));
        assert!(matcher.should_redirect("https://www.youtube.com/feed/trending/"));
        assert!(matcher.should_redirect("https://www.youtube.com/feed/trending?bp=x"));
        assert!(matcher.should_redirect("https://www.youtube.com/feed/trending#top"));
        assert!(!matcher.should_redirect("https://www.youtube.com/feed/trending/now"));
    }

    #[test]
    fn test_from_settings_unions_filters() {
        let settings = Settings {
            patterns: vec!["*instagram.com/reels/*".into()],
            filters: vec!["*youtube.com/shorts/*".into()],
            ..Settings::default()
        };
        let matcher = Matcher::from_settings(&settings);
        assert_eq!(matcher.len(), 2);
        assert_eq!(
            matcher.matching_pattern("https://www.youtube.com/shorts/xyz"),
            Some("*youtube.com/shorts/*")
        );
        assert_eq!(
            matcher.matching_pattern("https://instagram.com/reels/"),
            Some("*instagram.com/reels/*")
        );
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let matcher = Matcher::new(["*.com/*", "*a.com/*"]);
        assert_eq!(matcher.matching_pattern("https://a.com/x"), Some("*.com/*"));
    }

    #[test]
    fn test_context_invalidated_detection() {
        assert!(is_context_invalidated("Extension context invalidated."));
        assert!(is_context_invalidated("Error: EXTENSION CONTEXT INVALIDATED"));
        assert!(!is_context_invalidated("getDynamicRules: quota exceeded"));
    }
}
