//! Wildcard pattern compiler
//!
//! A pattern is matched against a whole URL string. `*` stands for any run of
//! characters (including none); everything else is literal. Compiling a
//! pattern yields an anchored regex source suitable for the host's
//! `regexFilter` and for the in-process matcher.

use regex::Regex;

use crate::hash::rule_id_for_pattern;

/// Characters that carry meaning in a regex and must be escaped when they
/// appear literally in a pattern. `*` is absent: it is the wildcard.
const REGEX_META: &[char] = &[
    '.', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

/// Error type for pattern compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Invalid regex for pattern '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },
}

/// A pattern together with everything derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    pub pattern: String,
    pub rule_id: i32,
    pub regex_source: String,
}

impl CompiledPattern {
    pub fn compile(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            rule_id: rule_id_for_pattern(pattern),
            regex_source: wildcard_to_regex(pattern),
        }
    }

    /// Build an executable regex from the compiled source.
    pub fn to_regex(&self) -> Result<Regex, CompileError> {
        Regex::new(&self.regex_source).map_err(|e| CompileError::InvalidRegex {
            pattern: self.pattern.clone(),
            message: e.to_string(),
        })
    }
}

/// Translate a wildcard pattern into an anchored regex source.
///
/// Each input character is classified exactly once: metacharacters are
/// escaped, `*` becomes `.*`. An escaped literal therefore can never turn
/// into a wildcard.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2 + 5);
    out.push('^');

    for ch in pattern.chars() {
        if ch == '*' {
            out.push_str(".*");
            continue;
        }
        if REGEX_META.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }

    if allows_optional_slash(pattern) {
        out.push_str("/?");
    }

    out.push('$');
    out
}

/// A pattern naming a bare host or path also matches the same URL with a
/// trailing slash (browsers normalize homepage URLs to end in `/`).
#[inline]
pub fn allows_optional_slash(pattern: &str) -> bool {
    !pattern.ends_with('*') && !pattern.ends_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, url: &str) -> bool {
        CompiledPattern::compile(pattern).to_regex().unwrap().is_match(url)
    }

    #[test]
    fn test_compile_idempotent() {
        let a = CompiledPattern::compile("*instagram.com/reels/*");
        let b = CompiledPattern::compile("*instagram.com/reels/*");
        assert_eq!(a, b);
    }

    #[test]
    fn test_regex_source_shape() {
        assert_eq!(wildcard_to_regex("*a.com/x*"), "^.*a\\.com/x.*$");
        assert_eq!(wildcard_to_regex("*site.com"), "^.*site\\.com/?$");
        assert_eq!(wildcard_to_regex("*site.com/"), "^.*site\\.com/$");
        assert_eq!(wildcard_to_regex(""), "^/?$");
    }

    #[test]
    fn test_escaping_precedes_wildcards() {
        assert!(matches("a.b*c", "a.bYYYc"));
        assert!(matches("a.b*c", "a.bc"));
        assert!(!matches("a.b*c", "aXbYYYc"));
        assert!(!matches("a.b*c", "axbYYYc"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let pattern = "https://x.com/a+b?(c)[d]{e}|f^g$h\\i";
        assert!(matches(pattern, pattern));
        assert!(!matches(pattern, "https://x.com/aab"));
    }

    #[test]
    fn test_anchored_both_ends() {
        let pattern = "*example.com/path*";
        assert!(matches(pattern, "https://example.com/path/x"));
        assert!(!matches("example.com/path*", "https://example.com/path/x"));
        assert!(!matches("https://example.com/path", "https://example.com/path/x"));
        assert!(!matches("https://example.com/path", "xhttps://example.com/path"));
    }

    #[test]
    fn test_trailing_slash_tolerance() {
        assert!(matches("*site.com", "https://site.com"));
        assert!(matches("*site.com", "https://site.com/"));
        assert!(!matches("*site.com", "https://site.com//"));

        assert!(matches("*site.com/", "https://site.com/"));
        assert!(!matches("*site.com/", "https://site.com"));
    }

    #[test]
    fn test_wildcard_matches_empty_run() {
        assert!(matches("*instagram.com/reels/*", "instagram.com/reels/"));
        assert!(matches(
            "*instagram.com/reels/*",
            "https://www.instagram.com/reels/C1a2b3/"
        ));
        assert!(!matches(
            "*instagram.com/reels/*",
            "https://www.instagram.com/explore/"
        ));
    }

    #[test]
    fn test_empty_pattern() {
        assert!(matches("", ""));
        assert!(matches("", "/"));
        assert!(!matches("", "https://a.com"));
    }

    #[test]
    fn test_optional_slash_rule() {
        assert!(allows_optional_slash("*site.com"));
        assert!(!allows_optional_slash("*site.com/"));
        assert!(!allows_optional_slash("*site.com*"));
        assert!(allows_optional_slash(""));
    }
}
