//! Wildcard URL gating
//!
//! Patterns use `*` for "any substring" and are matched unanchored against
//! the full page URL. Any URL containing the literal text between the
//! wildcards matches, so `*://example.com/*` also matches
//! `https://evil.test/?next=https://example.com/`. A longer host such as
//! `notexample.com` does not match, since `://` must directly precede the
//! host text. Block patterns always win over allow patterns.

use regex::Regex;

use crate::types::PageDecision;

// =============================================================================
// Pattern
// =============================================================================

/// A compiled wildcard URL pattern.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    source: String,
    regex: Option<Regex>,
}

impl UrlPattern {
    /// Compile a wildcard pattern.
    ///
    /// Never fails: a pattern that cannot be compiled matches nothing.
    pub fn compile(pattern: &str) -> Self {
        let expr = regex::escape(pattern).replace(r"\*", ".*");
        let regex = match Regex::new(&expr) {
            Ok(regex) => Some(regex),
            Err(e) => {
                log::debug!("URL pattern {pattern:?} disabled: {e}");
                None
            }
        };

        Self {
            source: pattern.to_string(),
            regex,
        }
    }

    /// Unanchored match against `url`.
    #[inline]
    pub fn matches(&self, url: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(url))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Allow/block lists compiled once at startup.
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    allow: Vec<UrlPattern>,
    block: Vec<UrlPattern>,
}

impl UrlFilter {
    pub fn new<A, B>(allow: A, block: B) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        Self {
            allow: allow.into_iter().map(|p| UrlPattern::compile(p.as_ref())).collect(),
            block: block.into_iter().map(|p| UrlPattern::compile(p.as_ref())).collect(),
        }
    }

    /// First block pattern matching `url`, if any.
    pub fn blocked_by(&self, url: &str) -> Option<&UrlPattern> {
        self.block.iter().find(|p| p.matches(url))
    }

    /// First allow pattern matching `url`, if any.
    pub fn allowed_by(&self, url: &str) -> Option<&UrlPattern> {
        self.allow.iter().find(|p| p.matches(url))
    }

    pub fn classify(&self, url: &str) -> PageDecision {
        if self.blocked_by(url).is_some() {
            PageDecision::Blocked
        } else if self.allowed_by(url).is_some() {
            PageDecision::Allowed
        } else {
            PageDecision::NotListed
        }
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        self.classify(url).is_allowed()
    }
}

/// One-shot check without keeping the compiled filter around.
pub fn is_allowed<A, B>(url: &str, allow_list: A, block_list: B) -> bool
where
    A: IntoIterator,
    A::Item: AsRef<str>,
    B: IntoIterator,
    B::Item: AsRef<str>,
{
    UrlFilter::new(allow_list, block_list).is_allowed(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn test_wildcard_matches_full_url() {
        let p = UrlPattern::compile("*://example.com/*");
        assert!(p.matches("https://example.com/path?x=1"));
        assert!(p.matches("http://example.com/"));
        assert!(!p.matches("https://example.org/path"));
    }

    #[test]
    fn test_wildcard_is_unanchored() {
        // Substring semantics: the literal text may appear anywhere in the URL.
        let p = UrlPattern::compile("*://example.com/*");
        assert!(p.matches("https://evil.test/?next=https://example.com/"));
        assert!(p.matches("https://a.test/x://example.com/"));
        // `://` has to sit right before the host text.
        assert!(!p.matches("https://notexample.com/"));

        let bare = UrlPattern::compile("example.com");
        assert!(bare.matches("https://www.example.com/a"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let p = UrlPattern::compile("*://site.com/a+b?(x)*");
        assert!(p.matches("https://site.com/a+b?(x)=1"));
        assert!(!p.matches("https://site.com/aab"));

        let dot = UrlPattern::compile("*://site.com/*");
        assert!(!dot.matches("https://siteXcom/"));
    }

    #[test]
    fn test_block_takes_precedence() {
        let filter = UrlFilter::new(["*://site.com/*"], ["*://site.com/login*"]);
        assert_eq!(filter.classify("https://site.com/login"), PageDecision::Blocked);
        assert_eq!(filter.classify("https://site.com/login?next=/"), PageDecision::Blocked);
        assert_eq!(filter.classify("https://site.com/signup"), PageDecision::Allowed);
        assert!(!filter.is_allowed("https://site.com/login"));
    }

    #[test]
    fn test_block_without_allow_match() {
        let filter = UrlFilter::new(["*://other.com/*"], ["*://site.com/*"]);
        assert_eq!(filter.classify("https://site.com/"), PageDecision::Blocked);
    }

    #[test]
    fn test_unlisted_url_is_not_allowed() {
        let filter = UrlFilter::new(["*://site.com/*"], NONE);
        assert_eq!(filter.classify("https://elsewhere.com/"), PageDecision::NotListed);

        let empty = UrlFilter::default();
        assert!(!empty.is_allowed("https://site.com/"));
    }

    #[test]
    fn test_matched_patterns_are_reported() {
        let filter = UrlFilter::new(
            ["*://a.com/*", "*://site.com/*"],
            ["*://site.com/connect-cards*"],
        );
        let url = "https://site.com/connect-cards/1";
        assert_eq!(filter.blocked_by(url).map(UrlPattern::as_str), Some("*://site.com/connect-cards*"));
        assert_eq!(filter.allowed_by(url).map(UrlPattern::as_str), Some("*://site.com/*"));
    }

    #[test]
    fn test_is_allowed_helper() {
        assert!(is_allowed("https://site.com/x", ["*://site.com/*"], NONE));
        assert!(!is_allowed("https://site.com/x", ["*://site.com/*"], ["*site.com*"]));
        assert!(!is_allowed("https://site.com/x", NONE, NONE));
    }
}
