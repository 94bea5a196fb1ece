//! Email address extraction from affiliation text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern for a contact address embedded in free text.
pub const EMAIL_PATTERN: &str = r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("valid regex"));

/// Finds the first email address in a piece of text.
#[derive(Debug, Clone, Copy)]
pub struct EmailExtractor {
    pattern: &'static Regex,
}

impl EmailExtractor {
    pub fn new() -> Self {
        Self { pattern: &EMAIL_RE }
    }

    /// First match in `text`, verbatim. Absent text is scanned as "".
    pub fn extract(&self, text: Option<&str>) -> Option<String> {
        self.pattern
            .find(text.unwrap_or(""))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_embedded_address() {
        let extractor = EmailExtractor::new();
        assert_eq!(
            extractor.extract(Some("Acme Pharma Inc, jane.doe@acme.com")),
            Some("jane.doe@acme.com".to_string())
        );
        assert_eq!(
            extractor.extract(Some("Dept. of Chemistry, Basel. Electronic address: first.last+tag@sub-domain.example.co.uk")),
            Some("first.last+tag@sub-domain.example.co.uk".to_string())
        );
    }

    #[test]
    fn test_first_match_wins() {
        let extractor = EmailExtractor::new();
        assert_eq!(
            extractor.extract(Some("a@x.org; b@y.org")),
            Some("a@x.org".to_string())
        );
    }

    #[test]
    fn test_no_address() {
        let extractor = EmailExtractor::new();
        assert_eq!(extractor.extract(Some("University of Example")), None);
        assert_eq!(extractor.extract(Some("user@localhost")), None);
        assert_eq!(extractor.extract(Some("")), None);
        assert_eq!(extractor.extract(None), None);
    }

    #[test]
    fn test_extractors_share_pattern() {
        let a = EmailExtractor::new();
        let b = EmailExtractor::default();
        assert_eq!(a.pattern.as_str(), EMAIL_PATTERN);
        assert!(std::ptr::eq(a.pattern, b.pattern));
    }

    #[test]
    fn test_trailing_period_is_kept() {
        // The domain class includes '.', so a sentence-ending period sticks.
        let extractor = EmailExtractor::new();
        assert_eq!(
            extractor.extract(Some("Contact: x@y.com.")),
            Some("x@y.com.".to_string())
        );
    }
}
