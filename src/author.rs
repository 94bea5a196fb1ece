//! Author resolution.
//!
//! Turns one [`RawAuthor`] into a [`ResolvedAuthor`]: a display name, the
//! affiliation used for classification, and any email found in it. Only the
//! first affiliation of an author is considered; later ones are ignored for
//! both the company text and the email scan.

use crate::classifier::AffiliationClassifier;
use crate::document::RawAuthor;
use crate::email::EmailExtractor;

/// Name used when either name part is missing.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Normalized view of one author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAuthor {
    /// `"{first} {last}"`, or [`UNKNOWN_AUTHOR`]
    pub full_name: String,
    /// First affiliation entry
    pub affiliation_text: Option<String>,
    /// Whether `affiliation_text` looks commercial
    pub is_commercial: bool,
    /// Keyword that made the affiliation commercial
    pub matched_keyword: Option<&'static str>,
    /// First email address in `affiliation_text`
    pub email: Option<String>,
}

/// Resolves raw authors with a classifier and an email extractor.
#[derive(Debug, Clone, Default)]
pub struct AuthorResolver {
    classifier: AffiliationClassifier,
    emails: EmailExtractor,
}

impl AuthorResolver {
    pub fn new(classifier: AffiliationClassifier, emails: EmailExtractor) -> Self {
        Self { classifier, emails }
    }

    /// Resolve one author. Never fails; missing parts fall back to defaults.
    pub fn resolve(&self, raw: &RawAuthor) -> ResolvedAuthor {
        let full_name = match (&raw.first_name, &raw.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            _ => UNKNOWN_AUTHOR.to_string(),
        };

        let affiliation_text = raw.affiliations.first().cloned();
        let matched_keyword = self.classifier.matched_keyword(affiliation_text.as_deref());
        let email = self.emails.extract(affiliation_text.as_deref());

        ResolvedAuthor {
            full_name,
            affiliation_text,
            is_commercial: matched_keyword.is_some(),
            matched_keyword,
            email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(first: Option<&str>, last: Option<&str>, affiliations: &[&str]) -> RawAuthor {
        RawAuthor {
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            affiliations: affiliations.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_resolve_commercial_author() {
        let resolver = AuthorResolver::default();
        let resolved = resolver.resolve(&author(
            Some("Jane"),
            Some("Doe"),
            &["Acme Pharma Inc, jane.doe@acme.com"],
        ));

        assert_eq!(resolved.full_name, "Jane Doe");
        assert_eq!(
            resolved.affiliation_text.as_deref(),
            Some("Acme Pharma Inc, jane.doe@acme.com")
        );
        assert!(resolved.is_commercial);
        assert_eq!(resolved.matched_keyword, Some("Pharma"));
        assert_eq!(resolved.email.as_deref(), Some("jane.doe@acme.com"));
    }

    #[test]
    fn test_unknown_name() {
        let resolver = AuthorResolver::default();
        assert_eq!(resolver.resolve(&author(None, None, &[])).full_name, UNKNOWN_AUTHOR);
        assert_eq!(resolver.resolve(&author(Some("Jane"), None, &[])).full_name, UNKNOWN_AUTHOR);
        assert_eq!(resolver.resolve(&author(None, Some("Doe"), &[])).full_name, UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_no_affiliation() {
        let resolver = AuthorResolver::default();
        let resolved = resolver.resolve(&author(Some("Jane"), Some("Doe"), &[]));
        assert_eq!(resolved.affiliation_text, None);
        assert!(!resolved.is_commercial);
        assert_eq!(resolved.email, None);
    }

    #[test]
    fn test_only_first_affiliation_counts() {
        let resolver = AuthorResolver::default();
        let resolved = resolver.resolve(&author(
            Some("Ana"),
            Some("Silva"),
            &["University of Porto", "Biotech Ltd, ana@biotech.example.com"],
        ));
        assert_eq!(resolved.affiliation_text.as_deref(), Some("University of Porto"));
        assert!(!resolved.is_commercial);
        assert_eq!(resolved.email, None);
    }
}
