//! Commercial affiliation heuristic.
//!
//! An affiliation is treated as commercial when it contains one of a fixed
//! set of keywords as a case-sensitive substring. The match is crude on
//! purpose: "Inc" also fires inside "Lincoln".

/// Keywords that mark an affiliation as commercial.
pub const COMMERCIAL_KEYWORDS: &[&str] = &["Pharma", "Biotech", "Inc", "Ltd", "Laboratories"];

/// Substring classifier over a closed keyword set.
#[derive(Debug, Clone, Copy)]
pub struct AffiliationClassifier {
    keywords: &'static [&'static str],
}

impl AffiliationClassifier {
    /// Create a classifier over `keywords`.
    pub fn new(keywords: &'static [&'static str]) -> Self {
        Self { keywords }
    }

    /// True if `affiliation` is present and contains any keyword.
    pub fn classify(&self, affiliation: Option<&str>) -> bool {
        self.matched_keyword(affiliation).is_some()
    }

    /// First keyword (in keyword-set order) contained in `affiliation`.
    pub fn matched_keyword(&self, affiliation: Option<&str>) -> Option<&'static str> {
        let affiliation = affiliation?;
        self.keywords
            .iter()
            .copied()
            .find(|kw| affiliation.contains(kw))
    }
}

impl Default for AffiliationClassifier {
    fn default() -> Self {
        Self::new(COMMERCIAL_KEYWORDS)
    }
}
