//! Record extraction.
//!
//! Reduces one [`RawRecord`] to an [`OutputRow`]: title, year, the authors
//! whose first affiliation looks commercial (with those affiliations, in the
//! same order), and the first email found across authors.

use crate::author::{AuthorResolver, ResolvedAuthor};
use crate::document::RawRecord;
use serde::Serialize;
use tracing::{debug, warn};

/// Placeholder for a missing title, year or email
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for an empty author or affiliation list
pub const NONE_FOUND: &str = "None";

/// Separator used when joining author and affiliation lists
pub const LIST_SEPARATOR: &str = ", ";

/// CSV column order for the output table
pub const OUTPUT_COLUMNS: &[&str] = &[
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Authors",
    "Company Affiliations",
    "Corresponding Email",
];

/// Summary of one record.
///
/// `non_academic_authors[i]` is affiliated with `company_affiliations[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub pubmed_id: String,
    pub title: String,
    pub publication_year: String,
    pub non_academic_authors: Vec<String>,
    pub company_affiliations: Vec<String>,
    pub corresponding_email: Option<String>,
}

/// Flat table form of an [`OutputRow`], with placeholders filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Publication Date")]
    pub publication_date: String,
    #[serde(rename = "Non-academic Authors")]
    pub non_academic_authors: String,
    #[serde(rename = "Company Affiliations")]
    pub company_affiliations: String,
    #[serde(rename = "Corresponding Email")]
    pub corresponding_email: String,
}

impl OutputRow {
    /// Render with the fixed placeholders of the output table.
    pub fn to_table_row(&self) -> TableRow {
        TableRow {
            pubmed_id: self.pubmed_id.clone(),
            title: self.title.clone(),
            publication_date: self.publication_year.clone(),
            non_academic_authors: join_or_none(&self.non_academic_authors),
            company_affiliations: join_or_none(&self.company_affiliations),
            corresponding_email: self
                .corresponding_email
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        NONE_FOUND.to_string()
    } else {
        items.join(LIST_SEPARATOR)
    }
}

/// Stateless record extractor.
///
/// Holds no mutable state, so one instance can be shared across tasks and
/// records can be extracted in any order.
#[derive(Debug, Clone, Default)]
pub struct RecordExtractor {
    resolver: AuthorResolver,
}

impl RecordExtractor {
    pub fn new(resolver: AuthorResolver) -> Self {
        Self { resolver }
    }

    /// Extract one row. An absent record (failed fetch or parse) yields `None`.
    pub fn extract(&self, record_id: &str, record: Option<&RawRecord>) -> Option<OutputRow> {
        let record = record?;

        let title = record
            .select_text("//ArticleTitle")
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let publication_year = record
            .select_text("//PubDate/Year")
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let authors: Vec<ResolvedAuthor> = record
            .authors()
            .iter()
            .map(|raw| self.resolver.resolve(raw))
            .collect();

        let mut non_academic_authors = Vec::new();
        let mut company_affiliations = Vec::new();
        for author in authors.iter().filter(|a| a.is_commercial) {
            debug!(
                pmid = record_id,
                author = %author.full_name,
                keyword = author.matched_keyword.unwrap_or_default(),
                "Commercial affiliation"
            );
            non_academic_authors.push(author.full_name.clone());
            company_affiliations.push(
                author
                    .affiliation_text
                    .clone()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            );
        }

        let corresponding_email = authors.iter().find_map(|a| a.email.clone());

        Some(OutputRow {
            pubmed_id: record_id.to_string(),
            title,
            publication_year,
            non_academic_authors,
            company_affiliations,
            corresponding_email,
        })
    }

    /// Parse `xml` and extract it. Parse failures are logged and yield `None`.
    pub fn extract_xml(&self, record_id: &str, xml: &str) -> Option<OutputRow> {
        match RawRecord::parse(xml) {
            Ok(record) => self.extract(record_id, Some(&record)),
            Err(e) => {
                warn!(pmid = record_id, error = %e, "Could not parse record");
                None
            }
        }
    }

    /// Extract a batch, keeping input order and dropping absent records.
    pub fn extract_batch<'a, I>(&self, records: I) -> Vec<OutputRow>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a RawRecord>)>,
    {
        records
            .into_iter()
            .filter_map(|(id, record)| self.extract(id, record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(authors: &str) -> String {
        format!(
            r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
<PMID>123</PMID>
<Article>
  <Journal><JournalIssue><PubDate><Year>2024</Year></PubDate></JournalIssue></Journal>
  <ArticleTitle>A study of things</ArticleTitle>
  <AuthorList>{}</AuthorList>
</Article>
</MedlineCitation></PubmedArticle></PubmedArticleSet>"#,
            authors
        )
    }

    fn author(first: &str, last: &str, affiliation: &str) -> String {
        format!(
            "<Author><LastName>{}</LastName><ForeName>{}</ForeName>\
             <AffiliationInfo><Affiliation>{}</Affiliation></AffiliationInfo></Author>",
            last, first, affiliation
        )
    }

    fn extract(xml: &str) -> OutputRow {
        let record = RawRecord::parse(xml).expect("parse");
        RecordExtractor::default()
            .extract("123", Some(&record))
            .expect("row")
    }

    #[test]
    fn test_commercial_author_with_email() {
        let row = extract(&article(&author(
            "Jane",
            "Doe",
            "Acme Pharma Inc, jane.doe@acme.com",
        )));
        let table = row.to_table_row();

        assert_eq!(table.pubmed_id, "123");
        assert_eq!(table.title, "A study of things");
        assert_eq!(table.publication_date, "2024");
        assert_eq!(table.non_academic_authors, "Jane Doe");
        assert_eq!(table.company_affiliations, "Acme Pharma Inc, jane.doe@acme.com");
        assert_eq!(table.corresponding_email, "jane.doe@acme.com");
    }

    #[test]
    fn test_academic_author_without_email() {
        let row = extract(&article(&author("John", "Smith", "University of Example")));
        let table = row.to_table_row();

        assert_eq!(table.non_academic_authors, NONE_FOUND);
        assert_eq!(table.company_affiliations, NONE_FOUND);
        assert_eq!(table.corresponding_email, NOT_AVAILABLE);
    }

    #[test]
    fn test_author_without_names() {
        let row = extract(&article(
            "<Author><CollectiveName>Consortium</CollectiveName>\
             <AffiliationInfo><Affiliation>Genomics Ltd</Affiliation></AffiliationInfo></Author>",
        ));
        assert_eq!(row.non_academic_authors, vec!["Unknown".to_string()]);
        assert_eq!(row.company_affiliations, vec!["Genomics Ltd".to_string()]);
    }

    #[test]
    fn test_absent_record() {
        assert_eq!(RecordExtractor::default().extract("123", None), None);
    }

    #[test]
    fn test_zero_authors() {
        let row = extract(
            "<PubmedArticle><ArticleTitle>Lonely</ArticleTitle>\
             <PubDate><Year>1999</Year></PubDate></PubmedArticle>",
        );
        let table = row.to_table_row();
        assert_eq!(table.title, "Lonely");
        assert_eq!(table.publication_date, "1999");
        assert_eq!(table.non_academic_authors, NONE_FOUND);
        assert_eq!(table.company_affiliations, NONE_FOUND);
        assert_eq!(table.corresponding_email, NOT_AVAILABLE);
    }

    #[test]
    fn test_missing_title_and_year() {
        let row = extract("<PubmedArticle><AuthorList/></PubmedArticle>");
        assert_eq!(row.title, NOT_AVAILABLE);
        assert_eq!(row.publication_year, NOT_AVAILABLE);
    }

    #[test]
    fn test_parallel_lists_and_first_email() {
        let authors = [
            author("Ana", "Silva", "University of Porto, ana@up.pt"),
            author("Bo", "Chen", "Novel Biotech Ltd"),
            author("Cy", "Park", "Dept of Chemistry"),
            author("Di", "Ng", "Zeta Laboratories, di@zeta.com"),
        ]
        .concat();
        let row = extract(&article(&authors));

        assert_eq!(row.non_academic_authors, vec!["Bo Chen", "Di Ng"]);
        assert_eq!(
            row.company_affiliations,
            vec!["Novel Biotech Ltd", "Zeta Laboratories, di@zeta.com"]
        );
        assert_eq!(row.non_academic_authors.len(), row.company_affiliations.len());
        // Email comes from the first author that has one, commercial or not.
        assert_eq!(row.corresponding_email.as_deref(), Some("ana@up.pt"));
        assert_eq!(
            row.to_table_row().non_academic_authors,
            "Bo Chen, Di Ng"
        );
    }

    #[test]
    fn test_extract_is_idempotent() {
        let record = RawRecord::parse(&article(&author("Jane", "Doe", "Acme Inc"))).expect("parse");
        let extractor = RecordExtractor::default();
        assert_eq!(
            extractor.extract("123", Some(&record)),
            extractor.extract("123", Some(&record))
        );
    }

    #[test]
    fn test_extract_xml_parse_failure() {
        let extractor = RecordExtractor::default();
        assert_eq!(extractor.extract_xml("123", "<broken>"), None);
        assert!(extractor.extract_xml("123", &article("")).is_some());
    }

    #[test]
    fn test_extract_batch_skips_absent() {
        let record = RawRecord::parse(&article("")).expect("parse");
        let rows = RecordExtractor::default().extract_batch([
            ("1", Some(&record)),
            ("2", None),
            ("3", Some(&record)),
        ]);
        let ids: Vec<&str> = rows.iter().map(|r| r.pubmed_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
