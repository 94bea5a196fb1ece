//! Record sources.
//!
//! A [`RecordSource`] turns a query into PubMed IDs and an ID into a parsed
//! record. [`crate::pubmed::PubMedClient`] talks to E-utilities;
//! [`XmlFileSource`] serves records from a saved efetch document.

use crate::document::RawRecord;
use crate::error::{PubmedError, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Supplies record IDs for a query and records for IDs.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Up to `max_results` record IDs matching `query`, in source order.
    async fn search_ids(&self, query: &str, max_results: usize) -> Result<Vec<String>>;

    /// Fetch and parse one record.
    async fn fetch_record(&self, id: &str) -> Result<RawRecord>;
}

/// Records loaded from a `PubmedArticleSet` XML document.
#[derive(Debug, Clone)]
pub struct XmlFileSource {
    records: Vec<(String, RawRecord)>,
}

impl XmlFileSource {
    /// Load every `PubmedArticle` in the file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path)?;
        let source = Self::from_xml(&xml)?;
        info!(path = %path.display(), records = source.len(), "Loaded XML records");
        Ok(source)
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        Ok(Self {
            records: RawRecord::parse_article_set(xml)?,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordSource for XmlFileSource {
    /// The query is ignored; IDs come back in file order.
    async fn search_ids(&self, _query: &str, max_results: usize) -> Result<Vec<String>> {
        Ok(self
            .records
            .iter()
            .take(max_results)
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn fetch_record(&self, id: &str) -> Result<RawRecord> {
        self.records
            .iter()
            .find(|(pmid, _)| pmid == id)
            .map(|(_, record)| record.clone())
            .ok_or_else(|| PubmedError::NotFound(id.to_string()))
    }
}
