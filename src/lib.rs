//! # rustpubmed
//!
//! PubMed paper fetcher that flags authors with commercial affiliations.
//!
//! ## Modules
//!
//! - [`document`] - Parsed XML records and path selectors
//! - [`classifier`] - Commercial affiliation keywords
//! - [`email`] - Email extraction from affiliation text
//! - [`author`] - Author name and affiliation resolution
//! - [`extractor`] - One record to one output row
//! - [`source`] - Record sources (trait + XML file source)
//! - [`pubmed`] - E-utilities client
//! - [`pipeline`] - Search, fetch and extract a batch
//! - [`sink`] - CSV output
//! - [`config`] - Client configuration
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustpubmed::{config::ClientConfig, extractor::RecordExtractor, pipeline, pubmed::PubMedClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PubMedClient::new(ClientConfig::default())?;
//!     let report = pipeline::run(&client, &RecordExtractor::default(), "biotechnology", 5).await?;
//!     println!("Extracted {} rows", report.rows.len());
//!     Ok(())
//! }
//! ```

pub mod author;
pub mod classifier;
pub mod config;
pub mod document;
pub mod email;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod pubmed;
pub mod sink;
pub mod source;

pub use error::{PubmedError, Result};
