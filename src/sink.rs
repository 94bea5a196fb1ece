//! CSV output.
//!
//! Writes [`OutputRow`]s as a table with the columns in
//! [`OUTPUT_COLUMNS`](crate::extractor::OUTPUT_COLUMNS). An empty batch is
//! never written.

use crate::error::Result;
use crate::extractor::OutputRow;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// What a save call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Rows were written
    Saved(usize),
    /// No rows; nothing was written
    NothingToSave,
}

/// Write `rows` as CSV with a header to `writer`.
pub fn write_csv<W: Write>(writer: W, rows: &[OutputRow]) -> Result<SaveOutcome> {
    if rows.is_empty() {
        return Ok(SaveOutcome::NothingToSave);
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for row in rows {
        wtr.serialize(row.to_table_row())?;
    }

    wtr.flush()?;
    Ok(SaveOutcome::Saved(rows.len()))
}

/// Save `rows` to a CSV file at `path`. No file is created for an empty batch.
pub fn save_csv(path: &Path, rows: &[OutputRow]) -> Result<SaveOutcome> {
    if rows.is_empty() {
        info!(path = %path.display(), "No data to save");
        return Ok(SaveOutcome::NothingToSave);
    }

    let file = std::fs::File::create(path)?;
    let outcome = write_csv(file, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Saved CSV");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::OUTPUT_COLUMNS;
    use tempfile::tempdir;

    fn row(id: &str, authors: &[&str], affiliations: &[&str], email: Option<&str>) -> OutputRow {
        OutputRow {
            pubmed_id: id.to_string(),
            title: "A title, with a comma".to_string(),
            publication_year: "2024".to_string(),
            non_academic_authors: authors.iter().map(|s| s.to_string()).collect(),
            company_affiliations: affiliations.iter().map(|s| s.to_string()).collect(),
            corresponding_email: email.map(String::from),
        }
    }

    #[test]
    fn test_write_csv_header_and_placeholders() -> Result<()> {
        let rows = vec![
            row("1", &["Jane Doe"], &["Acme Pharma Inc"], Some("jane@acme.com")),
            row("2", &[], &[], None),
        ];
        let mut buf = Vec::new();
        assert_eq!(write_csv(&mut buf, &rows)?, SaveOutcome::Saved(2));

        let text = String::from_utf8_lossy(&buf).into_owned();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], OUTPUT_COLUMNS.join(","));
        assert_eq!(
            lines[1],
            "1,\"A title, with a comma\",2024,Jane Doe,Acme Pharma Inc,jane@acme.com"
        );
        assert_eq!(lines[2], "2,\"A title, with a comma\",2024,None,None,N/A");
        Ok(())
    }

    #[test]
    fn test_empty_batch_writes_nothing() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("papers.csv");
        assert_eq!(save_csv(&path, &[])?, SaveOutcome::NothingToSave);
        assert!(!path.exists());

        let mut buf = Vec::new();
        assert_eq!(write_csv(&mut buf, &[])?, SaveOutcome::NothingToSave);
        assert!(buf.is_empty());
        Ok(())
    }

    #[test]
    fn test_save_csv_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("papers.csv");
        let rows = vec![row("7", &["A B", "C D"], &["X Ltd", "Y Inc"], None)];
        assert_eq!(save_csv(&path, &rows)?, SaveOutcome::Saved(1));

        let content = std::fs::read_to_string(&path)?;
        assert!(content.contains("\"A B, C D\",\"X Ltd, Y Inc\",N/A"));
        Ok(())
    }
}
