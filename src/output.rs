use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::{EntityRecord, SearchLimit};
use crate::utils;

/// Append-only writers for the two per-term outputs: the structured record
/// file (one JSON object per line) and the flat address list (one canonical
/// address per line). Every append is flushed and fsynced before the run
/// moves on, so files on disk always hold exactly the accepted set at the
/// moment of stopping.
pub struct OutputWriter {
    records_file: File,
    records_path: PathBuf,
    addresses_file: File,
    addresses_path: PathBuf,
}

impl OutputWriter {
    pub fn create(dir: &Path, term: &str, limit: SearchLimit) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

        let records_path = utils::records_path(dir, term);
        let addresses_path = utils::addresses_path(dir, term, limit);

        let records_file = open_append(&records_path)?;
        let addresses_file = open_append(&addresses_path)?;

        Ok(OutputWriter {
            records_file,
            records_path,
            addresses_file,
            addresses_path,
        })
    }

    /// Append one record to the structured output. No record-level dedup
    /// here; dedup is address-based and happens upstream.
    pub fn append_record(&mut self, record: &EntityRecord) -> Result<()> {
        let line = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(self.records_file, "{}", line).with_context(|| {
            format!("Failed to append record to {}", self.records_path.display())
        })?;
        self.records_file.flush()?;
        self.records_file.sync_all()?;
        Ok(())
    }

    pub fn append_address(&mut self, canonical: &str) -> Result<()> {
        writeln!(self.addresses_file, "{}", canonical).with_context(|| {
            format!("Failed to append address to {}", self.addresses_path.display())
        })?;
        self.addresses_file.flush()?;
        self.addresses_file.sync_all()?;
        Ok(())
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    pub fn addresses_path(&self) -> &Path {
        &self.addresses_path
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open output file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityStub;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn record(name: &str, addr: &str) -> EntityRecord {
        let stub = EntityStub {
            document_number: "P1".to_string(),
            name: name.to_string(),
            detail_locator: "/1".to_string(),
        };
        let mut details = BTreeMap::new();
        details.insert("Principal Address".to_string(), addr.to_string());
        EntityRecord::from_details(&stub, details)
    }

    #[test]
    fn records_round_trip_through_jsonl() {
        let dir = TempDir::new().unwrap();
        let mut writer = OutputWriter::create(dir.path(), "plumber", SearchLimit::Count(5)).unwrap();

        writer.append_record(&record("ACME", "1 Bay St")).unwrap();
        writer.append_record(&record("BULK", "2 Bay St")).unwrap();
        drop(writer);

        let contents = fs::read_to_string(utils::records_path(dir.path(), "plumber")).unwrap();
        let parsed: Vec<EntityRecord> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "ACME");
        assert_eq!(parsed[1].principal_address.as_deref(), Some("2 Bay St"));
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let dir = TempDir::new().unwrap();

        let mut writer = OutputWriter::create(dir.path(), "plumber", SearchLimit::All).unwrap();
        writer.append_address("1 Bay St").unwrap();
        drop(writer);

        let mut writer = OutputWriter::create(dir.path(), "plumber", SearchLimit::All).unwrap();
        writer.append_address("2 Bay St").unwrap();
        drop(writer);

        let contents =
            fs::read_to_string(utils::addresses_path(dir.path(), "plumber", SearchLimit::All))
                .unwrap();
        assert_eq!(contents, "1 Bay St\n2 Bay St\n");
    }

    #[test]
    fn limit_is_part_of_the_address_file_name() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::create(dir.path(), "Water Filter", SearchLimit::Count(50)).unwrap();
        assert!(writer
            .addresses_path()
            .ends_with("waterfilter_50.txt"));
    }
}
