use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::utils;

/// Per-term history of every address emitted by any prior run. Backed by a
/// plain one-address-per-line file that is only ever appended to.
///
/// Single-writer: two processes running the same term at once will race on
/// the file. Nothing enforces this; distinct terms get distinct files and
/// need no coordination.
pub struct SeenLedger {
    path: PathBuf,
    seen: HashSet<String>,
    file: Option<File>,
}

impl SeenLedger {
    /// Load the ledger for a term. A missing file is an empty history, not
    /// an error; the file is created on the first `record`.
    pub fn load(dir: &Path, term: &str) -> Result<Self> {
        let path = utils::ledger_path(dir, term);
        let mut seen = HashSet::new();

        if path.exists() {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open ledger file: {}", path.display()))?;
            for line in BufReader::new(file).lines() {
                let line = line.context("Failed to read ledger line")?;
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    seen.insert(trimmed.to_string());
                }
            }
        }

        Ok(SeenLedger {
            path,
            seen,
            file: None,
        })
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.seen.contains(canonical)
    }

    /// Mark an address as emitted: insert into the in-memory set and append
    /// the line durably (fsync before returning). Once this returns, a crash
    /// cannot cause the address to be emitted again.
    pub fn record(&mut self, canonical: &str) -> Result<()> {
        if !self.seen.insert(canonical.to_string()) {
            return Ok(());
        }

        if self.file.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .with_context(|| {
                    format!("Failed to open ledger for append: {}", self.path.display())
                })?;
            self.file = Some(file);
        }

        if let Some(file) = self.file.as_mut() {
            writeln!(file, "{}", canonical)
                .with_context(|| format!("Failed to append to ledger: {}", self.path.display()))?;
            file.flush()?;
            file.sync_all()
                .with_context(|| format!("Failed to sync ledger: {}", self.path.display()))?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
