use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;

use crate::debug_eprintln;
use crate::dedup::{self, Verdict};
use crate::extractor;
use crate::ledger::SeenLedger;
use crate::models::{SearchLimit, SessionResult, StopReason};
use crate::output::OutputWriter;
use crate::source::{ListingSource, SourceError};
use crate::walker::PageWalker;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub term: String,
    pub limit: SearchLimit,
    pub data_dir: PathBuf,
    /// Checked between stub iterations; setting it makes the run stop with
    /// reason `Cancelled`. Everything already accepted stays on disk.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl SearchOptions {
    pub fn new(term: &str, limit: SearchLimit, data_dir: impl Into<PathBuf>) -> Self {
        SearchOptions {
            term: term.to_string(),
            limit,
            data_dir: data_dir.into(),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .is_some_and(|cancelled| cancelled)
    }
}

/// Drive one full run for a term: walk result pages, extract each stub,
/// judge its principal address against the filter and the per-term ledger,
/// and append accepted records and addresses to the outputs.
///
/// The requested limit counts ACCEPTED addresses, not raw stubs: asking for
/// 300 addresses yields up to 300 genuinely new valid ones, however many
/// rows the source had to serve for that. The termination predicate is
/// evaluated after every accepted item; the walker is simply not pulled
/// again once the limit is met, so no further pages are fetched.
///
/// Only local file I/O can make this return `Err`. Source failures end the
/// run with `StopReason::SourceError` and partial counts preserved.
pub fn run_search<S, F>(
    source: &S,
    options: &SearchOptions,
    mut on_progress: F,
) -> Result<SessionResult>
where
    S: ListingSource,
    F: FnMut(usize),
{
    let mut ledger = SeenLedger::load(&options.data_dir, &options.term)?;
    let mut writer = OutputWriter::create(&options.data_dir, &options.term, options.limit)?;
    let mut walker = PageWalker::new(source, &options.term);

    let mut accepted = 0usize;
    let mut skipped_details = 0usize;
    let mut invalid_addresses = 0usize;
    let mut duplicate_addresses = 0usize;

    let reason = loop {
        if options.cancelled() {
            break StopReason::Cancelled;
        }
        if options.limit.reached(accepted) {
            break StopReason::LimitReached;
        }

        let stub = match walker.next() {
            None => break StopReason::PagesExhausted,
            Some(Err(e)) => break StopReason::SourceError(e.to_string()),
            Some(Ok(stub)) => stub,
        };

        let record = match extractor::extract(source, &stub) {
            Ok(record) => record,
            Err(SourceError::DetailUnavailable { locator, message }) => {
                debug_eprintln!("Skipping {} ({}): {}", stub.name, locator, message);
                skipped_details += 1;
                continue;
            }
            Err(e) => {
                debug_eprintln!("Skipping {}: {}", stub.name, e);
                skipped_details += 1;
                continue;
            }
        };

        match dedup::judge(&record, &mut ledger)? {
            Verdict::Accepted(canonical) => {
                writer.append_record(&record)?;
                writer.append_address(&canonical)?;
                accepted += 1;
                on_progress(accepted);
            }
            Verdict::EmptyAddress | Verdict::PoBox => invalid_addresses += 1,
            Verdict::Duplicate => duplicate_addresses += 1,
        }
    };

    Ok(SessionResult {
        term: options.term.clone(),
        requested_limit: options.limit.to_string(),
        accepted,
        pages_visited: walker.pages_visited(),
        skipped_details,
        invalid_addresses,
        duplicate_addresses,
        reason,
        finished_at: Utc::now(),
    })
}
