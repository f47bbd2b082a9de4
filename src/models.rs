use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimal reference to one search-result row, prior to detail retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityStub {
    pub document_number: String,
    pub name: String,
    /// Locator of the detail page, as the source reported it.
    pub detail_locator: String,
}

/// Fully extracted record for one entity. Immutable after creation and
/// written once to the structured output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    pub document_number: String,
    pub status: String,
    pub detail_locator: String,
    /// All detail fields keyed by their on-page label.
    pub details: BTreeMap<String, String>,
    pub principal_address: Option<String>,
    pub mailing_address: Option<String>,
}

impl EntityRecord {
    pub fn from_details(stub: &EntityStub, details: BTreeMap<String, String>) -> Self {
        let principal_address = details.get("Principal Address").cloned();
        let mailing_address = details.get("Mailing Address").cloned();
        let status = details.get("Status").cloned().unwrap_or_default();
        EntityRecord {
            name: stub.name.clone(),
            document_number: stub.document_number.clone(),
            status,
            detail_locator: stub.detail_locator.clone(),
            details,
            principal_address,
            mailing_address,
        }
    }
}

/// How many accepted addresses a session should collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    /// Walk every page the source has.
    All,
    /// Stop once this many addresses have been accepted.
    Count(usize),
}

impl SearchLimit {
    pub fn reached(&self, accepted: usize) -> bool {
        match self {
            SearchLimit::All => false,
            SearchLimit::Count(n) => accepted >= *n,
        }
    }

    /// Parse user input: empty or "all" means unbounded.
    pub fn parse(input: &str) -> Option<SearchLimit> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Some(SearchLimit::All);
        }
        trimmed
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(SearchLimit::Count)
    }
}

impl fmt::Display for SearchLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchLimit::All => write!(f, "all"),
            SearchLimit::Count(n) => write!(f, "{}", n),
        }
    }
}

/// Why a session stopped pulling stubs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    LimitReached,
    PagesExhausted,
    SourceError(String),
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::LimitReached => write!(f, "limit reached"),
            StopReason::PagesExhausted => write!(f, "pages exhausted"),
            StopReason::SourceError(msg) => write!(f, "source error: {}", msg),
            StopReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Summary of one completed or aborted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub term: String,
    pub requested_limit: String,
    pub accepted: usize,
    pub pages_visited: usize,
    pub skipped_details: usize,
    pub invalid_addresses: usize,
    pub duplicate_addresses: usize,
    pub reason: StopReason,
    /// UTC timestamp of when the run stopped.
    pub finished_at: DateTime<Utc>,
}
