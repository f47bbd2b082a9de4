use std::collections::VecDeque;
use std::time::Duration;

use rand::Rng;

use crate::debug_eprintln;
use crate::models::EntityStub;
use crate::source::{ListingSource, SourceError};

/// Attempts per page before the walk gives up on the source.
pub const PAGE_FETCH_RETRIES: usize = 3;

/// Lazy page-by-page traversal of the search results for one term. Yields
/// stubs in the exact order the source returns them (page order, then
/// intra-page order); that order is what makes first-occurrence dedup
/// deterministic downstream.
///
/// Finite and not restartable; a fresh walker re-issues requests from page
/// one. A page that fails `PAGE_FETCH_RETRIES` times yields one terminal
/// `Err` and the iterator is exhausted afterwards.
pub struct PageWalker<'a, S: ListingSource> {
    source: &'a S,
    term: String,
    next_token: Option<String>,
    fetched_first_page: bool,
    buffered: VecDeque<EntityStub>,
    yielded: usize,
    stub_limit: Option<usize>,
    pages_visited: usize,
    retry_delay: Duration,
    done: bool,
}

impl<'a, S: ListingSource> PageWalker<'a, S> {
    pub fn new(source: &'a S, term: &str) -> Self {
        PageWalker {
            source,
            term: term.to_string(),
            next_token: None,
            fetched_first_page: false,
            buffered: VecDeque::new(),
            yielded: 0,
            stub_limit: None,
            pages_visited: 0,
            retry_delay: Duration::from_millis(500),
            done: false,
        }
    }

    /// Stop after yielding this many stubs; no further pages are fetched
    /// once the bound is met.
    pub fn with_stub_limit(mut self, limit: usize) -> Self {
        self.stub_limit = Some(limit);
        self
    }

    /// Base delay between retries of a failed page fetch. Tests shrink this.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    fn fetch_next_page(&mut self) -> Result<(), SourceError> {
        let token = self.next_token.clone();
        let mut last_error = None;

        for attempt in 1..=PAGE_FETCH_RETRIES {
            match self.source.fetch_page(&self.term, token.as_deref()) {
                Ok(page) => {
                    self.pages_visited += 1;
                    self.fetched_first_page = true;
                    self.buffered.extend(page.stubs);
                    self.next_token = page.next_page_token;
                    return Ok(());
                }
                Err(e) => {
                    debug_eprintln!(
                        "Page fetch attempt {}/{} failed for '{}': {}",
                        attempt,
                        PAGE_FETCH_RETRIES,
                        self.term,
                        e
                    );
                    last_error = Some(e);
                    if attempt < PAGE_FETCH_RETRIES {
                        let jitter = rand::thread_rng().gen_range(0..=self.retry_delay.as_millis() as u64);
                        std::thread::sleep(self.retry_delay + Duration::from_millis(jitter));
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SourceError::SourceUnavailable("page fetch failed with no error detail".to_string())
        }))
    }
}

impl<'a, S: ListingSource> Iterator for PageWalker<'a, S> {
    type Item = Result<EntityStub, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(limit) = self.stub_limit {
            if self.yielded >= limit {
                self.done = true;
                return None;
            }
        }

        loop {
            if let Some(stub) = self.buffered.pop_front() {
                self.yielded += 1;
                return Some(Ok(stub));
            }

            let has_more = !self.fetched_first_page || self.next_token.is_some();
            if !has_more {
                self.done = true;
                return None;
            }

            if let Err(e) = self.fetch_next_page() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}
