use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::EntityStub;

/// One fetched result page: the stubs it listed, in on-page order, and the
/// token of the following page if the source advertised one.
#[derive(Debug, Clone, Default)]
pub struct ResultPage {
    pub stubs: Vec<EntityStub>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    /// A result page could not be fetched or rendered. Fatal to the walk
    /// once retries are exhausted.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),
    /// One entity's detail page could not be fetched. Isolated to that stub.
    #[error("detail unavailable for {locator}: {message}")]
    DetailUnavailable { locator: String, message: String },
}

/// The paginated search interface, reduced to the two calls the pipeline
/// needs. The concrete site adapter lives behind this so the whole pipeline
/// runs against an in-memory fake in tests. These are the only blocking
/// calls in a run.
pub trait ListingSource {
    /// Fetch one result page for a term. `page_token` of `None` means the
    /// first page; later pages use the token the previous page returned.
    fn fetch_page(&self, term: &str, page_token: Option<&str>) -> Result<ResultPage, SourceError>;

    /// Fetch the labeled detail fields for one entity.
    fn fetch_detail(&self, locator: &str) -> Result<BTreeMap<String, String>, SourceError>;
}
