pub mod address;
pub mod debug;
pub mod dedup;
pub mod extractor;
pub mod ledger;
pub mod models;
pub mod output;
pub mod remote;
pub mod session;
pub mod source;
pub mod sunbiz;
pub mod tui;
pub mod utils;
pub mod walker;

pub use models::{EntityRecord, EntityStub, SearchLimit, SessionResult, StopReason};
pub use source::{ListingSource, ResultPage, SourceError};
