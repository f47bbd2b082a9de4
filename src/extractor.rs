use crate::models::{EntityRecord, EntityStub};
use crate::source::{ListingSource, SourceError};

/// Fetch the detail fields for one stub and assemble its record. Missing
/// fields (including a missing principal address) become `None`, never an
/// error; only a failed detail fetch is reported, and the caller treats
/// that as a skipped stub rather than aborting the run.
pub fn extract<S: ListingSource>(
    source: &S,
    stub: &EntityStub,
) -> Result<EntityRecord, SourceError> {
    let details = source.fetch_detail(&stub.detail_locator)?;
    Ok(EntityRecord::from_details(stub, details))
}
