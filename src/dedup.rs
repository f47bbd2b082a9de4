use anyhow::Result;

use crate::address::{self, AddressClass};
use crate::ledger::SeenLedger;
use crate::models::EntityRecord;

/// Outcome of judging one record against the address filter and the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// New valid address; it has been recorded in the ledger.
    Accepted(String),
    EmptyAddress,
    PoBox,
    Duplicate,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }
}

/// Classify the record's principal address and consult the ledger. The
/// classification happens first: empty and PO-box addresses never touch the
/// ledger, so they are not remembered as seen and never pollute the history.
/// A valid unseen address is recorded durably before the verdict is returned.
pub fn judge(record: &EntityRecord, ledger: &mut SeenLedger) -> Result<Verdict> {
    let raw = record.principal_address.as_deref().unwrap_or("");
    match address::classify(raw) {
        AddressClass::Empty => Ok(Verdict::EmptyAddress),
        AddressClass::PoBox => Ok(Verdict::PoBox),
        AddressClass::Valid(canonical) => {
            if ledger.contains(&canonical) {
                return Ok(Verdict::Duplicate);
            }
            ledger.record(&canonical)?;
            Ok(Verdict::Accepted(canonical))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityStub;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn record_with_address(addr: Option<&str>) -> EntityRecord {
        let stub = EntityStub {
            document_number: "P1".to_string(),
            name: "ACME".to_string(),
            detail_locator: "/1".to_string(),
        };
        let mut details = BTreeMap::new();
        if let Some(addr) = addr {
            details.insert("Principal Address".to_string(), addr.to_string());
        }
        EntityRecord::from_details(&stub, details)
    }

    #[test]
    fn first_occurrence_wins_then_duplicates_are_rejected() {
        let dir = TempDir::new().unwrap();
        let mut ledger = SeenLedger::load(dir.path(), "plumber").unwrap();

        let record = record_with_address(Some("22 Palm Ave, Tampa FL"));
        assert_eq!(
            judge(&record, &mut ledger).unwrap(),
            Verdict::Accepted("22 Palm Ave, Tampa FL".to_string())
        );
        assert_eq!(judge(&record, &mut ledger).unwrap(), Verdict::Duplicate);
    }

    #[test]
    fn whitespace_variants_hit_the_same_ledger_entry() {
        let dir = TempDir::new().unwrap();
        let mut ledger = SeenLedger::load(dir.path(), "plumber").unwrap();

        let first = record_with_address(Some("22 Palm Ave,\nTampa FL"));
        let second = record_with_address(Some("  22  Palm Ave, Tampa FL "));
        assert!(judge(&first, &mut ledger).unwrap().is_accepted());
        assert_eq!(judge(&second, &mut ledger).unwrap(), Verdict::Duplicate);
    }

    #[test]
    fn po_box_and_empty_never_reach_the_ledger() {
        let dir = TempDir::new().unwrap();
        let mut ledger = SeenLedger::load(dir.path(), "plumber").unwrap();

        assert_eq!(
            judge(&record_with_address(Some("PO Box 9")), &mut ledger).unwrap(),
            Verdict::PoBox
        );
        assert_eq!(
            judge(&record_with_address(Some("   ")), &mut ledger).unwrap(),
            Verdict::EmptyAddress
        );
        assert_eq!(
            judge(&record_with_address(None), &mut ledger).unwrap(),
            Verdict::EmptyAddress
        );
        assert!(ledger.is_empty());
    }
}
