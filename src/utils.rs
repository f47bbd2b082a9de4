use std::path::{Path, PathBuf};

use crate::models::SearchLimit;

/// Filesystem-safe form of a search term: lowercased, spaces removed.
/// Every per-term file name starts with this.
pub fn clean_term(term: &str) -> String {
    term.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Ledger of already-emitted addresses. Derived from the term only, so all
/// limits for a term share one history.
pub fn ledger_path(dir: &Path, term: &str) -> PathBuf {
    dir.join(format!("{}_seen.txt", clean_term(term)))
}

/// Structured record output, one JSON object per line.
pub fn records_path(dir: &Path, term: &str) -> PathBuf {
    dir.join(format!("{}_records.jsonl", clean_term(term)))
}

/// Flat address list, one canonical address per line. Derived from term and
/// requested limit.
pub fn addresses_path(dir: &Path, term: &str, limit: SearchLimit) -> PathBuf {
    dir.join(format!("{}_{}.txt", clean_term(term), limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_cleaning_matches_file_naming_convention() {
        assert_eq!(clean_term("Water Filter"), "waterfilter");
        assert_eq!(clean_term("  PLUMBER "), "plumber");
    }

    #[test]
    fn per_term_paths() {
        let dir = Path::new("/data");
        assert_eq!(
            ledger_path(dir, "Water Filter"),
            PathBuf::from("/data/waterfilter_seen.txt")
        );
        assert_eq!(
            records_path(dir, "plumber"),
            PathBuf::from("/data/plumber_records.jsonl")
        );
        assert_eq!(
            addresses_path(dir, "plumber", SearchLimit::Count(50)),
            PathBuf::from("/data/plumber_50.txt")
        );
        assert_eq!(
            addresses_path(dir, "plumber", SearchLimit::All),
            PathBuf::from("/data/plumber_all.txt")
        );
    }
}
