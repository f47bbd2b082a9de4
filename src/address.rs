use regex::Regex;
use std::sync::OnceLock;

/// Classification of a raw principal-address string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressClass {
    /// Usable street address; carries the canonical form used as dedup key
    /// and output line.
    Valid(String),
    Empty,
    PoBox,
}

/// PO Box in all the shapes the site prints it: "PO Box", "P.O. Box",
/// "P O BOX", "Post Office Box", with or without periods and spaces.
fn po_box_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(?:p\.?\s*o\.?\s*box|post\s*office\s*box|p\.?o\.?\.?box)\b")
            .unwrap()
    })
}

/// Canonicalize and classify a raw address. Total: any input maps to exactly
/// one class, and unrecognized garble counts as valid rather than being
/// dropped. Canonicalization is one line with whitespace runs collapsed to
/// single spaces; no geocoding or further standardization.
pub fn classify(raw: &str) -> AddressClass {
    let canonical = canonicalize(raw);
    if canonical.is_empty() {
        return AddressClass::Empty;
    }
    if po_box_pattern().is_match(&canonical) {
        return AddressClass::PoBox;
    }
    AddressClass::Valid(canonical)
}

pub fn canonicalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn po_box_variants_are_all_caught() {
        for input in [
            "PO Box 12",
            "P.O. Box 12",
            "p o box 12",
            "P.O.Box 12",
            "POST OFFICE BOX 443",
            "c/o agent, PO BOX 9, Miami FL",
        ] {
            assert_eq!(classify(input), AddressClass::PoBox, "input: {:?}", input);
        }
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(classify(""), AddressClass::Empty);
        assert_eq!(classify("   "), AddressClass::Empty);
        assert_eq!(classify("\n\t  \n"), AddressClass::Empty);
    }

    #[test]
    fn street_addresses_are_valid_and_collapsed() {
        assert_eq!(
            classify("123 Main St"),
            AddressClass::Valid("123 Main St".to_string())
        );
        assert_eq!(
            classify("  4100  W\nKENNEDY BLVD\tSUITE 220  TAMPA, FL 33609 "),
            AddressClass::Valid("4100 W KENNEDY BLVD SUITE 220 TAMPA, FL 33609".to_string())
        );
    }

    #[test]
    fn garble_is_treated_as_valid_not_rejected() {
        assert_eq!(
            classify("???!!! 0x00"),
            AddressClass::Valid("???!!! 0x00".to_string())
        );
    }

    #[test]
    fn po_box_inside_a_street_name_is_not_a_po_box() {
        // "Boxwood" must not trip the word-boundary pattern.
        assert_eq!(
            classify("12 Po Boxwood Lane"),
            AddressClass::Valid("12 Po Boxwood Lane".to_string())
        );
    }
}
