//! Header-shift repair for the entity index sheets.
//!
//! Some index sheets were exported without their header row, so the first data
//! row ended up as the header. The shape of such a table is still known: it has
//! exactly as many columns as the expected header list, and its second header is
//! a data value instead of one of the usual header tokens.

use crate::Table;

/// Header tokens that show up in the second column of a correctly exported index.
pub const HEADER_TOKENS: &[&str] = &["name", "titel", "ort", "m3gim_id"];

pub const ORGANIZATION_INDEX_HEADERS: &[&str] = &[
    "m3gim_id",
    "name",
    "wikidata_id",
    "ort",
    "assoziierte_person",
    "anmerkung",
];

pub const PLACE_INDEX_HEADERS: &[&str] = &["m3gim_id", "name", "wikidata_id"];

pub const WORK_INDEX_HEADERS: &[&str] = &[
    "m3gim_id",
    "name",
    "wikidata_id",
    "komponist",
    "rolle_stimme",
    "anmerkung",
];

/// True when `table` looks like an index whose header row was consumed as data.
pub fn is_header_shifted(table: &Table, expected: &[&str]) -> bool {
    let headers = table.headers();
    if headers.len() != expected.len() || headers.len() < 2 {
        return false;
    }
    let second = headers[1].as_str();
    !second.is_empty() && !HEADER_TOKENS.contains(&second)
}

/// Repair a shifted header in place.
///
/// The wrongly consumed header row is reinserted as the first data row (with its
/// original spelling) and `expected` becomes the header. Returns whether a repair
/// happened.
pub fn repair_header_shift(table: &mut Table, expected: &[&str]) -> bool {
    if !is_header_shifted(table, expected) {
        return false;
    }
    let recovered = table.raw_headers().to_vec();
    table.set_headers(expected.iter().map(|h| h.to_string()).collect());
    table.insert_row(0, recovered);
    tracing::warn!(
        table = %table.name(),
        rows = table.len(),
        "repaired shifted header row"
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn shifted_organization_index_recovers_first_row() {
        let mut table = Table::new(
            "Organisationsindex",
            strings(&["O001", "Wiener Staatsoper", "Q209510", "Wien", "", ""]),
            vec![strings(&["O002", "Bayerische Staatsoper", "Q265290", "München", "", ""])],
        );

        assert!(repair_header_shift(&mut table, ORGANIZATION_INDEX_HEADERS));
        assert_eq!(table.headers(), ORGANIZATION_INDEX_HEADERS);
        assert_eq!(table.len(), 2);

        let first = table.row(0).expect("recovered row");
        assert_eq!(first.get("name"), Some("Wiener Staatsoper"));
        assert_eq!(first.get("wikidata_id"), Some("Q209510"));
        assert_eq!(first.get("assoziierte_person"), None);
        let second = table.row(1).expect("second row");
        assert_eq!(second.get("name"), Some("Bayerische Staatsoper"));
    }

    #[test]
    fn correct_headers_are_left_alone() {
        let mut table = Table::new(
            "Ortsindex",
            strings(&["m3gim_id", "Name", "wikidata_id"]),
            vec![strings(&["L001", "Wien", "Q1741"])],
        );

        assert!(!repair_header_shift(&mut table, PLACE_INDEX_HEADERS));
        assert_eq!(table.len(), 1);
        assert_eq!(table.headers()[1], "name");
    }

    #[test]
    fn width_mismatch_is_not_a_shift() {
        let table = Table::new(
            "Werkindex",
            strings(&["W001", "Carmen", "Q186360"]),
            Vec::new(),
        );
        assert!(!is_header_shifted(&table, WORK_INDEX_HEADERS));
    }
}
