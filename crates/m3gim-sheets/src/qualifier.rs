//! Qualifier (folio) column detection.

use crate::Table;
use regex::Regex;
use std::sync::OnceLock;

/// Column names the relation sheet uses for the qualifier, in priority order.
pub const RELATION_QUALIFIER_COLUMNS: &[&str] = &["folio", "unnamed: 1"];

/// How many non-empty values are sampled when probing a candidate column.
const QUALIFIER_SAMPLE: usize = 5;

fn folio_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+_\d+$").expect("valid folio regex"))
}

/// True for values shaped like a folio qualifier (`1_2`, `fol. 3`).
pub fn looks_like_qualifier(value: &str) -> bool {
    let value = value.trim();
    folio_pattern().is_match(value) || value.starts_with("fol.")
}

/// Find the object sheet's qualifier column.
///
/// Candidates are columns named `folio` or carrying an `unnamed` placeholder; the
/// first candidate whose sampled values contain a folio-shaped value wins.
pub fn detect_qualifier_column(table: &Table) -> Option<String> {
    table
        .headers()
        .iter()
        .filter(|h| h.as_str() == "folio" || h.contains("unnamed"))
        .find(|h| {
            table
                .column_values(h)
                .take(QUALIFIER_SAMPLE)
                .any(looks_like_qualifier)
        })
        .cloned()
}

/// The relation sheet's qualifier column: the first present candidate name.
pub fn relation_qualifier_column(table: &Table) -> Option<String> {
    RELATION_QUALIFIER_COLUMNS
        .iter()
        .find(|c| table.has_column(c))
        .map(|c| c.to_string())
}
