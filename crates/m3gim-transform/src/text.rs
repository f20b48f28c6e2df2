//! Scalar normalization shared by the converters.

use regex::Regex;
use std::sync::OnceLock;

fn timestamp_artifact() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+00:00:00$").expect("valid timestamp regex"))
}

/// Trimmed value, `None` when empty.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trimmed + lowercased value, `None` when empty.
pub fn lower(value: Option<&str>) -> Option<String> {
    non_empty(value).map(|v| v.to_lowercase())
}

/// Strip the spreadsheet midnight timestamp (`1958-04-18 00:00:00` → `1958-04-18`).
///
/// Idempotent; anything else passes through trimmed.
pub fn clean_date(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    let cleaned = timestamp_artifact().replace(trimmed, "");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
