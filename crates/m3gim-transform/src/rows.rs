//! Typed input rows.
//!
//! Each sheet row is read once into an all-`Option` record so every consumer
//! handles absence explicitly. Column names are the sheet's (German) headers.

use m3gim_sheets::Row;

/// Signature value marking the template row at the top of each sheet.
pub const TEMPLATE_SIGNATURE: &str = "beispiel";

pub mod columns {
    pub const SIGNATURE: &str = "archivsignatur";
    pub const TITLE: &str = "titel";
    pub const DATE: &str = "entstehungsdatum";
    pub const DOCUMENT_TYPE: &str = "dokumenttyp";
    pub const LANGUAGE: &str = "sprache";
    pub const EXTENT: &str = "umfang";
    pub const DESCRIPTION: &str = "beschreibung";
    pub const WORKFLOW: &str = "bearbeitungsstand";
    pub const ACCESS: &str = "zugaenglichkeit";
    pub const SCAN_STATUS: &str = "scan_status";

    pub const PHOTOGRAPHER: &str = "fotograf";
    pub const FORMAT: &str = "format";
    pub const PHOTO_TYPE: &str = "fototyp";
    pub const RECORDING_PLACE: &str = "aufnahmeort";
    pub const FILENAME: &str = "filename";

    pub const RELATION_TYPE: &str = "typ";
    pub const RELATION_NAME: &str = "name";
    pub const RELATION_ROLE: &str = "rolle";
    pub const RELATION_DATE: &str = "datum";
    pub const NOTE: &str = "anmerkung";
}

/// True for an empty signature or the template row.
pub fn is_skipped_signature(signature: Option<&str>) -> bool {
    match signature.map(str::trim) {
        None | Some("") => true,
        Some(s) => s.eq_ignore_ascii_case(TEMPLATE_SIGNATURE),
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Object,
    Photograph,
}

/// One object or photograph row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub kind: RecordKind,
    pub line: usize,
    pub signature: Option<String>,
    pub qualifier: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub document_type: Option<String>,
    pub language: Option<String>,
    pub extent: Option<String>,
    pub description: Option<String>,
    pub workflow_status: Option<String>,
    pub access_status: Option<String>,
    pub scan_status: Option<String>,
    pub photographer: Option<String>,
    pub photo_type: Option<String>,
    pub recording_place: Option<String>,
    pub filename: Option<String>,
}

impl CatalogRow {
    fn empty(kind: RecordKind, line: usize) -> Self {
        Self {
            kind,
            line,
            signature: None,
            qualifier: None,
            title: None,
            date: None,
            document_type: None,
            language: None,
            extent: None,
            description: None,
            workflow_status: None,
            access_status: None,
            scan_status: None,
            photographer: None,
            photo_type: None,
            recording_place: None,
            filename: None,
        }
    }

    /// Object sheet row; `qualifier_column` comes from qualifier detection.
    pub fn object(row: &Row<'_>, qualifier_column: Option<&str>) -> Self {
        Self {
            signature: owned(row.get(columns::SIGNATURE)),
            qualifier: owned(qualifier_column.and_then(|c| row.get(c))),
            title: owned(row.get(columns::TITLE)),
            date: owned(row.get(columns::DATE)),
            document_type: owned(row.get(columns::DOCUMENT_TYPE)),
            language: owned(row.get(columns::LANGUAGE)),
            extent: owned(row.get(columns::EXTENT)),
            description: owned(row.get(columns::DESCRIPTION)),
            workflow_status: owned(row.get(columns::WORKFLOW)),
            access_status: owned(row.get(columns::ACCESS)),
            scan_status: owned(row.get(columns::SCAN_STATUS)),
            ..Self::empty(RecordKind::Object, row.line())
        }
    }

    /// Photograph sheet row. Photographs have no qualifier; `format` is the extent.
    pub fn photograph(row: &Row<'_>) -> Self {
        Self {
            signature: owned(row.get(columns::SIGNATURE)),
            title: owned(row.get(columns::TITLE)),
            date: owned(row.get(columns::DATE)),
            extent: owned(row.get(columns::FORMAT)),
            description: owned(row.get(columns::DESCRIPTION)),
            photographer: owned(row.get(columns::PHOTOGRAPHER)),
            photo_type: owned(row.get(columns::PHOTO_TYPE)),
            recording_place: owned(row.get(columns::RECORDING_PLACE)),
            filename: owned(row.get(columns::FILENAME)),
            ..Self::empty(RecordKind::Photograph, row.line())
        }
    }

    pub fn is_skipped(&self) -> bool {
        is_skipped_signature(self.signature.as_deref())
    }
}

/// One relation sheet row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationRow {
    pub line: usize,
    pub signature: Option<String>,
    pub qualifier: Option<String>,
    pub relation_type: Option<String>,
    pub value: Option<String>,
    pub role: Option<String>,
    pub date: Option<String>,
    pub note: Option<String>,
}

impl RelationRow {
    pub fn from_row(row: &Row<'_>, qualifier_column: Option<&str>) -> Self {
        Self {
            line: row.line(),
            signature: owned(row.get(columns::SIGNATURE)),
            qualifier: owned(qualifier_column.and_then(|c| row.get(c))),
            relation_type: owned(row.get(columns::RELATION_TYPE)),
            value: owned(row.get(columns::RELATION_NAME)),
            role: owned(row.get(columns::RELATION_ROLE)),
            date: owned(row.get(columns::RELATION_DATE)),
            note: owned(row.get(columns::NOTE)),
        }
    }
}
