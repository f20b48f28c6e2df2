//! Record conversion: one catalog row → one record node.

use crate::attach::{RelationEntry, RelationFields, RelationOwner};
use crate::identifier::{identifier_string, record_id, IdRef, NodeId};
use crate::index::{EntityIndex, EntityKind};
use crate::rows::{CatalogRow, RecordKind};
use crate::text::{clean_date, lower, non_empty};
use crate::vocab::{documentary_form_type, wikidata_ref, TYPE_PHOTOGRAPH, TYPE_RECORD};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Normalized `bearbeitungsstand`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowStatus {
    Completed,
    InProgress,
    Deferred,
    /// Unrecognized text, kept verbatim (lowercased).
    Other(String),
}

impl WorkflowStatus {
    /// Classify lowercased status text by the German phrases used in the sheet.
    pub fn parse(text: &str) -> Self {
        if text.contains("vollst") || text == "abgeschlossen" || text.starts_with("erledigt") {
            Self::Completed
        } else if text.starts_with("begonnen") {
            Self::InProgress
        } else if text.contains("ckgestellt") || text.contains("zurück") {
            Self::Deferred
        } else {
            Self::Other(text.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "abgeschlossen",
            Self::InProgress => "begonnen",
            Self::Deferred => "zurueckgestellt",
            Self::Other(text) => text,
        }
    }
}

impl Serialize for WorkflowStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// `@type` of a record: a single tag, or several for photographs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NodeType {
    Single(&'static str),
    Many(Vec<&'static str>),
}

/// A catalog item in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordNode {
    #[serde(rename = "@id")]
    pub id: NodeId,
    #[serde(rename = "@type")]
    pub node_type: NodeType,
    #[serde(rename = "rico:identifier")]
    pub identifier: String,
    #[serde(rename = "rico:title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "rico:date", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "rico:hasDocumentaryFormType", skip_serializing_if = "Option::is_none")]
    pub form_type: Option<IdRef>,
    #[serde(rename = "rico:hasOrHadLanguage", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "rico:hasExtent", skip_serializing_if = "Option::is_none")]
    pub extent: Option<String>,
    #[serde(rename = "rico:scopeAndContent", skip_serializing_if = "Option::is_none")]
    pub scope_and_content: Option<String>,
    #[serde(rename = "rico:hasCreator", skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(rename = "m3gim:bearbeitungsstand", skip_serializing_if = "Option::is_none")]
    pub workflow_status: Option<WorkflowStatus>,
    #[serde(rename = "m3gim:accessStatus", skip_serializing_if = "Option::is_none")]
    pub access_status: Option<String>,
    #[serde(rename = "m3gim:digitizationStatus", skip_serializing_if = "Option::is_none")]
    pub digitization_status: Option<String>,
    #[serde(rename = "m3gim:photoType", skip_serializing_if = "Option::is_none")]
    pub photo_type: Option<String>,
    #[serde(rename = "m3gim:filename", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub relations: RelationFields,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, String>,

    /// Base signature (trimmed), used for grouping.
    #[serde(skip)]
    pub signature: String,
    #[serde(skip)]
    pub qualifier: Option<String>,
    #[serde(skip)]
    pub kind: RecordKind,
    /// Sheet line the record came from.
    #[serde(skip)]
    pub line: usize,
}

impl RecordNode {
    pub fn is_photograph(&self) -> bool {
        self.kind == RecordKind::Photograph
    }
}

impl RelationOwner for RecordNode {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn relation_fields_mut(&mut self) -> &mut RelationFields {
        &mut self.relations
    }

    fn extensions_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.extensions
    }
}

/// Convert one catalog row. Rows without a usable signature yield `None`.
///
/// `index` resolves a photograph's recording place; nothing else is looked up
/// at this stage.
pub fn convert(row: &CatalogRow, index: &EntityIndex) -> Option<RecordNode> {
    if row.is_skipped() {
        return None;
    }
    let signature = non_empty(row.signature.as_deref())?;
    let qualifier = match row.kind {
        RecordKind::Object => non_empty(row.qualifier.as_deref()),
        RecordKind::Photograph => None,
    };

    let node_type = match row.kind {
        RecordKind::Object => NodeType::Single(TYPE_RECORD),
        RecordKind::Photograph => NodeType::Many(vec![TYPE_RECORD, TYPE_PHOTOGRAPH]),
    };

    let form_type = lower(row.document_type.as_deref())
        .and_then(|code| documentary_form_type(&code))
        .map(IdRef::new);

    let mut relations = RelationFields::default();
    if let Some(place) = non_empty(row.recording_place.as_deref()) {
        let id = index
            .lookup(EntityKind::Place, &place)
            .and_then(|e| e.wikidata_id.as_deref())
            .and_then(wikidata_ref);
        relations.locations.push(RelationEntry {
            id,
            ..RelationEntry::named(place)
        });
    }

    Some(RecordNode {
        id: record_id(&signature, qualifier.as_deref()),
        node_type,
        identifier: identifier_string(&signature, qualifier.as_deref()),
        title: non_empty(row.title.as_deref()),
        date: clean_date(row.date.as_deref()),
        form_type,
        language: non_empty(row.language.as_deref()),
        extent: non_empty(row.extent.as_deref()),
        scope_and_content: non_empty(row.description.as_deref()),
        creator: non_empty(row.photographer.as_deref()),
        workflow_status: lower(row.workflow_status.as_deref()).map(|s| WorkflowStatus::parse(&s)),
        access_status: lower(row.access_status.as_deref()),
        digitization_status: lower(row.scan_status.as_deref()),
        photo_type: non_empty(row.photo_type.as_deref()),
        filename: non_empty(row.filename.as_deref()),
        relations,
        extensions: BTreeMap::new(),
        signature,
        qualifier,
        kind: row.kind,
        line: row.line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexTables;
    use m3gim_sheets::Table;

    fn object_row(signature: &str) -> CatalogRow {
        let table = Table::new("Objekte", vec!["archivsignatur".to_string()], vec![vec![signature.to_string()]]);
        let row = table.row(0).map(|r| CatalogRow::object(&r, None));
        row.expect("row")
    }

    #[test]
    fn workflow_status_normalizes_german_phrases() {
        assert_eq!(WorkflowStatus::parse("vollständig erfasst"), WorkflowStatus::Completed);
        assert_eq!(WorkflowStatus::parse("abgeschlossen"), WorkflowStatus::Completed);
        assert_eq!(WorkflowStatus::parse("erledigt (2025)"), WorkflowStatus::Completed);
        assert_eq!(WorkflowStatus::parse("begonnen"), WorkflowStatus::InProgress);
        assert_eq!(WorkflowStatus::parse("zurückgestellt"), WorkflowStatus::Deferred);
        assert_eq!(WorkflowStatus::parse("zurueckgestellt"), WorkflowStatus::Deferred);
        assert_eq!(WorkflowStatus::parse("in prüfung").as_str(), "in prüfung");
    }

    #[test]
    fn converts_object_fields() {
        let row = CatalogRow {
            qualifier: Some("1_2".to_string()),
            title: Some("Brief an Ira Malaniuk".to_string()),
            date: Some("1958-04-18 00:00:00".to_string()),
            document_type: Some("Korrespondenz".to_string()),
            language: Some("de, uk".to_string()),
            workflow_status: Some("Begonnen".to_string()),
            scan_status: Some("Gescannt".to_string()),
            ..object_row("UAKUG/NIM_003")
        };
        let node = convert(&row, &EntityIndex::default()).expect("node");

        assert_eq!(node.id.as_str(), "m3gim:NIM_003_1_2");
        assert_eq!(node.identifier, "UAKUG/NIM_003 1_2");
        assert_eq!(node.date.as_deref(), Some("1958-04-18"));
        assert_eq!(node.form_type, Some(IdRef::new("m3gim-dft:brief")));
        assert_eq!(node.language.as_deref(), Some("de, uk"));
        assert_eq!(node.workflow_status, Some(WorkflowStatus::InProgress));
        assert_eq!(node.digitization_status.as_deref(), Some("gescannt"));

        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["@type"], "rico:Record");
        assert_eq!(json["rico:hasDocumentaryFormType"]["@id"], "m3gim-dft:brief");
        assert_eq!(json["m3gim:bearbeitungsstand"], "begonnen");
        assert!(json.get("rico:hasExtent").is_none());
        assert!(json.get("signature").is_none());
    }

    #[test]
    fn unmapped_document_types_leave_the_field_absent() {
        let row = CatalogRow {
            document_type: Some("flugblatt".to_string()),
            ..object_row("UAKUG/NIM_001")
        };
        let node = convert(&row, &EntityIndex::default()).expect("node");
        assert_eq!(node.form_type, None);
    }

    #[test]
    fn template_rows_are_not_converted() {
        assert!(convert(&object_row("Beispiel"), &EntityIndex::default()).is_none());
        assert!(convert(&object_row(""), &EntityIndex::default()).is_none());
    }

    #[test]
    fn photographs_carry_their_extras() {
        let index = EntityIndex::build(
            IndexTables {
                places: Some(Table::new(
                    "Ortsindex",
                    vec!["m3gim_id".into(), "name".into(), "wikidata_id".into()],
                    vec![vec!["L001".into(), "Bayreuth".into(), "Q3923".into()]],
                )),
                ..IndexTables::default()
            },
            None,
        )
        .0;
        let table = Table::new(
            "Fotos",
            ["archivsignatur", "titel", "fotograf", "format", "fototyp", "aufnahmeort", "filename"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![["UAKUG/NIM_FS_012", "Als Fricka", "Lauterwasser", "18x24", "s/w", "Bayreuth", "fs012.jpg"]
                .iter()
                .map(|s| s.to_string())
                .collect()],
        );
        let row = CatalogRow::photograph(&table.row(0).expect("row"));
        let node = convert(&row, &index).expect("node");

        assert!(node.is_photograph());
        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["@type"], serde_json::json!(["rico:Record", "rico:Photograph"]));
        assert_eq!(json["rico:hasCreator"], "Lauterwasser");
        assert_eq!(json["rico:hasExtent"], "18x24");
        assert_eq!(json["m3gim:photoType"], "s/w");
        assert_eq!(json["m3gim:filename"], "fs012.jpg");
        assert_eq!(
            json["rico:hasOrHadLocation"],
            serde_json::json!({"name": "Bayreuth", "@id": "wd:Q3923"})
        );
    }
}
