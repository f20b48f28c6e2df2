//! Integration tests for the complete M³GIM pipeline
//!
//! These tests run the sheet exports in `tests/fixtures/sheets/` end to end:
//! - CSV loading → header repair → index (+ reconciliation cache)
//! - Records → containers → relations → graph document
//! - Atomic write of the document
//!
//! Run with: cargo test --test integration_tests

use m3gim_transform::{
    load_cache, load_sheets, transform, write_atomic, GraphDocument, SheetPaths, TransformOptions,
    TransformReport,
};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sheets")
}

fn options() -> TransformOptions {
    TransformOptions {
        export_date: chrono::NaiveDate::from_ymd_opt(2026, 2, 14)
            .and_then(|d| d.and_hms_micro_opt(9, 15, 30, 123456)),
        ..TransformOptions::default()
    }
}

fn run_fixtures() -> (GraphDocument, TransformReport) {
    let dir = fixtures_dir();
    let sheets = load_sheets(&SheetPaths::in_dir(&dir)).expect("load fixture sheets");
    let cache = load_cache(&dir.join("wikidata-reconciliation.json")).expect("load cache");
    assert!(cache.is_some(), "fixture cache present");
    transform(sheets, cache.as_ref(), &options()).expect("transform fixtures")
}

fn document_json() -> Value {
    serde_json::to_value(run_fixtures().0).expect("serialize document")
}

fn node<'a>(doc: &'a Value, id: &str) -> &'a Value {
    doc["@graph"]
        .as_array()
        .and_then(|g| g.iter().find(|n| n["@id"] == id))
        .unwrap_or_else(|| panic!("node {id} missing"))
}

fn ids(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["@id"].as_str()).collect())
        .unwrap_or_default()
}

// ============================================================================
// Graph shape
// ============================================================================

#[test]
fn test_fixture_graph_shape_and_counts() {
    let (doc, report) = run_fixtures();

    assert_eq!(doc.record_count, 7);
    assert_eq!(doc.container_count, 1);
    assert_eq!(doc.graph.len(), 9);
    assert_eq!(report.skipped_rows, 3);
    assert_eq!(report.duplicate_ids.len(), 1);
    assert_eq!(report.duplicate_ids[0].as_str(), "m3gim:NIM_028");
    assert_eq!(report.qualifier_column.as_deref(), Some("unnamed: 1"));
}

#[test]
fn test_graph_order_and_collection_membership() {
    let doc = document_json();
    let graph: Vec<&str> = doc["@graph"]
        .as_array()
        .expect("graph")
        .iter()
        .filter_map(|n| n["@id"].as_str())
        .collect();
    assert_eq!(
        graph,
        vec![
            "m3gim:UAKUG_NIM",
            "m3gim:NIM_003/set",
            "m3gim:NIM_003_1_1",
            "m3gim:NIM_003_1_2",
            "m3gim:NIM_003",
            "m3gim:NIM_010",
            "m3gim:NIM_028",
            "m3gim:NIM_PL_07",
            "m3gim:NIM_FS_001",
        ]
    );

    let fonds = node(&doc, "m3gim:UAKUG_NIM");
    assert_eq!(fonds["@type"], "rico:RecordSet");
    assert_eq!(fonds["rico:hasRecordSetType"], json!({"@id": "rico:Fonds"}));
    assert_eq!(
        ids(&fonds["rico:hasOrHadPart"]),
        vec![
            "m3gim:NIM_003/set",
            "m3gim:NIM_003",
            "m3gim:NIM_010",
            "m3gim:NIM_028",
            "m3gim:NIM_PL_07",
            "m3gim:NIM_FS_001",
        ]
    );

    let container = node(&doc, "m3gim:NIM_003/set");
    assert_eq!(container["rico:identifier"], "UAKUG/NIM_003");
    assert_eq!(container["rico:hasRecordSetType"], json!({"@id": "rico:File"}));
    assert_eq!(
        ids(&container["rico:hasOrHadPart"]),
        vec!["m3gim:NIM_003_1_1", "m3gim:NIM_003_1_2"]
    );
}

#[test]
fn test_every_node_reachable_once() {
    let doc = document_json();
    let mut reachable: Vec<&str> = Vec::new();
    for n in doc["@graph"].as_array().expect("graph") {
        reachable.extend(ids(&n["rico:hasOrHadPart"]));
    }
    reachable.sort_unstable();
    let mut nodes: Vec<&str> = doc["@graph"]
        .as_array()
        .expect("graph")
        .iter()
        .skip(1)
        .filter_map(|n| n["@id"].as_str())
        .collect();
    nodes.sort_unstable();
    assert_eq!(reachable, nodes);
}

// ============================================================================
// Record fields
// ============================================================================

#[test]
fn test_record_scalars_are_normalized() {
    let doc = document_json();

    let letter = node(&doc, "m3gim:NIM_003_1_1");
    assert_eq!(letter["rico:identifier"], "UAKUG/NIM_003 1_1");
    assert_eq!(letter["rico:date"], "1958-04-18");
    assert_eq!(letter["rico:hasDocumentaryFormType"], json!({"@id": "m3gim-dft:brief"}));
    assert_eq!(letter["m3gim:bearbeitungsstand"], "abgeschlossen");
    assert_eq!(letter["m3gim:digitizationStatus"], "gescannt");

    assert_eq!(node(&doc, "m3gim:NIM_003")["m3gim:bearbeitungsstand"], "zurueckgestellt");

    let passport = node(&doc, "m3gim:NIM_028");
    assert_eq!(passport["rico:title"], "Reisepass");
    assert_eq!(passport["m3gim:bearbeitungsstand"], "in prüfung");
    assert_eq!(passport["m3gim:accessStatus"], "gesperrt");
    assert_eq!(passport["rico:hasDocumentaryFormType"], json!({"@id": "m3gim-dft:ausweis"}));

    let photo = node(&doc, "m3gim:NIM_FS_001");
    assert_eq!(photo["@type"], json!(["rico:Record", "rico:Photograph"]));
    assert_eq!(photo["rico:date"], "1955-07-25");
    assert_eq!(photo["rico:hasCreator"], "Lauterwasser");
    assert_eq!(photo["rico:hasOrHadLocation"], json!({"name": "Bayreuth", "@id": "wd:Q3923"}));
}

// ============================================================================
// Relations
// ============================================================================

#[test]
fn test_nim_010_relations() {
    let doc = document_json();
    let programme = node(&doc, "m3gim:NIM_010");

    assert_eq!(
        programme["m3gim:mentions"],
        json!({"name": "Nilsson, Birgit", "@id": "wd:Q234157", "role": "erwähnt"})
    );
    assert_eq!(
        programme["rico:hasOrHadAgent"],
        json!({"name": "Wiener Philharmoniker", "@id": "wd:Q154685", "@type": "rico:Group"})
    );
    assert_eq!(
        programme["rico:hasOrHadSubject"],
        json!([
            {"name": "Carmen", "@id": "wd:Q186360", "@type": "m3gim:MusicalWork", "komponist": "Bizet, Georges"},
            {"name": "Premiere", "date": "1952-12-17"}
        ])
    );
    assert_eq!(
        programme["rico:hasOrHadLocation"],
        json!({"name": "München", "@id": "wd:Q1726"})
    );
    assert_eq!(programme["rico:isAssociatedWithDate"], "1952-12-17");
    assert_eq!(
        programme["m3gim:hasPerformanceRole"],
        json!({"name": "Carmen", "role": "titelpartie"})
    );
    assert_eq!(programme["m3gim:ausgaben"], "1200 ats");
    assert_eq!(programme["m3gim:honorar"], "vereinbart");
}

#[test]
fn test_base_signature_relations_and_sheet_ids_win() {
    let doc = document_json();

    // The cache carries a different id for Wien; the index value stays.
    for id in ["m3gim:NIM_003/set", "m3gim:NIM_003"] {
        let n = node(&doc, id);
        assert_eq!(n["rico:hasOrHadLocation"], json!({"name": "Wien", "@id": "wd:Q1741"}));
        assert_eq!(n["rico:isAssociatedWithDate"], "1958-04-18");
    }

    let letter = node(&doc, "m3gim:NIM_003_1_1");
    assert_eq!(
        letter["rico:hasOrHadAgent"],
        json!([
            {"name": "Böhm, Karl", "@id": "wd:Q78882", "@type": "rico:Person", "role": "verfasser"},
            {"name": "Wiener Staatsoper", "@id": "wd:Q209510", "@type": "rico:CorporateBody"}
        ])
    );
    assert!(letter.get("rico:hasOrHadLocation").is_none());
    assert!(node(&doc, "m3gim:NIM_003_1_2").get("rico:hasOrHadAgent").is_none());
}

#[test]
fn test_relation_report() {
    let (_, report) = run_fixtures();
    assert_eq!(report.relations.rows, 14);
    assert_eq!(report.relations.skipped_rows, 2);
    assert_eq!(report.relations.composite_splits, 2);
    assert_eq!(report.attach.unattached_owners, vec!["UAKUG/NIM_999".to_string()]);
    assert!(report.attach.refused_extension_keys.is_empty());

    let org = report
        .index
        .iter()
        .find(|(kind, _)| *kind == m3gim_transform::EntityKind::Organization)
        .map(|(_, stats)| *stats)
        .expect("organization index built");
    assert!(org.header_repaired);
    assert_eq!(org.entries, 2);
}

// ============================================================================
// Document + output
// ============================================================================

#[test]
fn test_document_header() {
    let doc = document_json();
    assert_eq!(doc["m3gim:exportDate"], "2026-02-14T09:15:30.123456");
    assert_eq!(doc["m3gim:recordCount"], 7);
    assert_eq!(doc["m3gim:konvolutCount"], 1);
    let context = doc["@context"].as_object().expect("context");
    for prefix in ["rico", "m3gim", "m3gim-dft", "m3gim-role", "wd", "skos", "xsd"] {
        assert!(context.contains_key(prefix), "missing prefix {prefix}");
    }
}

#[test]
fn test_atomic_write_round_trip() {
    let (doc, _) = run_fixtures();
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("output").join("m3gim.jsonld");

    write_atomic(&out, &doc).expect("first write");
    write_atomic(&out, &doc).expect("second write replaces");

    let text = fs::read_to_string(&out).expect("read output");
    assert!(text.contains("\"München\""), "non-ASCII kept verbatim");
    let parsed: Value = serde_json::from_str(&text).expect("valid JSON");
    assert_eq!(parsed, serde_json::to_value(&doc).expect("serialize"));

    let leftovers: Vec<_> = fs::read_dir(out.parent().expect("parent"))
        .expect("list output dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
