//! Graph document assembly and output.

use crate::error::{Result, TransformError};
use crate::hierarchy::{CollectionNode, ContainerNode};
use crate::records::RecordNode;
use crate::vocab::context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp format of `m3gim:exportDate` (local time, microseconds).
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// One element of `@graph`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GraphNode {
    Collection(CollectionNode),
    Container(ContainerNode),
    Record(RecordNode),
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match self {
            Self::Collection(n) => &n.id,
            Self::Container(n) => n.id.as_str(),
            Self::Record(n) => n.id.as_str(),
        }
    }
}

/// The emitted JSON-LD document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphDocument {
    #[serde(rename = "@context")]
    pub context: BTreeMap<&'static str, &'static str>,
    #[serde(rename = "@graph")]
    pub graph: Vec<GraphNode>,
    #[serde(rename = "m3gim:exportDate")]
    pub export_date: String,
    #[serde(rename = "m3gim:recordCount")]
    pub record_count: usize,
    #[serde(rename = "m3gim:konvolutCount")]
    pub container_count: usize,
}

impl GraphDocument {
    /// Graph order: collection, containers, records.
    pub fn assemble(
        collection: CollectionNode,
        containers: Vec<ContainerNode>,
        records: Vec<RecordNode>,
        export_date: String,
    ) -> Self {
        let record_count = records.len();
        let container_count = containers.len();
        let mut graph = Vec::with_capacity(1 + container_count + record_count);
        graph.push(GraphNode::Collection(collection));
        graph.extend(containers.into_iter().map(GraphNode::Container));
        graph.extend(records.into_iter().map(GraphNode::Record));
        Self {
            context: context(),
            graph,
            export_date,
            record_count,
            container_count,
        }
    }

    pub fn collection(&self) -> Option<&CollectionNode> {
        self.graph.iter().find_map(|n| match n {
            GraphNode::Collection(c) => Some(c),
            _ => None,
        })
    }

    pub fn containers(&self) -> impl Iterator<Item = &ContainerNode> + '_ {
        self.graph.iter().filter_map(|n| match n {
            GraphNode::Container(c) => Some(c),
            _ => None,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = &RecordNode> + '_ {
        self.graph.iter().filter_map(|n| match n {
            GraphNode::Record(r) => Some(r),
            _ => None,
        })
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.graph.iter().find(|n| n.id() == id)
    }

    /// Pretty-printed JSON (2-space indent, non-ASCII kept as is).
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> TransformError + '_ {
    move |source| TransformError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `document` to `path` via `<path>.tmp` + rename. Returns the byte size.
///
/// Serialization happens before anything touches the filesystem, so a failure
/// leaves an existing `path` untouched.
pub fn write_atomic(path: &Path, document: &GraphDocument) -> Result<u64> {
    let bytes = document.to_json_pretty()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let tmp = tmp_path(path);
    let written = fs::File::create(&tmp)
        .and_then(|mut f| {
            f.write_all(&bytes)?;
            f.sync_all()
        })
        .map_err(io_error(&tmp));
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    fs::rename(&tmp, path).map_err(io_error(path))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote graph document");
    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{build_collection, FondsInfo};

    fn empty_document() -> GraphDocument {
        let collection = build_collection(&FondsInfo::default(), &[], &[]);
        GraphDocument::assemble(collection, Vec::new(), Vec::new(), "2026-01-01T00:00:00.000000".to_string())
    }

    #[test]
    fn document_keys_follow_the_vocabulary() {
        let json = serde_json::to_value(empty_document()).expect("serialize");
        for key in [
            crate::vocab::KEY_CONTEXT,
            crate::vocab::KEY_GRAPH,
            crate::vocab::KEY_EXPORT_DATE,
            crate::vocab::KEY_RECORD_COUNT,
            crate::vocab::KEY_CONTAINER_COUNT,
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["@context"]["rico"], crate::vocab::NS_RICO);
        assert_eq!(json["@graph"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn pretty_output_keeps_umlauts() {
        let mut doc = empty_document();
        if let Some(GraphNode::Collection(c)) = doc.graph.first_mut() {
            c.title = "Teilnachlass Ira Malaniuk (Künstlerin)".to_string();
        }
        let text = String::from_utf8(doc.to_json_pretty().expect("json")).expect("utf8");
        assert!(text.contains("Künstlerin"));
        assert!(text.contains("\n  \"@graph\": ["));
    }

    #[test]
    fn atomic_write_replaces_target_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("data").join("m3gim.jsonld");
        fs::create_dir_all(out.parent().expect("parent")).expect("mkdir");
        fs::write(&out, "old").expect("seed");

        let size = write_atomic(&out, &empty_document()).expect("write");

        let text = fs::read_to_string(&out).expect("read");
        assert_eq!(text.len() as u64, size);
        assert!(text.starts_with('{'));
        assert!(!tmp_path(&out).exists());
    }

    #[test]
    fn failed_write_keeps_existing_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("m3gim.jsonld");
        fs::write(&out, "old").expect("seed");
        // A directory in the way of the temp file makes creating it fail.
        fs::create_dir(tmp_path(&out)).expect("block tmp path");

        let err = write_atomic(&out, &empty_document()).unwrap_err();

        match err {
            TransformError::Io { path, .. } => assert_eq!(path, tmp_path(&out)),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read_to_string(&out).expect("read"), "old");
    }
}
