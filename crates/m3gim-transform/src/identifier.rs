//! Node identifiers derived from archival signatures.
//!
//! ```text
//! UAKUG/NIM_028            → m3gim:NIM_028
//! UAKUG/NIM_003 + 1_1      → m3gim:NIM_003_1_1
//! UAKUG/NIM/PL_07          → m3gim:NIM_PL_07
//! UAKUG/NIM_003 (as set)   → m3gim:NIM_003/set
//! ```
//!
//! Record ids never contain `/` (every separator is rewritten to `_`), which keeps
//! container ids disjoint from record ids for any input.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace prefix stripped from signatures.
pub const SIGNATURE_PREFIX: &str = "UAKUG/";

/// Compact-IRI prefix of every node id.
pub const ID_PREFIX: &str = "m3gim:";

const CONTAINER_SUFFIX: &str = "/set";

/// Graph node identifier (compact IRI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// `{"@id": ...}` reference object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    #[serde(rename = "@id")]
    pub id: String,
}

impl IdRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl From<&NodeId> for IdRef {
    fn from(id: &NodeId) -> Self {
        Self::new(id.as_str())
    }
}

fn local_part(signature: &str) -> String {
    signature.trim().replace(SIGNATURE_PREFIX, "").replace('/', "_")
}

/// Identifier of a record row.
pub fn record_id(signature: &str, qualifier: Option<&str>) -> NodeId {
    let mut local = local_part(signature);
    if let Some(q) = qualifier.map(str::trim).filter(|q| !q.is_empty()) {
        local.push('_');
        local.push_str(&q.split_whitespace().collect::<Vec<_>>().join("_"));
    }
    NodeId(format!("{ID_PREFIX}{local}"))
}

/// Identifier of the container grouping all qualified rows of `signature`.
pub fn container_id(signature: &str) -> NodeId {
    NodeId(format!("{ID_PREFIX}{}{CONTAINER_SUFFIX}", local_part(signature)))
}

/// Human-facing identifier: `signature` or `signature qualifier`.
pub fn identifier_string(signature: &str, qualifier: Option<&str>) -> String {
    let signature = signature.trim();
    match qualifier.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => format!("{signature} {q}"),
        None => signature.to_string(),
    }
}
