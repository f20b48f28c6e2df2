//! Containment: fonds → container → record.
//!
//! Records sharing a base signature with at least two distinct qualifiers are
//! grouped under one container (`rico:RecordSet` / `rico:File`). Everything else
//! hangs directly off the collection root, so each record and container has
//! exactly one parent.

use crate::attach::{RelationFields, RelationOwner};
use crate::identifier::{container_id, IdRef, NodeId};
use crate::records::RecordNode;
use crate::vocab::{RECORD_SET_FILE, RECORD_SET_FONDS, TYPE_RECORD_SET};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Identity of the collection root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FondsInfo {
    pub id: String,
    pub identifier: String,
    pub title: String,
}

impl Default for FondsInfo {
    fn default() -> Self {
        Self {
            id: "m3gim:UAKUG_NIM".to_string(),
            identifier: "UAKUG/NIM".to_string(),
            title: "Teilnachlass Ira Malaniuk".to_string(),
        }
    }
}

/// A group of qualified records sharing one signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerNode {
    #[serde(rename = "@id")]
    pub id: NodeId,
    #[serde(rename = "@type")]
    pub node_type: &'static str,
    #[serde(rename = "rico:hasRecordSetType")]
    pub record_set_type: IdRef,
    #[serde(rename = "rico:identifier")]
    pub identifier: String,
    #[serde(rename = "rico:hasOrHadPart")]
    pub parts: Vec<IdRef>,
    #[serde(flatten)]
    pub relations: RelationFields,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, String>,
}

impl RelationOwner for ContainerNode {
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

/// The fonds root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionNode {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub node_type: &'static str,
    #[serde(rename = "rico:hasRecordSetType")]
    pub record_set_type: IdRef,
    #[serde(rename = "rico:identifier")]
    pub identifier: String,
    #[serde(rename = "rico:title")]
    pub title: String,
    #[serde(rename = "rico:hasOrHadPart")]
    pub parts: Vec<IdRef>,
}

/// Drop records whose id an earlier record already produced.
///
/// Returns the kept records (input order) and the ids of the dropped rows.
pub fn dedupe_records(records: Vec<RecordNode>) -> (Vec<RecordNode>, Vec<NodeId>) {
    let mut seen: HashSet<NodeId> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    let mut duplicates = Vec::new();
    for record in records {
        if seen.insert(record.id.clone()) {
            kept.push(record);
        } else {
            tracing::warn!(id = %record.id, line = record.line, "duplicate record id, keeping first row");
            duplicates.push(record.id);
        }
    }
    (kept, duplicates)
}

/// Build containers for signatures with two or more distinct qualifiers.
///
/// Containers are ordered by the first appearance of their signature; members
/// keep input order.
pub fn build_containers(records: &[RecordNode]) -> Vec<ContainerNode> {
    let mut order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, Vec<&RecordNode>> = HashMap::new();
    for record in records.iter().filter(|r| r.qualifier.is_some()) {
        let signature = record.signature.as_str();
        members
            .entry(signature)
            .or_insert_with(|| {
                order.push(signature);
                Vec::new()
            })
            .push(record);
    }

    order
        .into_iter()
        .filter_map(|signature| {
            let group = members.remove(signature)?;
            let distinct: HashSet<&str> = group.iter().filter_map(|r| r.qualifier.as_deref()).collect();
            if distinct.len() < 2 {
                return None;
            }
            Some(ContainerNode {
                id: container_id(signature),
                node_type: TYPE_RECORD_SET,
                record_set_type: IdRef::new(RECORD_SET_FILE),
                identifier: signature.to_string(),
                parts: group.iter().map(|r| IdRef::from(&r.id)).collect(),
                relations: RelationFields::default(),
                extensions: BTreeMap::new(),
            })
        })
        .collect()
}

/// Collection root: every container, then every record not inside a container.
pub fn build_collection(fonds: &FondsInfo, containers: &[ContainerNode], records: &[RecordNode]) -> CollectionNode {
    let contained: HashSet<&str> = containers
        .iter()
        .flat_map(|c| c.parts.iter().map(|p| p.id.as_str()))
        .collect();

    let parts = containers
        .iter()
        .map(|c| IdRef::from(&c.id))
        .chain(
            records
                .iter()
                .filter(|r| !contained.contains(r.id.as_str()))
                .map(|r| IdRef::from(&r.id)),
        )
        .collect();

    CollectionNode {
        id: fonds.id.clone(),
        node_type: TYPE_RECORD_SET,
        record_set_type: IdRef::new(RECORD_SET_FONDS),
        identifier: fonds.identifier.clone(),
        title: fonds.title.clone(),
        parts,
    }
}
