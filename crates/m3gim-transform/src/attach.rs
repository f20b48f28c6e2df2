//! Relation attachment.
//!
//! Decomposed relations are bucketed into the structured fields of the node
//! whose identifier string equals the owner key. A relation declared on a base
//! signature lands on every node carrying that identifier string (a container
//! and an unqualified record can share one).
//!
//! Serialized field shape:
//!
//! - no entries: key omitted
//! - one entry: the entry itself
//! - several entries: a list, in attachment order

use crate::relations::{AtomicRelation, RelationGroups, RelationTarget};
use crate::vocab::{
    extension_key, is_mention_role, wikidata_ref, FIXED_NODE_KEYS, TYPE_CORPORATE_BODY,
    TYPE_GROUP, TYPE_MUSICAL_WORK, TYPE_PERSON,
};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};

/// Serialize a list as a single value when it has exactly one element.
#[allow(clippy::ptr_arg)]
pub fn compact<S, T>(values: &Vec<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    match values.as_slice() {
        [single] => single.serialize(serializer),
        _ => values.serialize(serializer),
    }
}

/// Entry of an agent, location, subject or mention field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationEntry {
    pub name: String,
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "komponist", skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl RelationEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn from_target(target: &RelationTarget, entry_type: Option<&'static str>) -> Self {
        Self {
            name: target.name.clone(),
            id: target.wikidata_id.as_deref().and_then(wikidata_ref),
            entry_type,
            role: target.role.clone(),
            ..Self::default()
        }
    }
}

/// `m3gim:hasPerformanceRole` entry; `role` is emitted as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceRole {
    pub name: String,
    pub role: Option<String>,
}

/// Relation-derived fields shared by records and containers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationFields {
    #[serde(rename = "rico:hasOrHadAgent", skip_serializing_if = "Vec::is_empty", serialize_with = "compact")]
    pub agents: Vec<RelationEntry>,
    #[serde(rename = "rico:hasOrHadLocation", skip_serializing_if = "Vec::is_empty", serialize_with = "compact")]
    pub locations: Vec<RelationEntry>,
    #[serde(rename = "rico:hasOrHadSubject", skip_serializing_if = "Vec::is_empty", serialize_with = "compact")]
    pub subjects: Vec<RelationEntry>,
    #[serde(rename = "m3gim:mentions", skip_serializing_if = "Vec::is_empty", serialize_with = "compact")]
    pub mentions: Vec<RelationEntry>,
    #[serde(rename = "rico:isAssociatedWithDate", skip_serializing_if = "Vec::is_empty", serialize_with = "compact")]
    pub dates: Vec<String>,
    #[serde(rename = "m3gim:hasPerformanceRole", skip_serializing_if = "Vec::is_empty", serialize_with = "compact")]
    pub performance_roles: Vec<PerformanceRole>,
}

/// A graph node that can receive relations.
pub trait RelationOwner {
    /// Identifier string relations are matched against.
    fn identifier(&self) -> &str;
    fn relation_fields_mut(&mut self) -> &mut RelationFields;
    fn extensions_mut(&mut self) -> &mut BTreeMap<String, String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachStats {
    pub nodes_touched: usize,
    pub relations_attached: usize,
    /// Owner keys that matched no record or container.
    pub unattached_owners: Vec<String>,
    /// Extension keys refused because they name a fixed node field.
    pub refused_extension_keys: Vec<String>,
}

fn set_extension<N: RelationOwner + ?Sized>(node: &mut N, local: &str, value: String, stats: &mut AttachStats) {
    let key = extension_key(local.trim());
    if FIXED_NODE_KEYS.contains(&key.as_str()) {
        tracing::warn!(node = %node.identifier(), key = %key, "extension key names a fixed field, skipped");
        stats.refused_extension_keys.push(key);
        return;
    }
    node.extensions_mut().insert(key, value);
}

/// Bucket one owner's relations into `node`.
pub fn apply_relations<N: RelationOwner + ?Sized>(node: &mut N, relations: &[AtomicRelation], stats: &mut AttachStats) {
    for relation in relations {
        match relation {
            AtomicRelation::Person(target) if is_mention_role(target.role.as_deref()) => {
                let entry = RelationEntry::from_target(target, None);
                node.relation_fields_mut().mentions.push(entry);
            }
            AtomicRelation::Person(target) => {
                let entry = RelationEntry::from_target(target, Some(TYPE_PERSON));
                node.relation_fields_mut().agents.push(entry);
            }
            AtomicRelation::Organization(target) => {
                let entry = RelationEntry::from_target(target, Some(TYPE_CORPORATE_BODY));
                node.relation_fields_mut().agents.push(entry);
            }
            AtomicRelation::Ensemble(target) => {
                let entry = RelationEntry::from_target(target, Some(TYPE_GROUP));
                node.relation_fields_mut().agents.push(entry);
            }
            AtomicRelation::Place(target) => {
                let entry = RelationEntry::from_target(target, None);
                node.relation_fields_mut().locations.push(entry);
            }
            AtomicRelation::Work { target, composer } => {
                let entry = RelationEntry {
                    composer: composer.clone(),
                    ..RelationEntry::from_target(target, Some(TYPE_MUSICAL_WORK))
                };
                node.relation_fields_mut().subjects.push(entry);
            }
            AtomicRelation::Event { target, date } => {
                let entry = RelationEntry {
                    date: date.clone(),
                    ..RelationEntry::from_target(target, None)
                };
                node.relation_fields_mut().subjects.push(entry);
            }
            AtomicRelation::Role { name, role } => {
                node.relation_fields_mut().performance_roles.push(PerformanceRole {
                    name: name.clone(),
                    role: role.clone(),
                });
            }
            AtomicRelation::Date(date) => node.relation_fields_mut().dates.push(date.clone()),
            AtomicRelation::Detail { key, value } => {
                // A detail without a value carries nothing.
                if let Some(value) = value {
                    set_extension(node, key, value.clone(), stats);
                }
            }
            AtomicRelation::Financial { kind, amount, qualifier } => {
                let value = match qualifier {
                    Some(q) => format!("{amount} {q}"),
                    None => amount.clone(),
                };
                set_extension(node, kind.key(), value, stats);
            }
        }
        stats.relations_attached += 1;
    }
}

/// Attach every group to the nodes whose identifier string matches its owner key.
pub fn attach_all(nodes: &mut [&mut dyn RelationOwner], groups: &RelationGroups) -> AttachStats {
    let mut stats = AttachStats::default();
    let mut seen: HashSet<String> = HashSet::new();

    for node in nodes.iter_mut() {
        let Some(relations) = groups.get(node.identifier()) else {
            continue;
        };
        seen.insert(node.identifier().to_string());
        apply_relations(&mut **node, relations, &mut stats);
        stats.nodes_touched += 1;
    }

    for owner in groups.owners().filter(|o| !seen.contains(*o)) {
        tracing::warn!(owner = %owner, "relations reference no record or container");
        stats.unattached_owners.push(owner.to_string());
    }
    stats
}
