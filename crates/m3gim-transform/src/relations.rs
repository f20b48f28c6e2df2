//! Relation decomposition.
//!
//! A relation row names its owner (signature + optional qualifier), a type
//! expression such as `person` or `ort, datum`, a value, and optional role, date
//! and note. Each row becomes zero or more [`AtomicRelation`]s:
//!
//! - the type is split on commas into lowercase tokens, currency markers dropped;
//! - `ort, datum` rows whose value reads `<place>, <yyyy...>` are split into a
//!   place and a date, every other multi-token row shares its value;
//! - names are resolved against the entity index (Wikidata id, composer).
//!
//! Relations are grouped by owner key for the attacher.

use crate::index::{EntityIndex, EntityKind};
use crate::rows::{is_skipped_signature, RelationRow};
use crate::text::{clean_date, lower, non_empty};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Type tokens that qualify a financial relation without being one.
pub const IGNORED_TOKENS: &[&str] = &["waehrung", "währung"];

fn place_date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+?),\s*(\d{4}.*)$").expect("valid place/date regex"))
}

/// Who or what a relation points at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationTarget {
    pub name: String,
    pub role: Option<String>,
    pub note: Option<String>,
    pub wikidata_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinancialKind {
    Expenses,
    Income,
    Total,
}

impl FinancialKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ausgaben" => Some(Self::Expenses),
            "einnahmen" => Some(Self::Income),
            "summe" => Some(Self::Total),
            _ => None,
        }
    }

    /// Local name of the extension field.
    pub fn key(self) -> &'static str {
        match self {
            Self::Expenses => "ausgaben",
            Self::Income => "einnahmen",
            Self::Total => "summe",
        }
    }
}

/// One typed fact about a record or container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicRelation {
    Person(RelationTarget),
    Organization(RelationTarget),
    Ensemble(RelationTarget),
    Place(RelationTarget),
    Work {
        target: RelationTarget,
        composer: Option<String>,
    },
    Event {
        target: RelationTarget,
        date: Option<String>,
    },
    Role {
        name: String,
        role: Option<String>,
    },
    Date(String),
    Detail {
        key: String,
        value: Option<String>,
    },
    Financial {
        kind: FinancialKind,
        amount: String,
        qualifier: Option<String>,
    },
}

/// Split a type expression into tokens, dropping ignored markers.
pub fn type_tokens(expression: &str) -> Vec<String> {
    expression
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty() && !IGNORED_TOKENS.contains(&t.as_str()))
        .collect()
}

/// Split `<place>, <yyyy...>` into place and cleaned date.
pub fn split_place_date(value: &str) -> Option<(String, String)> {
    let caps = place_date_pattern().captures(value.trim())?;
    let place = caps.get(1)?.as_str().trim().to_string();
    let date = clean_date(caps.get(2).map(|m| m.as_str()))?;
    Some((place, date))
}

fn is_place_date(tokens: &[String]) -> bool {
    tokens.len() == 2
        && tokens.iter().any(|t| t == "ort")
        && tokens.iter().any(|t| t == "datum")
}

/// Owner key: `signature` or `signature qualifier`.
pub fn owner_key(signature: &str, qualifier: Option<&str>) -> String {
    crate::identifier::identifier_string(signature, qualifier)
}

/// Counters for the decomposition pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecomposeStats {
    pub rows: usize,
    pub skipped_rows: usize,
    pub relations: usize,
    pub composite_splits: usize,
    pub broadcasts: usize,
    pub unknown_tokens: usize,
}

/// Relations grouped by owner key; keys keep first-seen order.
#[derive(Debug, Clone, Default)]
pub struct RelationGroups {
    order: Vec<String>,
    groups: HashMap<String, Vec<AtomicRelation>>,
}

impl RelationGroups {
    pub fn push(&mut self, owner: &str, relations: Vec<AtomicRelation>) {
        if relations.is_empty() {
            return;
        }
        match self.groups.get_mut(owner) {
            Some(existing) => existing.extend(relations),
            None => {
                self.order.push(owner.to_string());
                self.groups.insert(owner.to_string(), relations);
            }
        }
    }

    pub fn get(&self, owner: &str) -> Option<&[AtomicRelation]> {
        self.groups.get(owner).map(Vec::as_slice)
    }

    /// Owner keys in first-seen order.
    pub fn owners(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn relation_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

struct Resolver<'a> {
    index: &'a EntityIndex,
    role: Option<String>,
    note: Option<String>,
}

impl Resolver<'_> {
    /// Target for `name`, enriched from the `kind` index. Also returns the composer.
    fn target(&self, kind: EntityKind, name: &str) -> (RelationTarget, Option<String>) {
        let entry = self.index.lookup(kind, name);
        let target = RelationTarget {
            name: name.to_string(),
            role: self.role.clone(),
            note: self.note.clone(),
            wikidata_id: entry.and_then(|e| e.wikidata_id.clone()),
        };
        (target, entry.and_then(|e| e.composer.clone()))
    }
}

/// Decompose one relation row. Returns the owner key and its relations, or `None`
/// for rows that carry nothing (no owner, template row, no type, no value).
pub fn decompose(
    row: &RelationRow,
    index: &EntityIndex,
    stats: &mut DecomposeStats,
) -> Option<(String, Vec<AtomicRelation>)> {
    stats.rows += 1;
    let signature = row.signature.as_deref().map(str::trim);
    let (Some(signature), Some(expression), Some(value)) = (
        signature.filter(|s| !is_skipped_signature(Some(*s))),
        non_empty(row.relation_type.as_deref()),
        non_empty(row.value.as_deref()),
    ) else {
        stats.skipped_rows += 1;
        return None;
    };

    let tokens = type_tokens(&expression);
    let split = if tokens.len() > 1 {
        let split = is_place_date(&tokens).then(|| split_place_date(&value)).flatten();
        if split.is_some() {
            stats.composite_splits += 1;
        } else {
            stats.broadcasts += 1;
        }
        split
    } else {
        None
    };

    let role = lower(row.role.as_deref());
    let note = non_empty(row.note.as_deref());
    let resolver = Resolver {
        index,
        role: role.clone(),
        note: note.clone(),
    };
    let row_date = clean_date(row.date.as_deref());
    let mut out = Vec::with_capacity(tokens.len());

    for token in &tokens {
        let token_value = match (&split, token.as_str()) {
            (Some((place, _)), "ort") => place.as_str(),
            (Some((_, date)), "datum") => date.as_str(),
            _ => value.as_str(),
        };
        let relation = match token.as_str() {
            "person" => Some(AtomicRelation::Person(
                resolver.target(EntityKind::Person, token_value).0,
            )),
            "institution" => Some(AtomicRelation::Organization(
                resolver.target(EntityKind::Organization, token_value).0,
            )),
            "ensemble" => Some(AtomicRelation::Ensemble(
                resolver.target(EntityKind::Organization, token_value).0,
            )),
            "ort" => Some(AtomicRelation::Place(
                resolver.target(EntityKind::Place, token_value).0,
            )),
            "werk" => {
                let (target, composer) = resolver.target(EntityKind::Work, token_value);
                Some(AtomicRelation::Work { target, composer })
            }
            "ereignis" => Some(AtomicRelation::Event {
                target: RelationTarget {
                    name: token_value.to_string(),
                    role: role.clone(),
                    note: note.clone(),
                    wikidata_id: None,
                },
                date: row_date.clone(),
            }),
            "rolle" => Some(AtomicRelation::Role {
                name: token_value.to_string(),
                role: role.clone(),
            }),
            "datum" => {
                let date = match &split {
                    Some((_, date)) => Some(date.clone()),
                    None => row_date.clone().or_else(|| clean_date(Some(token_value))),
                };
                date.map(AtomicRelation::Date)
            }
            "detail" => Some(AtomicRelation::Detail {
                key: token_value.to_string(),
                value: role.clone(),
            }),
            other => match FinancialKind::from_token(other) {
                Some(kind) => Some(AtomicRelation::Financial {
                    kind,
                    amount: token_value.to_string(),
                    qualifier: role.clone(),
                }),
                None => {
                    stats.unknown_tokens += 1;
                    tracing::debug!(line = row.line, token = %other, "unknown relation type token");
                    None
                }
            },
        };
        out.extend(relation);
    }

    stats.relations += out.len();
    let owner = owner_key(signature, row.qualifier.as_deref());
    Some((owner, out))
}

/// Decompose every relation row and group the result by owner key.
pub fn decompose_all(rows: &[RelationRow], index: &EntityIndex) -> (RelationGroups, DecomposeStats) {
    let mut stats = DecomposeStats::default();
    let mut groups = RelationGroups::default();
    for row in rows {
        if let Some((owner, relations)) = decompose(row, index, &mut stats) {
            groups.push(&owner, relations);
        }
    }
    tracing::info!(
        rows = stats.rows,
        relations = stats.relations,
        owners = groups.len(),
        skipped = stats.skipped_rows,
        unknown_tokens = stats.unknown_tokens,
        "decomposed relations"
    );
    (groups, stats)
}
