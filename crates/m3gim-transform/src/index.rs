//! Entity indices: person, organization, place and work lookup tables.
//!
//! Each index sheet becomes a map from case-folded name to [`IndexEntry`]. The
//! maps are built once per run (header repair first, reconciliation cache
//! second) and are read-only afterwards.

use crate::reconciliation::ReconciliationCache;
use crate::text::non_empty;
use m3gim_sheets::{
    repair_header_shift, Table, ORGANIZATION_INDEX_HEADERS, PLACE_INDEX_HEADERS, WORK_INDEX_HEADERS,
};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Person,
    Organization,
    Place,
    Work,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::Person, Self::Organization, Self::Place, Self::Work];

    /// `type` value used by the reconciliation cache.
    pub fn cache_type(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Organization => "org",
            Self::Place => "location",
            Self::Work => "work",
        }
    }

    /// Sheet name, as in `M3GIM-<sheet>.csv`.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Self::Person => "Personenindex",
            Self::Organization => "Organisationsindex",
            Self::Place => "Ortsindex",
            Self::Work => "Werkindex",
        }
    }

    /// Header list used to repair a shifted header row, if the sheet has one.
    pub fn expected_headers(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Person => None,
            Self::Organization => Some(ORGANIZATION_INDEX_HEADERS),
            Self::Place => Some(PLACE_INDEX_HEADERS),
            Self::Work => Some(WORK_INDEX_HEADERS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikidata_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gnd_id: Option<String>,
    #[serde(rename = "anmerkung", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "komponist", skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
}

/// Counters from building one index table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub rows: usize,
    pub entries: usize,
    pub skipped_rows: usize,
    pub duplicate_names: usize,
    pub header_repaired: bool,
    pub reconciled: usize,
}

/// Name-keyed lookup for one entity kind.
#[derive(Debug, Clone, Default)]
pub struct IndexTable {
    entries: HashMap<String, IndexEntry>,
}

impl IndexTable {
    /// Build a lookup from an index sheet. `name` is preferred, `titel` is the fallback
    /// name column; rows without a name are skipped and the last duplicate wins.
    pub fn from_table(kind: EntityKind, table: &Table) -> (Self, IndexStats) {
        let mut stats = IndexStats {
            rows: table.len(),
            ..IndexStats::default()
        };
        let name_column = if table.has_column("name") { "name" } else { "titel" };
        let mut entries = HashMap::new();

        for row in table.rows() {
            let Some(name) = non_empty(row.get(name_column)) else {
                stats.skipped_rows += 1;
                continue;
            };
            let entry = IndexEntry {
                wikidata_id: non_empty(row.get("wikidata_id")),
                gnd_id: non_empty(row.get("gnd_id")),
                note: non_empty(row.get("anmerkung")),
                composer: non_empty(row.get("komponist")),
                name,
            };
            if let Some(previous) = entries.insert(entry.name.to_lowercase(), entry) {
                stats.duplicate_names += 1;
                tracing::warn!(
                    index = kind.sheet_name(),
                    name = %previous.name,
                    line = row.line(),
                    "duplicate index name, later row wins"
                );
            }
        }

        stats.entries = entries.len();
        (Self { entries }, stats)
    }

    pub fn get(&self, name: &str) -> Option<&IndexEntry> {
        self.entries.get(&name.trim().to_lowercase())
    }

    /// Entries sorted by key.
    pub fn entries(&self) -> Vec<&IndexEntry> {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        keys.into_iter().filter_map(|k| self.entries.get(k)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fill missing Wikidata ids from the cache. Returns how many entries changed.
    fn apply_reconciliation(&mut self, kind: EntityKind, cache: &ReconciliationCache) -> usize {
        let matches = cache.matches_for(kind);
        let mut filled = 0;
        for (key, entry) in self.entries.iter_mut() {
            if entry.wikidata_id.is_some() {
                continue;
            }
            if let Some(m) = matches.get(key) {
                entry.wikidata_id = Some(m.qid.trim().to_string());
                filled += 1;
            }
        }
        filled
    }
}

/// The four lookups, frozen after [`EntityIndex::build`].
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    persons: IndexTable,
    organizations: IndexTable,
    places: IndexTable,
    works: IndexTable,
}

/// Index sheets as loaded; absent sheets give empty lookups.
#[derive(Debug, Clone, Default)]
pub struct IndexTables {
    pub persons: Option<Table>,
    pub organizations: Option<Table>,
    pub places: Option<Table>,
    pub works: Option<Table>,
}

impl IndexTables {
    fn take(&mut self, kind: EntityKind) -> Option<Table> {
        match kind {
            EntityKind::Person => self.persons.take(),
            EntityKind::Organization => self.organizations.take(),
            EntityKind::Place => self.places.take(),
            EntityKind::Work => self.works.take(),
        }
    }
}

impl EntityIndex {
    pub fn build(
        mut tables: IndexTables,
        cache: Option<&ReconciliationCache>,
    ) -> (Self, Vec<(EntityKind, IndexStats)>) {
        let mut index = Self::default();
        let mut report = Vec::with_capacity(EntityKind::ALL.len());

        for kind in EntityKind::ALL {
            let Some(mut table) = tables.take(kind) else {
                tracing::warn!(index = kind.sheet_name(), "index table absent, lookups stay empty");
                continue;
            };
            let repaired = kind
                .expected_headers()
                .is_some_and(|expected| repair_header_shift(&mut table, expected));
            let (mut lookup, mut stats) = IndexTable::from_table(kind, &table);
            stats.header_repaired = repaired;
            if let Some(cache) = cache {
                stats.reconciled = lookup.apply_reconciliation(kind, cache);
            }
            tracing::info!(
                index = kind.sheet_name(),
                entries = stats.entries,
                duplicates = stats.duplicate_names,
                reconciled = stats.reconciled,
                "built index"
            );
            *index.table_mut(kind) = lookup;
            report.push((kind, stats));
        }

        (index, report)
    }

    pub fn table(&self, kind: EntityKind) -> &IndexTable {
        match kind {
            EntityKind::Person => &self.persons,
            EntityKind::Organization => &self.organizations,
            EntityKind::Place => &self.places,
            EntityKind::Work => &self.works,
        }
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut IndexTable {
        match kind {
            EntityKind::Person => &mut self.persons,
            EntityKind::Organization => &mut self.organizations,
            EntityKind::Place => &mut self.places,
            EntityKind::Work => &mut self.works,
        }
    }

    pub fn lookup(&self, kind: EntityKind, name: &str) -> Option<&IndexEntry> {
        self.table(kind).get(name)
    }
}
