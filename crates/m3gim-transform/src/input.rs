//! Sheet exports on disk.
//!
//! A data directory holds one CSV export per sheet, named `M3GIM-<sheet>.csv`.

use crate::error::Result;
use crate::index::{EntityKind, IndexTables};
use crate::reconciliation::ReconciliationCache;
use crate::SheetSet;
use m3gim_sheets::{read_optional_table, read_table, Table};
use std::path::{Path, PathBuf};

pub const OBJECTS_FILE: &str = "M3GIM-Objekte.csv";
pub const PHOTOGRAPHS_FILE: &str = "M3GIM-Fotos.csv";
pub const RELATIONS_FILE: &str = "M3GIM-Verknuepfungen.csv";
/// Umlaut spelling, used when the transliterated file is absent.
pub const RELATIONS_FILE_ALT: &str = "M3GIM-Verknüpfungen.csv";
pub const RECONCILIATION_FILE: &str = "wikidata-reconciliation.json";

pub fn index_file(kind: EntityKind) -> String {
    format!("M3GIM-{}.csv", kind.sheet_name())
}

/// Resolved input locations for one data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPaths {
    pub objects: PathBuf,
    pub photographs: PathBuf,
    pub relations: PathBuf,
    pub persons: PathBuf,
    pub organizations: PathBuf,
    pub places: PathBuf,
    pub works: PathBuf,
}

impl SheetPaths {
    pub fn in_dir(dir: &Path) -> Self {
        let relations = dir.join(RELATIONS_FILE);
        let relations = if !relations.exists() && dir.join(RELATIONS_FILE_ALT).exists() {
            dir.join(RELATIONS_FILE_ALT)
        } else {
            relations
        };
        Self {
            objects: dir.join(OBJECTS_FILE),
            photographs: dir.join(PHOTOGRAPHS_FILE),
            relations,
            persons: dir.join(index_file(EntityKind::Person)),
            organizations: dir.join(index_file(EntityKind::Organization)),
            places: dir.join(index_file(EntityKind::Place)),
            works: dir.join(index_file(EntityKind::Work)),
        }
    }

    pub fn index(&self, kind: EntityKind) -> &Path {
        match kind {
            EntityKind::Person => &self.persons,
            EntityKind::Organization => &self.organizations,
            EntityKind::Place => &self.places,
            EntityKind::Work => &self.works,
        }
    }
}

fn optional_index(kind: EntityKind, paths: &SheetPaths) -> Result<Option<Table>> {
    Ok(read_optional_table(kind.sheet_name(), paths.index(kind))?)
}

/// Load the four index sheets; absent ones stay `None`.
pub fn load_indices(paths: &SheetPaths) -> Result<IndexTables> {
    Ok(IndexTables {
        persons: optional_index(EntityKind::Person, paths)?,
        organizations: optional_index(EntityKind::Organization, paths)?,
        places: optional_index(EntityKind::Place, paths)?,
        works: optional_index(EntityKind::Work, paths)?,
    })
}

/// Load every sheet. The object sheet is required.
pub fn load_sheets(paths: &SheetPaths) -> Result<SheetSet> {
    Ok(SheetSet {
        objects: read_table("Objekte", &paths.objects)?,
        photographs: read_optional_table("Fotos", &paths.photographs)?,
        relations: read_optional_table("Verknuepfungen", &paths.relations)?,
        indices: load_indices(paths)?,
    })
}

/// Load the reconciliation cache when the file exists.
pub fn load_cache(path: &Path) -> Result<Option<ReconciliationCache>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no reconciliation cache");
        return Ok(None);
    }
    ReconciliationCache::load(path).map(Some)
}
