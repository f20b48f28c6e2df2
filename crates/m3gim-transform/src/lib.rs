//! M³GIM catalog → RiC-O JSON-LD transform.
//!
//! Input: the catalog sheets as [`m3gim_sheets::Table`]s. Output: one
//! [`GraphDocument`] holding the fonds root, the containers and every record.
//!
//! Pipeline (single pass, in this order):
//!
//! - **index**: build the four entity lookups once (header repair, optional
//!   reconciliation cache), then freeze them;
//! - **records**: convert object rows, then photograph rows, dropping duplicate ids;
//! - **hierarchy**: group qualified records into containers;
//! - **relations**: decompose relation rows and attach them to matching nodes;
//! - **graph**: collection root last, then assemble.
//!
//! The core never prints. Row-level problems are skipped and counted in the
//! [`TransformReport`]; structural problems are [`TransformError`]s.

pub mod attach;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod identifier;
pub mod index;
pub mod input;
pub mod reconciliation;
pub mod records;
pub mod relations;
pub mod rows;
pub mod text;
pub mod vocab;

pub use attach::{AttachStats, RelationEntry, RelationFields, RelationOwner};
pub use error::{Result, TransformError};
pub use graph::{write_atomic, GraphDocument, GraphNode, EXPORT_DATE_FORMAT};
pub use hierarchy::{CollectionNode, ContainerNode, FondsInfo};
pub use identifier::{container_id, identifier_string, record_id, IdRef, NodeId};
pub use index::{EntityIndex, EntityKind, IndexEntry, IndexStats, IndexTables};
pub use input::{load_cache, load_sheets, SheetPaths};
pub use reconciliation::{ReconciliationCache, ReconciliationStatus};
pub use records::{RecordNode, WorkflowStatus};
pub use relations::{AtomicRelation, DecomposeStats, RelationGroups};

use crate::rows::{CatalogRow, RelationRow};
use chrono::NaiveDateTime;
use m3gim_sheets::{detect_qualifier_column, relation_qualifier_column, Table};

// ============================================================================
// Inputs / options / report
// ============================================================================

/// Every sheet the transform reads. Only the object table is required.
#[derive(Debug, Clone, Default)]
pub struct SheetSet {
    pub objects: Table,
    pub photographs: Option<Table>,
    pub relations: Option<Table>,
    pub indices: IndexTables,
}

#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    pub fonds: FondsInfo,
    /// Fixed export timestamp; the current local time when unset.
    pub export_date: Option<NaiveDateTime>,
}

impl TransformOptions {
    fn export_date(&self) -> String {
        self.export_date
            .unwrap_or_else(|| chrono::Local::now().naive_local())
            .format(EXPORT_DATE_FORMAT)
            .to_string()
    }
}

/// What happened during one run.
#[derive(Debug, Clone, Default)]
pub struct TransformReport {
    pub object_rows: usize,
    pub photograph_rows: usize,
    /// Catalog rows without a usable signature (blank or template).
    pub skipped_rows: usize,
    pub qualifier_column: Option<String>,
    pub duplicate_ids: Vec<NodeId>,
    pub records: usize,
    pub containers: usize,
    pub graph_nodes: usize,
    pub index: Vec<(EntityKind, IndexStats)>,
    pub relations: DecomposeStats,
    pub attach: AttachStats,
}

// ============================================================================
// Pipeline
// ============================================================================

fn convert_rows<'a>(
    rows: impl Iterator<Item = CatalogRow> + 'a,
    index: &'a EntityIndex,
    skipped: &'a mut usize,
) -> impl Iterator<Item = RecordNode> + 'a {
    rows.filter_map(move |row| {
        let node = records::convert(&row, index);
        if node.is_none() {
            *skipped += 1;
        }
        node
    })
}

/// Run the whole transform over in-memory sheets.
pub fn transform(
    sheets: SheetSet,
    cache: Option<&ReconciliationCache>,
    options: &TransformOptions,
) -> Result<(GraphDocument, TransformReport)> {
    let SheetSet {
        objects,
        photographs,
        relations: relation_table,
        indices,
    } = sheets;

    if !objects.has_column(rows::columns::SIGNATURE) {
        return Err(TransformError::MissingSignatureColumn {
            table: objects.name().to_string(),
        });
    }
    if objects.is_empty() {
        return Err(TransformError::EmptyObjectTable {
            table: objects.name().to_string(),
        });
    }

    let mut report = TransformReport::default();
    let (index, index_report) = EntityIndex::build(indices, cache);
    report.index = index_report;

    // Records: objects first, then photographs.
    let qualifier_column = detect_qualifier_column(&objects);
    if let Some(column) = &qualifier_column {
        tracing::info!(column = %column, "detected qualifier column");
    }
    report.object_rows = objects.len();
    report.photograph_rows = photographs.as_ref().map_or(0, Table::len);

    let object_rows = objects
        .rows()
        .map(|row| CatalogRow::object(&row, qualifier_column.as_deref()));
    let photo_rows = photographs
        .iter()
        .flat_map(|table| table.rows().map(|row| CatalogRow::photograph(&row)));
    let converted: Vec<RecordNode> =
        convert_rows(object_rows.chain(photo_rows), &index, &mut report.skipped_rows).collect();
    report.qualifier_column = qualifier_column;

    let (mut records, duplicates) = hierarchy::dedupe_records(converted);
    report.duplicate_ids = duplicates;

    let mut containers = hierarchy::build_containers(&records);

    // Relations.
    if let Some(table) = &relation_table {
        let column = relation_qualifier_column(table);
        let relation_rows: Vec<RelationRow> = table
            .rows()
            .map(|row| RelationRow::from_row(&row, column.as_deref()))
            .collect();
        let (groups, stats) = relations::decompose_all(&relation_rows, &index);
        report.relations = stats;

        let mut owners: Vec<&mut dyn RelationOwner> = Vec::with_capacity(records.len() + containers.len());
        for record in records.iter_mut() {
            owners.push(record);
        }
        for container in containers.iter_mut() {
            owners.push(container);
        }
        report.attach = attach::attach_all(&mut owners, &groups);
    } else {
        tracing::warn!("no relation table, records carry no relations");
    }

    // Collection membership is computed after everything else is final.
    let collection = hierarchy::build_collection(&options.fonds, &containers, &records);

    report.records = records.len();
    report.containers = containers.len();
    report.graph_nodes = 1 + records.len() + containers.len();

    let document = GraphDocument::assemble(collection, containers, records, options.export_date());
    tracing::info!(
        records = report.records,
        containers = report.containers,
        duplicates = report.duplicate_ids.len(),
        unattached = report.attach.unattached_owners.len(),
        "transform complete"
    );
    Ok((document, report))
}
