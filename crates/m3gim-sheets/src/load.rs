//! CSV loading for sheet exports.
//!
//! Exports are read without trusting the first line as a header (the header
//! defects are repaired later, with the raw text still available), with flexible
//! row widths, and with a UTF-8 byte order mark tolerated.

use crate::{SheetError, Table};
use std::io::Read;
use std::path::Path;

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

/// Read a table from any CSV source. The first record is the header row.
pub fn read_table_from_reader<R: Read>(name: &str, reader: R) -> Result<Table, SheetError> {
    let mut rdr = csv_reader(reader);
    let mut records: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|source| SheetError::Csv {
            table: name.to_string(),
            source,
        })?;
        records.push(record.iter().map(|c| c.to_string()).collect());
    }
    let table = Table::from_records(name, records)?;
    tracing::debug!(table = %name, rows = table.len(), columns = table.headers().len(), "loaded table");
    Ok(table)
}

/// Read a required table; a missing file is a structural error.
pub fn read_table(name: &str, path: &Path) -> Result<Table, SheetError> {
    if !path.exists() {
        return Err(SheetError::Missing {
            table: name.to_string(),
            path: path.to_path_buf(),
        });
    }
    let file = std::fs::File::open(path).map_err(|e| SheetError::Csv {
        table: name.to_string(),
        source: csv::Error::from(e),
    })?;
    read_table_from_reader(name, std::io::BufReader::new(file))
}

/// Read an optional table; a missing file yields `None` and a warning.
pub fn read_optional_table(name: &str, path: &Path) -> Result<Option<Table>, SheetError> {
    if !path.exists() {
        tracing::warn!(table = %name, path = %path.display(), "optional table not found");
        return Ok(None);
    }
    read_table(name, path).map(Some)
}
