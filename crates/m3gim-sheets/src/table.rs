//! Named-field tables.

use crate::SheetError;

/// One exported sheet: a header row plus data rows.
///
/// Rows are stored positionally; [`Row::get`] resolves a column name against the
/// normalized headers. Every data row is padded to the header width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    name: String,
    /// Header cells as written in the sheet (trimmed only).
    raw_headers: Vec<String>,
    /// Normalized header names used for lookups.
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

/// Normalize a header cell: trim + lowercase, empty headers get the
/// `unnamed: <index>` placeholder spreadsheet exporters use.
pub fn normalize_header(raw: &str, index: usize) -> String {
    let trimmed = raw.trim().trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        format!("unnamed: {index}")
    } else {
        trimmed.to_lowercase()
    }
}

fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl Table {
    /// Build a table from a header row and raw data rows.
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self {
            name: name.into(),
            raw_headers: Vec::new(),
            headers: Vec::new(),
            rows: Vec::with_capacity(rows.len()),
        };
        table.set_headers(headers);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Build a table from raw records where the first record is the header row.
    pub fn from_records(name: impl Into<String>, records: Vec<Vec<String>>) -> Result<Self, SheetError> {
        let name = name.into();
        let mut records = records.into_iter();
        let Some(headers) = records.next() else {
            return Err(SheetError::NoHeader { table: name });
        };
        if headers.iter().all(|h| h.trim().trim_start_matches('\u{feff}').is_empty()) {
            return Err(SheetError::NoHeader { table: name });
        }
        Ok(Self::new(name, headers, records.collect()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn raw_headers(&self) -> &[String] {
        &self.raw_headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column position for a (case-insensitive) column name.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        let wanted = column.trim().to_lowercase();
        self.headers.iter().position(|h| *h == wanted)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row { table: self, index })
    }

    /// Non-empty values of one column, in row order.
    pub fn column_values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a str> + 'a {
        let index = self.column_index(column);
        self.rows.iter().filter_map(move |cells| {
            index
                .and_then(|i| cells.get(i))
                .and_then(|cell| cell.as_deref())
        })
    }

    /// Replace the header row; rows are re-padded to the new width.
    pub fn set_headers(&mut self, headers: Vec<String>) {
        self.raw_headers = headers.iter().map(|h| h.trim().to_string()).collect();
        self.headers = headers
            .iter()
            .enumerate()
            .map(|(i, h)| normalize_header(h, i))
            .collect();
        let width = self.headers.len();
        for cells in &mut self.rows {
            cells.resize(width, None);
        }
    }

    /// Insert a raw row at `position` (clamped to the table length).
    pub fn insert_row(&mut self, position: usize, row: Vec<String>) {
        let cells = self.normalize_row(row);
        let position = position.min(self.rows.len());
        self.rows.insert(position, cells);
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        let cells = self.normalize_row(row);
        self.rows.push(cells);
    }

    fn normalize_row(&mut self, row: Vec<String>) -> Vec<Option<String>> {
        // Rows wider than the header get placeholder columns.
        while self.headers.len() < row.len() {
            let index = self.headers.len();
            self.raw_headers.push(String::new());
            self.headers.push(normalize_header("", index));
            for cells in &mut self.rows {
                cells.push(None);
            }
        }
        let mut cells: Vec<Option<String>> = row.iter().map(|c| normalize_cell(c)).collect();
        cells.resize(self.headers.len(), None);
        cells
    }
}

/// A borrowed view of one data row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    /// Sheet line number (1-based, header on line 1).
    pub fn line(&self) -> usize {
        self.index + 2
    }

    /// Trimmed, non-empty value of a column. Missing columns read as absent.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let col = self.table.column_index(column)?;
        self.cell(col)
    }

    /// Value at a column position.
    pub fn cell(&self, column: usize) -> Option<&'a str> {
        self.table
            .rows
            .get(self.index)
            .and_then(|cells| cells.get(column))
            .and_then(|cell| cell.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn headers_are_normalized_and_cells_trimmed() {
        let table = Table::new(
            "Objekte",
            strings(&["\u{feff}Archivsignatur ", "", "Titel"]),
            vec![strings(&[" UAKUG/NIM_001 ", "1_1", "  "])],
        );

        assert_eq!(table.headers(), &["archivsignatur", "unnamed: 1", "titel"]);
        let row = table.row(0).expect("row");
        assert_eq!(row.get("ARCHIVSIGNATUR"), Some("UAKUG/NIM_001"));
        assert_eq!(row.get("unnamed: 1"), Some("1_1"));
        assert_eq!(row.get("titel"), None);
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.line(), 2);
    }

    #[test]
    fn short_rows_are_padded_and_wide_rows_extend_headers() {
        let table = Table::new(
            "t",
            strings(&["a", "b"]),
            vec![strings(&["1"]), strings(&["1", "2", "3"])],
        );

        assert_eq!(table.headers().len(), 3);
        assert_eq!(table.headers()[2], "unnamed: 2");
        assert_eq!(table.row(0).and_then(|r| r.get("b")), None);
        assert_eq!(table.row(1).and_then(|r| r.get("unnamed: 2")), Some("3"));
    }

    #[test]
    fn from_records_requires_a_header() {
        let err = Table::from_records("empty", Vec::new()).unwrap_err();
        assert!(matches!(err, SheetError::NoHeader { .. }));

        let err = Table::from_records("blank", vec![strings(&["", " "])]).unwrap_err();
        assert!(matches!(err, SheetError::NoHeader { .. }));
    }

    #[test]
    fn column_values_skip_empty_cells() {
        let table = Table::new(
            "t",
            strings(&["folio"]),
            vec![strings(&[""]), strings(&["1_1"]), strings(&["1_2"])],
        );
        let values: Vec<&str> = table.column_values("folio").collect();
        assert_eq!(values, vec!["1_1", "1_2"]);
    }
}
