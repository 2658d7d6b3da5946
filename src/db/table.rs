//! Tabular query results: ordered named columns × rows of scalar cells.
//!
//! Every aggregation hands its result to two consumers: the JSON API,
//! which wants an array of records, and the report, which needs column
//! headers in query order. `Table` keeps both views available without
//! committing to a per-query struct.

use rusqlite::types::ValueRef;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A single scalar value from a result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    /// Numeric view of the cell. Text is parsed when it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Real(v) => Some(*v),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Null => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(v) => Some(*v),
            Cell::Real(v) => Some(v.round() as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Integer(v) => write!(f, "{v}"),
            Cell::Real(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(v) => Cell::Integer(v),
            ValueRef::Real(v) => Cell::Real(v),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Cell::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TableError {
    #[error("Column not found in result set: {0}")]
    MissingColumn(String),
}

/// Rows × named columns, in query order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with `Null`, long rows truncated,
    /// so every row always matches the column count.
    pub fn push_row(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Null);
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Cell at `row` for the named column.
    pub fn cell(&self, row: usize, column: &str) -> Result<Option<&Cell>, TableError> {
        let idx = self.column_index(column)?;
        Ok(self.rows.get(row).and_then(|r| r.get(idx)))
    }

    /// Every value of a column rendered as text (`Null` → empty string).
    pub fn texts(&self, column: &str) -> Result<Vec<String>, TableError> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|r| r[idx].to_string()).collect())
    }

    /// Every value of a column as a number (`Null`/non-numeric → 0.0).
    pub fn numbers(&self, column: &str) -> Result<Vec<f64>, TableError> {
        let idx = self.column_index(column)?;
        Ok(self
            .rows
            .iter()
            .map(|r| r[idx].as_f64().unwrap_or(0.0))
            .collect())
    }

    /// Sum of a numeric column.
    pub fn sum(&self, column: &str) -> Result<f64, TableError> {
        Ok(self.numbers(column)?.iter().sum())
    }

    /// First-row integer value of a column; `None` on an empty table or NULL.
    pub fn scalar_i64(&self, column: &str) -> Result<Option<i64>, TableError> {
        Ok(self.cell(0, column)?.and_then(Cell::as_i64))
    }

    /// First-row numeric value of a column; `None` on an empty table or NULL.
    pub fn scalar_f64(&self, column: &str) -> Result<Option<f64>, TableError> {
        Ok(self.cell(0, column)?.and_then(Cell::as_f64))
    }
}

/// One row viewed as a `column → value` record.
struct Record<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(column, cell)?;
        }
        map.end()
    }
}

/// Serializes as an array of records, one object per row.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for cells in &self.rows {
            seq.serialize_element(&Record {
                columns: &self.columns,
                cells,
            })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec!["especialidad".into(), "total_citas".into()]);
        table.push_row(vec![Cell::Text("Cardiología".into()), Cell::Integer(7)]);
        table.push_row(vec![Cell::Text("Pediatría".into()), Cell::Integer(3)]);
        table
    }

    #[test]
    fn serializes_as_records_in_column_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"[{"especialidad":"Cardiología","total_citas":7},{"especialidad":"Pediatría","total_citas":3}]"#
        );
    }

    #[test]
    fn empty_table_serializes_as_empty_array() {
        let table = Table::new(vec!["a".into()]);
        assert_eq!(serde_json::to_value(&table).unwrap(), serde_json::json!([]));
    }

    #[test]
    fn null_cells_serialize_as_null() {
        let mut table = Table::new(vec!["sede_nombre".into()]);
        table.push_row(vec![Cell::Null]);
        let json = serde_json::to_value(&table).unwrap();
        assert!(json[0]["sede_nombre"].is_null());
    }

    #[test]
    fn missing_column_is_reported() {
        let err = sample().numbers("cantidad").unwrap_err();
        assert_eq!(err, TableError::MissingColumn("cantidad".into()));
    }

    #[test]
    fn numeric_accessors() {
        let table = sample();
        assert_eq!(table.numbers("total_citas").unwrap(), vec![7.0, 3.0]);
        assert_eq!(table.sum("total_citas").unwrap(), 10.0);
        assert_eq!(table.scalar_i64("total_citas").unwrap(), Some(7));
        assert_eq!(
            table.texts("especialidad").unwrap(),
            vec!["Cardiología".to_string(), "Pediatría".to_string()]
        );
    }

    #[test]
    fn scalar_on_empty_table_is_none() {
        let table = Table::new(vec!["total".into()]);
        assert_eq!(table.scalar_i64("total").unwrap(), None);
    }

    #[test]
    fn push_row_pads_to_width() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        table.push_row(vec![Cell::Integer(1)]);
        assert_eq!(table.rows()[0], vec![Cell::Integer(1), Cell::Null]);
    }

    #[test]
    fn text_cells_parse_as_numbers() {
        assert_eq!(Cell::Text(" 12.5 ".into()).as_f64(), Some(12.5));
        assert_eq!(Cell::Text("n/a".into()).as_f64(), None);
        assert_eq!(Cell::Real(2.6).as_i64(), Some(3));
    }
}
