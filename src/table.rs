use std::cmp::Ordering;

use serde::Serialize;

use crate::error::ReportError;

/// A single cell value. Columns are homogeneous: every non-null value in a
/// column shares one variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Display label, used as a grouping key and in rendered output.
    pub fn label(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{}", f),
            Value::Text(s) => s.clone(),
        }
    }

    /// Total order for sorting: nulls first, numbers by numeric value,
    /// text lexicographically, numbers before text.
    pub fn compare(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Null => 0,
                Value::Int(_) | Value::Float(_) => 1,
                Value::Text(_) => 2,
            }
        }
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => rank(self).cmp(&rank(other)),
            },
        }
    }
}

/// Sort direction for ranked sub-tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One named column of homogeneous values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// An immutable, fully-loaded snapshot of one summary view: a name plus
/// ordered columns of equal length. Nothing mutates a `NamedTable` after
/// construction; every derived table is a fresh value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedTable {
    name: String,
    columns: Vec<Column>,
}

impl NamedTable {
    /// Panics if column lengths differ; loaders and aggregate functions only
    /// ever construct rectangular tables.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        if let Some(first) = columns.first() {
            let len = first.values.len();
            assert!(
                columns.iter().all(|c| c.values.len() == len),
                "ragged columns in NamedTable"
            );
        }
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column, ReportError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ReportError::ColumnNotFound {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Cell at (`row`, `column`). An unknown column is `ColumnNotFound`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= row_count()`; callers index rows they obtained from
    /// this table.
    pub fn value(&self, row: usize, column: &str) -> Result<&Value, ReportError> {
        Ok(&self.column(column)?.values[row])
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        (0..self.row_count()).map(move |index| RowRef { table: self, index })
    }

    pub fn row(&self, index: usize) -> RowRef<'_> {
        RowRef { table: self, index }
    }

    /// New table containing the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> NamedTable {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        NamedTable {
            name: self.name.clone(),
            columns,
        }
    }

    /// New table with an extra column appended. The column must match the
    /// current row count and must not shadow an existing name.
    pub fn with_column(&self, column: Column) -> Result<NamedTable, ReportError> {
        assert_eq!(column.values.len(), self.row_count(), "ragged derive column");
        if self.column_index(&column.name).is_some() {
            return Err(ReportError::Configuration(format!(
                "derived column `{}` already exists in table `{}`",
                column.name, self.name
            )));
        }
        let mut columns = self.columns.clone();
        columns.push(column);
        Ok(NamedTable {
            name: self.name.clone(),
            columns,
        })
    }

    /// First `n` rows, in original order. Used for the outlier display cap.
    pub fn truncated(&self, n: usize) -> NamedTable {
        let keep: Vec<usize> = (0..self.row_count().min(n)).collect();
        self.select_rows(&keep)
    }
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a NamedTable,
    index: usize,
}

impl<'a> RowRef<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Result<&'a Value, ReportError> {
        Ok(&self.table.column(column)?.values[self.index])
    }
}
