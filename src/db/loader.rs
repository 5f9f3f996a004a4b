use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::config::DataSourceConfig;
use crate::db::setup::open_data_source;
use crate::error::ReportError;
use crate::table::{Column, NamedTable, Value};

/// Fetches a named table or view in full. Implementations perform a single
/// read-only query per call and make no caching guarantee of their own;
/// snapshot lifetime is the caller's concern.
pub trait TableLoader {
    fn load(&self, name: &str) -> Result<NamedTable, ReportError>;
}

/// `TableLoader` over a SQLite data source.
pub struct SqliteTableLoader {
    conn: Connection,
}

impl SqliteTableLoader {
    pub fn open(config: &DataSourceConfig) -> Result<Self, ReportError> {
        let conn = open_data_source(config)?;
        Ok(Self { conn })
    }

    /// Wraps an existing connection. Used by tests and by hosts that manage
    /// the connection lifecycle themselves.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn exists(&self, name: &str) -> Result<bool, ReportError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = ?1 AND type IN ('table', 'view')",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl TableLoader for SqliteTableLoader {
    fn load(&self, name: &str) -> Result<NamedTable, ReportError> {
        // Names are interpolated into the SELECT, so only plain identifiers
        // are accepted.
        if !is_identifier(name) {
            return Err(ReportError::TableNotFound(name.to_string()));
        }
        if !self.exists(name)? {
            return Err(ReportError::TableNotFound(name.to_string()));
        }

        let mut stmt = self.conn.prepare(&format!("SELECT * FROM \"{}\"", name))?;
        let column_names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut columns: Vec<Column> = column_names
            .into_iter()
            .map(|n| Column::new(n, Vec::new()))
            .collect();

        let mut rows = stmt.query([])?;
        let mut row_count = 0usize;
        while let Some(row) = rows.next()? {
            for (i, column) in columns.iter_mut().enumerate() {
                column.values.push(read_cell(row.get_ref(i)?, name, &column.name));
            }
            row_count += 1;
        }

        debug!(table = name, rows = row_count, "loaded summary view");
        Ok(NamedTable::new(name, columns))
    }
}

fn read_cell(cell: ValueRef<'_>, table: &str, column: &str) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => {
            // The view contract has no binary columns; treat as missing.
            warn!(table, column, "blob cell in summary view, storing NULL");
            Value::Null
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
