use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("data source unreachable: {0}")]
    Connection(String),

    #[error("table or view not found: {0}")]
    TableNotFound(String),

    #[error("column `{column}` not found in table `{table}`")]
    ColumnNotFound { table: String, column: String },

    #[error("column `{column}` in table `{table}` is not numeric")]
    NonNumericColumn { table: String, column: String },

    #[error("zero denominator in `{denominator}` at row {row} with no fallback value supplied")]
    DivideByZeroPolicy { denominator: String, row: usize },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
