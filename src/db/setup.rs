use rusqlite::{Connection, OpenFlags};

use crate::config::DataSourceConfig;
use crate::error::ReportError;

/// Opens the data source for the lifetime of one report build. The
/// connection is read-only: this system has no write path.
pub fn open_data_source(config: &DataSourceConfig) -> Result<Connection, ReportError> {
    let path = config.database_path();

    let conn = if path == ":memory:" {
        Connection::open_in_memory().map_err(connection_error)?
    } else {
        Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(connection_error)?
    };

    conn.execute_batch(
        "
        PRAGMA query_only = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA temp_store = MEMORY;
    ",
    )?;

    Ok(conn)
}

fn connection_error(e: rusqlite::Error) -> ReportError {
    ReportError::Connection(e.to_string())
}
