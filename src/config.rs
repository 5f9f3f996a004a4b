use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Environment variable holding the connection descriptor.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Connection descriptor for the summary-view data source.
///
/// Accepted forms: `sqlite://<path>`, `sqlite:<path>`, or a bare filesystem
/// path. `:memory:` is a valid path. There is exactly one descriptor — no
/// alternate or fallback variable is consulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    url: String,
}

impl DataSourceConfig {
    pub fn new(url: impl Into<String>) -> Result<Self, ReportError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(ReportError::Configuration(
                "connection descriptor is empty".to_string(),
            ));
        }
        if let Some((scheme, _)) = url.split_once("://") {
            if scheme != "sqlite" {
                return Err(ReportError::Configuration(format!(
                    "unsupported scheme `{}`: only sqlite sources are supported",
                    scheme
                )));
            }
        }
        Ok(Self { url })
    }

    /// Reads the descriptor from `DATABASE_URL`. Missing or empty is a fatal
    /// configuration error, surfaced before any table load is attempted.
    pub fn from_env() -> Result<Self, ReportError> {
        match std::env::var(DATABASE_URL_VAR) {
            Ok(url) => Self::new(url),
            Err(_) => Err(ReportError::Configuration(format!(
                "{} is not set",
                DATABASE_URL_VAR
            ))),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Filesystem path of the SQLite database, with any scheme prefix removed.
    pub fn database_path(&self) -> &str {
        self.url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))
            .unwrap_or(&self.url)
    }
}
