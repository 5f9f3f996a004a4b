pub mod loader;
pub mod setup;

pub use loader::{SqliteTableLoader, TableLoader};
