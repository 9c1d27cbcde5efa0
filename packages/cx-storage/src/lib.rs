//! Persistent storage layer: `Store`/`Cache` ports plus a SQLite-backed
//! adapter, split into `domain` (traits and errors) and `infrastructure`
//! (concrete implementations).

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::{Cache, StorageStats, Store};
pub use error::StorageError;
pub use infrastructure::sqlite::{SqliteCache, SqliteStore};
