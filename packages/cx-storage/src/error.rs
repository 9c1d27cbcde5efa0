//! Storage-layer error type.
//!
//! Same `[{kind}] {message}` shape as `cx_domain::CxError`, with a
//! `rusqlite` conversion added and a `From<StorageError> for CxError` so
//! callers outside this crate see one unified taxonomy.

use cx_domain::{CxError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct StorageError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl StorageError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn storage_init(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, format!("database corrupt: {}", message.into()))
    }

    pub fn atomicity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, format!("transaction rolled back: {}", message.into()))
    }

    pub fn integrity_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IntegrityViolation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(sqlite_err, _) = &err {
            if sqlite_err.code == rusqlite::ErrorCode::ConstraintViolation
                && sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
            {
                return StorageError::integrity_violation(format!("dangling foreign key: {err}")).with_source(err);
            }
        }
        StorageError::new(ErrorKind::Storage, format!("sqlite error: {err}")).with_source(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::new(ErrorKind::Storage, format!("json error: {err}")).with_source(err)
    }
}

impl From<StorageError> for CxError {
    fn from(err: StorageError) -> Self {
        CxError::new(err.kind, err.message)
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = StorageError::not_found("entity fn-abc-1-Foo");
        assert_eq!(format!("{err}"), "[not_found] entity fn-abc-1-Foo");
    }

    #[test]
    fn converts_into_cx_error() {
        let err: CxError = StorageError::integrity_violation("dangling edge").into();
        assert_eq!(err.kind, ErrorKind::IntegrityViolation);
    }
}
