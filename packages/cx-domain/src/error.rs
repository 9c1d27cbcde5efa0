//! Error taxonomy shared by every CX crate.
//!
//! Structured `[{kind}] {message}` error shape, one discriminant enum
//! rather than one variant per failure mode, so that downstream crates can
//! add their own `From` conversions without redefining the kind set.

use std::fmt;
use thiserror::Error;

/// Coarse failure category, independent of which crate raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unsupported language, malformed ref, empty query where required.
    Input,
    /// Syntax failure in a file; non-fatal by default.
    Parse,
    /// Open/init/transaction/integrity failure in a store.
    Storage,
    /// A dependency references an endpoint absent from the snapshot.
    IntegrityViolation,
    /// A specifically named entity/file/metric is required but missing.
    NotFound,
    /// Operation aborted via its cancellation token.
    Cancelled,
    /// Invariant violation — a bug, not user error.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Input => "input",
            ErrorKind::Parse => "parse",
            ErrorKind::Storage => "storage",
            ErrorKind::IntegrityViolation => "integrity_violation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unified CX error.
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct CxError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl CxError {
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

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn integrity_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IntegrityViolation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl From<serde_json::Error> for CxError {
    fn from(err: serde_json::Error) -> Self {
        CxError::input(format!("JSON error: {err}")).with_source(err)
    }
}

pub type Result<T> = std::result::Result<T, CxError>;
