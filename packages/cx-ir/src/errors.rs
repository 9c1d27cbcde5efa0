//! `cx-ir` error type. Same `[{kind}] {message}` shape as
//! `cx_domain::CxError` / `cx_storage::StorageError`.

use cx_domain::{CxError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct IrError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl IrError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), source: None }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn unsupported_language(ext: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, format!("unsupported language for extension '{}'", ext.into()))
    }

    pub fn parse(file: impl Into<String>, line: u32, column: u32, detail: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Parse,
            format!("{}:{}:{}: {}", file.into(), line, column, detail.into()),
        )
    }

    pub fn invalid_ref(raw: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, format!("invalid ref '{}'", raw.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "operation cancelled")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl From<cx_storage::StorageError> for IrError {
    fn from(err: cx_storage::StorageError) -> Self {
        IrError::new(err.kind, err.message)
    }
}

impl From<IrError> for CxError {
    fn from(err: IrError) -> Self {
        CxError::new(err.kind, err.message)
    }
}

pub type Result<T> = std::result::Result<T, IrError>;

/// Cooperative cancellation token checked at traversal node-visit boundaries,
/// letting a long scan or graph walk be aborted without unwinding a thread.
#[derive(Clone, Default)]
pub struct CancellationToken {
    flag: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(IrError::cancelled())
        } else {
            Ok(())
        }
    }
}
