//! Shared, I/O-free types for the CX code-intelligence engine: the Entity /
//! Dependency data model, content hashing, the error taxonomy, and ref
//! syntax. `cx-storage` and `cx-ir` both depend on this crate so the model
//! has a single definition, the way `ob-poc`'s workspace shares `dsl_types`.

pub mod error;
pub mod hash;
pub mod models;
pub mod refs;

pub use error::{CxError, ErrorKind, Result};
pub use models::{
    DepType, Dependency, Entity, EntityFilter, EntityKind, FileEntry, Importance, Metrics, Param,
    SearchHit, Status, Visibility,
};
pub use refs::Ref;
