use thiserror::Error;

use shopgate_core::{DomainError, StoreError};

/// Failure of a store operation that also runs record-level validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
