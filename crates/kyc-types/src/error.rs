use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown field kind: {0}")]
    UnknownFieldKind(String),

    #[error("unknown document slot: {0}")]
    UnknownDocumentSlot(String),
}
