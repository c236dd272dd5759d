//! Foundation types for the identity-verification workflow.
//!
//! Every other `kyc-*` crate depends on `kyc-types`. Nothing in here
//! performs validation; these are the shapes the validators, gateway,
//! gate and session pass between each other.
//!
//! # Key Types
//!
//! - [`FieldKind`]: Semantic type of a validated input
//! - [`DocumentSlot`]: Where an uploaded document is attached
//! - [`FieldStatus`]: Idle / Validating / Valid / Invalid
//! - [`Verdict`]: Outcome of a validation or verification attempt
//! - [`DataRecord`]: Display attributes returned by a successful verification
//! - [`DocumentFile`]: Metadata of a user-supplied file
//! - [`SessionId`]: UUID v7 session identifier

pub mod document;
pub mod error;
pub mod field;
pub mod record;
pub mod session;
pub mod verdict;

pub use document::{DocumentFile, PreviewKind};
pub use error::TypeError;
pub use field::{DocumentSlot, FieldKind, FieldStatus};
pub use record::DataRecord;
pub use session::SessionId;
pub use verdict::Verdict;
