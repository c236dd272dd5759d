//! Step gate for the identity-verification workflow.
//!
//! Every stage declares the fields that must be verified and the documents
//! that must be attached before the user may move on. The gate evaluates
//! that declaration against a read-only [`GateInput`] view of the session
//! and reports each requirement's outcome, so adding or removing a stage
//! is a configuration change, not a code change.
//!
//! # Quick Start
//!
//! ```rust
//! use kyc_gate::{GateInput, StepGate};
//! use kyc_types::{DocumentSlot, FieldKind, FieldStatus};
//!
//! struct Nothing;
//! impl GateInput for Nothing {
//!     fn field_status(&self, _: FieldKind) -> FieldStatus { FieldStatus::Idle }
//!     fn has_attachment(&self, _: DocumentSlot) -> bool { false }
//! }
//!
//! let gate = StepGate::with_default_stages();
//! assert!(!gate.can_advance(0, &Nothing));
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod requirement;

// Re-exports for convenience.
pub use config::{GateConfig, StageSpec};
pub use error::GateError;
pub use gate::{CheckResult, GateResult, StepGate};
pub use requirement::{GateInput, Requirement};
