//! Format validators for the identity-verification workflow.
//!
//! Validators are pure: the same input always yields the same [`Verdict`],
//! and no validator consults the verification record store. A value that
//! passes here is only *well-formed*; whether it exists is decided by the
//! verification gateway.
//!
//! # Quick Start
//!
//! ```rust
//! use kyc_types::FieldKind;
//! use kyc_validate::FieldValidator;
//!
//! let validator = FieldValidator::default();
//! assert!(validator.validate(FieldKind::TaxId, "ABCDE1234F").is_valid());
//! assert!(!validator.validate(FieldKind::TaxId, "abcde1234f").is_valid());
//! ```

pub mod document;
pub mod rules;
pub mod validator;

pub use document::DocumentPolicy;
pub use rules::{
    validate_account_number, validate_identity_number, validate_routing_code, validate_tax_id,
};
pub use validator::FieldValidator;

pub use kyc_types::Verdict;
