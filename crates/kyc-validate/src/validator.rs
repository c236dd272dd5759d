use kyc_types::{DocumentFile, FieldKind, Verdict};

use crate::document::DocumentPolicy;
use crate::rules;

/// Dispatches raw input to the rule for its [`FieldKind`].
#[derive(Clone, Debug, Default)]
pub struct FieldValidator {
    documents: DocumentPolicy,
}

impl FieldValidator {
    pub fn new(documents: DocumentPolicy) -> Self {
        Self { documents }
    }

    pub fn document_policy(&self) -> &DocumentPolicy {
        &self.documents
    }

    /// Validate a text field.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is [`FieldKind::DocumentFile`]; documents carry
    /// metadata, not text, and go through [`Self::validate_document`].
    pub fn validate(&self, kind: FieldKind, value: &str) -> Verdict {
        match kind {
            FieldKind::IdentityNumber => rules::validate_identity_number(value),
            FieldKind::TaxId => rules::validate_tax_id(value),
            FieldKind::AccountNumber => rules::validate_account_number(value),
            FieldKind::RoutingCode => rules::validate_routing_code(value),
            FieldKind::DocumentFile => {
                panic!("document-file is not a text field; use validate_document")
            }
        }
    }

    pub fn validate_document(&self, file: Option<&DocumentFile>) -> Verdict {
        self.documents.validate(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_by_kind() {
        let v = FieldValidator::default();
        assert!(v.validate(FieldKind::IdentityNumber, "234567890123").is_valid());
        assert!(v.validate(FieldKind::TaxId, "ABCDE1234F").is_valid());
        assert!(v.validate(FieldKind::AccountNumber, "000123456789").is_valid());
        assert!(v.validate(FieldKind::RoutingCode, "SBIN0001234").is_valid());
        // A valid tax ID is not a valid routing code.
        assert!(!v.validate(FieldKind::RoutingCode, "ABCDE1234F").is_valid());
    }

    #[test]
    fn local_verdicts_never_carry_records() {
        let v = FieldValidator::default();
        for kind in FieldKind::TEXT_KINDS {
            assert!(v.validate(kind, "234567890123").record.is_none());
        }
    }

    #[test]
    #[should_panic(expected = "not a text field")]
    fn document_kind_through_text_path_panics() {
        FieldValidator::default().validate(FieldKind::DocumentFile, "scan.pdf");
    }

    #[test]
    fn documents_use_configured_policy() {
        let v = FieldValidator::new(DocumentPolicy::with_max_bytes(100));
        let file = DocumentFile::new("id.pdf", 101, "application/pdf");
        assert!(!v.validate_document(Some(&file)).is_valid());
    }
}
