use std::fmt;

use kyc_types::{DocumentSlot, FieldKind, FieldStatus};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GateInput
// ---------------------------------------------------------------------------

/// Read-only view of the session that the gate judges.
///
/// The gate never mutates state; the session implements this trait and
/// hands itself to [`crate::StepGate`].
pub trait GateInput {
    /// Current validation status of a text field.
    fn field_status(&self, kind: FieldKind) -> FieldStatus;

    /// Whether a document is attached in `slot`.
    fn has_attachment(&self, slot: DocumentSlot) -> bool;
}

// ---------------------------------------------------------------------------
// Requirement
// ---------------------------------------------------------------------------

/// A single admission condition of a stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Requirement {
    /// The field must be `Valid`.
    Field(FieldKind),
    /// A document must be attached in the slot.
    Attachment(DocumentSlot),
}

impl Requirement {
    pub fn is_met(&self, input: &dyn GateInput) -> bool {
        match self {
            Self::Field(kind) => input.field_status(*kind).is_valid(),
            Self::Attachment(slot) => input.has_attachment(*slot),
        }
    }

    /// Why the requirement is unmet, phrased for the user.
    pub fn unmet_reason(&self, input: &dyn GateInput) -> String {
        match self {
            Self::Field(kind) => match input.field_status(*kind) {
                FieldStatus::Idle => format!("{} is required", kind.label()),
                FieldStatus::Validating => format!("{} is still being verified", kind.label()),
                FieldStatus::Invalid => format!("{} is invalid", kind.label()),
                FieldStatus::Valid => format!("{} is verified", kind.label()),
            },
            Self::Attachment(slot) => format!("{} is not attached", slot.label()),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(kind) => write!(f, "field:{kind}"),
            Self::Attachment(slot) => write!(f, "attachment:{slot}"),
        }
    }
}
