use std::collections::HashSet;

use kyc_types::{DocumentSlot, FieldKind};
use serde::{Deserialize, Serialize};

use crate::error::GateError;
use crate::requirement::Requirement;

/// One step of the workflow and what it takes to leave it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Stable identifier, e.g. `"identity"`.
    pub id: String,
    /// Heading shown for the stage.
    pub title: String,
    /// Instructions shown under the heading.
    #[serde(default)]
    pub description: String,
    /// Fields that must be `Valid`.
    #[serde(default)]
    pub required_fields: Vec<FieldKind>,
    /// Document slots that must be filled.
    #[serde(default)]
    pub required_attachments: Vec<DocumentSlot>,
}

impl StageSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            required_fields: Vec::new(),
            required_attachments: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn field(mut self, kind: FieldKind) -> Self {
        self.required_fields.push(kind);
        self
    }

    pub fn attachment(mut self, slot: DocumentSlot) -> Self {
        self.required_attachments.push(slot);
        self
    }

    /// Fields first, then attachments, in declaration order.
    pub fn requirements(&self) -> impl Iterator<Item = Requirement> + '_ {
        self.required_fields
            .iter()
            .copied()
            .map(Requirement::Field)
            .chain(
                self.required_attachments
                    .iter()
                    .copied()
                    .map(Requirement::Attachment),
            )
    }
}

/// The ordered stage plan. Stages are linear: no branching, no skipping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub stages: Vec<StageSpec>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            stages: vec![
                StageSpec::new("identity", "Identity Verification")
                    .describe(
                        "Enter your 12-digit identity number and upload a scanned copy of your identity card.",
                    )
                    .field(FieldKind::IdentityNumber)
                    .attachment(DocumentSlot::IdentityDocument),
                StageSpec::new("tax", "Tax ID Verification")
                    .describe(
                        "Enter your 10-character tax ID and upload a scanned copy of your tax card.",
                    )
                    .field(FieldKind::TaxId)
                    .attachment(DocumentSlot::TaxDocument),
                StageSpec::new("bank", "Bank Account Verification")
                    .describe("Enter your bank account details for verification.")
                    .field(FieldKind::AccountNumber)
                    .field(FieldKind::RoutingCode),
            ],
        }
    }
}

impl GateConfig {
    pub fn new(stages: Vec<StageSpec>) -> Self {
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage(&self, index: usize) -> Option<&StageSpec> {
        self.stages.get(index)
    }

    /// Reject plans the gate cannot evaluate meaningfully.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.stages.is_empty() {
            return Err(GateError::Config("stage plan must have at least one stage".into()));
        }

        let mut ids = HashSet::new();
        for (i, stage) in self.stages.iter().enumerate() {
            if stage.id.trim().is_empty() {
                return Err(GateError::Config(format!("stage at index {i} has an empty id")));
            }
            if !ids.insert(stage.id.as_str()) {
                return Err(GateError::Config(format!("duplicate stage id '{}'", stage.id)));
            }
            if stage.required_fields.contains(&FieldKind::DocumentFile) {
                return Err(GateError::Config(format!(
                    "stage '{}' lists document-file as a field; use required_attachments",
                    stage.id
                )));
            }
        }

        Ok(())
    }
}
