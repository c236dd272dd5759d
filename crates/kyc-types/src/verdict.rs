use serde::{Deserialize, Serialize};

use crate::record::DataRecord;

/// Outcome of a validation or verification attempt.
///
/// `message` is set whenever `valid` is false. `record` is only ever set
/// by the verification gateway on success; local validators never attach
/// one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<DataRecord>,
}

impl Verdict {
    /// A passing verdict with no message or record.
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: None,
            record: None,
        }
    }

    /// A failing verdict with a human-actionable reason.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            record: None,
        }
    }

    /// A passing verdict carrying the record the gateway resolved.
    pub fn verified(record: DataRecord) -> Self {
        Self {
            valid: true,
            message: None,
            record: Some(record),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}
