use kyc_types::{DocumentFile, DocumentSlot, FieldKind};

use crate::controller::AttachmentOutcome;
use crate::error::{Rejected, SubmissionError};
use crate::submission::SubmissionReceipt;

/// A user action sent to a running [`crate::Session`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    InputChanged { kind: FieldKind, value: String },
    /// `None` removes the current document.
    FileChanged { slot: DocumentSlot, file: Option<DocumentFile> },
    Retry(FieldKind),
    /// Advance, or submit when on the final stage.
    Advance,
    Submit,
}

impl Command {
    pub fn input(kind: FieldKind, value: impl Into<String>) -> Self {
        Self::InputChanged {
            kind,
            value: value.into(),
        }
    }

    pub fn attach(slot: DocumentSlot, file: DocumentFile) -> Self {
        Self::FileChanged {
            slot,
            file: Some(file),
        }
    }

    pub fn detach(slot: DocumentSlot) -> Self {
        Self::FileChanged { slot, file: None }
    }
}

/// Result of handling one [`Command`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Updated,
    Attachment(AttachmentOutcome),
    Advanced(usize),
    Submitted(SubmissionReceipt),
    Rejected(Rejected),
    SubmissionFailed(SubmissionError),
}
