use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kyc_gate::GateInput;
use kyc_types::{DocumentFile, DocumentSlot, FieldKind, FieldStatus, SessionId};

use crate::field::FieldState;
use crate::submission::{SubmissionPayload, SubmissionReceipt};

/// Aggregate state of one verification session.
///
/// Only [`crate::StageController`] mutates it; everything else reads.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub(crate) id: SessionId,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) stage: usize,
    pub(crate) fields: BTreeMap<FieldKind, FieldState>,
    pub(crate) documents: BTreeMap<DocumentSlot, DocumentFile>,
    pub(crate) attachment_errors: BTreeMap<DocumentSlot, String>,
    pub(crate) submitting: bool,
    pub(crate) receipt: Option<SubmissionReceipt>,
}

impl SessionState {
    pub(crate) fn new() -> Self {
        Self {
            id: SessionId::new(),
            started_at: Utc::now(),
            stage: 0,
            fields: FieldKind::TEXT_KINDS
                .into_iter()
                .map(|kind| (kind, FieldState::new(kind)))
                .collect(),
            documents: BTreeMap::new(),
            attachment_errors: BTreeMap::new(),
            submitting: false,
            receipt: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// 0-based index of the active stage.
    pub fn stage_index(&self) -> usize {
        self.stage
    }

    /// # Panics
    ///
    /// Panics if `kind` is [`FieldKind::DocumentFile`].
    pub fn field(&self, kind: FieldKind) -> &FieldState {
        self.fields
            .get(&kind)
            .unwrap_or_else(|| panic!("{kind} has no text validation state"))
    }

    pub(crate) fn field_mut(&mut self, kind: FieldKind) -> &mut FieldState {
        self.fields
            .get_mut(&kind)
            .unwrap_or_else(|| panic!("{kind} has no text validation state"))
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldState> {
        self.fields.values()
    }

    pub fn document(&self, slot: DocumentSlot) -> Option<&DocumentFile> {
        self.documents.get(&slot)
    }

    pub fn attachment_error(&self, slot: DocumentSlot) -> Option<&str> {
        self.attachment_errors.get(&slot).map(String::as_str)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_complete(&self) -> bool {
        self.receipt.is_some()
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    /// Freeze the collected inputs for the submitter.
    pub(crate) fn payload(&self) -> SubmissionPayload {
        SubmissionPayload {
            session: self.id,
            fields: self
                .fields
                .values()
                .filter(|f| !f.input().is_empty())
                .map(|f| (f.kind(), f.input().to_owned()))
                .collect(),
            records: self
                .fields
                .values()
                .filter_map(|f| f.record().map(|r| (f.kind(), r.clone())))
                .collect(),
            documents: self.documents.clone(),
        }
    }
}

impl GateInput for SessionState {
    fn field_status(&self, kind: FieldKind) -> FieldStatus {
        self.fields
            .get(&kind)
            .map(FieldState::status)
            .unwrap_or_default()
    }

    fn has_attachment(&self, slot: DocumentSlot) -> bool {
        self.documents.contains_key(&slot)
    }
}
