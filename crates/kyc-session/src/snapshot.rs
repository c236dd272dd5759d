use serde::Serialize;

use kyc_types::{DataRecord, DocumentSlot, FieldKind, FieldStatus, PreviewKind, SessionId};

use crate::controller::StageController;
use crate::submission::SubmissionReceipt;

/// Read-only view of a session, published after every change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session: SessionId,
    pub stage: StageView,
    pub fields: Vec<FieldView>,
    pub attachments: Vec<AttachmentView>,
    pub can_advance: bool,
    /// Unmet requirements of the active stage.
    pub blocked_by: Vec<String>,
    pub submitting: bool,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<SubmissionReceipt>,
    pub progress: Vec<StageProgress>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageView {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub description: String,
    pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub kind: FieldKind,
    pub label: &'static str,
    /// Input length limit for the text box.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    pub status: FieldStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<DataRecord>,
    pub input: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttachmentView {
    pub slot: DocumentSlot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentView {
    pub name: String,
    pub size: String,
    pub preview: PreviewKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageMark {
    Completed,
    Current,
    Upcoming,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageProgress {
    pub id: String,
    pub title: String,
    pub mark: StageMark,
}

impl SessionSnapshot {
    pub(crate) fn capture(controller: &StageController) -> Self {
        let state = controller.state();
        let gate = controller.gate();
        let current = state.stage_index();

        let stage = gate
            .stage(current)
            .map(|spec| StageView {
                index: current,
                id: spec.id.clone(),
                title: spec.title.clone(),
                description: spec.description.clone(),
                total: gate.stage_count(),
            })
            .unwrap_or(StageView {
                index: current,
                id: String::new(),
                title: String::new(),
                description: String::new(),
                total: gate.stage_count(),
            });

        let fields = state
            .fields()
            .map(|f| FieldView {
                kind: f.kind(),
                label: f.kind().label(),
                max_length: f.kind().max_length(),
                status: f.status(),
                message: f.message().map(str::to_owned),
                record: f.record().cloned(),
                input: f.input().to_owned(),
            })
            .collect();

        let attachments = DocumentSlot::ALL
            .into_iter()
            .map(|slot| AttachmentView {
                slot,
                document: state.document(slot).map(|d| DocumentView {
                    name: d.name.clone(),
                    size: d.size_label(),
                    preview: d.preview_kind(),
                }),
                error: state.attachment_error(slot).map(str::to_owned),
            })
            .collect();

        let completed = state.is_complete();
        let progress = gate
            .config()
            .stages
            .iter()
            .enumerate()
            .map(|(i, spec)| StageProgress {
                id: spec.id.clone(),
                title: spec.title.clone(),
                mark: if completed || i < current {
                    StageMark::Completed
                } else if i == current {
                    StageMark::Current
                } else {
                    StageMark::Upcoming
                },
            })
            .collect();

        Self {
            session: state.id(),
            stage,
            fields,
            attachments,
            can_advance: controller.can_advance(),
            blocked_by: controller
                .gate_result()
                .map(|r| r.reasons())
                .unwrap_or_default(),
            submitting: state.is_submitting(),
            completed,
            receipt: state.receipt().cloned(),
            progress,
        }
    }

    pub fn field(&self, kind: FieldKind) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.kind == kind)
    }

    pub fn attachment(&self, slot: DocumentSlot) -> Option<&AttachmentView> {
        self.attachments.iter().find(|a| a.slot == slot)
    }
}
