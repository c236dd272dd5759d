use kyc_gate::{GateResult, StepGate};
use kyc_types::{DocumentFile, DocumentSlot, FieldKind};
use kyc_validate::FieldValidator;

use crate::error::{Rejected, SubmissionError};
use crate::field::{FieldState, InputTransition, Resolution, ResolutionOutcome, Ticket};
use crate::snapshot::SessionSnapshot;
use crate::state::SessionState;
use crate::submission::{SubmissionPayload, SubmissionReceipt};

/// What a file change did to its slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttachmentOutcome {
    Attached,
    Removed,
    /// The file was refused; the slot keeps whatever it held before.
    Rejected(String),
    /// The session is submitting or submitted; nothing changed.
    Ignored,
}

/// Result of [`StageController::on_advance`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the stage with this index.
    Moved(usize),
    /// The final stage was admitted; submission has begun with this payload.
    Submit(SubmissionPayload),
}

/// Synchronous core of a session.
///
/// Owns [`SessionState`] and applies commands to it: input changes run the
/// format rule and hand back a [`Ticket`] to verify, gateway responses come
/// back through [`Self::apply_resolution`], and the [`StepGate`] decides
/// every advance. No I/O happens here; see [`crate::Session`] for the
/// driver that talks to the gateway and the submitter.
pub struct StageController {
    state: SessionState,
    validator: FieldValidator,
    gate: StepGate,
}

impl StageController {
    pub fn new(validator: FieldValidator, gate: StepGate) -> Self {
        Self {
            state: SessionState::new(),
            validator,
            gate,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn gate(&self) -> &StepGate {
        &self.gate
    }

    pub fn validator(&self) -> &FieldValidator {
        &self.validator
    }

    pub fn current_field_state(&self, kind: FieldKind) -> &FieldState {
        self.state.field(kind)
    }

    /// Inputs are frozen from the start of submission onward.
    fn is_frozen(&self) -> bool {
        self.state.submitting || self.state.is_complete()
    }

    // -----------------------------------------------------------------------
    // Fields
    // -----------------------------------------------------------------------

    /// Apply a raw input; returns the ticket to verify if the format passed.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is [`FieldKind::DocumentFile`].
    pub fn on_input_change(&mut self, kind: FieldKind, raw: &str) -> Option<Ticket> {
        assert!(
            kind.is_text(),
            "document-file input goes through on_file_change"
        );
        if self.is_frozen() {
            tracing::debug!(%kind, "input ignored while submitting or submitted");
            return None;
        }

        let field = self.state.field_mut(kind);
        let transition = field.on_input(raw, &self.validator);
        tracing::debug!(%kind, seq = field.seq(), status = %field.status(), "input applied");

        match transition {
            InputTransition::Dispatched(ticket) => Some(ticket),
            InputTransition::Cleared | InputTransition::Rejected => None,
        }
    }

    /// Re-verify a field whose verification failed.
    pub fn retry(&mut self, kind: FieldKind) -> Option<Ticket> {
        if self.is_frozen() {
            return None;
        }
        let ticket = self.state.field_mut(kind).retry(&self.validator);
        if ticket.is_some() {
            tracing::debug!(%kind, "verification retried");
        }
        ticket
    }

    /// Apply a gateway response, dropping it if the field moved on.
    pub fn apply_resolution(&mut self, resolution: Resolution) -> ResolutionOutcome {
        let Resolution {
            kind,
            seq,
            value,
            outcome,
        } = resolution;

        if let Err(err) = &outcome {
            tracing::warn!(%kind, error = %err, "verification call failed");
        }

        let applied = self.state.field_mut(kind).resolve(seq, outcome);
        match applied {
            ResolutionOutcome::Stale => {
                tracing::debug!(%kind, seq, value = %value, "stale verification dropped");
            }
            ResolutionOutcome::Applied(status) => {
                tracing::debug!(%kind, seq, %status, "verification applied");
            }
        }
        applied
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    /// Attach, replace or (with `None`) remove the document in `slot`.
    pub fn on_file_change(&mut self, slot: DocumentSlot, file: Option<DocumentFile>) -> AttachmentOutcome {
        if self.is_frozen() {
            tracing::debug!(%slot, "file change ignored while submitting or submitted");
            return AttachmentOutcome::Ignored;
        }
        let Some(file) = file else {
            self.state.documents.remove(&slot);
            self.state.attachment_errors.remove(&slot);
            tracing::debug!(%slot, "document removed");
            return AttachmentOutcome::Removed;
        };

        let verdict = self.validator.validate_document(Some(&file));
        if !verdict.is_valid() {
            let message = verdict
                .message
                .unwrap_or_else(|| "Invalid file".to_string());
            tracing::debug!(%slot, name = %file.name, reason = %message, "document rejected");
            self.state.attachment_errors.insert(slot, message.clone());
            return AttachmentOutcome::Rejected(message);
        }

        tracing::debug!(%slot, name = %file.name, size = file.size, "document attached");
        self.state.attachment_errors.remove(&slot);
        self.state.documents.insert(slot, file);
        AttachmentOutcome::Attached
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    /// Gate evaluation of the active stage.
    pub fn gate_result(&self) -> Option<GateResult> {
        self.gate.evaluate(self.state.stage, &self.state).ok()
    }

    pub fn can_advance(&self) -> bool {
        !self.state.submitting
            && !self.state.is_complete()
            && self.gate.can_advance(self.state.stage, &self.state)
    }

    pub fn is_final_stage(&self) -> bool {
        self.gate.is_final(self.state.stage)
    }

    /// Move to the next stage. Never submits.
    pub fn advance(&mut self) -> Result<usize, Rejected> {
        self.check_advance()?;
        if self.is_final_stage() {
            return Err(Rejected::FinalStage);
        }

        self.state.stage += 1;
        tracing::info!(session = %self.state.id, stage = self.state.stage, "advanced to next stage");
        Ok(self.state.stage)
    }

    /// Advance, or on the final stage begin submission.
    pub fn on_advance(&mut self) -> Result<AdvanceOutcome, Rejected> {
        self.check_advance()?;
        if !self.is_final_stage() {
            return self.advance().map(AdvanceOutcome::Moved);
        }

        self.begin_submission()
            .map(AdvanceOutcome::Submit)
            .map_err(|err| match err {
                SubmissionError::InFlight => Rejected::Submitting,
                SubmissionError::Completed => Rejected::Completed,
                SubmissionError::NotReady { stage, reasons } => Rejected::Blocked { stage, reasons },
                other => Rejected::Blocked {
                    stage: self.stage_id(),
                    reasons: vec![other.to_string()],
                },
            })
    }

    fn check_advance(&self) -> Result<(), Rejected> {
        if self.state.is_complete() {
            return Err(Rejected::Completed);
        }
        if self.state.submitting {
            return Err(Rejected::Submitting);
        }

        match self.gate_result() {
            Some(result) if result.is_admitted() => Ok(()),
            Some(result) => Err(Rejected::Blocked {
                stage: result.stage_id.clone(),
                reasons: result.reasons(),
            }),
            None => Err(Rejected::Blocked {
                stage: self.stage_id(),
                reasons: vec!["stage is not part of the plan".to_string()],
            }),
        }
    }

    fn stage_id(&self) -> String {
        self.gate
            .stage(self.state.stage)
            .map(|s| s.id.clone())
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Check every stage, raise the in-flight flag and freeze the payload.
    pub fn begin_submission(&mut self) -> Result<SubmissionPayload, SubmissionError> {
        if self.state.is_complete() {
            return Err(SubmissionError::Completed);
        }
        if self.state.submitting {
            return Err(SubmissionError::InFlight);
        }
        if !self.is_final_stage() {
            return Err(SubmissionError::NotReady {
                stage: self.stage_id(),
                reasons: vec!["submission is only available on the final stage".to_string()],
            });
        }

        let last = self.gate.stage_count().saturating_sub(1);
        let result = self
            .gate
            .evaluate_through(last, &self.state)
            .map_err(|err| SubmissionError::NotReady {
                stage: self.stage_id(),
                reasons: vec![err.to_string()],
            })?;
        if !result.is_admitted() {
            return Err(SubmissionError::NotReady {
                stage: result.stage_id.clone(),
                reasons: result.reasons(),
            });
        }

        self.state.submitting = true;
        tracing::info!(session = %self.state.id, "submission started");
        Ok(self.state.payload())
    }

    /// Lower the in-flight flag and record the outcome.
    ///
    /// On failure nothing else changes, so the user can simply submit again.
    pub fn finish_submission(
        &mut self,
        result: Result<SubmissionReceipt, SubmissionError>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        self.state.submitting = false;
        match result {
            Ok(receipt) => {
                tracing::info!(session = %self.state.id, reference = %receipt.reference, "submission completed");
                self.state.receipt = Some(receipt.clone());
                Ok(receipt)
            }
            Err(err) => {
                tracing::warn!(session = %self.state.id, error = %err, "submission failed");
                Err(err)
            }
        }
    }

    /// Read model for the presentation layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }
}
