use kyc_gateway::GatewayResult;
use kyc_types::{DataRecord, FieldKind, FieldStatus, Verdict};
use kyc_validate::FieldValidator;

/// Message shown on a field once the gateway has verified it.
pub const VERIFIED_MESSAGE: &str = "Verified";

/// A verification dispatch: the value to verify, tagged with the input
/// sequence number it was taken from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub kind: FieldKind,
    pub seq: u64,
    pub value: String,
}

/// A gateway response for a previously dispatched [`Ticket`].
#[derive(Clone, Debug)]
pub struct Resolution {
    pub kind: FieldKind,
    pub seq: u64,
    pub value: String,
    pub outcome: GatewayResult<Verdict>,
}

impl Resolution {
    pub fn new(ticket: Ticket, outcome: GatewayResult<Verdict>) -> Self {
        Self {
            kind: ticket.kind,
            seq: ticket.seq,
            value: ticket.value,
            outcome,
        }
    }
}

/// What a new input did to the field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputTransition {
    /// Input is empty; the field is `Idle`.
    Cleared,
    /// The format rule rejected the input; the field is `Invalid`.
    Rejected,
    /// The format is fine; the field is `Validating` and the ticket must be
    /// sent to the gateway.
    Dispatched(Ticket),
}

/// What a gateway response did to the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The response matched the latest input and set the new status.
    Applied(FieldStatus),
    /// The input changed since dispatch; the response was dropped.
    Stale,
}

/// Validation state machine of one text field.
///
/// ```text
/// Idle ──input──▶ Validating ──resolve(seq == latest)──▶ Valid | Invalid
///   ▲    └─bad format─▶ Invalid                 │
///   └──────────── input cleared ◀───────────────┘
/// ```
///
/// Every input event bumps the sequence number, so any response still in
/// flight for an older input is recognised as stale when it lands.
#[derive(Clone, Debug)]
pub struct FieldState {
    kind: FieldKind,
    status: FieldStatus,
    message: Option<String>,
    record: Option<DataRecord>,
    input: String,
    seq: u64,
}

impl FieldState {
    /// # Panics
    ///
    /// Panics if `kind` is not a text field.
    pub fn new(kind: FieldKind) -> Self {
        assert!(kind.is_text(), "{kind} has no text validation state");
        Self {
            kind,
            status: FieldStatus::Idle,
            message: None,
            record: None,
            input: String::new(),
            seq: 0,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn status(&self) -> FieldStatus {
        self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn record(&self) -> Option<&DataRecord> {
        self.record.as_ref()
    }

    /// The raw input exactly as last entered.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Sequence number of the latest input event.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Apply a new raw input.
    pub fn on_input(&mut self, raw: &str, validator: &FieldValidator) -> InputTransition {
        self.seq += 1;
        self.input = raw.to_owned();
        self.record = None;

        if raw.trim().is_empty() {
            self.status = FieldStatus::Idle;
            self.message = None;
            return InputTransition::Cleared;
        }

        let verdict = validator.validate(self.kind, raw);
        if !verdict.is_valid() {
            self.status = FieldStatus::Invalid;
            self.message = verdict.message;
            return InputTransition::Rejected;
        }

        self.status = FieldStatus::Validating;
        self.message = None;
        InputTransition::Dispatched(self.ticket())
    }

    /// Re-dispatch the current input after a failed verification.
    ///
    /// Returns `None` unless the field is `Invalid` with format-valid input,
    /// i.e. the gateway, not the format rule, rejected it.
    pub fn retry(&mut self, validator: &FieldValidator) -> Option<Ticket> {
        if self.status != FieldStatus::Invalid || self.input.trim().is_empty() {
            return None;
        }
        if !validator.validate(self.kind, &self.input).is_valid() {
            return None;
        }

        self.seq += 1;
        self.status = FieldStatus::Validating;
        self.message = None;
        Some(self.ticket())
    }

    /// Apply a gateway response if it answers the latest input.
    pub fn resolve(&mut self, seq: u64, outcome: GatewayResult<Verdict>) -> ResolutionOutcome {
        if seq != self.seq || self.status != FieldStatus::Validating {
            return ResolutionOutcome::Stale;
        }

        match outcome {
            Ok(verdict) if verdict.is_valid() => {
                self.status = FieldStatus::Valid;
                self.message = Some(VERIFIED_MESSAGE.to_string());
                self.record = verdict.record;
            }
            Ok(verdict) => {
                self.status = FieldStatus::Invalid;
                self.message = Some(
                    verdict
                        .message
                        .unwrap_or_else(|| format!("{} could not be verified", self.kind.label())),
                );
                self.record = None;
            }
            Err(err) => {
                self.status = FieldStatus::Invalid;
                self.message = Some(format!("{err}. Please try again"));
                self.record = None;
            }
        }

        ResolutionOutcome::Applied(self.status)
    }

    fn ticket(&self) -> Ticket {
        Ticket {
            kind: self.kind,
            seq: self.seq,
            value: self.input.clone(),
        }
    }
}
