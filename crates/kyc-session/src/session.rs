use std::sync::Arc;

use kyc_gate::StepGate;
use kyc_gateway::{InMemoryRecords, RecordSource, SimulatedGateway, VerificationGateway};
use kyc_types::{DocumentFile, DocumentSlot, FieldKind};
use kyc_validate::FieldValidator;
use tokio::sync::{mpsc, watch};

use crate::command::{Command, CommandOutcome};
use crate::config::WorkflowConfig;
use crate::controller::{AdvanceOutcome, AttachmentOutcome, StageController};
use crate::error::{Rejected, SessionResult, SubmissionError};
use crate::field::{Resolution, ResolutionOutcome, Ticket};
use crate::snapshot::SessionSnapshot;
use crate::submission::{
    CompletionSink, NoOpSink, SimulatedSubmitter, SubmissionPayload, SubmissionReceipt, Submitter,
};

type SubmissionResult = Result<SubmissionReceipt, SubmissionError>;

/// Async driver around a [`StageController`].
///
/// Each verification ticket is handed to the gateway on its own task; the
/// response comes back over a channel and is applied on the session's side,
/// where stale responses are dropped. Callers either drive the session
/// step by step (`input_change`, `next_resolution`, `advance`, `submit`) or
/// hand it a command channel with [`Session::run`], which also moves the
/// submission onto its own task so the in-flight state is observable.
pub struct Session {
    controller: StageController,
    gateway: Arc<dyn VerificationGateway>,
    submitter: Arc<dyn Submitter>,
    sink: Arc<dyn CompletionSink>,
    resolutions_tx: mpsc::UnboundedSender<Resolution>,
    resolutions_rx: mpsc::UnboundedReceiver<Resolution>,
    in_flight: usize,
    submissions_tx: mpsc::UnboundedSender<SubmissionResult>,
    submissions_rx: mpsc::UnboundedReceiver<SubmissionResult>,
    submission_pending: bool,
}

enum Incoming {
    Resolution(Resolution),
    Submission(SubmissionResult),
    Command(Option<Command>),
}

impl Session {
    pub fn new(
        controller: StageController,
        gateway: Arc<dyn VerificationGateway>,
        submitter: Arc<dyn Submitter>,
    ) -> Self {
        let (resolutions_tx, resolutions_rx) = mpsc::unbounded_channel();
        let (submissions_tx, submissions_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            gateway,
            submitter,
            sink: Arc::new(NoOpSink),
            resolutions_tx,
            resolutions_rx,
            in_flight: 0,
            submissions_tx,
            submissions_rx,
            submission_pending: false,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn CompletionSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Build a session from configuration, backed by the simulated gateway
    /// (with the demo record set) and the simulated submitter.
    pub fn from_config(config: &WorkflowConfig) -> SessionResult<Self> {
        config.validate()?;

        let records: Arc<dyn RecordSource> = Arc::new(InMemoryRecords::demo());
        let gateway = SimulatedGateway::new(records, &config.gateway);
        let gate = StepGate::new(config.gate_config())?;
        let validator = FieldValidator::new(config.documents.clone());

        Ok(Self::new(
            StageController::new(validator, gate),
            Arc::new(gateway),
            Arc::new(SimulatedSubmitter::new(&config.submission)),
        ))
    }

    pub fn controller(&self) -> &StageController {
        &self.controller
    }

    /// Number of verification calls whose response has not been applied.
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.controller.snapshot()
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    /// Apply an input and, if its format passes, start verifying it.
    ///
    /// Must be called within a tokio runtime.
    pub fn input_change(&mut self, kind: FieldKind, value: &str) {
        if let Some(ticket) = self.controller.on_input_change(kind, value) {
            self.dispatch(ticket);
        }
    }

    /// Re-verify a field the gateway rejected. Returns `false` if there was
    /// nothing to retry.
    pub fn retry(&mut self, kind: FieldKind) -> bool {
        match self.controller.retry(kind) {
            Some(ticket) => {
                self.dispatch(ticket);
                true
            }
            None => false,
        }
    }

    pub fn file_change(&mut self, slot: DocumentSlot, file: Option<DocumentFile>) -> AttachmentOutcome {
        self.controller.on_file_change(slot, file)
    }

    fn dispatch(&mut self, ticket: Ticket) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.resolutions_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let outcome = gateway.verify(ticket.kind, &ticket.value).await;
            // The receiver lives as long as the session.
            let _ = tx.send(Resolution::new(ticket, outcome));
        });
    }

    // -----------------------------------------------------------------------
    // Resolutions
    // -----------------------------------------------------------------------

    /// Wait for the next gateway response and apply it.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_resolution(&mut self) -> Option<ResolutionOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let resolution = self.resolutions_rx.recv().await?;
        Some(self.apply(resolution))
    }

    /// Wait until every outstanding verification has been applied.
    pub async fn settle(&mut self) {
        while self.next_resolution().await.is_some() {}
    }

    fn apply(&mut self, resolution: Resolution) -> ResolutionOutcome {
        self.in_flight -= 1;
        self.controller.apply_resolution(resolution)
    }

    // -----------------------------------------------------------------------
    // Stages and submission
    // -----------------------------------------------------------------------

    pub fn advance(&mut self) -> Result<usize, Rejected> {
        self.controller.advance()
    }

    /// Submit the session. On success the completion sink is notified and
    /// the session becomes read-only.
    pub async fn submit(&mut self) -> Result<SubmissionReceipt, SubmissionError> {
        let payload = self.controller.begin_submission()?;
        self.deliver(payload).await
    }

    async fn deliver(&mut self, payload: SubmissionPayload) -> SubmissionResult {
        let result = self.submitter.submit(&payload).await;
        self.conclude(result)
    }

    /// Hand the payload to the submitter on its own task; the result comes
    /// back through `submissions_rx`.
    fn spawn_submission(&mut self, payload: SubmissionPayload) {
        let submitter = Arc::clone(&self.submitter);
        let tx = self.submissions_tx.clone();
        self.submission_pending = true;

        tokio::spawn(async move {
            let result = submitter.submit(&payload).await;
            let _ = tx.send(result);
        });
    }

    fn conclude(&mut self, result: SubmissionResult) -> SubmissionResult {
        self.submission_pending = false;
        let receipt = self.controller.finish_submission(result)?;
        self.sink.on_submitted(&receipt);
        Ok(receipt)
    }

    pub async fn handle(&mut self, command: Command) -> CommandOutcome {
        match command {
            Command::InputChanged { kind, value } => {
                self.input_change(kind, &value);
                CommandOutcome::Updated
            }
            Command::FileChanged { slot, file } => CommandOutcome::Attachment(self.file_change(slot, file)),
            Command::Retry(kind) => {
                self.retry(kind);
                CommandOutcome::Updated
            }
            Command::Advance => match self.controller.on_advance() {
                Ok(AdvanceOutcome::Moved(stage)) => CommandOutcome::Advanced(stage),
                Ok(AdvanceOutcome::Submit(payload)) => match self.deliver(payload).await {
                    Ok(receipt) => CommandOutcome::Submitted(receipt),
                    Err(err) => CommandOutcome::SubmissionFailed(err),
                },
                Err(rejected) => CommandOutcome::Rejected(rejected),
            },
            Command::Submit => match self.submit().await {
                Ok(receipt) => CommandOutcome::Submitted(receipt),
                Err(err) => CommandOutcome::SubmissionFailed(err),
            },
        }
    }

    /// Process commands, gateway responses and the submission result until
    /// the session is submitted or the command channel closes with nothing
    /// left in flight.
    ///
    /// A snapshot is published after every applied event, including the
    /// start of a submission.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        snapshots: watch::Sender<SessionSnapshot>,
    ) -> Option<SubmissionReceipt> {
        let mut open = true;
        snapshots.send_replace(self.snapshot());

        loop {
            let incoming = tokio::select! {
                Some(resolution) = self.resolutions_rx.recv(), if self.in_flight > 0 => {
                    Incoming::Resolution(resolution)
                }
                Some(result) = self.submissions_rx.recv(), if self.submission_pending => {
                    Incoming::Submission(result)
                }
                command = commands.recv(), if open => Incoming::Command(command),
                else => break,
            };

            match incoming {
                Incoming::Resolution(resolution) => {
                    self.apply(resolution);
                }
                Incoming::Submission(result) => {
                    if let Err(err) = self.conclude(result) {
                        tracing::debug!(error = %err, "submit action re-enabled");
                    }
                }
                Incoming::Command(Some(command)) => self.start(command).await,
                Incoming::Command(None) => {
                    open = false;
                    continue;
                }
            }

            snapshots.send_replace(self.snapshot());
            if self.controller.state().is_complete() {
                break;
            }
        }

        tracing::debug!(session = %self.controller.state().id(), "session loop finished");
        self.controller.state().receipt().cloned()
    }

    /// Like [`Self::handle`], but a submission is started rather than awaited.
    async fn start(&mut self, command: Command) {
        let payload = match command {
            Command::Advance => match self.controller.on_advance() {
                Ok(AdvanceOutcome::Submit(payload)) => Ok(payload),
                Ok(AdvanceOutcome::Moved(stage)) => {
                    tracing::debug!(stage, "command handled");
                    return;
                }
                Err(rejected) => {
                    tracing::debug!(%rejected, "advance rejected");
                    return;
                }
            },
            Command::Submit => self.controller.begin_submission(),
            other => {
                let outcome = self.handle(other).await;
                tracing::debug!(?outcome, "command handled");
                return;
            }
        };

        match payload {
            Ok(payload) => self.spawn_submission(payload),
            Err(err) => tracing::debug!(error = %err, "submission not started"),
        }
    }
}
