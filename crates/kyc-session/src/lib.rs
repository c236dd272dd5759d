//! Verification sessions for the identity-verification workflow.
//!
//! A session walks the user through the configured stages. Each text field
//! runs its own validation state machine ([`FieldState`]): the local format
//! rule first, then the remote [`kyc_gateway::VerificationGateway`]. Gateway
//! responses that answer an outdated input are dropped. The
//! [`kyc_gate::StepGate`] decides every advance, and the final advance hands
//! the frozen payload to a [`Submitter`].
//!
//! # Layers
//!
//! - [`StageController`]: synchronous, owns [`SessionState`], no I/O.
//! - [`Session`]: async driver that calls the gateway and the submitter.
//!   Drive it step by step or give it a [`Command`] channel via
//!   [`Session::run`], which publishes a [`SessionSnapshot`] after every
//!   change.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kyc_session::{Session, WorkflowConfig};
//! use kyc_types::FieldKind;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::from_config(&WorkflowConfig::default())?;
//! session.input_change(FieldKind::IdentityNumber, "234567890123");
//! session.settle().await;
//! assert!(session.snapshot().field(FieldKind::IdentityNumber).unwrap().status.is_valid());
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod field;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod submission;

// Re-exports for convenience.
pub use command::{Command, CommandOutcome};
pub use config::{SubmissionConfig, WorkflowConfig};
pub use controller::{AdvanceOutcome, AttachmentOutcome, StageController};
pub use error::{Rejected, SessionError, SessionResult, SubmissionError};
pub use field::{FieldState, InputTransition, Resolution, ResolutionOutcome, Ticket, VERIFIED_MESSAGE};
pub use session::Session;
pub use snapshot::{AttachmentView, DocumentView, FieldView, SessionSnapshot, StageMark, StageProgress, StageView};
pub use state::SessionState;
pub use submission::{
    CompletionSink, NoOpSink, SimulatedSubmitter, SubmissionPayload, SubmissionReceipt, Submitter,
    SUCCESS_MESSAGE,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use kyc_gate::StepGate;
    use kyc_gateway::{GatewayError, GatewayResult, SimulatedGateway, VerificationGateway};
    use kyc_types::{DocumentFile, DocumentSlot, FieldKind, FieldStatus, Verdict};
    use kyc_validate::FieldValidator;
    use tokio::sync::{mpsc, watch};

    /// Gateway that accepts everything and counts its calls.
    #[derive(Default)]
    struct CountingGateway {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VerificationGateway for CountingGateway {
        async fn verify(&self, _kind: FieldKind, _value: &str) -> GatewayResult<Verdict> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(Verdict::valid())
        }
    }

    /// Gateway whose latency and verdict depend on the value.
    struct SlowValueGateway {
        slow: &'static str,
    }

    #[async_trait]
    impl VerificationGateway for SlowValueGateway {
        async fn verify(&self, _kind: FieldKind, value: &str) -> GatewayResult<Verdict> {
            if value == self.slow {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(Verdict::invalid("slow value rejected"))
            } else {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(Verdict::valid())
            }
        }
    }

    /// Gateway that is unavailable for its first call only.
    #[derive(Default)]
    struct FlakyGateway {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VerificationGateway for FlakyGateway {
        async fn verify(&self, _kind: FieldKind, _value: &str) -> GatewayResult<Verdict> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(GatewayError::Unavailable("upstream down".into()));
            }
            Ok(Verdict::valid())
        }
    }

    /// Submitter that fails its first attempt with a network error.
    #[derive(Default)]
    struct FlakySubmitter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Submitter for FlakySubmitter {
        async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(SubmissionError::Network("connection reset".into()));
            }
            Ok(SubmissionReceipt::issue(payload.session))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        receipts: Mutex<Vec<SubmissionReceipt>>,
    }

    impl CompletionSink for RecordingSink {
        fn on_submitted(&self, receipt: &SubmissionReceipt) {
            self.receipts.lock().unwrap().push(receipt.clone());
        }
    }

    fn session_with(gateway: Arc<dyn VerificationGateway>) -> Session {
        let controller = StageController::new(FieldValidator::default(), StepGate::with_default_stages());
        Session::new(controller, gateway, Arc::new(SimulatedSubmitter::default()))
    }

    fn pdf(mb: u64) -> DocumentFile {
        DocumentFile::new("document.pdf", mb * 1024 * 1024, "application/pdf")
    }

    fn status(session: &Session, kind: FieldKind) -> FieldStatus {
        session.controller().current_field_state(kind).status()
    }

    async fn fill_every_stage(session: &mut Session) {
        session.input_change(FieldKind::IdentityNumber, "234567890123");
        session.file_change(DocumentSlot::IdentityDocument, Some(pdf(1)));
        session.settle().await;
        session.advance().unwrap();

        session.input_change(FieldKind::TaxId, "ABCDE1234F");
        session.file_change(DocumentSlot::TaxDocument, Some(pdf(1)));
        session.settle().await;
        session.advance().unwrap();

        session.input_change(FieldKind::AccountNumber, "000123456789");
        session.input_change(FieldKind::RoutingCode, "SBIN0001234");
        session.settle().await;
    }

    // -----------------------------------------------------------------------
    // 1. Identity stage end to end against the demo gateway
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn identity_stage_end_to_end() {
        let mut session = Session::from_config(&WorkflowConfig::default()).unwrap();

        session.input_change(FieldKind::IdentityNumber, "234567890123");
        assert_eq!(status(&session, FieldKind::IdentityNumber), FieldStatus::Validating);
        assert_eq!(session.pending(), 1);

        let outcome = session.next_resolution().await;
        assert_eq!(outcome, Some(ResolutionOutcome::Applied(FieldStatus::Valid)));
        let field = session.controller().current_field_state(FieldKind::IdentityNumber);
        assert_eq!(field.message(), Some(VERIFIED_MESSAGE));
        assert_eq!(field.record().unwrap().get("name"), Some("Asha Verma"));

        assert!(!session.controller().can_advance());
        let attached = session.file_change(DocumentSlot::IdentityDocument, Some(pdf(1)));
        assert_eq!(attached, AttachmentOutcome::Attached);
        assert!(session.controller().can_advance());
        assert_eq!(session.advance(), Ok(1));
    }

    // -----------------------------------------------------------------------
    // 2. Bad format never reaches the gateway
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn bad_format_skips_gateway() {
        let gateway = Arc::new(CountingGateway::default());
        let mut session = session_with(gateway.clone());

        session.input_change(FieldKind::IdentityNumber, "000000000000");
        assert_eq!(status(&session, FieldKind::IdentityNumber), FieldStatus::Invalid);
        assert_eq!(session.pending(), 0);
        assert_eq!(session.next_resolution().await, None);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    // -----------------------------------------------------------------------
    // 3. Whitespace-only input is treated as empty
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn whitespace_input_is_idle() {
        let gateway = Arc::new(CountingGateway::default());
        let mut session = session_with(gateway.clone());

        session.input_change(FieldKind::TaxId, "   ");
        assert_eq!(status(&session, FieldKind::TaxId), FieldStatus::Idle);
        assert_eq!(session.pending(), 0);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    // -----------------------------------------------------------------------
    // 4. Oversized document leaves the slot empty
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn oversized_document_is_rejected() {
        let mut session = session_with(Arc::new(CountingGateway::default()));
        let png = DocumentFile::new("card.png", 6 * 1024 * 1024, "image/png");

        let outcome = session.file_change(DocumentSlot::IdentityDocument, Some(png));
        assert!(matches!(outcome, AttachmentOutcome::Rejected(_)));
        assert!(session
            .controller()
            .state()
            .document(DocumentSlot::IdentityDocument)
            .is_none());
        let snap = session.snapshot();
        assert!(snap
            .attachment(DocumentSlot::IdentityDocument)
            .unwrap()
            .error
            .as_deref()
            .unwrap()
            .contains("5MB"));
    }

    // -----------------------------------------------------------------------
    // 5. A slow response for an old input never overwrites a newer one
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn stale_response_is_dropped() {
        let mut session = session_with(Arc::new(SlowValueGateway { slow: "AAAAA1111A" }));

        session.input_change(FieldKind::TaxId, "AAAAA1111A");
        session.input_change(FieldKind::TaxId, "BBBBB2222B");
        assert_eq!(session.pending(), 2);

        assert_eq!(
            session.next_resolution().await,
            Some(ResolutionOutcome::Applied(FieldStatus::Valid))
        );
        assert_eq!(session.next_resolution().await, Some(ResolutionOutcome::Stale));
        assert_eq!(session.pending(), 0);

        let field = session.controller().current_field_state(FieldKind::TaxId);
        assert_eq!(field.status(), FieldStatus::Valid);
        assert_eq!(field.input(), "BBBBB2222B");
    }

    // -----------------------------------------------------------------------
    // 5b. An older response landing first leaves the newer input validating
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn early_response_for_old_input_is_dropped() {
        let mut session = session_with(Arc::new(CountingGateway::default()));

        session.input_change(FieldKind::TaxId, "AAAAA1111A");
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.input_change(FieldKind::TaxId, "BBBBB2222B");

        assert_eq!(session.next_resolution().await, Some(ResolutionOutcome::Stale));
        let field = session.controller().current_field_state(FieldKind::TaxId);
        assert_eq!(field.status(), FieldStatus::Validating);
        assert_eq!(field.input(), "BBBBB2222B");

        assert_eq!(
            session.next_resolution().await,
            Some(ResolutionOutcome::Applied(FieldStatus::Valid))
        );
        assert_eq!(session.pending(), 0);
    }

    // -----------------------------------------------------------------------
    // 6. Gateway failure marks the field invalid; retry recovers
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn gateway_failure_then_retry() {
        let mut session = session_with(Arc::new(FlakyGateway::default()));

        session.input_change(FieldKind::AccountNumber, "123456789");
        session.settle().await;
        let field = session.controller().current_field_state(FieldKind::AccountNumber);
        assert_eq!(field.status(), FieldStatus::Invalid);
        assert!(field.message().unwrap().ends_with("Please try again"));

        assert!(session.retry(FieldKind::AccountNumber));
        assert_eq!(status(&session, FieldKind::AccountNumber), FieldStatus::Validating);
        session.settle().await;
        assert_eq!(status(&session, FieldKind::AccountNumber), FieldStatus::Valid);

        // Nothing left to retry.
        assert!(!session.retry(FieldKind::AccountNumber));
    }

    // -----------------------------------------------------------------------
    // 7. Blocked advance reports every unmet requirement
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn blocked_advance_lists_reasons() {
        let mut session = session_with(Arc::new(CountingGateway::default()));
        session.input_change(FieldKind::IdentityNumber, "234567890123");

        match session.advance() {
            Err(Rejected::Blocked { stage, reasons }) => {
                assert_eq!(stage, "identity");
                assert_eq!(
                    reasons,
                    vec![
                        "Identity number is still being verified".to_string(),
                        "Identity document is not attached".to_string(),
                    ]
                );
            }
            other => panic!("expected a blocked advance, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // 8. Failed submission keeps everything; the retry completes the session
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn submission_failure_then_success() {
        let sink = Arc::new(RecordingSink::default());
        let controller = StageController::new(FieldValidator::default(), StepGate::with_default_stages());
        let mut session = Session::new(
            controller,
            Arc::new(SimulatedGateway::demo()),
            Arc::new(FlakySubmitter::default()),
        )
        .with_sink(sink.clone());

        fill_every_stage(&mut session).await;
        assert!(session.controller().can_advance());
        assert_eq!(session.advance(), Err(Rejected::FinalStage));

        let err = session.submit().await.unwrap_err();
        assert_eq!(err, SubmissionError::Network("connection reset".into()));
        let state = session.controller().state();
        assert!(!state.is_submitting());
        assert!(!state.is_complete());
        assert_eq!(state.stage_index(), 2);
        assert!(sink.receipts.lock().unwrap().is_empty());

        let receipt = session.submit().await.unwrap();
        assert_eq!(receipt.message, SUCCESS_MESSAGE);
        assert_eq!(receipt.session, session.controller().state().id());
        assert_eq!(sink.receipts.lock().unwrap().as_slice(), &[receipt]);

        assert_eq!(session.advance(), Err(Rejected::Completed));
        assert_eq!(
            session.handle(Command::Submit).await,
            CommandOutcome::SubmissionFailed(SubmissionError::Completed)
        );
        assert!(session.snapshot().completed);
    }

    // -----------------------------------------------------------------------
    // 9. Advance on the final stage submits
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn final_advance_command_submits() {
        let mut session = Session::from_config(&WorkflowConfig::default()).unwrap();
        fill_every_stage(&mut session).await;

        match session.handle(Command::Advance).await {
            CommandOutcome::Submitted(receipt) => assert_eq!(receipt.message, SUCCESS_MESSAGE),
            other => panic!("expected submission, got {other:?}"),
        }
        let snap = session.snapshot();
        assert!(snap.completed);
        assert!(!snap.can_advance);
        assert!(snap.progress.iter().all(|p| p.mark == StageMark::Completed));
    }

    // -----------------------------------------------------------------------
    // 10. Strict fallback rejects values missing from the directory
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn strict_fallback_from_config() {
        let config = WorkflowConfig::from_toml_str(
            r#"
            [gateway]
            latency_ms = 5

            [gateway.fallback]
            identity-number = "strict"
            "#,
        )
        .unwrap();
        let mut session = Session::from_config(&config).unwrap();

        session.input_change(FieldKind::IdentityNumber, "555555555555");
        session.settle().await;
        let field = session.controller().current_field_state(FieldKind::IdentityNumber);
        assert_eq!(field.status(), FieldStatus::Invalid);
        assert_eq!(field.message(), Some("Identity number not found"));
    }

    // -----------------------------------------------------------------------
    // 11. The command loop publishes snapshots and returns the receipt
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn run_loop_drives_the_whole_workflow() {
        let session = Session::from_config(&WorkflowConfig::default()).unwrap();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (snap_tx, mut snap_rx) = watch::channel(session.snapshot());
        let handle = tokio::spawn(session.run(cmd_rx, snap_tx));

        cmd_tx
            .send(Command::input(FieldKind::IdentityNumber, "234567890123"))
            .await
            .unwrap();
        cmd_tx
            .send(Command::attach(DocumentSlot::IdentityDocument, pdf(1)))
            .await
            .unwrap();
        snap_rx.wait_for(|s| s.can_advance).await.unwrap();
        cmd_tx.send(Command::Advance).await.unwrap();

        cmd_tx.send(Command::input(FieldKind::TaxId, "ABCDE1234F")).await.unwrap();
        cmd_tx
            .send(Command::attach(DocumentSlot::TaxDocument, pdf(2)))
            .await
            .unwrap();
        snap_rx
            .wait_for(|s| s.stage.index == 1 && s.can_advance)
            .await
            .unwrap();
        cmd_tx.send(Command::Advance).await.unwrap();

        cmd_tx
            .send(Command::input(FieldKind::AccountNumber, "000123456789"))
            .await
            .unwrap();
        cmd_tx
            .send(Command::input(FieldKind::RoutingCode, "SBIN0001234"))
            .await
            .unwrap();
        snap_rx
            .wait_for(|s| s.stage.index == 2 && s.can_advance)
            .await
            .unwrap();
        cmd_tx.send(Command::Advance).await.unwrap();

        let receipt = handle.await.unwrap().expect("session submitted");
        assert_eq!(receipt.message, SUCCESS_MESSAGE);
        assert!(snap_rx.borrow().completed);
    }

    // -----------------------------------------------------------------------
    // 12. Closing the command channel ends the loop without a receipt
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn run_loop_stops_when_commands_close() {
        let session = session_with(Arc::new(CountingGateway::default()));
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (snap_tx, snap_rx) = watch::channel(session.snapshot());
        let handle = tokio::spawn(session.run(cmd_rx, snap_tx));

        cmd_tx
            .send(Command::input(FieldKind::RoutingCode, "HDFC0000123"))
            .await
            .unwrap();
        drop(cmd_tx);

        assert_eq!(handle.await.unwrap(), None);
        // The in-flight verification was still applied before exit.
        let snap = snap_rx.borrow();
        assert_eq!(
            snap.field(FieldKind::RoutingCode).unwrap().status,
            FieldStatus::Valid
        );
    }

    // -----------------------------------------------------------------------
    // 13. The command loop publishes the in-flight submission
    // -----------------------------------------------------------------------
    #[tokio::test(start_paused = true)]
    async fn run_loop_shows_submission_in_flight() {
        let session = Session::from_config(&WorkflowConfig::default()).unwrap();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (snap_tx, mut snap_rx) = watch::channel(session.snapshot());
        let handle = tokio::spawn(session.run(cmd_rx, snap_tx));

        let stages = [
            vec![
                Command::input(FieldKind::IdentityNumber, "234567890123"),
                Command::attach(DocumentSlot::IdentityDocument, pdf(1)),
            ],
            vec![
                Command::input(FieldKind::TaxId, "ABCDE1234F"),
                Command::attach(DocumentSlot::TaxDocument, pdf(1)),
            ],
            vec![
                Command::input(FieldKind::AccountNumber, "000123456789"),
                Command::input(FieldKind::RoutingCode, "SBIN0001234"),
            ],
        ];
        for (index, commands) in stages.into_iter().enumerate() {
            for command in commands {
                cmd_tx.send(command).await.unwrap();
            }
            snap_rx
                .wait_for(|s| s.stage.index == index && s.can_advance)
                .await
                .unwrap();
            cmd_tx.send(Command::Advance).await.unwrap();
        }

        let frozen = snap_rx
            .wait_for(|s| s.submitting && !s.can_advance)
            .await
            .unwrap()
            .clone();
        assert!(!frozen.completed);
        assert!(frozen.receipt.is_none());

        // Edits during the submission change nothing.
        cmd_tx
            .send(Command::input(FieldKind::AccountNumber, "999999999"))
            .await
            .unwrap();

        let receipt = handle.await.unwrap().expect("session submitted");
        let done = snap_rx.borrow();
        assert!(done.completed);
        assert!(!done.submitting);
        assert_eq!(done.receipt.as_ref(), Some(&receipt));
        assert_eq!(
            done.field(FieldKind::AccountNumber).unwrap().input,
            "000123456789"
        );
    }
}
