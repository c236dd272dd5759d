use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kyc_types::{DataRecord, DocumentFile, DocumentSlot, FieldKind, SessionId};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SubmissionConfig;
use crate::error::SubmissionError;

pub const SUCCESS_MESSAGE: &str = "Verification completed successfully";

/// Everything collected by the session, frozen at the start of submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub session: SessionId,
    pub fields: BTreeMap<FieldKind, String>,
    pub records: BTreeMap<FieldKind, DataRecord>,
    pub documents: BTreeMap<DocumentSlot, DocumentFile>,
}

/// Acknowledgement of a successful submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Reference issued by the receiving system.
    pub reference: uuid::Uuid,
    pub session: SessionId,
    pub submitted_at: DateTime<Utc>,
    pub message: String,
}

impl SubmissionReceipt {
    pub fn issue(session: SessionId) -> Self {
        Self {
            reference: uuid::Uuid::now_v7(),
            session,
            submitted_at: Utc::now(),
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Final hand-off of a completed session.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Notified once per successful submission (navigation, toasts, ...).
pub trait CompletionSink: Send + Sync {
    fn on_submitted(&self, receipt: &SubmissionReceipt);
}

pub struct NoOpSink;

impl CompletionSink for NoOpSink {
    fn on_submitted(&self, _receipt: &SubmissionReceipt) {}
}

/// Fixed-latency submitter that fails at a configurable rate.
pub struct SimulatedSubmitter {
    latency: Duration,
    failure_rate: f64,
}

impl SimulatedSubmitter {
    /// Out-of-range rates are clamped; a non-finite rate never fails.
    pub fn new(config: &SubmissionConfig) -> Self {
        let failure_rate = if config.failure_rate.is_finite() {
            config.failure_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            latency: config.latency(),
            failure_rate,
        }
    }

    /// Always fails with a network error.
    pub fn failing(latency: Duration) -> Self {
        Self {
            latency,
            failure_rate: 1.0,
        }
    }
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self::new(&SubmissionConfig::default())
    }
}

#[async_trait]
impl Submitter for SimulatedSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        tokio::time::sleep(self.latency).await;

        let failed = rand::thread_rng().gen_bool(self.failure_rate);
        if failed {
            tracing::warn!(session = %payload.session, "simulated submission failure");
            return Err(SubmissionError::Network("simulated network failure".into()));
        }

        Ok(SubmissionReceipt::issue(payload.session))
    }
}
