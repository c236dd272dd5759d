use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kyc_types::{FieldKind, Verdict};
use kyc_validate::FieldValidator;

use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::fallback::{not_found_message, placeholder_record, FallbackConfig, FallbackPolicy};
use crate::records::{InMemoryRecords, RecordSource};

/// Asynchronous remote verification of a format-valid value.
///
/// Calls are not cancellable. Callers that have moved on to newer input
/// drop the stale result instead.
#[async_trait]
pub trait VerificationGateway: Send + Sync {
    async fn verify(&self, kind: FieldKind, value: &str) -> GatewayResult<Verdict>;
}

/// Fixed-latency stand-in for the remote authorities.
pub struct SimulatedGateway {
    records: Arc<dyn RecordSource>,
    validator: FieldValidator,
    latency: Duration,
    fallback: FallbackConfig,
}

impl SimulatedGateway {
    pub fn new(records: Arc<dyn RecordSource>, config: &GatewayConfig) -> Self {
        Self {
            records,
            validator: FieldValidator::default(),
            latency: config.latency(),
            fallback: config.fallback.clone(),
        }
    }

    /// Gateway over [`InMemoryRecords::demo`] with the default configuration.
    pub fn demo() -> Self {
        Self::new(Arc::new(InMemoryRecords::demo()), &GatewayConfig::default())
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn fallback(&self) -> &FallbackConfig {
        &self.fallback
    }

    /// The decision itself, without the artificial delay.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is not verified remotely ([`FieldKind::DocumentFile`]).
    pub fn decide(&self, kind: FieldKind, value: &str) -> GatewayResult<Verdict> {
        assert!(
            kind.requires_verification(),
            "{kind} is not verified remotely; documents go through validate_document"
        );

        // The caller already checked the format; this catches callers that
        // skipped it.
        let format = self.validator.validate(kind, value);
        if !format.is_valid() {
            return Ok(format);
        }

        if let Some(record) = self.records.lookup(kind, value) {
            return Ok(Verdict::verified(record));
        }

        match self.fallback.policy_for(kind) {
            FallbackPolicy::Permissive => {
                tracing::debug!(%kind, "unknown value accepted with placeholder record");
                Ok(Verdict::verified(placeholder_record(kind)))
            }
            FallbackPolicy::Strict => Ok(Verdict::invalid(not_found_message(kind))),
        }
    }
}

#[async_trait]
impl VerificationGateway for SimulatedGateway {
    async fn verify(&self, kind: FieldKind, value: &str) -> GatewayResult<Verdict> {
        tracing::debug!(%kind, latency_ms = self.latency.as_millis() as u64, "verification dispatched");
        tokio::time::sleep(self.latency).await;
        let verdict = self.decide(kind, value)?;
        tracing::debug!(%kind, valid = verdict.valid, "verification resolved");
        Ok(verdict)
    }
}
