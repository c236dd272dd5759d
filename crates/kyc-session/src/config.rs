use std::path::Path;
use std::time::Duration;

use kyc_gate::{GateConfig, StageSpec};
use kyc_gateway::GatewayConfig;
use kyc_validate::DocumentPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

/// Settings for the simulated submitter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub latency_ms: u64,
    /// Probability in `[0, 1]` that a submission fails.
    pub failure_rate: f64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            latency_ms: 2000,
            failure_rate: 0.0,
        }
    }
}

impl SubmissionConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Whole-workflow configuration, loadable from TOML.
///
/// ```toml
/// [gateway]
/// latency_ms = 800
///
/// [gateway.fallback]
/// routing-code = "strict"
///
/// [documents]
/// max_bytes = 5242880
///
/// [[stages]]
/// id = "identity"
/// title = "Identity Verification"
/// required_fields = ["identity-number"]
/// required_attachments = ["identity-document"]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub gateway: GatewayConfig,
    pub documents: DocumentPolicy,
    pub stages: Vec<StageSpec>,
    pub submission: SubmissionConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            documents: DocumentPolicy::default(),
            stages: GateConfig::default().stages,
            submission: SubmissionConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn from_toml_str(s: &str) -> SessionResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SessionResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig::new(self.stages.clone())
    }

    pub fn validate(&self) -> SessionResult<()> {
        self.gate_config().validate()?;

        if !(0.0..=1.0).contains(&self.submission.failure_rate) {
            return Err(SessionError::Config(format!(
                "submission.failure_rate must be within [0, 1], got {}",
                self.submission.failure_rate
            )));
        }
        if self.documents.allowed_mime_types.is_empty() {
            return Err(SessionError::Config(
                "documents.allowed_mime_types must not be empty".into(),
            ));
        }
        Ok(())
    }
}
