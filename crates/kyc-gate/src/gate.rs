use crate::config::{GateConfig, StageSpec};
use crate::error::GateError;
use crate::requirement::{GateInput, Requirement};

// ---------------------------------------------------------------------------
// CheckResult
// ---------------------------------------------------------------------------

/// Recorded result of one requirement check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckResult {
    pub requirement: Requirement,
    pub passed: bool,
    /// Populated when the check failed.
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// GateResult
// ---------------------------------------------------------------------------

/// The outcome of evaluating one stage.
#[derive(Clone, Debug)]
pub struct GateResult {
    pub stage_index: usize,
    pub stage_id: String,
    /// Every requirement of the stage, in declaration order.
    pub checks: Vec<CheckResult>,
}

impl GateResult {
    /// Returns `true` if every requirement is met.
    pub fn is_admitted(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Requirements that blocked admission.
    pub fn unmet(&self) -> Vec<Requirement> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.requirement)
            .collect()
    }

    /// Reasons for the unmet requirements.
    pub fn reasons(&self) -> Vec<String> {
        self.checks.iter().filter_map(|c| c.reason.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// StepGate
// ---------------------------------------------------------------------------

/// Decides whether the active stage may be left.
///
/// A stage is a conjunction of its declared requirements. The gate holds no
/// per-session state; the same gate serves any number of sessions.
#[derive(Clone, Debug)]
pub struct StepGate {
    config: GateConfig,
}

impl StepGate {
    /// Build a gate over a validated stage plan.
    pub fn new(config: GateConfig) -> Result<Self, GateError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The three-stage identity / tax / bank plan.
    pub fn with_default_stages() -> Self {
        Self {
            config: GateConfig::default(),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn stage_count(&self) -> usize {
        self.config.len()
    }

    pub fn stage(&self, index: usize) -> Option<&StageSpec> {
        self.config.stage(index)
    }

    pub fn is_final(&self, index: usize) -> bool {
        index + 1 == self.stage_count()
    }

    /// Evaluate every requirement of `stage_index`.
    pub fn evaluate(&self, stage_index: usize, input: &dyn GateInput) -> Result<GateResult, GateError> {
        let stage = self.stage(stage_index).ok_or(GateError::StageOutOfRange {
            index: stage_index,
            total: self.stage_count(),
        })?;

        let checks = stage
            .requirements()
            .map(|requirement| {
                let passed = requirement.is_met(input);
                CheckResult {
                    requirement,
                    passed,
                    reason: (!passed).then(|| requirement.unmet_reason(input)),
                }
            })
            .collect();

        let result = GateResult {
            stage_index,
            stage_id: stage.id.clone(),
            checks,
        };
        tracing::debug!(
            stage = %result.stage_id,
            admitted = result.is_admitted(),
            "stage gate evaluated"
        );
        Ok(result)
    }

    /// Pure admission predicate. Out-of-range stages are never admitted.
    pub fn can_advance(&self, stage_index: usize, input: &dyn GateInput) -> bool {
        self.evaluate(stage_index, input)
            .map(|r| r.is_admitted())
            .unwrap_or(false)
    }

    /// Evaluate stages `0..=last`, stopping at the first one not admitted.
    pub fn evaluate_through(&self, last: usize, input: &dyn GateInput) -> Result<GateResult, GateError> {
        if last >= self.stage_count() {
            return Err(GateError::StageOutOfRange {
                index: last,
                total: self.stage_count(),
            });
        }

        let mut result = self.evaluate(0, input)?;
        for index in 1..=last {
            if !result.is_admitted() {
                break;
            }
            result = self.evaluate(index, input)?;
        }
        Ok(result)
    }
}
