use std::fmt;

/// Errors that can occur during gate evaluation.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The requested stage does not exist in the plan.
    #[error("stage index {index} out of range (plan has {total} stages)")]
    StageOutOfRange { index: usize, total: usize },

    /// The stage plan is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PartialEq for GateError {
    fn eq(&self, other: &Self) -> bool {
        // Compare by display representation for test convenience.
        fmt::format(format_args!("{self}")) == fmt::format(format_args!("{other}"))
    }
}

impl Eq for GateError {}
