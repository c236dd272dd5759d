use thiserror::Error;

/// Errors raised while building a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("gate error: {0}")]
    Gate(#[from] kyc_gate::GateError),

    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Why an advance request was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("stage '{stage}' is not complete: {}", .reasons.join("; "))]
    Blocked { stage: String, reasons: Vec<String> },

    #[error("already on the final stage; submit instead")]
    FinalStage,

    #[error("a submission is in progress")]
    Submitting,

    #[error("the session has already been submitted")]
    Completed,
}

/// Why a submission attempt failed.
///
/// Every variant leaves the session as it was before the attempt, with the
/// submit action available again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("stage '{stage}' is not complete: {}", .reasons.join("; "))]
    NotReady { stage: String, reasons: Vec<String> },

    #[error("a submission is already in progress")]
    InFlight,

    #[error("the session has already been submitted")]
    Completed,

    #[error("network error: {0}")]
    Network(String),
}
