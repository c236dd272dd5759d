use thiserror::Error;

/// Transport-level failures of a verification call.
///
/// A value that was looked up and not found is *not* an error; it comes back
/// as an invalid [`kyc_types::Verdict`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("verification service unavailable: {0}")]
    Unavailable(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
