//! Verification gateway for the identity-verification workflow.
//!
//! The gateway is the only asynchronous boundary between a format-valid
//! value and a verified one. [`SimulatedGateway`] stands in for the remote
//! authorities: it waits a fixed latency, re-runs the format rule, and looks
//! the value up in an injected [`RecordSource`]. A real client implements
//! [`VerificationGateway`] and slots in without touching the session.

pub mod config;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod records;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use fallback::{FallbackConfig, FallbackPolicy};
pub use gateway::{SimulatedGateway, VerificationGateway};
pub use records::{InMemoryRecords, RecordSource};
