//! Error taxonomy for the rxverify analysis pipeline.
//!
//! Only the request boundary and configuration loading return
//! `RxResult<T>`. Oracle failures never become an `RxError`: they are
//! `OracleError`s, absorbed by the calling component and recorded as
//! degradations.

use thiserror::Error;

/// The unified error type for the rxverify workspace.
#[derive(Debug, Error)]
pub enum RxError {
    /// The request was rejected at the boundary before reaching the pipeline.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// A configuration document or seed file is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The boundary's overall request deadline elapsed.
    #[error("analysis timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

/// Convenience alias used throughout the rxverify crates.
pub type RxResult<T> = Result<T, RxError>;
