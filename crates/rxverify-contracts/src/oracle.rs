//! Oracle call errors and the tagged reply type.
//!
//! Every oracle-calling component receives an `OracleReply` and matches on
//! it explicitly. A reply is never assumed well-typed until the normalizer
//! has produced a `Parsed` value and the caller has read its fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The only error an oracle implementation may return.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// The backend answered with an error (model failure, bad status, ...).
    #[error("oracle backend error: {0}")]
    Backend(String),

    /// The call did not complete within the backend's own deadline.
    #[error("oracle call timed out")]
    Timeout,

    /// The oracle has not been loaded or is otherwise unreachable.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// The outcome of one oracle round trip, after the normalizer has run.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleReply {
    /// The response text yielded a structured value.
    Parsed(Value),
    /// The call returned text, but no structured value could be recovered.
    ParseFailed { raw: String },
    /// The call itself failed; there is no text to parse.
    CallFailed { reason: String },
}

impl OracleReply {
    /// The parsed value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            OracleReply::Parsed(v) => Some(v),
            _ => None,
        }
    }

    /// The degradation kind this reply represents, or `None` on success.
    pub fn failure_kind(&self) -> Option<DegradationKind> {
        match self {
            OracleReply::Parsed(_) => None,
            OracleReply::ParseFailed { .. } => Some(DegradationKind::ParseFailed),
            OracleReply::CallFailed { .. } => Some(DegradationKind::CallFailed),
        }
    }
}

/// Why a sub-step had to fall back or omit its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DegradationKind {
    /// The oracle call failed (timeout, backend error).
    CallFailed,
    /// The oracle replied but the reply was unusable after repair.
    ParseFailed,
}

impl std::fmt::Display for DegradationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradationKind::CallFailed => write!(f, "CALL_FAILED"),
            DegradationKind::ParseFailed => write!(f, "PARSE_FAILED"),
        }
    }
}
