//! One oracle round trip: call, then normalize against an expected shape.

use tracing::{debug, warn};

use rxverify_contracts::oracle::OracleReply;
use rxverify_repair::{normalize_as, ExpectedShape};

use crate::traits::Oracle;

/// Ask the oracle and classify what came back.
///
/// Never fails: a call error becomes `CallFailed` and unusable text becomes
/// `ParseFailed`, leaving the fallback decision to the caller.
pub async fn consult(
    oracle: &dyn Oracle,
    prompt: &str,
    max_new_tokens: u32,
    shape: &ExpectedShape,
) -> OracleReply {
    match oracle.generate(prompt, max_new_tokens).await {
        Err(e) => {
            warn!(shape = shape.name(), error = %e, "oracle call failed");
            OracleReply::CallFailed { reason: e.to_string() }
        }
        Ok(raw) => match normalize_as(&raw, shape) {
            Some(value) => {
                debug!(shape = shape.name(), "oracle reply parsed");
                OracleReply::Parsed(value)
            }
            None => OracleReply::ParseFailed { raw },
        },
    }
}
