//! Collaborator traits for the analysis pipeline.
//!
//! These two traits are the pipeline's only view of the outside world:
//!
//! - `Oracle`: untrusted, fallible, latency-bearing text generation
//! - `DrugKnowledge`: trusted, deterministic, read-only reference data
//!
//! Both are injected into [`crate::Pipeline::new`] as `Arc<dyn _>`; there is
//! no process-global handle.

use async_trait::async_trait;

use rxverify_contracts::{interaction::InteractionRecord, oracle::OracleError};

/// An external text-generation service.
///
/// Implementations are **untrusted**: replies follow the requested format
/// only loosely and calls may fail at any time. Callers never assume a reply
/// is well-formed; every reply goes through the normalizer first.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Generate a completion for `prompt`, producing at most
    /// `max_new_tokens` tokens.
    ///
    /// Any error is treated by the pipeline exactly like an unusable reply.
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<String, OracleError>;

    /// Identifier of the model behind this oracle, for report metadata.
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// Deterministic interaction, class, and contraindication lookups.
///
/// Implementations are **trusted**, must be cheap, and must never fail: a
/// miss is reported as `None`, `"Unknown"`, or an empty list. They are read
/// concurrently without locking, so they must not mutate internal state.
pub trait DrugKnowledge: Send + Sync {
    /// The curated record for the unordered pair `{drug_a, drug_b}`,
    /// case-insensitive, tagged `KNOWLEDGE_BASE`.
    fn classify(&self, drug_a: &str, drug_b: &str) -> Option<InteractionRecord>;

    /// Therapeutic class of `drug`, or `"Unknown"`.
    fn drug_class(&self, drug: &str) -> String;

    /// Conditions in which `drug` is contraindicated.
    fn contraindications(&self, drug: &str) -> Vec<String>;
}
