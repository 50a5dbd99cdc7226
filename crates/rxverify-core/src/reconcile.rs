//! Interaction reconciliation.
//!
//! Every unordered pair of distinct mentions is checked twice: once against
//! the knowledge base and once by the oracle. Records from both sources are
//! kept side by side (knowledge-base records first, each group in pair
//! order) so a disagreement between the curated table and the model stays
//! visible.

use std::collections::HashSet;
use std::sync::Arc;

use futures::{stream, StreamExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use rxverify_contracts::{
    analysis::{Degradation, Stage},
    error::RxResult,
    interaction::{InteractionOrigin, InteractionRecord, Severity},
    mention::DrugMention,
    oracle::OracleReply,
};
use rxverify_repair::{fields, ExpectedShape};

use crate::{
    config::PipelineConfig,
    consult::consult,
    prompts,
    stage::StageOutput,
    traits::{DrugKnowledge, Oracle},
};

const DEFAULT_WARNING: &str = "Potential interaction detected";
const DEFAULT_RECOMMENDATION: &str = "Consult healthcare provider";

pub struct InteractionReconciler {
    oracle: Arc<dyn Oracle>,
    knowledge: Arc<dyn DrugKnowledge>,
    shape: ExpectedShape,
    max_tokens: u32,
    concurrency: usize,
}

impl InteractionReconciler {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        knowledge: Arc<dyn DrugKnowledge>,
        config: &PipelineConfig,
    ) -> RxResult<Self> {
        Ok(Self {
            oracle,
            knowledge,
            shape: prompts::interaction_shape()?,
            max_tokens: config.interaction_max_tokens,
            concurrency: config.oracle_concurrency.max(1),
        })
    }

    /// All interaction records among `mentions`.
    ///
    /// Fewer than two distinct drugs yields an empty list without any lookup.
    /// A failed oracle call removes only that pair's oracle record.
    pub async fn reconcile(&self, mentions: &[DrugMention]) -> StageOutput<Vec<InteractionRecord>> {
        let pairs = unordered_pairs(mentions);
        if pairs.is_empty() {
            return StageOutput::clean(Vec::new());
        }

        // ── Step 1: knowledge base ────────────────────────────────────────────
        let mut records: Vec<InteractionRecord> = pairs
            .iter()
            .filter_map(|(a, b)| self.knowledge.classify(a, b))
            .collect();
        let known = records.len();

        // ── Step 2: oracle, one call per pair ─────────────────────────────────
        let replies: Vec<OracleReply> = stream::iter(pairs.iter())
            .map(|(a, b)| async move {
                let prompt = prompts::interaction_prompt(a, b);
                consult(self.oracle.as_ref(), &prompt, self.max_tokens, &self.shape).await
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut degradations = Vec::new();
        for ((a, b), reply) in pairs.iter().zip(replies) {
            match reply {
                OracleReply::Parsed(value) => {
                    if let Some(record) = oracle_record(a, b, &value) {
                        records.push(record);
                    }
                }
                failed => {
                    warn!(drug_a = %a, drug_b = %b, "interaction check skipped for pair");
                    if let Some(kind) = failed.failure_kind() {
                        degradations.push(Degradation {
                            stage: Stage::Interactions,
                            subject: format!("{a} + {b}"),
                            kind,
                        });
                    }
                }
            }
        }

        info!(
            pairs = pairs.len(),
            knowledge_base = known,
            oracle = records.len() - known,
            failed = degradations.len(),
            "interaction reconciliation complete"
        );
        StageOutput { value: records, degradations }
    }
}

/// Unordered pairs of distinct drugs, in mention order.
fn unordered_pairs(mentions: &[DrugMention]) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let names: Vec<&str> = mentions
        .iter()
        .filter(|m| seen.insert(m.key()))
        .map(|m| m.name.as_str())
        .collect();

    let mut pairs = Vec::new();
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            pairs.push((a.to_string(), b.to_string()));
        }
    }
    pairs
}

/// Read an oracle verdict. `None` unless `has_interaction` is affirmative.
fn oracle_record(drug_a: &str, drug_b: &str, value: &Value) -> Option<InteractionRecord> {
    if fields::flag(value, "has_interaction") != Some(true) {
        debug!(drug_a, drug_b, "oracle reports no interaction");
        return None;
    }
    let severity = match fields::text(value, "severity") {
        Some(raw) => raw.parse::<Severity>().unwrap_or_else(|_| {
            debug!(drug_a, drug_b, severity = %raw, "unrecognized severity, using MEDIUM");
            Severity::Medium
        }),
        None => Severity::Medium,
    };
    Some(InteractionRecord::new(
        drug_a,
        drug_b,
        severity,
        fields::text(value, "warning").unwrap_or_else(|| DEFAULT_WARNING.to_string()),
        fields::text(value, "recommendation").unwrap_or_else(|| DEFAULT_RECOMMENDATION.to_string()),
        InteractionOrigin::Oracle,
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
