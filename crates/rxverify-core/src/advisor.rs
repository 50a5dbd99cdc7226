//! Dosage advisories and alternative suggestions.
//!
//! Dosage is safety-relevant: every drug gets exactly one advisory, and an
//! unusable oracle reply is replaced by a fixed template naming the
//! patient's age category. Alternatives are optional: an unusable reply
//! simply leaves the drug out of the map.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::{stream, StreamExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use rxverify_contracts::{
    advisory::{AgeCategory, AlternativeOption, AlternativeSuggestion, DosageAdvisory},
    analysis::{Degradation, Stage},
    error::RxResult,
    mention::{DrugMention, NOT_SPECIFIED},
    oracle::{DegradationKind, OracleReply},
    request::PatientContext,
};
use rxverify_repair::{fields, ExpectedShape};

use crate::{
    config::PipelineConfig,
    consult::consult,
    prompts,
    stage::StageOutput,
    traits::{DrugKnowledge, Oracle},
};

const UNKNOWN_CLASS: &str = "Unknown";

/// The advisory used when the oracle's reply is unusable.
pub fn fallback_advisory(drug: &str, category: AgeCategory) -> DosageAdvisory {
    DosageAdvisory {
        drug: drug.to_string(),
        age_category: category,
        recommendation: format!(
            "Standard adult dosing may need adjustment for {} patients",
            category.as_str().to_lowercase()
        ),
        warnings: vec!["Consult healthcare provider for appropriate dosing".to_string()],
        monitoring: vec!["Regular monitoring recommended".to_string()],
        fallback: true,
    }
}

pub struct Advisor {
    oracle: Arc<dyn Oracle>,
    knowledge: Arc<dyn DrugKnowledge>,
    dosage_shape: ExpectedShape,
    alternatives_shape: ExpectedShape,
    dosage_max_tokens: u32,
    alternatives_max_tokens: u32,
    alternatives_limit: usize,
    concurrency: usize,
}

impl Advisor {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        knowledge: Arc<dyn DrugKnowledge>,
        config: &PipelineConfig,
    ) -> RxResult<Self> {
        Ok(Self {
            oracle,
            knowledge,
            dosage_shape: prompts::dosage_shape()?,
            alternatives_shape: prompts::alternatives_shape()?,
            dosage_max_tokens: config.dosage_max_tokens,
            alternatives_max_tokens: config.alternatives_max_tokens,
            alternatives_limit: config.alternatives_limit,
            concurrency: config.oracle_concurrency.max(1),
        })
    }

    // ── Dosage ────────────────────────────────────────────────────────────────

    /// Dosage guidance for one drug. Never fails.
    pub async fn advise(&self, drug: &str, age: u32, weight_kg: Option<f64>) -> StageOutput<DosageAdvisory> {
        let category = AgeCategory::from_age(age);
        let prompt = prompts::dosage_prompt(drug, age, category, weight_kg);
        let reply = consult(self.oracle.as_ref(), &prompt, self.dosage_max_tokens, &self.dosage_shape).await;

        let parsed = reply.value().and_then(|value| {
            let recommendation = fields::text(value, "recommendation")?;
            Some(DosageAdvisory {
                drug: drug.to_string(),
                age_category: category,
                recommendation,
                warnings: fields::text_list(value, "warnings"),
                monitoring: fields::text_list(value, "monitoring"),
                fallback: false,
            })
        });

        match parsed {
            Some(advisory) => StageOutput::clean(advisory),
            None => {
                warn!(drug, age_category = %category, "dosage reply unusable, using fallback advisory");
                // A parsed object whose recommendation is unreadable counts as a parse failure.
                let kind = reply.failure_kind().unwrap_or(DegradationKind::ParseFailed);
                StageOutput::with(
                    fallback_advisory(drug, category),
                    Some(Degradation { stage: Stage::Dosage, subject: drug.to_string(), kind }),
                )
            }
        }
    }

    /// One advisory per mention, in mention order.
    pub async fn advise_all(
        &self,
        mentions: &[DrugMention],
        patient: &PatientContext,
    ) -> StageOutput<Vec<DosageAdvisory>> {
        let outputs: Vec<StageOutput<DosageAdvisory>> = stream::iter(mentions)
            .map(|m| self.advise(&m.name, patient.age, patient.weight_kg))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut advisories = Vec::with_capacity(outputs.len());
        let mut degradations = Vec::new();
        for output in outputs {
            advisories.push(output.value);
            degradations.extend(output.degradations);
        }
        info!(
            advisories = advisories.len(),
            fallbacks = degradations.len(),
            "dosage advice complete"
        );
        StageOutput { value: advisories, degradations }
    }

    // ── Alternatives ──────────────────────────────────────────────────────────

    /// Alternatives for the first `alternatives_limit` mentions, keyed by
    /// drug name. Drugs whose reply is unusable are omitted.
    pub async fn find_alternatives(
        &self,
        mentions: &[DrugMention],
        conditions: &[String],
    ) -> StageOutput<BTreeMap<String, AlternativeSuggestion>> {
        let considered = &mentions[..mentions.len().min(self.alternatives_limit)];

        let replies: Vec<OracleReply> = stream::iter(considered)
            .map(|m| async move {
                let prompt = prompts::alternatives_prompt(&m.name, conditions);
                consult(
                    self.oracle.as_ref(),
                    &prompt,
                    self.alternatives_max_tokens,
                    &self.alternatives_shape,
                )
                .await
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut suggestions = BTreeMap::new();
        let mut degradations = Vec::new();
        for (mention, reply) in considered.iter().zip(replies) {
            match reply.value() {
                Some(value) => {
                    let suggestion = self.suggestion(&mention.name, value);
                    suggestions.insert(mention.name.clone(), suggestion);
                }
                None => {
                    debug!(drug = %mention.name, "alternatives omitted");
                    if let Some(kind) = reply.failure_kind() {
                        degradations.push(Degradation {
                            stage: Stage::Alternatives,
                            subject: mention.name.clone(),
                            kind,
                        });
                    }
                }
            }
        }
        info!(
            requested = considered.len(),
            found = suggestions.len(),
            "alternatives lookup complete"
        );
        StageOutput { value: suggestions, degradations }
    }

    fn suggestion(&self, drug: &str, value: &Value) -> AlternativeSuggestion {
        let known_class = self.knowledge.drug_class(drug);
        let drug_class = if known_class != UNKNOWN_CLASS {
            known_class
        } else {
            fields::text(value, "drug_class").unwrap_or(known_class)
        };

        AlternativeSuggestion {
            original_drug: drug.to_string(),
            drug_class,
            reason: fields::text(value, "reason_for_alternatives")
                .or_else(|| fields::text(value, "reason"))
                .unwrap_or_default(),
            alternatives: fields::items(value, "alternatives")
                .iter()
                .filter_map(alternative_option)
                .collect(),
            considerations: fields::text_list(value, "considerations"),
        }
    }
}

fn alternative_option(item: &Value) -> Option<AlternativeOption> {
    if let Value::String(name) = item {
        let name = name.trim();
        return (!name.is_empty()).then(|| AlternativeOption {
            name: name.to_string(),
            dosage: NOT_SPECIFIED.to_string(),
            notes: String::new(),
        });
    }
    Some(AlternativeOption {
        name: fields::text(item, "name")?,
        dosage: fields::text(item, "dosage").unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        notes: fields::text(item, "notes").unwrap_or_default(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
