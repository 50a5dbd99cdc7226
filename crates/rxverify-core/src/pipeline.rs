//! The analysis pipeline: the orchestrator that sequences every stage.
//!
//!   Extract → Reconcile → Dosage → Alternatives → Warnings → Assemble
//!
//! The pipeline makes no oracle calls of its own and never sees an error
//! from a stage: each stage absorbs its own oracle failures and reports
//! them as degradations alongside a usable value. The only fallible entry
//! point is [`Pipeline::report`], which validates the incoming request
//! before any stage runs.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use rxverify_contracts::{
    analysis::{AnalysisReport, AnalysisResult, Complexity, ExtractionMethod, InsightSummary},
    error::RxResult,
    mention::DrugMention,
    request::{PatientContext, PrescriptionRequest},
};

use crate::{
    advisor::Advisor,
    config::PipelineConfig,
    extraction::{request_notes, ExtractionFormatter},
    reconcile::InteractionReconciler,
    traits::{DrugKnowledge, Oracle},
    warnings::{narrative_summary, screen_contraindications, synthesize_warnings},
};

/// Drives one prescription through every stage.
///
/// Construct once and share: the pipeline holds no per-request state, so
/// concurrent `analyze` calls on the same instance are independent.
pub struct Pipeline {
    oracle: Arc<dyn Oracle>,
    knowledge: Arc<dyn DrugKnowledge>,
    config: PipelineConfig,
    extractor: ExtractionFormatter,
    reconciler: InteractionReconciler,
    advisor: Advisor,
}

impl Pipeline {
    /// Wire the stages to the injected oracle and knowledge base.
    ///
    /// Returns `RxError::ConfigError` if `config` is invalid.
    pub fn new(
        oracle: Arc<dyn Oracle>,
        knowledge: Arc<dyn DrugKnowledge>,
        config: PipelineConfig,
    ) -> RxResult<Self> {
        config.validate()?;
        Ok(Self {
            extractor: ExtractionFormatter::new(oracle.clone(), &config)?,
            reconciler: InteractionReconciler::new(oracle.clone(), knowledge.clone(), &config)?,
            advisor: Advisor::new(oracle.clone(), knowledge.clone(), &config)?,
            oracle,
            knowledge,
            config,
        })
    }

    pub fn advisor(&self) -> &Advisor {
        &self.advisor
    }

    /// Analyze prescription text for an already-validated patient.
    ///
    /// Always returns a result; gaps left by oracle failures show up as empty
    /// collections, fallback-tagged entries, and `degradations`.
    pub async fn analyze(&self, text: &str, patient: &PatientContext) -> AnalysisResult {
        let started = Instant::now();
        debug!(age = patient.age, conditions = patient.conditions.len(), "analysis starting");

        // ── Step 1: Extract mentions ─────────────────────────────────────────
        let extraction = self.extractor.extract_mentions(text).await;
        let mentions = extraction.value;
        let mut degradations = extraction.degradations;

        // ── Step 2: Reconcile interactions ───────────────────────────────────
        let reconciled = self.reconciler.reconcile(&mentions).await;
        degradations.extend(reconciled.degradations);
        let interactions = reconciled.value;

        // ── Step 3: Dosage, one advisory per mention ─────────────────────────
        let dosage = self.advisor.advise_all(&mentions, patient).await;
        degradations.extend(dosage.degradations);

        // ── Step 4: Alternatives for the leading mentions ────────────────────
        let alternatives = self.advisor.find_alternatives(&mentions, &patient.conditions).await;
        degradations.extend(alternatives.degradations);

        // ── Step 5: Warnings and contraindications ───────────────────────────
        let warnings = synthesize_warnings(
            &mentions,
            &interactions,
            patient.age,
            self.config.polypharmacy_threshold,
        );
        let contraindications =
            screen_contraindications(&mentions, &patient.conditions, self.knowledge.as_ref());

        // ── Step 6: Assemble ─────────────────────────────────────────────────
        let insights = self.insights(&mentions);

        info!(
            drugs = mentions.len(),
            interactions = interactions.len(),
            warnings = warnings.len(),
            degradations = degradations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );

        AnalysisResult {
            mentions,
            interactions,
            dosage_advisories: dosage.value,
            alternatives: alternatives.value,
            insights,
            warnings,
            contraindications,
            degradations,
        }
    }

    /// Validate `request`, analyze it, and wrap the result with report
    /// metadata.
    ///
    /// # Errors
    ///
    /// `RxError::InvalidRequest` if the request fails validation. Nothing
    /// after validation can fail.
    pub async fn report(&self, request: &PrescriptionRequest) -> RxResult<AnalysisReport> {
        let patient = request.validate()?;
        let started = Instant::now();

        let result = self.analyze(&request.text, &patient).await;

        Ok(AnalysisReport {
            analysis_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            processing_time_ms: started.elapsed().as_millis() as u64,
            oracle_model: self.oracle.model_name().to_string(),
            summary: narrative_summary(&result),
            request_notes: request_notes(&request.text),
            result,
        })
    }

    fn insights(&self, mentions: &[DrugMention]) -> InsightSummary {
        let extraction_method = if mentions.is_empty() {
            ExtractionMethod::None
        } else if mentions.iter().any(DrugMention::is_pattern_derived) {
            ExtractionMethod::PatternFallback
        } else {
            ExtractionMethod::Oracle
        };

        InsightSummary {
            total_drugs_found: mentions.len(),
            complexity: Complexity::for_drug_count(mentions.len()),
            extraction_method,
            confidence_scores: mentions.iter().map(|m| (m.name.clone(), m.confidence)).collect(),
            drug_classes: mentions
                .iter()
                .map(|m| (m.name.clone(), self.knowledge.drug_class(&m.name)))
                .collect::<BTreeMap<_, _>>(),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rxverify_contracts::{
        analysis::{Complexity, ExtractionMethod, Stage},
        error::RxError,
        interaction::{InteractionOrigin, Severity},
        request::{PatientContext, PrescriptionRequest},
    };

    use crate::{
        config::PipelineConfig,
        testing::{MockKnowledge, MockOracle},
        warnings::{ELDERLY_WARNING, POLYPHARMACY_WARNING},
    };

    use super::Pipeline;

    fn pipeline(oracle: MockOracle) -> (Pipeline, Arc<MockOracle>) {
        let oracle = Arc::new(oracle);
        let p = Pipeline::new(
            oracle.clone(),
            Arc::new(MockKnowledge::warfarin_aspirin()),
            PipelineConfig::default(),
        )
        .unwrap();
        (p, oracle)
    }

    fn anticoagulation_oracle() -> MockOracle {
        MockOracle::new()
            .reply(
                "Extract drug",
                r#"{"drugs": [
                    {"name": "Warfarin", "dosage": "5mg", "frequency": "once daily", "confidence": 0.95},
                    {"name": "Aspirin", "dosage": "75mg", "frequency": "once daily", "confidence": 0.9}
                ]}"#,
            )
            .reply("Analyze the interaction", r#"{"has_interaction": true, "severity": "HIGH"}"#)
            .reply("Provide dosage", r#"{"recommendation": "Use lowest effective dose"}"#)
            .reply("Suggest alternatives", r#"{"alternatives": [{"name": "Clopidogrel"}]}"#)
    }

    // ── 1. Full happy path ───────────────────────────────────────────────────

    #[tokio::test]
    async fn test_warfarin_aspirin_elderly() {
        let (p, _) = pipeline(anticoagulation_oracle());
        let patient = PatientContext::new(68).with_conditions(["heart disease", "Asthma"]);
        let result = p
            .analyze("Warfarin 5mg once daily, Aspirin 75mg once daily", &patient)
            .await;

        assert_eq!(result.mentions.len(), 2);
        let kb = result
            .interactions
            .iter()
            .find(|r| r.origin == InteractionOrigin::KnowledgeBase)
            .unwrap();
        assert_eq!(kb.severity, Severity::High);
        assert!(kb.warning.contains("bleeding"));
        assert_eq!(result.interactions.len(), 2);

        assert!(result.warnings.iter().any(|w| w.contains("high-risk")));
        assert!(result.warnings.iter().any(|w| w == ELDERLY_WARNING));

        assert_eq!(result.dosage_advisories.len(), 2);
        assert!(result.dosage_advisories.iter().all(|a| !a.fallback));
        assert_eq!(result.alternatives.len(), 2);

        assert_eq!(result.contraindications.len(), 1);
        assert_eq!(result.contraindications[0].drug, "Aspirin");

        assert_eq!(result.insights.complexity, Complexity::Simple);
        assert_eq!(result.insights.extraction_method, ExtractionMethod::Oracle);
        assert_eq!(result.insights.drug_classes["Warfarin"], "Anticoagulant");
        assert_eq!(result.insights.confidence_scores["Warfarin"], 0.95);
        assert!(result.degradations.is_empty());
    }

    // ── 2. Nothing found ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_no_mentions_yields_empty_simple_result() {
        let (p, oracle) = pipeline(MockOracle::new().reply("Extract drug", r#"{"drugs": []}"#));
        let result = p.analyze("Rest and fluids", &PatientContext::new(40)).await;

        assert!(result.mentions.is_empty());
        assert!(result.interactions.is_empty());
        assert!(result.dosage_advisories.is_empty());
        assert!(result.alternatives.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.insights.complexity, Complexity::Simple);
        assert_eq!(result.insights.extraction_method, ExtractionMethod::None);
        assert_eq!(oracle.calls(), 1);
    }

    // ── 3. Oracle outage ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_total_oracle_outage_still_produces_a_result() {
        let (p, _) = pipeline(MockOracle::new());
        let result = p
            .analyze("Warfarin 5mg daily and aspirin 81mg daily", &PatientContext::new(40))
            .await;

        assert_eq!(result.mentions.len(), 2);
        assert_eq!(result.insights.extraction_method, ExtractionMethod::PatternFallback);
        assert_eq!(result.interactions.len(), 1);
        assert_eq!(result.interactions[0].origin, InteractionOrigin::KnowledgeBase);
        assert_eq!(result.dosage_advisories.len(), 2);
        assert!(result.dosage_advisories.iter().all(|a| a.fallback));
        assert!(result.alternatives.is_empty());

        let per_stage = |stage| result.degradations.iter().filter(|d| d.stage == stage).count();
        assert_eq!(per_stage(Stage::Extraction), 1);
        assert_eq!(per_stage(Stage::Interactions), 1);
        assert_eq!(per_stage(Stage::Dosage), 2);
        assert_eq!(per_stage(Stage::Alternatives), 2);
    }

    // ── 4. Polypharmacy ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_six_mentions_trigger_polypharmacy() {
        let (p, oracle) = pipeline(MockOracle::new().reply(
            "Extract drug",
            r#"{"drugs": [{"name": "Lisinopril"}, {"name": "Amlodipine"}, {"name": "Metformin"},
                          {"name": "Atorvastatin"}, {"name": "Omeprazole"}, {"name": "Levothyroxine"}]}"#,
        ));
        let result = p.analyze("six drugs", &PatientContext::new(50)).await;

        assert_eq!(result.mentions.len(), 6);
        assert_eq!(result.warnings, [POLYPHARMACY_WARNING]);
        assert_eq!(result.insights.complexity, Complexity::Medium);
        assert_eq!(result.dosage_advisories.len(), 6);

        // 1 extraction + 15 pairs + 6 dosage + 3 alternatives
        assert_eq!(oracle.calls(), 25);
        let alternative_prompts = oracle
            .prompts()
            .iter()
            .filter(|prompt| prompt.contains("Suggest alternatives"))
            .count();
        assert_eq!(alternative_prompts, 3);
    }

    // ── 5. Report envelope ───────────────────────────────────────────────────

    #[tokio::test]
    async fn test_report_validates_before_analysis() {
        let (p, oracle) = pipeline(MockOracle::new());
        let request = PrescriptionRequest {
            text: "   ".to_string(),
            age: 30,
            weight: None,
            medical_conditions: None,
        };
        let err = p.report(&request).await.unwrap_err();
        assert!(matches!(err, RxError::InvalidRequest { .. }));
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_report_carries_metadata_and_summary() {
        let (p, _) = pipeline(anticoagulation_oracle());
        let request = PrescriptionRequest {
            text: "Warfarin 5mg once daily, Aspirin 75mg once daily".to_string(),
            age: 68,
            weight: Some(70.0),
            medical_conditions: Some(vec!["heart disease".to_string()]),
        };
        let report = p.report(&request).await.unwrap();

        assert_eq!(report.oracle_model, "mock");
        assert!(report.request_notes.is_empty());
        assert!(report.summary.starts_with("2 medications were identified."));
        assert!(report.summary.ends_with("Review recommended before dispensing."));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("analysis_id").is_some());
        assert_eq!(json["interactions"][0]["origin"], "KNOWLEDGE_BASE");
        assert_eq!(json["interactions"][0]["severity"], "HIGH");
    }

    /// Any interaction or warning asks for review, not only HIGH pairs.
    #[tokio::test]
    async fn test_medium_interaction_with_warnings_still_asks_for_review() {
        let (p, _) = pipeline(
            MockOracle::new()
                .reply(
                    "Extract drug",
                    r#"{"drugs": [{"name": "Lisinopril"}, {"name": "Amlodipine"}, {"name": "Metformin"},
                                  {"name": "Atorvastatin"}, {"name": "Omeprazole"}, {"name": "Levothyroxine"}]}"#,
                )
                .reply(
                    "between Lisinopril and Amlodipine",
                    r#"{"has_interaction": true, "severity": "MEDIUM"}"#,
                )
                .reply("Analyze the interaction", r#"{"has_interaction": false}"#),
        );
        let request = PrescriptionRequest {
            text: "six drugs".to_string(),
            age: 72,
            weight: None,
            medical_conditions: None,
        };
        let report = p.report(&request).await.unwrap();

        assert_eq!(report.result.interactions.len(), 1);
        assert_eq!(report.result.interactions[0].severity, Severity::Medium);
        assert_eq!(report.result.warnings, [ELDERLY_WARNING, POLYPHARMACY_WARNING]);
        assert_eq!(
            report.summary,
            "6 medications were identified. 1 potential interaction(s) found. 2 warning(s) raised. \
             Review recommended before dispensing."
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PipelineConfig { oracle_concurrency: 0, ..PipelineConfig::default() };
        let result = Pipeline::new(
            Arc::new(MockOracle::new()),
            Arc::new(MockKnowledge::warfarin_aspirin()),
            config,
        );
        assert!(matches!(result, Err(RxError::ConfigError { .. })));
    }
}
