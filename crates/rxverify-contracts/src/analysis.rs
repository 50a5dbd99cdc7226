//! The aggregate analysis result and the report envelope around it.
//!
//! `AnalysisResult` is built fresh for every request and discarded after
//! serialization. Maps are `BTreeMap` so serialized output is stable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    advisory::{AlternativeSuggestion, ContraindicationAlert, DosageAdvisory},
    interaction::InteractionRecord,
    mention::DrugMention,
    oracle::DegradationKind,
};

/// Rough complexity tier of a prescription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    Simple,
    Medium,
}

impl Complexity {
    /// `Simple` for at most two drugs, `Medium` beyond that.
    pub fn for_drug_count(count: usize) -> Self {
        if count > 2 {
            Complexity::Medium
        } else {
            Complexity::Simple
        }
    }
}

/// How the mention list was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    /// The oracle's structured reply was used.
    Oracle,
    /// The oracle path failed and lexical heuristics were used.
    PatternFallback,
    /// Both paths produced nothing.
    None,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMethod::Oracle => write!(f, "oracle"),
            ExtractionMethod::PatternFallback => write!(f, "pattern-fallback"),
            ExtractionMethod::None => write!(f, "none"),
        }
    }
}

/// Summary-level facts about the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSummary {
    pub total_drugs_found: usize,
    pub complexity: Complexity,
    pub extraction_method: ExtractionMethod,
    /// Display name → extraction confidence.
    pub confidence_scores: BTreeMap<String, f64>,
    /// Display name → therapeutic class ("Unknown" if not in the table).
    pub drug_classes: BTreeMap<String, String>,
}

/// Pipeline stage that absorbed a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Interactions,
    Dosage,
    Alternatives,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Extraction => write!(f, "extraction"),
            Stage::Interactions => write!(f, "interactions"),
            Stage::Dosage => write!(f, "dosage"),
            Stage::Alternatives => write!(f, "alternatives"),
        }
    }
}

/// One absorbed oracle failure, so callers can tell which gaps are fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    pub stage: Stage,
    /// The drug or pair the failed call was about (e.g. "Warfarin + Aspirin").
    pub subject: String,
    pub kind: DegradationKind,
}

/// Everything the pipeline produces for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub mentions: Vec<DrugMention>,
    pub interactions: Vec<InteractionRecord>,
    pub dosage_advisories: Vec<DosageAdvisory>,
    pub alternatives: BTreeMap<String, AlternativeSuggestion>,
    pub insights: InsightSummary,
    pub warnings: Vec<String>,
    pub contraindications: Vec<ContraindicationAlert>,
    pub degradations: Vec<Degradation>,
}

/// Response envelope handed to the request boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    /// Identifier of the oracle backend that served this request.
    pub oracle_model: String,
    /// One-paragraph human-readable summary.
    pub summary: String,
    /// Non-fatal notes produced while validating the request.
    pub request_notes: Vec<String>,
    #[serde(flatten)]
    pub result: AnalysisResult,
}
