//! Drug-mention extraction.
//!
//! The oracle is asked first. If its reply is unusable (call error, or no
//! recoverable object carrying a `drugs` array) the lexical fallback scans
//! the text for drug-like names instead. A parsed `drugs` array is taken as
//! the oracle's answer even when empty.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tracing::{info, warn};

use rxverify_contracts::{
    analysis::{Degradation, Stage},
    error::RxResult,
    mention::{DrugMention, MentionSource},
    oracle::OracleReply,
};
use rxverify_repair::{fields, ExpectedShape};

use crate::{config::PipelineConfig, consult::consult, prompts, stage::StageOutput, traits::Oracle};

// ── Lexical patterns ──────────────────────────────────────────────────────────

/// Words ending like generic drug names.
static SUFFIX_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b([a-z]{2,}(?:in|ol|ide|ine|ate|pam|zole|cillin|mycin|cycline|pril|sartan|vir|mab|afil|triptan|sone))\b",
    )
    .unwrap()
});

/// Common over-the-counter brand and generic names.
static OTC_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(aspirin|ibuprofen|acetaminophen|paracetamol|tylenol|advil|motrin|aleve|naproxen)\b").unwrap()
});

/// A word directly followed by a numeric dose, e.g. `Lipitor 20 mg`.
static DOSE_ADJACENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]{4,})\s+\d+(?:\.\d+)?\s*(?:mg|mcg|g)\b").unwrap()
});

static DOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*(?:mg|mcg|g|ml|units?|iu)\b").unwrap()
});

/// A dose written just before the name: `500 mg of Metformin`.
static PRECEDING_DOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?\s*(?:mg|mcg|g|ml|units?|iu))\s+(?:of\s+)?$").unwrap()
});

static FREQUENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:once|twice|three times|four times)\s+(?:a\s+)?(?:daily|day|weekly|week)\b",
        r"|\bevery\s+\d+(?:\s*-\s*\d+)?\s*hours?\b",
        r"|\bevery\s+(?:morning|evening|night|other day)\b",
        r"|\bat\s+bedtime\b",
        r"|\bas\s+needed\b",
        r"|\b(?:daily|nightly|weekly|bid|tid|qid|qd|prn|q\d+h)\b",
    ))
    .unwrap()
});

/// Ordinary words the name patterns would otherwise pick up.
const STOP_WORDS: &[&str] = &[
    "about", "again", "alcohol", "alternate", "appropriate", "aside", "bedtime", "beside", "brain",
    "capsule", "capsules", "certain", "chain", "combine", "contain", "continue", "control", "daily",
    "date", "decide", "determine", "dose", "doses", "drink", "each", "evening", "every", "examine",
    "fine", "gain", "give", "given", "guide", "immediate", "inside", "late", "line", "main",
    "medicine", "medication", "moderate", "morning", "night", "nine", "obtain", "once", "online",
    "outside", "pain", "patient", "plain", "protein", "protocol", "provide", "rate", "remain",
    "routine", "saline", "separate", "side", "skin", "start", "state", "tablet", "tablets", "take",
    "takes", "taking", "then", "total", "twice", "urine", "vein", "wide", "with", "within",
];

struct Hit<'t> {
    start: usize,
    end: usize,
    name: &'t str,
}

// ── ExtractionFormatter ───────────────────────────────────────────────────────

/// Turns free prescription text into an ordered list of drug mentions.
pub struct ExtractionFormatter {
    oracle: Arc<dyn Oracle>,
    shape: ExpectedShape,
    max_tokens: u32,
    default_confidence: f64,
    fallback_confidence: f64,
}

impl ExtractionFormatter {
    pub fn new(oracle: Arc<dyn Oracle>, config: &PipelineConfig) -> RxResult<Self> {
        Ok(Self {
            oracle,
            shape: prompts::extraction_shape()?,
            max_tokens: config.extraction_max_tokens,
            default_confidence: config.default_confidence,
            fallback_confidence: config.fallback_confidence,
        })
    }

    /// Extract mentions, first-occurrence order, no two with the same key.
    ///
    /// Never fails. Empty or whitespace-only text yields an empty list
    /// without calling the oracle.
    pub async fn extract_mentions(&self, text: &str) -> StageOutput<Vec<DrugMention>> {
        if text.trim().is_empty() {
            return StageOutput::clean(Vec::new());
        }

        let reply = consult(
            self.oracle.as_ref(),
            &prompts::extraction_prompt(text),
            self.max_tokens,
            &self.shape,
        )
        .await;

        match &reply {
            OracleReply::Parsed(value) => {
                let mentions = self.from_reply(value);
                info!(count = mentions.len(), method = "oracle", "drug extraction complete");
                StageOutput::clean(mentions)
            }
            OracleReply::ParseFailed { .. } | OracleReply::CallFailed { .. } => {
                let mentions = pattern_mentions(text, self.fallback_confidence);
                warn!(count = mentions.len(), "oracle extraction unusable, used pattern fallback");
                let degradation = reply.failure_kind().map(|kind| Degradation {
                    stage: Stage::Extraction,
                    subject: "prescription".to_string(),
                    kind,
                });
                StageOutput::with(mentions, degradation)
            }
        }
    }

    fn from_reply(&self, value: &Value) -> Vec<DrugMention> {
        let mentions = fields::items(value, "drugs").iter().filter_map(|item| {
            let name = match item {
                Value::String(s) => Some(s.clone()),
                _ => fields::text(item, "name")
                    .or_else(|| fields::text(item, "drug_name"))
                    .or_else(|| fields::text(item, "drug")),
            }?;
            let confidence = fields::number(item, "confidence").unwrap_or(self.default_confidence);
            DrugMention::new(
                &name,
                fields::text(item, "dosage").as_deref(),
                fields::text(item, "frequency").as_deref(),
                confidence,
                MentionSource::Oracle,
            )
        });
        dedup_by_key(mentions)
    }
}

fn dedup_by_key(mentions: impl IntoIterator<Item = DrugMention>) -> Vec<DrugMention> {
    let mut seen = HashSet::new();
    mentions.into_iter().filter(|m| seen.insert(m.key())).collect()
}

// ── Pattern fallback ──────────────────────────────────────────────────────────

/// Drug-like names in `text`, in order of appearance, without overlaps.
fn name_hits(text: &str) -> Vec<Hit<'_>> {
    let mut hits: Vec<Hit<'_>> = [&*SUFFIX_NAME, &*OTC_NAME, &*DOSE_ADJACENT_NAME]
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1))
        .filter(|m| !STOP_WORDS.contains(&m.as_str().to_lowercase().as_str()))
        .map(|m| Hit { start: m.start(), end: m.end(), name: m.as_str() })
        .collect();

    hits.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut kept: Vec<Hit<'_>> = Vec::with_capacity(hits.len());
    for hit in hits {
        if kept.last().is_some_and(|last| hit.start < last.end) {
            continue;
        }
        kept.push(hit);
    }
    kept
}

/// Lexical extraction used when the oracle path is unusable.
///
/// Dosage and frequency are looked for in the text between a name and the
/// next detected name; a dose written immediately before the name also
/// counts.
pub fn pattern_mentions(text: &str, confidence: f64) -> Vec<DrugMention> {
    let hits = name_hits(text);
    let mentions = hits.iter().enumerate().filter_map(|(i, hit)| {
        let following_end = hits.get(i + 1).map_or(text.len(), |next| next.start);
        let preceding_start = if i == 0 { 0 } else { hits[i - 1].end };
        let following = &text[hit.end..following_end];
        let preceding = &text[preceding_start..hit.start];

        let dosage = DOSE
            .find(following)
            .map(|m| m.as_str())
            .or_else(|| PRECEDING_DOSE.captures(preceding).and_then(|c| c.get(1)).map(|m| m.as_str()));
        let frequency = FREQUENCY.find(following).map(|m| m.as_str());

        DrugMention::new(hit.name, dosage, frequency, confidence, MentionSource::PatternFallback)
    });
    dedup_by_key(mentions)
}

/// Non-fatal observations about the request text, for the report envelope.
pub fn request_notes(text: &str) -> Vec<String> {
    let mut notes = Vec::new();
    if text.trim().chars().count() < 10 {
        notes.push("Prescription text seems very short".to_string());
    }
    if name_hits(text).is_empty() {
        notes.push("No obvious drug names detected".to_string());
    }
    if !DOSE.is_match(text) {
        notes.push("No dosage information detected".to_string());
    }
    if !FREQUENCY.is_match(text) {
        notes.push("No frequency information detected".to_string());
    }
    notes
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rxverify_contracts::{
        analysis::Stage,
        mention::{MentionSource, NOT_SPECIFIED},
        oracle::{DegradationKind, OracleError},
    };

    use super::*;
    use crate::testing::MockOracle;

    fn formatter(oracle: MockOracle) -> (ExtractionFormatter, Arc<MockOracle>) {
        let oracle = Arc::new(oracle);
        let f = ExtractionFormatter::new(oracle.clone(), &PipelineConfig::default()).unwrap();
        (f, oracle)
    }

    // ── 1. Oracle path ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_oracle_reply_is_parsed_and_canonicalized() {
        let (f, _) = formatter(MockOracle::new().reply(
            "Extract drug",
            r#"Here you go: {"drugs": [
                {"name": "warfarin", "dosage": "5mg", "frequency": "once daily", "confidence": 0.95},
                {"name": "ASPIRIN", "dosage": "", "confidence": "0.9"}
            ]}"#,
        ));
        let out = f.extract_mentions("Warfarin 5mg once daily, aspirin").await;

        assert!(out.degradations.is_empty());
        let names: Vec<_> = out.value.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Warfarin", "Aspirin"]);
        assert_eq!(out.value[0].frequency, "once daily");
        assert_eq!(out.value[1].dosage, NOT_SPECIFIED);
        assert_eq!(out.value[1].frequency, NOT_SPECIFIED);
        assert_eq!(out.value[1].confidence, 0.9);
        assert!(out.value.iter().all(|m| m.sources.contains(&MentionSource::Oracle)));
    }

    #[tokio::test]
    async fn test_oracle_duplicates_and_nameless_items_are_dropped() {
        let (f, _) = formatter(MockOracle::new().reply(
            "Extract drug",
            r#"{"drugs": [{"name": "Metformin"}, {"dosage": "5mg"}, {"name": "metformin HCl"}, "Gliclazide"]}"#,
        ));
        let out = f.extract_mentions("Metformin and gliclazide").await;
        let names: Vec<_> = out.value.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Metformin", "Gliclazide"]);
        assert_eq!(out.value[0].confidence, 0.8);
    }

    #[tokio::test]
    async fn test_empty_drugs_array_is_authoritative() {
        let (f, _) = formatter(MockOracle::new().reply("Extract drug", r#"{"drugs": []}"#));
        let out = f.extract_mentions("Aspirin 81mg daily").await;
        assert!(out.value.is_empty());
        assert!(out.degradations.is_empty());
    }

    #[tokio::test]
    async fn test_blank_text_skips_the_oracle() {
        let (f, oracle) = formatter(MockOracle::new());
        let out = f.extract_mentions("   \n ").await;
        assert!(out.value.is_empty());
        assert_eq!(oracle.calls(), 0);
    }

    // ── 2. Fallback path ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_unparseable_reply_falls_back_to_patterns() {
        let (f, _) = formatter(MockOracle::new().reply("Extract drug", "I found some drugs."));
        let out = f.extract_mentions("Lisinopril 10mg once daily, Aspirin 81mg daily").await;

        let names: Vec<_> = out.value.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Lisinopril", "Aspirin"]);
        assert_eq!(out.value[0].dosage, "10mg");
        assert_eq!(out.value[0].frequency, "once daily");
        assert_eq!(out.value[1].dosage, "81mg");
        assert_eq!(out.value[1].frequency, "daily");
        assert!(out.value.iter().all(|m| m.is_pattern_derived() && m.confidence == 0.8));

        assert_eq!(out.degradations.len(), 1);
        assert_eq!(out.degradations[0].stage, Stage::Extraction);
        assert_eq!(out.degradations[0].kind, DegradationKind::ParseFailed);
    }

    #[tokio::test]
    async fn test_failed_call_falls_back_to_patterns() {
        let (f, _) = formatter(MockOracle::new().fail("Extract drug", OracleError::Timeout));
        let out = f.extract_mentions("Take Ibuprofen 400 mg as needed for pain").await;

        assert_eq!(out.value.len(), 1);
        assert_eq!(out.value[0].name, "Ibuprofen");
        assert_eq!(out.value[0].dosage, "400 mg");
        assert_eq!(out.value[0].frequency, "as needed");
        assert_eq!(out.degradations[0].kind, DegradationKind::CallFailed);
    }

    #[test]
    fn test_pattern_fallback_dedups_and_keeps_text_order() {
        let mentions = pattern_mentions("warfarin 5 mg; aspirin 75mg; Warfarin again", 0.8);
        let names: Vec<_> = mentions.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Warfarin", "Aspirin"]);
    }

    #[test]
    fn test_pattern_fallback_reads_dose_written_before_name() {
        let mentions = pattern_mentions("500 mg of metformin twice daily", 0.8);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].name, "Metformin");
        assert_eq!(mentions[0].dosage, "500 mg");
        assert_eq!(mentions[0].frequency, "twice daily");
    }

    #[test]
    fn test_pattern_fallback_ignores_ordinary_words() {
        assert!(pattern_mentions("Take with water within the hour for pain", 0.8).is_empty());
        assert!(pattern_mentions("", 0.8).is_empty());
    }

    // ── 3. Request notes ─────────────────────────────────────────────────────

    #[test]
    fn test_notes_for_sparse_text() {
        let notes = request_notes("hello");
        assert_eq!(notes.len(), 4);
        assert!(notes[0].contains("very short"));
    }

    #[test]
    fn test_no_notes_for_complete_text() {
        assert!(request_notes("Amlodipine 5mg once daily").is_empty());
    }
}
