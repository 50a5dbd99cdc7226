//! An in-process oracle with scripted replies.
//!
//! `ScriptedOracle` answers by prompt substring: the first rule whose needle
//! occurs in the prompt decides the reply. It stands in for a real model in
//! the scenarios and tests, and can inject failures and latency, either for
//! every call or only for prompts containing a given needle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use rxverify_contracts::oracle::OracleError;
use rxverify_core::traits::Oracle;

use crate::samples::SAMPLES;

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(OracleError),
}

impl Scripted {
    fn outcome(&self) -> Result<String, OracleError> {
        match self {
            Scripted::Reply(text) => Ok(text.clone()),
            Scripted::Fail(e) => Err(e.clone()),
        }
    }
}

#[derive(Debug)]
pub struct ScriptedOracle {
    model: String,
    rules: Vec<(String, Scripted)>,
    otherwise: Scripted,
    latency: Option<Duration>,
    delays: Vec<(String, Duration)>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    /// An oracle with no rules; every prompt fails as unavailable until
    /// rules are added.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            rules: Vec::new(),
            otherwise: Scripted::Fail(OracleError::Unavailable("no scripted reply".to_string())),
            latency: None,
            delays: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Reply with `text` to prompts containing `needle`.
    pub fn reply(mut self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Scripted::Reply(text.into())));
        self
    }

    /// Fail with `error` on prompts containing `needle`.
    pub fn fail(mut self, needle: impl Into<String>, error: OracleError) -> Self {
        self.rules.push((needle.into(), Scripted::Fail(error)));
        self
    }

    /// Reply with `text` when no rule matches.
    pub fn otherwise_reply(mut self, text: impl Into<String>) -> Self {
        self.otherwise = Scripted::Reply(text.into());
        self
    }

    /// Fail with `error` when no rule matches.
    pub fn otherwise_fail(mut self, error: OracleError) -> Self {
        self.otherwise = Scripted::Fail(error);
        self
    }

    /// Sleep this long before every reply.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Sleep `delay` before replying to prompts containing `needle`. The
    /// first matching delay replaces the global latency for that call.
    pub fn delay(mut self, needle: impl Into<String>, delay: Duration) -> Self {
        self.delays.push((needle.into(), delay));
        self
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Canned clinical answers for every prescription in [`SAMPLES`].
    ///
    /// Some replies are bare JSON and some are wrapped in prose or a code
    /// fence; one uses single quotes and a trailing comma. Brand names in
    /// sample 7 come back as generics. Prompts about unknown prescriptions
    /// fail, so free text goes through the lexical fallback.
    pub fn reference() -> Self {
        let mut oracle = Self::new("scripted-reference");

        // ── Extraction, one rule per sample ─────────────────────────────────
        for sample in SAMPLES {
            if let Some(reply) = extraction_reply(sample.id) {
                oracle = oracle.reply(format!("Text: \"{}\"", sample.text), reply);
            }
        }

        // ── Interactions ────────────────────────────────────────────────────
        oracle
            .reply(
                "between Warfarin and Aspirin",
                r#"{"has_interaction": true, "severity": "HIGH",
                    "warning": "Concurrent use markedly increases bleeding risk",
                    "recommendation": "Avoid unless benefit outweighs risk; monitor INR and for bleeding"}"#,
            )
            .reply(
                "between Metformin and Gliclazide",
                "{'has_interaction': true, 'severity': 'LOW', 'warning': 'Additive glucose lowering', \
                 'recommendation': 'Monitor for hypoglycaemia',}",
            )
            .reply(
                "between Lisinopril and Hydrochlorothiazide",
                "The combination is widely used. {\"has_interaction\": true, \"severity\": \"moderate\"}",
            )
            .reply("Analyze the interaction", r#"{"has_interaction": false}"#)
            // ── Dosage ──────────────────────────────────────────────────────
            .reply(
                "dosage recommendation for Warfarin",
                r#"{"recommendation": "Individualize dose to keep INR between 2.0 and 3.0",
                    "warnings": ["Lower starting dose in elderly patients"],
                    "monitoring": ["INR weekly until stable"]}"#,
            )
            .reply(
                "dosage recommendation for Metformin",
                r#"{"recommendation": "Titrate to 1000mg twice daily as tolerated",
                    "warnings": ["Hold if eGFR below 30"],
                    "monitoring": ["Renal function every 6-12 months", "Vitamin B12"]}"#,
            )
            .reply("dosage recommendation for Ibuprofen", "Use the lowest effective dose.")
            .reply(
                "Provide dosage recommendation",
                r#"{"recommendation": "Continue the prescribed dose; reassess at follow-up",
                    "warnings": [], "monitoring": ["Periodic clinical review"]}"#,
            )
            // ── Alternatives ────────────────────────────────────────────────
            .reply(
                "Suggest alternatives for Aspirin",
                r#"{"drug_class": "Antiplatelet", "reason_for_alternatives": "Bleeding risk with anticoagulation",
                    "alternatives": [{"name": "Clopidogrel", "dosage": "75mg daily", "notes": "Still raises bleeding risk"}],
                    "considerations": ["Reassess need for dual therapy"]}"#,
            )
            .reply(
                "Suggest alternatives for Ibuprofen",
                r#"{"drug_class": "NSAID", "reason_for_alternatives": "GI and renal risk",
                    "alternatives": [{"name": "Acetaminophen", "dosage": "500mg every 6 hours"},
                                     {"name": "Topical Diclofenac", "notes": "Lower systemic exposure"}],
                    "considerations": ["Check renal function"]}"#,
            )
            .reply(
                "Suggest alternatives for Metformin",
                r#"{"drug_class": "Biguanide", "reason": "Reduced renal function",
                    "alternatives": ["Sitagliptin",
                                     {"name": "Linagliptin", "dosage": "5mg daily", "notes": "No renal dose adjustment"}],
                    "considerations": ["Check eGFR before switching"]}"#,
            )
            .reply(
                "Suggest alternatives",
                "Alternatives depend on the full clinical picture; please consult the prescriber.",
            )
    }
}

/// The extraction answer for a sample prescription.
fn extraction_reply(id: u32) -> Option<&'static str> {
    let reply = match id {
        1 => r#"{"drugs": [
            {"name": "Lisinopril", "dosage": "10mg", "frequency": "once daily in the morning", "confidence": 0.95},
            {"name": "Amlodipine", "dosage": "5mg", "frequency": "once daily", "confidence": 0.95},
            {"name": "Hydrochlorothiazide", "dosage": "25mg", "frequency": "once daily", "confidence": 0.9}]}"#,
        2 => "Here is the extracted drug information:\n```json\n\
              {\"drugs\": [\
              {\"name\": \"Metformin\", \"dosage\": \"500mg\", \"frequency\": \"twice daily with meals\", \"confidence\": 0.95}, \
              {\"name\": \"Gliclazide\", \"dosage\": \"80mg\", \"frequency\": \"once daily before breakfast\", \"confidence\": 0.9}]}\n```",
        3 => r#"{"drugs": [
            {"name": "Ibuprofen", "dosage": "400mg", "frequency": "three times daily after meals", "confidence": 0.95},
            {"name": "Acetaminophen", "dosage": "500mg", "frequency": "every 6 hours as needed", "confidence": 0.9}]}"#,
        4 => "Here is the extracted drug information:\n```json\n\
              {\"drugs\": [\
              {\"name\": \"Warfarin\", \"dosage\": \"5mg\", \"frequency\": \"once daily at bedtime\", \"confidence\": 0.95}, \
              {\"name\": \"Aspirin\", \"dosage\": \"75mg\", \"frequency\": \"once daily\", \"confidence\": 0.95}]}\n```",
        5 => r#"{"drugs": [
            {"name": "Lisinopril", "dosage": "10mg", "frequency": "daily", "confidence": 0.95},
            {"name": "Atorvastatin", "dosage": "20mg", "frequency": "at bedtime", "confidence": 0.95},
            {"name": "Metformin", "dosage": "1000mg", "frequency": "twice daily", "confidence": 0.95},
            {"name": "Omeprazole", "dosage": "20mg", "frequency": "daily", "confidence": 0.9},
            {"name": "Levothyroxine", "dosage": "50mcg", "frequency": "in the morning", "confidence": 0.9}]}"#,
        6 => "Here is the extracted drug information:\n```json\n\
              {\"drugs\": [\
              {\"name\": \"Lisinopril\", \"dosage\": \"10mg\", \"frequency\": \"daily\"}, \
              {\"name\": \"Atorvastatin\", \"dosage\": \"20mg\", \"frequency\": \"at bedtime\"}, \
              {\"name\": \"Metformin\", \"dosage\": \"1000mg\", \"frequency\": \"twice daily\"}, \
              {\"name\": \"Omeprazole\", \"dosage\": \"20mg\", \"frequency\": \"daily\"}, \
              {\"name\": \"Levothyroxine\", \"dosage\": \"50mcg\", \"frequency\": \"in the morning\"}, \
              {\"name\": \"Ibuprofen\", \"dosage\": \"400mg\", \"frequency\": \"as needed\"}]}\n```",
        7 => r#"{"drugs": [
            {"name": "acetaminophen", "dosage": "500mg", "frequency": "every 6 hours as needed", "confidence": 0.9},
            {"name": "ibuprofen", "dosage": "200mg", "frequency": "three times daily", "confidence": 0.9}]}"#,
        _ => return None,
    };
    Some(reply)
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self
            .delays
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, d)| *d)
            .or(self.latency);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, s)| s)
            .unwrap_or(&self.otherwise);
        debug!(model = %self.model, max_new_tokens, matched = !matches!(scripted, Scripted::Fail(_)), "scripted oracle reply");
        scripted.outcome()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
