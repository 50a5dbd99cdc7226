//! Test doubles shared by the unit tests in this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use rxverify_contracts::{
    interaction::{InteractionOrigin, InteractionRecord, Severity},
    mention::match_key,
    oracle::OracleError,
};

use crate::traits::{DrugKnowledge, Oracle};

/// Replies by prompt substring; the first matching rule wins. Unmatched
/// prompts fail with `OracleError::Unavailable`. Prompts matching a `delay`
/// needle sleep first, so calls can be made to finish out of order.
#[derive(Default)]
pub struct MockOracle {
    rules: Vec<(String, Result<String, OracleError>)>,
    delays: Vec<(String, Duration)>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, needle: &str, text: &str) -> Self {
        self.rules.push((needle.to_string(), Ok(text.to_string())));
        self
    }

    pub fn fail(mut self, needle: &str, error: OracleError) -> Self {
        self.rules.push((needle.to_string(), Err(error)));
        self
    }

    pub fn delay(mut self, needle: &str, delay: Duration) -> Self {
        self.delays.push((needle.to_string(), delay));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn generate(&self, prompt: &str, _max_new_tokens: u32) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some((_, delay)) = self.delays.iter().find(|(needle, _)| prompt.contains(needle.as_str())) {
            tokio::time::sleep(*delay).await;
        }
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| Err(OracleError::Unavailable("no scripted reply".to_string())))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// A two-drug knowledge base: warfarin + aspirin is HIGH.
pub struct MockKnowledge;

impl MockKnowledge {
    pub fn warfarin_aspirin() -> Self {
        MockKnowledge
    }
}

impl DrugKnowledge for MockKnowledge {
    fn classify(&self, drug_a: &str, drug_b: &str) -> Option<InteractionRecord> {
        let mut keys = [match_key(drug_a), match_key(drug_b)];
        keys.sort();
        (keys == ["aspirin", "warfarin"]).then(|| {
            InteractionRecord::new(
                drug_a,
                drug_b,
                Severity::High,
                "Increased risk of bleeding",
                "Consider alternative or reduce warfarin dose",
                InteractionOrigin::KnowledgeBase,
            )
        })
    }

    fn drug_class(&self, drug: &str) -> String {
        match match_key(drug).as_str() {
            "warfarin" => "Anticoagulant",
            "aspirin" => "Antiplatelet/NSAID",
            _ => "Unknown",
        }
        .to_string()
    }

    fn contraindications(&self, drug: &str) -> Vec<String> {
        match match_key(drug).as_str() {
            "aspirin" => vec!["asthma".to_string(), "peptic ulcer".to_string()],
            "warfarin" => vec!["bleeding disorders".to_string()],
            _ => Vec::new(),
        }
    }
}
