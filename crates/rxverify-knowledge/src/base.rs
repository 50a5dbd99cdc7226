//! The read-only knowledge base.
//!
//! `KnowledgeBase` is built once from a `KnowledgeSeed` and never mutated
//! afterwards, so it can be shared behind an `Arc` and read from any number
//! of requests without locking.
//!
//! Lookup algorithm:
//!
//! 1. Every name is reduced to its match key (canonical, lower-cased).
//! 2. Pairs are stored under the ordered key pair, so looking up `{a, b}`
//!    and `{b, a}` hit the same entry.
//! 3. A miss is a normal outcome: `None`, `"Unknown"`, or an empty slice.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use rxverify_contracts::{
    error::{RxError, RxResult},
    interaction::{InteractionOrigin, InteractionRecord, Severity},
    mention::match_key,
};
use rxverify_core::traits::DrugKnowledge;

use crate::seed::KnowledgeSeed;

/// Returned by [`KnowledgeBase::drug_class`] for drugs not in the table.
pub const UNKNOWN_CLASS: &str = "Unknown";

#[derive(Debug, Clone)]
struct PairFacts {
    severity: Severity,
    warning: String,
    recommendation: String,
}

/// Deterministic interaction, class, and contraindication lookup.
///
/// ```rust,ignore
/// use rxverify_knowledge::KnowledgeBase;
///
/// let kb = KnowledgeBase::from_file(Path::new("seeds/knowledge_base.toml"))?;
/// let hit = kb.classify("Warfarin", "aspirin");
/// ```
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    interactions: HashMap<(String, String), PairFacts>,
    classes: HashMap<String, String>,
    contraindications: HashMap<String, Vec<String>>,
}

impl KnowledgeBase {
    /// Build the lookup tables from a parsed seed.
    ///
    /// Returns `RxError::ConfigError` if an interaction names the same drug
    /// twice, has an empty name, or duplicates an unordered pair already seen.
    pub fn from_seed(seed: KnowledgeSeed) -> RxResult<Self> {
        let mut interactions = HashMap::with_capacity(seed.interactions.len());

        for entry in seed.interactions {
            let a = match_key(&entry.drug_a);
            let b = match_key(&entry.drug_b);
            if a.is_empty() || b.is_empty() {
                return Err(RxError::ConfigError {
                    reason: "interaction entry with an empty drug name".to_string(),
                });
            }
            if a == b {
                return Err(RxError::ConfigError {
                    reason: format!("interaction entry pairs '{}' with itself", entry.drug_a),
                });
            }

            let key = ordered_key(a, b);
            if interactions.contains_key(&key) {
                return Err(RxError::ConfigError {
                    reason: format!(
                        "duplicate interaction entry for '{}' + '{}'",
                        entry.drug_a, entry.drug_b
                    ),
                });
            }
            interactions.insert(
                key,
                PairFacts {
                    severity: entry.severity,
                    warning: entry.warning,
                    recommendation: entry.recommendation,
                },
            );
        }

        let classes = seed
            .classes
            .into_iter()
            .map(|(drug, class)| (match_key(&drug), class))
            .collect();

        let contraindications = seed
            .contraindications
            .into_iter()
            .map(|(drug, conditions)| (match_key(&drug), conditions))
            .collect();

        let kb = Self {
            interactions,
            classes,
            contraindications,
        };
        info!(
            pairs = kb.pair_count(),
            classes = kb.classes.len(),
            contraindications = kb.contraindications.len(),
            "knowledge base loaded"
        );
        Ok(kb)
    }

    /// Parse `s` as a TOML seed and build the knowledge base.
    ///
    /// Returns `RxError::ConfigError` if the TOML is malformed, does not match
    /// `KnowledgeSeed`, or fails the checks in [`KnowledgeBase::from_seed`].
    pub fn from_toml_str(s: &str) -> RxResult<Self> {
        let seed: KnowledgeSeed = toml::from_str(s).map_err(|e| RxError::ConfigError {
            reason: format!("failed to parse knowledge seed TOML: {}", e),
        })?;
        Self::from_seed(seed)
    }

    /// Read the file at `path` and parse it as a TOML seed.
    pub fn from_file(path: &Path) -> RxResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RxError::ConfigError {
            reason: format!("failed to read knowledge seed '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The curated interaction for `{drug_a, drug_b}`, tagged `KNOWLEDGE_BASE`.
    pub fn classify(&self, drug_a: &str, drug_b: &str) -> Option<InteractionRecord> {
        let key = ordered_key(match_key(drug_a), match_key(drug_b));
        let facts = self.interactions.get(&key);
        debug!(drug_a, drug_b, hit = facts.is_some(), "knowledge base pair lookup");

        facts.map(|f| {
            InteractionRecord::new(
                drug_a,
                drug_b,
                f.severity,
                f.warning.clone(),
                f.recommendation.clone(),
                InteractionOrigin::KnowledgeBase,
            )
        })
    }

    /// Therapeutic class, or [`UNKNOWN_CLASS`].
    pub fn drug_class(&self, drug: &str) -> &str {
        self.classes
            .get(&match_key(drug))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CLASS)
    }

    /// Conditions in which `drug` is contraindicated; empty if not listed.
    pub fn contraindications(&self, drug: &str) -> &[String] {
        self.contraindications
            .get(&match_key(drug))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of curated pairs.
    pub fn pair_count(&self) -> usize {
        self.interactions.len()
    }

    /// Every curated pair as `(drug_a, drug_b)` match keys.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.interactions.keys().map(|(a, b)| (a.as_str(), b.as_str()))
    }
}

fn ordered_key(a: String, b: String) -> (String, String) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl DrugKnowledge for KnowledgeBase {
    fn classify(&self, drug_a: &str, drug_b: &str) -> Option<InteractionRecord> {
        KnowledgeBase::classify(self, drug_a, drug_b)
    }

    fn drug_class(&self, drug: &str) -> String {
        KnowledgeBase::drug_class(self, drug).to_string()
    }

    fn contraindications(&self, drug: &str) -> Vec<String> {
        KnowledgeBase::contraindications(self, drug).to_vec()
    }
}
