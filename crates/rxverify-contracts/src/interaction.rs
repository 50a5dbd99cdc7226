//! Pairwise interaction records.
//!
//! Pairs are unordered: the constructor stores them with `drug_a <= drug_b`
//! by match key, so the same pair always serializes the same way no matter
//! which order the caller supplied.

use serde::{Deserialize, Serialize};

use crate::mention::{canonical_name, match_key};

/// Ordinal risk tier of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Numeric rank, higher is more severe.
    pub fn rank(self) -> u8 {
        match self {
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::Low => write!(f, "LOW"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HIGH" => Ok(Severity::High),
            "MEDIUM" | "MODERATE" => Ok(Severity::Medium),
            "LOW" => Ok(Severity::Low),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// Which source asserted an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionOrigin {
    /// The curated, deterministic table.
    KnowledgeBase,
    /// The text-generation oracle.
    Oracle,
}

impl std::fmt::Display for InteractionOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionOrigin::KnowledgeBase => write!(f, "KNOWLEDGE_BASE"),
            InteractionOrigin::Oracle => write!(f, "ORACLE"),
        }
    }
}

/// A detected pairwise interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: Severity,
    pub warning: String,
    pub recommendation: String,
    pub origin: InteractionOrigin,
}

impl InteractionRecord {
    /// Build a record, canonicalizing both names and ordering the pair.
    pub fn new(
        first: &str,
        second: &str,
        severity: Severity,
        warning: impl Into<String>,
        recommendation: impl Into<String>,
        origin: InteractionOrigin,
    ) -> Self {
        let (a, b) = ordered_pair(first, second);
        Self {
            drug_a: canonical_name(a),
            drug_b: canonical_name(b),
            severity,
            warning: warning.into(),
            recommendation: recommendation.into(),
            origin,
        }
    }

    /// True if this record is about the unordered pair `{x, y}` (any casing).
    pub fn involves(&self, x: &str, y: &str) -> bool {
        let (a, b) = ordered_pair(x, y);
        match_key(&self.drug_a) == match_key(a) && match_key(&self.drug_b) == match_key(b)
    }
}

/// Order two names by match key so `{x, y}` and `{y, x}` coincide.
pub fn ordered_pair<'a>(x: &'a str, y: &'a str) -> (&'a str, &'a str) {
    if match_key(x) <= match_key(y) {
        (x, y)
    } else {
        (y, x)
    }
}
