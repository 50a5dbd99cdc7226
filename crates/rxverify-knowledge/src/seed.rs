//! Seed document schema for the knowledge base.
//!
//! A `KnowledgeSeed` is deserialized from TOML once at process start. Pairs
//! are logically unordered; the seed may list either direction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rxverify_contracts::interaction::Severity;

/// One curated interaction between two drugs.
///
/// Example in TOML:
/// ```toml
/// [[interactions]]
/// drug_a = "warfarin"
/// drug_b = "aspirin"
/// severity = "HIGH"
/// warning = "Increased risk of bleeding"
/// recommendation = "Consider alternative or reduce warfarin dose"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEntry {
    pub drug_a: String,
    pub drug_b: String,
    /// `"HIGH"`, `"MEDIUM"`, or `"LOW"`.
    pub severity: Severity,
    pub warning: String,
    pub recommendation: String,
}

/// The top-level structure deserialized from a TOML seed file.
///
/// Example:
/// ```toml
/// [classes]
/// warfarin = "Anticoagulant"
///
/// [contraindications]
/// warfarin = ["bleeding disorders", "liver disease"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSeed {
    #[serde(default)]
    pub interactions: Vec<InteractionEntry>,

    /// Drug name → therapeutic class.
    #[serde(default)]
    pub classes: BTreeMap<String, String>,

    /// Drug name → conditions in which the drug is contraindicated.
    #[serde(default)]
    pub contraindications: BTreeMap<String, Vec<String>>,
}
