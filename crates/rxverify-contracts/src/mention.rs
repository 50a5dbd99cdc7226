//! Drug mentions and drug-name canonicalization.
//!
//! A `DrugMention` is created once per extraction pass and never mutated.
//! Its display name is title-cased; matching always goes through
//! [`match_key`], which lower-cases the canonical form.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Placeholder for dosage and frequency text the source did not provide.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Release-form and salt tokens dropped during canonicalization
/// ("Metformin HCl ER" and "metformin" refer to the same drug for matching).
const STRIPPED_TOKENS: &[&str] = &["hcl", "hct", "er", "xl", "sr", "la"];

/// Where a mention came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MentionSource {
    /// Parsed from the oracle's structured reply.
    Oracle,
    /// Recovered by lexical heuristics after the oracle path failed.
    PatternFallback,
}

impl std::fmt::Display for MentionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MentionSource::Oracle => write!(f, "oracle"),
            MentionSource::PatternFallback => write!(f, "pattern-fallback"),
        }
    }
}

/// One detected medication reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugMention {
    /// Title-cased canonical name. Never empty.
    pub name: String,
    /// Dosage text as written, or [`NOT_SPECIFIED`].
    pub dosage: String,
    /// Frequency text as written, or [`NOT_SPECIFIED`].
    pub frequency: String,
    /// Extraction confidence in `[0, 1]`.
    pub confidence: f64,
    /// Provenance tags.
    pub sources: BTreeSet<MentionSource>,
}

impl DrugMention {
    /// Build a mention, canonicalizing the name.
    ///
    /// Returns `None` when the name is empty after canonicalization. Blank
    /// dosage/frequency text becomes [`NOT_SPECIFIED`]; confidence is clamped
    /// into `[0, 1]` (a NaN becomes 0).
    pub fn new(
        name: &str,
        dosage: Option<&str>,
        frequency: Option<&str>,
        confidence: f64,
        source: MentionSource,
    ) -> Option<Self> {
        let name = canonical_name(name);
        if name.is_empty() {
            return None;
        }
        let confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };

        Some(Self {
            name,
            dosage: or_not_specified(dosage),
            frequency: or_not_specified(frequency),
            confidence,
            sources: BTreeSet::from([source]),
        })
    }

    /// Case-insensitive key used for knowledge-base lookups and dedup.
    pub fn key(&self) -> String {
        match_key(&self.name)
    }

    /// True if any provenance tag is `PatternFallback`.
    pub fn is_pattern_derived(&self) -> bool {
        self.sources.contains(&MentionSource::PatternFallback)
    }
}

fn or_not_specified(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => NOT_SPECIFIED.to_string(),
    }
}

/// Canonical display form of a drug name.
///
/// Collapses whitespace, drops release/salt tokens such as `HCl` or `ER`
/// (only when something else remains), and title-cases every word.
pub fn canonical_name(raw: &str) -> String {
    let words: Vec<&str> = raw.split_whitespace().collect();
    let kept: Vec<&str> = words
        .iter()
        .enumerate()
        .filter(|(i, w)| *i == 0 || !STRIPPED_TOKENS.contains(&w.to_lowercase().as_str()))
        .map(|(_, w)| *w)
        .collect();

    kept.iter()
        .map(|w| title_case(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-cased canonical name; the only form used for matching.
pub fn match_key(raw: &str) -> String {
    canonical_name(raw).to_lowercase()
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_alpha = false;
    for c in word.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Descriptive label for a confidence score.
pub fn confidence_label(confidence: f64) -> &'static str {
    if confidence >= 0.9 {
        "Very High"
    } else if confidence >= 0.8 {
        "High"
    } else if confidence >= 0.7 {
        "Medium"
    } else if confidence >= 0.6 {
        "Moderate"
    } else {
        "Low"
    }
}
