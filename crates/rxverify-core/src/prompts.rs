//! Oracle prompt templates and the reply shapes they ask for.
//!
//! Every prompt uses the same three-part layout: a system role line, the
//! user request with an example JSON reply, and an open assistant turn.

use rxverify_contracts::{advisory::AgeCategory, error::RxResult};
use rxverify_repair::ExpectedShape;

fn frame(system: &str, user: &str) -> String {
    format!("<|system|>\n{system}\n\n<|user|>\n{user}\n\n<|assistant|>\n")
}

pub fn extraction_prompt(text: &str) -> String {
    frame(
        "You are a medical AI assistant specialized in analyzing prescriptions. \
         Extract drug information from the given text.",
        &format!(
            r#"Analyze this prescription text and extract drug information in JSON format:

Text: "{text}"

Please provide a JSON response with the following structure:
{{
    "drugs": [
        {{
            "name": "drug_name",
            "dosage": "dosage_amount",
            "frequency": "frequency_info",
            "confidence": 0.95
        }}
    ]
}}"#
        ),
    )
}

pub fn interaction_prompt(drug_a: &str, drug_b: &str) -> String {
    frame(
        "You are a clinical pharmacist AI. Analyze potential drug interactions.",
        &format!(
            r#"Analyze the interaction between {drug_a} and {drug_b}.

Provide a JSON response:
{{
    "has_interaction": true/false,
    "severity": "HIGH/MEDIUM/LOW",
    "warning": "description of interaction",
    "recommendation": "clinical recommendation"
}}"#
        ),
    )
}

pub fn dosage_prompt(drug: &str, age: u32, category: AgeCategory, weight_kg: Option<f64>) -> String {
    let weight = weight_kg
        .map(|w| format!(" (weight: {w}kg)"))
        .unwrap_or_default();
    let lower = category.as_str().to_lowercase();
    frame(
        "You are a clinical pharmacist providing dosage recommendations.",
        &format!(
            r#"Provide dosage recommendation for {drug} for a {age}-year-old {lower} patient{weight}.

Respond in JSON format:
{{
    "drug": "{drug}",
    "age_category": "{category}",
    "recommendation": "dosage recommendation",
    "warnings": ["warning1", "warning2"],
    "monitoring": ["monitoring requirement1"]
}}"#
        ),
    )
}

pub fn alternatives_prompt(drug: &str, conditions: &[String]) -> String {
    let conditions = if conditions.is_empty() {
        "none".to_string()
    } else {
        conditions.join(", ")
    };
    frame(
        "You are a clinical pharmacist suggesting drug alternatives.",
        &format!(
            r#"Suggest alternatives for {drug} considering patient conditions: {conditions}

Provide JSON response:
{{
    "original_drug": "{drug}",
    "drug_class": "therapeutic class",
    "reason_for_alternatives": "reason",
    "alternatives": [
        {{"name": "alt1", "dosage": "dose", "notes": "notes"}},
        {{"name": "alt2", "dosage": "dose", "notes": "notes"}}
    ],
    "considerations": ["consideration1", "consideration2"]
}}"#
        ),
    )
}

// ── Reply shapes ──────────────────────────────────────────────────────────────

/// A reply without a `drugs` array is unusable and triggers the lexical
/// fallback.
pub fn extraction_shape() -> RxResult<ExpectedShape> {
    ExpectedShape::object_with("extraction", &["drugs"], &["drugs"])
}

pub fn interaction_shape() -> RxResult<ExpectedShape> {
    ExpectedShape::object("interaction")
}

pub fn dosage_shape() -> RxResult<ExpectedShape> {
    ExpectedShape::object_with("dosage", &["recommendation"], &[])
}

pub fn alternatives_shape() -> RxResult<ExpectedShape> {
    ExpectedShape::object_with("alternatives", &["alternatives"], &["alternatives"])
}
