//! Patient-level warnings, contraindication screening, and the narrative
//! summary. Everything here is pure.

use std::collections::HashSet;

use rxverify_contracts::{
    advisory::ContraindicationAlert,
    analysis::AnalysisResult,
    interaction::{InteractionRecord, Severity},
    mention::{match_key, DrugMention},
};

use crate::traits::DrugKnowledge;

pub const PEDIATRIC_WARNING: &str = "Pediatric patient - dosages may need adjustment";
pub const ELDERLY_WARNING: &str = "Elderly patient - increased risk of adverse effects";
pub const POLYPHARMACY_WARNING: &str = "Polypharmacy detected - review for potential drug interactions";

/// Warnings for the whole prescription, in a fixed order: high-risk
/// interactions, age, polypharmacy.
pub fn synthesize_warnings(
    mentions: &[DrugMention],
    interactions: &[InteractionRecord],
    age: u32,
    polypharmacy_threshold: usize,
) -> Vec<String> {
    let mut warnings = Vec::new();

    let high_risk = high_risk_pairs(interactions);
    if high_risk > 0 {
        warnings.push(format!("{high_risk} high-risk drug interaction(s) detected!"));
    }

    if age < 18 {
        warnings.push(PEDIATRIC_WARNING.to_string());
    } else if age > 65 {
        warnings.push(ELDERLY_WARNING.to_string());
    }

    if mentions.len() > polypharmacy_threshold {
        warnings.push(POLYPHARMACY_WARNING.to_string());
    }

    warnings
}

/// Distinct pairs with at least one HIGH record, whatever its origin.
fn high_risk_pairs(interactions: &[InteractionRecord]) -> usize {
    interactions
        .iter()
        .filter(|r| r.severity == Severity::High)
        .map(|r| (match_key(&r.drug_a), match_key(&r.drug_b)))
        .collect::<HashSet<_>>()
        .len()
}

/// Mentions whose known contraindications match one of the patient's
/// conditions. A condition matches when either label contains the other,
/// ignoring case ("chronic kidney disease" matches "kidney disease").
pub fn screen_contraindications(
    mentions: &[DrugMention],
    conditions: &[String],
    knowledge: &dyn DrugKnowledge,
) -> Vec<ContraindicationAlert> {
    if conditions.is_empty() {
        return Vec::new();
    }
    let patient: Vec<(String, &String)> = conditions.iter().map(|c| (c.to_lowercase(), c)).collect();

    let mut alerts = Vec::new();
    for mention in mentions {
        for known in knowledge.contraindications(&mention.name) {
            let known = known.to_lowercase();
            for (lower, original) in &patient {
                let hit = lower.contains(&known) || known.contains(lower.as_str());
                let alert = ContraindicationAlert { drug: mention.name.clone(), condition: original.to_string() };
                if hit && !alerts.contains(&alert) {
                    alerts.push(alert);
                }
            }
        }
    }
    alerts
}

/// A short human-readable summary of `result`.
pub fn narrative_summary(result: &AnalysisResult) -> String {
    let mut parts = Vec::new();

    parts.push(match result.mentions.len() {
        0 => "No medications were identified in the prescription.".to_string(),
        1 => "1 medication was identified.".to_string(),
        n => format!("{n} medications were identified."),
    });

    let high = high_risk_pairs(&result.interactions);
    match (result.interactions.len(), high) {
        (0, _) => {}
        (_, h) if h > 0 => parts.push(format!("{h} high-risk interaction(s) require attention.")),
        (n, _) => parts.push(format!("{n} potential interaction(s) found.")),
    }

    if !result.contraindications.is_empty() {
        parts.push(format!(
            "{} contraindication alert(s) for the patient's conditions.",
            result.contraindications.len()
        ));
    }
    if !result.warnings.is_empty() {
        parts.push(format!("{} warning(s) raised.", result.warnings.len()));
    }

    let concerns =
        !result.warnings.is_empty() || !result.interactions.is_empty() || !result.contraindications.is_empty();
    if concerns {
        parts.push("Review recommended before dispensing.".to_string());
    } else {
        parts.push("No major concerns identified.".to_string());
    }
    parts.join(" ")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use rxverify_contracts::{
        interaction::{InteractionOrigin, InteractionRecord, Severity},
        mention::{DrugMention, MentionSource},
    };

    use super::*;
    use crate::testing::MockKnowledge;

    fn mentions(n: usize) -> Vec<DrugMention> {
        ["Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta"]
            .iter()
            .take(n)
            .map(|name| DrugMention::new(name, None, None, 0.9, MentionSource::Oracle).unwrap())
            .collect()
    }

    fn high(origin: InteractionOrigin) -> InteractionRecord {
        InteractionRecord::new("Warfarin", "Aspirin", Severity::High, "Increased risk of bleeding", "Avoid", origin)
    }

    #[test]
    fn test_elderly_with_high_risk_pair() {
        let w = synthesize_warnings(&mentions(2), &[high(InteractionOrigin::KnowledgeBase)], 68, 5);
        assert_eq!(w, ["1 high-risk drug interaction(s) detected!", ELDERLY_WARNING]);
    }

    #[test]
    fn test_same_pair_from_both_origins_counts_once() {
        let records = [high(InteractionOrigin::KnowledgeBase), high(InteractionOrigin::Oracle)];
        let w = synthesize_warnings(&mentions(2), &records, 40, 5);
        assert_eq!(w, ["1 high-risk drug interaction(s) detected!"]);
    }

    #[test]
    fn test_age_boundaries() {
        assert_eq!(synthesize_warnings(&mentions(1), &[], 17, 5), [PEDIATRIC_WARNING]);
        assert!(synthesize_warnings(&mentions(1), &[], 18, 5).is_empty());
        assert!(synthesize_warnings(&mentions(1), &[], 65, 5).is_empty());
        assert_eq!(synthesize_warnings(&mentions(1), &[], 66, 5), [ELDERLY_WARNING]);
    }

    #[test]
    fn test_polypharmacy_above_threshold_only() {
        assert!(synthesize_warnings(&mentions(5), &[], 40, 5).is_empty());
        assert_eq!(synthesize_warnings(&mentions(6), &[], 40, 5), [POLYPHARMACY_WARNING]);
    }

    #[test]
    fn test_no_mentions_adult_has_no_warnings() {
        assert!(synthesize_warnings(&[], &[], 40, 5).is_empty());
    }

    #[test]
    fn test_age_warnings_do_not_need_a_drug() {
        assert_eq!(synthesize_warnings(&[], &[], 10, 5), [PEDIATRIC_WARNING]);
        assert_eq!(synthesize_warnings(&[], &[], 80, 5), [ELDERLY_WARNING]);
    }

    #[test]
    fn test_contraindications_match_by_containment() {
        let kb = MockKnowledge::warfarin_aspirin();
        let drugs = vec![
            DrugMention::new("aspirin", None, None, 0.9, MentionSource::Oracle).unwrap(),
            DrugMention::new("Metformin", None, None, 0.9, MentionSource::Oracle).unwrap(),
        ];
        let conditions = vec!["Severe Asthma".to_string(), "gout".to_string()];
        let alerts = screen_contraindications(&drugs, &conditions, &kb);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].drug, "Aspirin");
        assert_eq!(alerts[0].condition, "Severe Asthma");

        assert!(screen_contraindications(&drugs, &[], &kb).is_empty());
    }
}
