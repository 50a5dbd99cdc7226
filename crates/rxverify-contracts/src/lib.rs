//! # rxverify-contracts
//!
//! Shared types, boundary shapes, and errors for the rxverify prescription
//! analyzer.
//!
//! All crates in the workspace import from here. No pipeline logic lives in
//! this crate, only data definitions, canonicalization helpers, and
//! request validation.

pub mod advisory;
pub mod analysis;
pub mod error;
pub mod interaction;
pub mod mention;
pub mod oracle;
pub mod request;

#[cfg(test)]
mod tests {
    use super::*;
    use advisory::AgeCategory;
    use analysis::Complexity;
    use error::RxError;
    use interaction::{InteractionOrigin, InteractionRecord, Severity};
    use mention::{canonical_name, confidence_label, match_key, DrugMention, MentionSource, NOT_SPECIFIED};
    use request::PrescriptionRequest;

    // ── Canonicalization ─────────────────────────────────────────────────────

    #[test]
    fn test_canonical_name_title_cases_and_collapses_whitespace() {
        assert_eq!(canonical_name("  warfarin  "), "Warfarin");
        assert_eq!(canonical_name("ACETYLSALICYLIC   acid"), "Acetylsalicylic Acid");
        assert_eq!(canonical_name("co-amoxiclav"), "Co-Amoxiclav");
    }

    #[test]
    fn test_canonical_name_strips_release_tokens_but_not_the_name() {
        assert_eq!(canonical_name("Metformin HCl ER"), "Metformin");
        assert_eq!(canonical_name("diltiazem xl"), "Diltiazem");
        // A lone token is the name itself and must survive.
        assert_eq!(canonical_name("la"), "La");
    }

    #[test]
    fn test_match_key_is_case_insensitive() {
        assert_eq!(match_key("WARFARIN"), match_key("warfarin"));
        assert_eq!(match_key("Metformin hcl"), "metformin");
    }

    // ── DrugMention ──────────────────────────────────────────────────────────

    #[test]
    fn test_mention_rejects_empty_name() {
        assert!(DrugMention::new("   ", None, None, 0.8, MentionSource::Oracle).is_none());
    }

    #[test]
    fn test_mention_defaults_missing_text_fields() {
        let m = DrugMention::new("aspirin", Some(" "), None, 0.8, MentionSource::Oracle).unwrap();
        assert_eq!(m.name, "Aspirin");
        assert_eq!(m.dosage, NOT_SPECIFIED);
        assert_eq!(m.frequency, NOT_SPECIFIED);
        assert!(!m.is_pattern_derived());
    }

    #[test]
    fn test_mention_clamps_confidence() {
        let high = DrugMention::new("a", None, None, 3.0, MentionSource::Oracle).unwrap();
        let low = DrugMention::new("a", None, None, -1.0, MentionSource::Oracle).unwrap();
        let nan = DrugMention::new("a", None, None, f64::NAN, MentionSource::Oracle).unwrap();
        assert_eq!(high.confidence, 1.0);
        assert_eq!(low.confidence, 0.0);
        assert_eq!(nan.confidence, 0.0);
    }

    #[test]
    fn test_confidence_labels_follow_thresholds() {
        assert_eq!(confidence_label(0.95), "Very High");
        assert_eq!(confidence_label(0.8), "High");
        assert_eq!(confidence_label(0.7), "Medium");
        assert_eq!(confidence_label(0.65), "Moderate");
        assert_eq!(confidence_label(0.1), "Low");
    }

    // ── InteractionRecord ────────────────────────────────────────────────────

    #[test]
    fn test_interaction_pair_is_stored_in_canonical_order() {
        let r = InteractionRecord::new(
            "warfarin",
            "ASPIRIN",
            Severity::High,
            "Increased risk of bleeding",
            "Avoid",
            InteractionOrigin::KnowledgeBase,
        );
        assert_eq!(r.drug_a, "Aspirin");
        assert_eq!(r.drug_b, "Warfarin");
        assert!(r.involves("Warfarin", "aspirin"));
        assert!(r.involves("aspirin", "warfarin"));
        assert!(!r.involves("aspirin", "ibuprofen"));
    }

    #[test]
    fn test_severity_serializes_as_upper_case_name() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"HIGH\"");
        assert_eq!(
            serde_json::to_string(&InteractionOrigin::KnowledgeBase).unwrap(),
            "\"KNOWLEDGE_BASE\""
        );
        assert_eq!("moderate".parse::<Severity>().unwrap(), Severity::Medium);
        assert!("severe-ish".parse::<Severity>().is_err());
    }

    // ── AgeCategory ──────────────────────────────────────────────────────────

    #[test]
    fn test_age_category_boundaries_are_exact() {
        let cases = [
            (0, AgeCategory::Neonate),
            (1, AgeCategory::Infant),
            (2, AgeCategory::Child),
            (11, AgeCategory::Child),
            (12, AgeCategory::Adolescent),
            (17, AgeCategory::Adolescent),
            (18, AgeCategory::Adult),
            (64, AgeCategory::Adult),
            (65, AgeCategory::Elderly),
            (99, AgeCategory::Elderly),
        ];
        for (age, expected) in cases {
            assert_eq!(AgeCategory::from_age(age), expected, "age {age}");
        }
    }

    #[test]
    fn test_complexity_tier_splits_after_two_drugs() {
        assert_eq!(Complexity::for_drug_count(0), Complexity::Simple);
        assert_eq!(Complexity::for_drug_count(2), Complexity::Simple);
        assert_eq!(Complexity::for_drug_count(3), Complexity::Medium);
    }

    // ── Request validation ───────────────────────────────────────────────────

    fn request(text: &str, age: i64) -> PrescriptionRequest {
        PrescriptionRequest {
            text: text.to_string(),
            age,
            weight: None,
            medical_conditions: None,
        }
    }

    #[test]
    fn test_validate_rejects_blank_text() {
        let err = request("   ", 40).validate().unwrap_err();
        assert!(matches!(err, RxError::InvalidRequest { .. }));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_validate_rejects_negative_age() {
        let err = request("Aspirin 75mg daily", -3).validate().unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_validate_rejects_non_positive_weight() {
        let mut req = request("Aspirin 75mg daily", 40);
        req.weight = Some(0.0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_drops_blank_conditions() {
        let mut req = request("Aspirin 75mg daily", 40);
        req.weight = Some(70.5);
        req.medical_conditions = Some(vec!["asthma".into(), "  ".into()]);
        let ctx = req.validate().unwrap();
        assert_eq!(ctx.age, 40);
        assert_eq!(ctx.weight_kg, Some(70.5));
        assert_eq!(ctx.conditions, vec!["asthma".to_string()]);
    }

    // ── RxError display messages ─────────────────────────────────────────────

    #[test]
    fn test_error_display_messages_carry_reason() {
        let err = RxError::ConfigError {
            reason: "duplicate pair".to_string(),
        };
        assert!(err.to_string().contains("configuration error"));
        assert!(err.to_string().contains("duplicate pair"));

        let err = RxError::Timeout { seconds: 30 };
        assert_eq!(err.to_string(), "analysis timed out after 30s");
    }
}
