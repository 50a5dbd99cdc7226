//! Scenario 3: Polypharmacy With Renal Impairment
//!
//! Six drugs for a 76-year-old with chronic kidney disease. No pair is in
//! the knowledge base and the oracle reports none, but the prescription
//! still needs review: two drugs are contraindicated for the patient's
//! kidneys, and the drug count crosses the polypharmacy threshold.
//!
//! Alternatives are only requested for the first three drugs, so the
//! oracle is called 1 + 15 + 6 + 3 = 25 times.

use std::sync::Arc;

use rxverify_contracts::error::{RxError, RxResult};

use crate::{oracle::ScriptedOracle, samples::sample};

use super::{print_result, reference_pipeline};

/// Run Scenario 3: Polypharmacy With Renal Impairment.
pub async fn run_scenario() -> RxResult<()> {
    println!("=== Scenario 3: Polypharmacy With Renal Impairment ===");
    println!();

    let sample = sample(6).ok_or_else(|| RxError::ConfigError {
        reason: "sample 6 missing".to_string(),
    })?;
    let oracle = Arc::new(ScriptedOracle::reference());
    let pipeline = reference_pipeline(oracle.clone())?;

    println!("  Prescription: {}", sample.text);
    println!("  Patient:      age {}, conditions {:?}", sample.age, sample.conditions);
    println!();

    let report = pipeline.report(&sample.request()).await?;
    print_result(&report.result);

    println!();
    println!("  Oracle calls:  {}", oracle.calls());
    println!("  Summary: {}", report.summary);
    println!();
    println!("  Scenario 3 complete.");
    println!();

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use rxverify_contracts::{
        advisory::{AgeCategory, ContraindicationAlert},
        analysis::{Complexity, Stage},
    };
    use rxverify_core::warnings::{ELDERLY_WARNING, POLYPHARMACY_WARNING};

    use super::*;

    #[tokio::test]
    async fn test_scenario_runs() {
        run_scenario().await.unwrap();
    }

    #[tokio::test]
    async fn test_renal_contraindications_and_polypharmacy() {
        let s = sample(6).unwrap();
        let oracle = Arc::new(ScriptedOracle::reference());
        let pipeline = reference_pipeline(oracle.clone()).unwrap();
        let result = pipeline.analyze(s.text, &s.patient()).await;

        assert_eq!(result.mentions.len(), 6);
        assert!(result.interactions.is_empty());
        assert_eq!(result.warnings, [ELDERLY_WARNING, POLYPHARMACY_WARNING]);
        assert_eq!(result.insights.complexity, Complexity::Medium);
        assert_eq!(oracle.calls(), 25);

        let ckd = "chronic kidney disease".to_string();
        assert_eq!(
            result.contraindications,
            [
                ContraindicationAlert { drug: "Metformin".to_string(), condition: ckd.clone() },
                ContraindicationAlert { drug: "Ibuprofen".to_string(), condition: ckd },
            ]
        );

        // Every advisory is for an elderly patient; Ibuprofen's reply had no JSON.
        assert_eq!(result.dosage_advisories.len(), 6);
        assert!(result.dosage_advisories.iter().all(|a| a.age_category == AgeCategory::Elderly));
        let fallbacks: Vec<_> = result
            .dosage_advisories
            .iter()
            .filter(|a| a.fallback)
            .map(|a| a.drug.as_str())
            .collect();
        assert_eq!(fallbacks, ["Ibuprofen"]);

        // Only Metformin's alternatives reply was usable.
        assert_eq!(result.alternatives.len(), 1);
        let metformin = &result.alternatives["Metformin"];
        assert_eq!(metformin.drug_class, "Biguanide");
        assert_eq!(metformin.reason, "Reduced renal function");
        let names: Vec<_> = metformin.alternatives.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Sitagliptin", "Linagliptin"]);

        let alternatives_gaps: Vec<_> = result
            .degradations
            .iter()
            .filter(|d| d.stage == Stage::Alternatives)
            .map(|d| d.subject.as_str())
            .collect();
        assert_eq!(alternatives_gaps, ["Lisinopril", "Atorvastatin"]);
    }

    #[tokio::test]
    async fn test_report_asks_for_review() {
        let s = sample(6).unwrap();
        let pipeline = reference_pipeline(Arc::new(ScriptedOracle::reference())).unwrap();
        let report = pipeline.report(&s.request()).await.unwrap();

        assert_eq!(
            report.summary,
            "6 medications were identified. 2 contraindication alert(s) for the patient's conditions. \
             2 warning(s) raised. Review recommended before dispensing."
        );
        assert!(report.request_notes.is_empty());
    }
}
