//! Scenario 1: Anticoagulation Therapy
//!
//! Warfarin with low-dose aspirin for a 68-year-old. The knowledge base and
//! the oracle both flag the pair as HIGH, so the result carries two records
//! for it, one per origin.
//!
//! Pipeline walk-through for the demo run:
//!   1. Oracle extraction reply arrives wrapped in prose and a code fence
//!   2. Knowledge base HIGH record, then the oracle's own HIGH verdict
//!   3. Dosage advice for both drugs, no template fallback
//!   4. Alternatives: Aspirin gets one, Warfarin's reply is unusable
//!   5. Elderly and high-risk warnings

use std::sync::Arc;

use rxverify_contracts::error::{RxError, RxResult};

use crate::{oracle::ScriptedOracle, samples::sample};

use super::{print_result, reference_pipeline};

/// Run Scenario 1: Anticoagulation Therapy.
pub async fn run_scenario() -> RxResult<()> {
    println!("=== Scenario 1: Anticoagulation Therapy ===");
    println!();

    let sample = sample(4).ok_or_else(|| RxError::ConfigError {
        reason: "sample 4 missing".to_string(),
    })?;
    let pipeline = reference_pipeline(Arc::new(ScriptedOracle::reference()))?;

    println!("  Prescription: {}", sample.text);
    println!("  Patient:      age {}, conditions {:?}", sample.age, sample.conditions);
    println!();

    let report = pipeline.report(&sample.request()).await?;
    print_result(&report.result);

    println!();
    println!("  Summary: {}", report.summary);
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
