//! Scenario 2: Oracle Outage
//!
//! The hypertension prescription analyzed while every oracle call fails.
//! The pipeline still answers: drug names come from the lexical fallback,
//! the knowledge base still supplies its interaction records, dosage
//! advice falls back to the fixed template, and alternatives are omitted.
//! Each absorbed failure is listed as a degradation.

use std::sync::Arc;

use rxverify_contracts::{
    error::{RxError, RxResult},
    oracle::OracleError,
};

use crate::{oracle::ScriptedOracle, samples::sample};

use super::{print_result, reference_pipeline};

/// An oracle whose backend is down.
pub fn offline_oracle() -> ScriptedOracle {
    ScriptedOracle::new("offline")
        .otherwise_fail(OracleError::Unavailable("connection refused".to_string()))
}

/// Run Scenario 2: Oracle Outage.
pub async fn run_scenario() -> RxResult<()> {
    println!("=== Scenario 2: Oracle Outage ===");
    println!();

    let sample = sample(1).ok_or_else(|| RxError::ConfigError {
        reason: "sample 1 missing".to_string(),
    })?;
    let oracle = Arc::new(offline_oracle());
    let pipeline = reference_pipeline(oracle.clone())?;

    println!("  Prescription: {}", sample.text);
    println!("  Oracle:       offline (every call fails)");
    println!();

    let report = pipeline.report(&sample.request()).await?;
    print_result(&report.result);
    for d in &report.result.degradations {
        println!("    ~ {:<13} {:<40} {:?}", d.stage.to_string(), d.subject, d.kind);
    }

    println!();
    println!("  Oracle calls attempted: {}", oracle.calls());
    println!("  Summary: {}", report.summary);
    println!();
    println!("  Scenario 2 complete.");
    println!();

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
