//! Reference runtime demo scenarios.
//!
//! Each scenario wires the real pipeline to the bundled knowledge base and a
//! scripted oracle, analyzes one sample prescription, and prints what the
//! pipeline produced.

use std::sync::Arc;

use rxverify_contracts::{analysis::AnalysisResult, error::RxResult, mention::confidence_label};
use rxverify_core::{traits::Oracle, Pipeline, PipelineConfig};

use crate::knowledge::default_knowledge_base;

pub mod anticoagulation;
pub mod oracle_outage;
pub mod polypharmacy;

/// Run every scenario in order.
pub async fn run_all() -> RxResult<()> {
    anticoagulation::run_scenario().await?;
    oracle_outage::run_scenario().await?;
    polypharmacy::run_scenario().await?;
    Ok(())
}

/// A pipeline over the bundled knowledge base with default settings.
pub fn reference_pipeline(oracle: Arc<dyn Oracle>) -> RxResult<Pipeline> {
    Pipeline::new(oracle, Arc::new(default_knowledge_base()?), PipelineConfig::default())
}

/// Print the parts of a result a reviewer looks at first.
pub fn print_result(result: &AnalysisResult) {
    println!("  Extraction:      {} ({} drug(s))", result.insights.extraction_method, result.mentions.len());
    for m in &result.mentions {
        println!(
            "    - {:<20} {:<14} {:<22} confidence {}",
            m.name,
            m.dosage,
            m.frequency,
            confidence_label(m.confidence)
        );
    }

    println!("  Interactions:    {}", result.interactions.len());
    for r in &result.interactions {
        println!(
            "    - {} + {} [{}] ({}) {}",
            r.drug_a, r.drug_b, r.severity, r.origin, r.warning
        );
    }

    let fallbacks = result.dosage_advisories.iter().filter(|a| a.fallback).count();
    println!(
        "  Dosage:          {} advisory(ies), {} from template",
        result.dosage_advisories.len(),
        fallbacks
    );

    println!("  Alternatives:    {}", result.alternatives.len());
    for (drug, s) in &result.alternatives {
        let names: Vec<_> = s.alternatives.iter().map(|a| a.name.as_str()).collect();
        println!("    - {drug} ({}): {}", s.drug_class, names.join(", "));
    }

    for c in &result.contraindications {
        println!("  Contraindicated: {} with {}", c.drug, c.condition);
    }
    for w in &result.warnings {
        println!("  WARNING:         {w}");
    }
    println!("  Degradations:    {}", result.degradations.len());
    println!("  Complexity:      {:?}", result.insights.complexity);
}
