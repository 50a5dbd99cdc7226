//! rxverify Prescription Analysis Demo CLI
//!
//! Acts as the request boundary in front of the pipeline: it validates the
//! request, enforces the overall deadline, and prints the serialized
//! report. The oracle is the scripted reference oracle, so no model or
//! network is needed.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- anticoagulation
//!   cargo run -p demo -- sample 5
//!   cargo run -p demo -- analyze --text "Warfarin 5mg daily, Ibuprofen 400mg as needed" --age 70

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rxverify_contracts::{
    analysis::AnalysisReport,
    error::{RxError, RxResult},
    request::PrescriptionRequest,
};
use rxverify_core::{traits::Oracle, Pipeline, PipelineConfig};
use rxverify_knowledge::KnowledgeBase;
use rxverify_ref::{
    default_knowledge_base, sample,
    scenarios::{self, anticoagulation, oracle_outage, polypharmacy},
    ScriptedOracle, SAMPLES,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// rxverify: best-effort prescription analysis over an unreliable oracle.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "rxverify prescription analysis demo",
    long_about = "Analyzes prescription text for drug interactions, dosage concerns,\n\
                  alternatives, and patient warnings. Oracle failures degrade the\n\
                  result instead of failing the request."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three scenarios in sequence.
    RunAll,
    /// Scenario 1: Anticoagulation Therapy (HIGH pair from both origins).
    Anticoagulation,
    /// Scenario 2: Oracle Outage (every oracle call fails).
    OracleOutage,
    /// Scenario 3: Polypharmacy With Renal Impairment.
    Polypharmacy,
    /// Analyze one of the bundled sample prescriptions and print the report.
    Sample {
        /// Sample id; omit to list the samples.
        id: Option<u32>,
        #[command(flatten)]
        run: RunOptions,
    },
    /// Analyze free prescription text and print the report.
    Analyze {
        /// Prescription text.
        #[arg(long)]
        text: String,
        /// Patient age in years.
        #[arg(long)]
        age: i64,
        /// Patient weight in kg.
        #[arg(long)]
        weight: Option<f64>,
        /// A medical condition; repeat for several.
        #[arg(long = "condition")]
        conditions: Vec<String>,
        #[command(flatten)]
        run: RunOptions,
    },
}

#[derive(Args)]
struct RunOptions {
    /// Overall request deadline.
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,
    /// Pipeline config TOML; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Knowledge base seed TOML; the bundled seed is used when omitted.
    #[arg(long)]
    knowledge: Option<PathBuf>,
    /// Simulate an oracle outage.
    #[arg(long)]
    offline: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => {
            print_banner();
            scenarios::run_all().await
        }
        Command::Anticoagulation => {
            print_banner();
            anticoagulation::run_scenario().await
        }
        Command::OracleOutage => {
            print_banner();
            oracle_outage::run_scenario().await
        }
        Command::Polypharmacy => {
            print_banner();
            polypharmacy::run_scenario().await
        }
        Command::Sample { id: None, .. } => {
            list_samples();
            Ok(())
        }
        Command::Sample { id: Some(id), run } => match sample(id) {
            Some(s) => analyze(s.request(), &run).await,
            None => Err(RxError::InvalidRequest {
                reason: format!("no sample with id {id}"),
            }),
        },
        Command::Analyze { text, age, weight, conditions, run } => {
            let request = PrescriptionRequest {
                text,
                age,
                weight,
                medical_conditions: Some(conditions),
            };
            analyze(request, &run).await
        }
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Request boundary ──────────────────────────────────────────────────────────

async fn analyze(request: PrescriptionRequest, run: &RunOptions) -> RxResult<()> {
    let pipeline = build_pipeline(run)?;

    let deadline = Duration::from_secs(run.timeout_secs);
    info!(timeout_secs = run.timeout_secs, "analysis request accepted");
    let report = tokio::time::timeout(deadline, pipeline.report(&request))
        .await
        .map_err(|_| RxError::Timeout { seconds: run.timeout_secs })??;

    print_report(&report);
    Ok(())
}

fn build_pipeline(run: &RunOptions) -> RxResult<Pipeline> {
    let config = match &run.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    let knowledge = match &run.knowledge {
        Some(path) => KnowledgeBase::from_file(path)?,
        None => default_knowledge_base()?,
    };
    let oracle: Arc<dyn Oracle> = if run.offline {
        Arc::new(oracle_outage::offline_oracle())
    } else {
        Arc::new(ScriptedOracle::reference())
    };
    Pipeline::new(oracle, Arc::new(knowledge), config)
}

fn print_report(report: &AnalysisReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("cannot serialize report: {e}"),
    }
}

fn list_samples() {
    println!("Bundled sample prescriptions:");
    for s in SAMPLES {
        println!("  {}. {:<36} age {:>3}  {}", s.id, s.title, s.age, s.text);
    }
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("rxverify: Prescription Analysis Pipeline");
    println!("Reference Demo");
    println!("========================================");
    println!();
    println!("Stages per request:");
    println!("  [1] Extract drug mentions (oracle, lexical fallback on failure)");
    println!("  [2] Reconcile interactions: knowledge base first, then the oracle per pair");
    println!("  [3] Dosage advice per drug (fixed template on failure)");
    println!("  [4] Alternatives for the first three drugs");
    println!("  [5] Warnings, contraindications, and the assembled result");
    println!();
}
