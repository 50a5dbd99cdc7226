//! # rxverify-ref
//!
//! Reference runtime for the rxverify prescription analysis pipeline.
//!
//! Bundles what a real deployment would supply from outside:
//!
//! - **Knowledge base**: the reference interaction, class, and
//!   contraindication seed, embedded at compile time.
//! - **Samples**: seven fictional prescriptions with the drugs a correct
//!   extraction should find and what the lexical fallback finds.
//! - **Scripted oracle**: canned model replies, deliberately messy in
//!   places, plus failure and latency injection.
//!
//! Three scenarios run the real pipeline end to end:
//!
//! 1. **Anticoagulation Therapy**: a HIGH pair confirmed by both origins.
//! 2. **Oracle Outage**: every oracle call fails and the result degrades.
//! 3. **Polypharmacy With Renal Impairment**: contraindications and the
//!    alternatives cap.
//!
//! No external calls are made.

pub mod knowledge;
pub mod oracle;
pub mod samples;
pub mod scenarios;

pub use knowledge::{default_knowledge_base, DEFAULT_SEED};
pub use oracle::ScriptedOracle;
pub use samples::{sample, SamplePrescription, SAMPLES};
