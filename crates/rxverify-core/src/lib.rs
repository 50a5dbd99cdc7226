//! # rxverify-core
//!
//! The prescription analysis pipeline.
//!
//! This crate provides:
//! - The two collaborator traits (`Oracle`, `DrugKnowledge`)
//! - The stages: `ExtractionFormatter`, `InteractionReconciler`, `Advisor`,
//!   and the pure warning functions
//! - The `Pipeline` that sequences them and assembles the result
//!
//! Oracle output is never trusted: every reply is normalized against an
//! expected shape and every failure is absorbed by the stage that made the
//! call, so `Pipeline::analyze` always returns a result.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rxverify_core::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(Arc::new(my_oracle), Arc::new(knowledge), PipelineConfig::default())?;
//! let report = pipeline.report(&request).await?;
//! ```

pub mod advisor;
pub mod config;
pub mod consult;
pub mod extraction;
pub mod pipeline;
pub mod prompts;
pub mod reconcile;
pub mod stage;
pub mod traits;
pub mod warnings;

#[cfg(test)]
mod testing;

pub use advisor::Advisor;
pub use config::PipelineConfig;
pub use extraction::ExtractionFormatter;
pub use pipeline::Pipeline;
pub use reconcile::InteractionReconciler;
pub use stage::StageOutput;
