//! # rxverify-knowledge
//!
//! A TOML-seeded, read-only table of drug interactions, therapeutic classes,
//! and contraindications.
//!
//! ## Overview
//!
//! This crate provides [`KnowledgeBase`], which implements the
//! [`DrugKnowledge`](rxverify_core::traits::DrugKnowledge) trait. The table is
//! loaded once and never changes; lookups are case-insensitive and pairs are
//! unordered. Absence of data is not an error.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use rxverify_knowledge::KnowledgeBase;
//!
//! let kb = KnowledgeBase::from_file(Path::new("seeds/knowledge_base.toml"))?;
//! // Pass `Arc::new(kb)` to `rxverify_core::Pipeline::new(...)`.
//! ```

pub mod base;
pub mod seed;

pub use base::{KnowledgeBase, UNKNOWN_CLASS};
pub use seed::{InteractionEntry, KnowledgeSeed};

// ── Tests ─────────────────────────────────────────────────────────────────────
