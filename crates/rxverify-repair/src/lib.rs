//! # rxverify-repair
//!
//! Recovery of structured data from text-generation output.
//!
//! The oracle is asked for a JSON object, but its reply is only a
//! suggestion of one: it may be wrapped in prose, fenced in Markdown,
//! single-quoted, or carry trailing commas. This crate turns such text into
//! a `serde_json::Value` or reports that nothing usable is there. It works in
//! three layers:
//!
//! 1. **Normalize**: [`normalize`] / [`normalize_as`] run the strict → span →
//!    repaired cascade. Pure, never panics on malformed input.
//! 2. **Shape**: [`ExpectedShape`] is a compiled JSON Schema (via the
//!    `jsonschema` crate) that a candidate must satisfy to be accepted.
//! 3. **Fields**: [`fields`] reads individual values leniently once a
//!    candidate has been accepted.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use rxverify_repair::{normalize_as, ExpectedShape};
//!
//! let shape = ExpectedShape::object_with("extraction", &["drugs"], &["drugs"])?;
//! match normalize_as(&reply, &shape) {
//!     Some(value) => { /* read fields */ }
//!     None => { /* component-specific fallback */ }
//! }
//! ```

pub mod fields;
pub mod normalizer;
pub mod shape;

pub use normalizer::{normalize, normalize_as, object_span, recover, rejection, repair, Recovery};
pub use shape::ExpectedShape;
