//! Expected reply shapes.
//!
//! An `ExpectedShape` is a compiled JSON Schema document plus a short name
//! for logs. Shapes are deliberately loose: they pin down the top-level
//! type and the fields a caller cannot do without, and leave everything
//! else to the lenient field readers in [`crate::fields`].

use jsonschema::Validator;
use serde_json::{json, Value};
use tracing::debug;

use rxverify_contracts::error::{RxError, RxResult};

/// A named structural constraint on a recovered oracle value.
pub struct ExpectedShape {
    name: String,
    validator: Validator,
}

impl std::fmt::Debug for ExpectedShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpectedShape").field("name", &self.name).finish()
    }
}

impl ExpectedShape {
    /// Compile `schema` into a shape.
    ///
    /// Returns `RxError::ConfigError` if `schema` is not a valid JSON Schema
    /// document.
    pub fn new(name: impl Into<String>, schema: &Value) -> RxResult<Self> {
        let name = name.into();
        let validator = jsonschema::validator_for(schema).map_err(|e| RxError::ConfigError {
            reason: format!("invalid JSON Schema for shape '{name}': {e}"),
        })?;
        Ok(Self { name, validator })
    }

    /// Any JSON object.
    pub fn object(name: impl Into<String>) -> RxResult<Self> {
        Self::new(name, &json!({ "type": "object" }))
    }

    /// An object that must carry `required` keys, with `arrays` typed as arrays.
    pub fn object_with(name: impl Into<String>, required: &[&str], arrays: &[&str]) -> RxResult<Self> {
        let properties: serde_json::Map<String, Value> = arrays
            .iter()
            .map(|field| (field.to_string(), json!({ "type": "array" })))
            .collect();
        Self::new(
            name,
            &json!({
                "type": "object",
                "required": required,
                "properties": properties,
            }),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if `value` satisfies the shape.
    pub fn conforms(&self, value: &Value) -> bool {
        let ok = self.validator.is_valid(value);
        if !ok {
            debug!(shape = %self.name, "candidate rejected by shape");
        }
        ok
    }

    /// Every violation, for diagnostics.
    pub fn violations(&self, value: &Value) -> Vec<String> {
        self.validator
            .iter_errors(value)
            .map(|e| format!("at {}: {}", e.instance_path, e))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
