//! Request boundary types.
//!
//! `PrescriptionRequest` is what the outer shell receives. It is checked with
//! [`PrescriptionRequest::validate`] before the pipeline is entered; the
//! pipeline itself only ever sees a `PatientContext`.

use serde::{Deserialize, Serialize};

use crate::error::{RxError, RxResult};

/// A raw analysis request as received from the outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRequest {
    pub text: String,
    pub age: i64,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub medical_conditions: Option<Vec<String>>,
}

/// Validated patient facts the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientContext {
    pub age: u32,
    pub weight_kg: Option<f64>,
    pub conditions: Vec<String>,
}

impl PatientContext {
    pub fn new(age: u32) -> Self {
        Self {
            age,
            weight_kg: None,
            conditions: Vec::new(),
        }
    }

    pub fn with_weight(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    pub fn with_conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }
}

impl PrescriptionRequest {
    /// Reject requests the pipeline must never see.
    ///
    /// Fails with `RxError::InvalidRequest` for blank text, a negative or
    /// absurd age, or a weight that is not a positive finite number. Blank
    /// condition labels are dropped.
    pub fn validate(&self) -> RxResult<PatientContext> {
        if self.text.trim().is_empty() {
            return Err(RxError::InvalidRequest {
                reason: "prescription text is empty".to_string(),
            });
        }

        let age = u32::try_from(self.age).map_err(|_| RxError::InvalidRequest {
            reason: format!("age must be a non-negative integer, got {}", self.age),
        })?;
        if age > 150 {
            return Err(RxError::InvalidRequest {
                reason: format!("age {age} is outside the supported range"),
            });
        }

        if let Some(w) = self.weight {
            if !w.is_finite() || w <= 0.0 {
                return Err(RxError::InvalidRequest {
                    reason: format!("weight must be a positive number, got {w}"),
                });
            }
        }

        let conditions = self
            .medical_conditions
            .iter()
            .flatten()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        Ok(PatientContext {
            age,
            weight_kg: self.weight,
            conditions,
        })
    }
}
