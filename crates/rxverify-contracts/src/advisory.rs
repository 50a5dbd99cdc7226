//! Per-drug, per-patient advisories.

use serde::{Deserialize, Serialize};

/// Coarse age bucket used to select dosage caution text.
///
/// Boundaries: `<1` Neonate, `<2` Infant, `<12` Child, `<18` Adolescent,
/// `<65` Adult, otherwise Elderly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeCategory {
    Neonate,
    Infant,
    Child,
    Adolescent,
    Adult,
    Elderly,
}

impl AgeCategory {
    /// Bucket an age in whole years.
    pub fn from_age(age: u32) -> Self {
        match age {
            0 => AgeCategory::Neonate,
            1 => AgeCategory::Infant,
            2..=11 => AgeCategory::Child,
            12..=17 => AgeCategory::Adolescent,
            18..=64 => AgeCategory::Adult,
            _ => AgeCategory::Elderly,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgeCategory::Neonate => "Neonate",
            AgeCategory::Infant => "Infant",
            AgeCategory::Child => "Child",
            AgeCategory::Adolescent => "Adolescent",
            AgeCategory::Adult => "Adult",
            AgeCategory::Elderly => "Elderly",
        }
    }
}

impl std::fmt::Display for AgeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dosage guidance for one drug and one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosageAdvisory {
    pub drug: String,
    pub age_category: AgeCategory,
    pub recommendation: String,
    pub warnings: Vec<String>,
    pub monitoring: Vec<String>,
    /// True when the oracle reply was unusable and the fixed template was used.
    pub fallback: bool,
}

/// One suggested substitute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeOption {
    pub name: String,
    pub dosage: String,
    pub notes: String,
}

/// Alternatives for one original drug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeSuggestion {
    pub original_drug: String,
    pub drug_class: String,
    pub reason: String,
    /// Ordered as the oracle listed them.
    pub alternatives: Vec<AlternativeOption>,
    pub considerations: Vec<String>,
}

/// A drug whose known contraindications include one of the patient's conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContraindicationAlert {
    pub drug: String,
    pub condition: String,
}
