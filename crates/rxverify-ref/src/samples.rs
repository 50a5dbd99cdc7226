//! Sample prescriptions for the reference runtime.
//!
//! All data in this module is hardcoded and fictional. Each sample carries
//! the drugs a correct extraction should find, and what the lexical fallback
//! finds on its own, so scenarios and tests can check both paths end to end.

use rxverify_contracts::request::{PatientContext, PrescriptionRequest};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePrescription {
    pub id: u32,
    pub title: &'static str,
    pub text: &'static str,
    pub age: u32,
    pub weight_kg: Option<f64>,
    pub conditions: &'static [&'static str],
    /// Canonical names, in order of appearance.
    pub expected_drugs: &'static [&'static str],
    /// What the lexical fallback finds. Brand names stay as written.
    pub lexical_drugs: &'static [&'static str],
}

pub const SAMPLES: &[SamplePrescription] = &[
    SamplePrescription {
        id: 1,
        title: "Hypertension Management",
        text: "Lisinopril 10mg once daily in the morning, Amlodipine 5mg once daily, \
               Hydrochlorothiazide 25mg once daily",
        age: 55,
        weight_kg: Some(82.0),
        conditions: &["hypertension"],
        expected_drugs: &["Lisinopril", "Amlodipine", "Hydrochlorothiazide"],
        lexical_drugs: &["Lisinopril", "Amlodipine", "Hydrochlorothiazide"],
    },
    SamplePrescription {
        id: 2,
        title: "Type 2 Diabetes Treatment",
        text: "Metformin 500mg twice daily with meals, Gliclazide 80mg once daily before breakfast",
        age: 62,
        weight_kg: None,
        conditions: &["diabetes"],
        expected_drugs: &["Metformin", "Gliclazide"],
        lexical_drugs: &["Metformin", "Gliclazide"],
    },
    SamplePrescription {
        id: 3,
        title: "Pain Management Protocol",
        text: "Ibuprofen 400mg three times daily after meals, \
               Acetaminophen 500mg every 6 hours as needed for pain",
        age: 45,
        weight_kg: None,
        conditions: &[],
        expected_drugs: &["Ibuprofen", "Acetaminophen"],
        lexical_drugs: &["Ibuprofen", "Acetaminophen"],
    },
    SamplePrescription {
        id: 4,
        title: "Anticoagulation Therapy",
        text: "Warfarin 5mg once daily at bedtime, Aspirin 75mg once daily for cardioprotection",
        age: 68,
        weight_kg: Some(74.5),
        conditions: &["heart disease"],
        expected_drugs: &["Warfarin", "Aspirin"],
        lexical_drugs: &["Warfarin", "Aspirin"],
    },
    SamplePrescription {
        id: 5,
        title: "Complex Polypharmacy Case",
        text: "Lisinopril 10mg daily, Atorvastatin 20mg at bedtime, Metformin 1000mg twice daily, \
               Omeprazole 20mg daily, Levothyroxine 50mcg in the morning",
        age: 72,
        weight_kg: None,
        conditions: &["hypertension", "diabetes", "heart disease"],
        expected_drugs: &["Lisinopril", "Atorvastatin", "Metformin", "Omeprazole", "Levothyroxine"],
        lexical_drugs: &["Lisinopril", "Atorvastatin", "Metformin", "Omeprazole", "Levothyroxine"],
    },
    SamplePrescription {
        id: 6,
        title: "Polypharmacy With Renal Impairment",
        text: "Lisinopril 10mg daily, Atorvastatin 20mg at bedtime, Metformin 1000mg twice daily, \
               Omeprazole 20mg daily, Levothyroxine 50mcg in the morning, Ibuprofen 400mg as needed",
        age: 76,
        weight_kg: Some(61.0),
        conditions: &["hypertension", "diabetes", "chronic kidney disease"],
        expected_drugs: &[
            "Lisinopril",
            "Atorvastatin",
            "Metformin",
            "Omeprazole",
            "Levothyroxine",
            "Ibuprofen",
        ],
        lexical_drugs: &[
            "Lisinopril",
            "Atorvastatin",
            "Metformin",
            "Omeprazole",
            "Levothyroxine",
            "Ibuprofen",
        ],
    },
    SamplePrescription {
        id: 7,
        title: "Brand-Name Analgesics",
        text: "Tylenol 500mg every 6 hours as needed, Advil 200mg three times daily",
        age: 34,
        weight_kg: None,
        conditions: &[],
        expected_drugs: &["Acetaminophen", "Ibuprofen"],
        lexical_drugs: &["Tylenol", "Advil"],
    },
];

/// Look up a sample by id.
pub fn sample(id: u32) -> Option<&'static SamplePrescription> {
    SAMPLES.iter().find(|s| s.id == id)
}

impl SamplePrescription {
    /// The boundary request a client would send for this sample.
    pub fn request(&self) -> PrescriptionRequest {
        PrescriptionRequest {
            text: self.text.to_string(),
            age: i64::from(self.age),
            weight: self.weight_kg,
            medical_conditions: Some(self.conditions.iter().map(|c| c.to_string()).collect()),
        }
    }

    /// The already-validated patient for this sample.
    pub fn patient(&self) -> PatientContext {
        let patient = PatientContext::new(self.age).with_conditions(self.conditions.iter().copied());
        match self.weight_kg {
            Some(w) => patient.with_weight(w),
            None => patient,
        }
    }
}
