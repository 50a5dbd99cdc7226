use rxverify_contracts::analysis::Degradation;

/// A stage's value plus the degradations recorded while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput<T> {
    pub value: T,
    pub degradations: Vec<Degradation>,
}

impl<T> StageOutput<T> {
    pub fn clean(value: T) -> Self {
        Self { value, degradations: Vec::new() }
    }

    pub fn with(value: T, degradation: Option<Degradation>) -> Self {
        Self { value, degradations: degradation.into_iter().collect() }
    }
}
