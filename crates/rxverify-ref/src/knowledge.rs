//! The bundled interaction knowledge base.

use rxverify_contracts::error::RxResult;
use rxverify_knowledge::KnowledgeBase;

/// Reference seed: interaction pairs, therapeutic classes, and
/// contraindications for the drugs in the sample prescriptions.
pub const DEFAULT_SEED: &str = include_str!("../seeds/knowledge_base.toml");

/// Load [`DEFAULT_SEED`].
pub fn default_knowledge_base() -> RxResult<KnowledgeBase> {
    KnowledgeBase::from_toml_str(DEFAULT_SEED)
}
