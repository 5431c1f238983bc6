use crate::registry::LanguageRegistry;
use std::collections::BTreeSet;

/// Knobs for one analysis run. The language registry is passed in rather
/// than read from process-global state so embedders control what the
/// keyword-collision check sees.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub warnings_as_errors: bool,
    /// Diagnostic codes (string form, e.g. "W_UNUSED_IMPORT") to drop.
    pub disabled_warnings: BTreeSet<String>,
    /// Target languages to check identifiers against. Empty means all
    /// registered languages.
    pub target_languages: BTreeSet<String>,
    pub registry: LanguageRegistry,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            warnings_as_errors: false,
            disabled_warnings: BTreeSet::new(),
            target_languages: BTreeSet::new(),
            registry: LanguageRegistry::builtin(),
        }
    }
}
