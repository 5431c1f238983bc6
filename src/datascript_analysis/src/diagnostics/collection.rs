use crate::diagnostics::diagnostic::Diagnostic;
use crate::diagnostics::severity::Severity;
use crate::options::AnalysisOptions;
use serde::{Deserialize, Serialize};

/// Collection of diagnostics, in emission order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticCollection {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Sort the tail of the collection (everything from `from` on) by source
    /// position. Phases call this when they finish so that ties within a
    /// phase break deterministically while cross-phase order is preserved.
    pub fn sort_tail_by_position(&mut self, from: usize) {
        let tail = &mut self.diagnostics[from..];
        tail.sort_by(|a, b| {
            (a.pos.file.as_str(), a.pos.line, a.pos.column).cmp(&(
                b.pos.file.as_str(),
                b.pos.line,
                b.pos.column,
            ))
        });
    }

    /// Apply the warning policy: drop suppressed warnings, then upgrade the
    /// rest to errors when warnings-as-errors is in force.
    pub fn apply_policy(&mut self, options: &AnalysisOptions) {
        self.diagnostics.retain(|d| {
            d.severity != Severity::Warning
                || !options.disabled_warnings.contains(d.code.as_str())
        });
        if options.warnings_as_errors {
            for d in &mut self.diagnostics {
                if d.severity == Severity::Warning {
                    d.severity = Severity::Error;
                }
            }
        }
    }
}
