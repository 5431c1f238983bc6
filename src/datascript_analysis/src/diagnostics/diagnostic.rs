use crate::diagnostics::code::DiagnosticCode;
use crate::diagnostics::severity::Severity;
use serde::{Deserialize, Serialize};
use syntax::SourcePos;

/// A related source location attached to a diagnostic, e.g. the previous
/// definition in a duplicate-definition error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedInfo {
    pub pos: SourcePos,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub pos: SourcePos,
    pub related: Option<RelatedInfo>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>, pos: SourcePos) -> Self {
        Diagnostic {
            severity: code.default_severity(),
            code,
            message: message.into(),
            pos,
            related: None,
            suggestion: None,
        }
    }

    pub fn error(code: DiagnosticCode, message: impl Into<String>, pos: SourcePos) -> Self {
        Diagnostic {
            severity: Severity::Error,
            ..Self::new(code, message, pos)
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>, pos: SourcePos) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Self::new(code, message, pos)
        }
    }

    pub fn with_related(mut self, pos: SourcePos, message: impl Into<String>) -> Self {
        self.related = Some(RelatedInfo {
            pos,
            message: message.into(),
        });
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}
