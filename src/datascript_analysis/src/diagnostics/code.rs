use crate::diagnostics::severity::Severity;
use serde::{Deserialize, Serialize};

/// Stable diagnostic codes. The string forms are part of the tool's
/// contract; suppression is keyed on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // Symbols
    DuplicateDefinition,
    UndefinedType,
    UndefinedConstant,
    UndefinedPackage,
    // Types
    TypeMismatch,
    InvalidOperandType,
    IncompatibleTypes,
    ParamCountMismatch,
    // Constant evaluation
    Overflow,
    Underflow,
    DivisionByZero,
    CircularConstant,
    NonConstantAlignment,
    // Target languages
    UnknownTargetLanguage,
    // Warnings
    KeywordCollision,
    WildcardConflict,
    AlwaysTrue,
    AlwaysFalse,
    UnusedImport,
    UnusedConstant,
    UnusedConstraint,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::DuplicateDefinition => "E_DUPLICATE_DEFINITION",
            DiagnosticCode::UndefinedType => "E_UNDEFINED_TYPE",
            DiagnosticCode::UndefinedConstant => "E_UNDEFINED_CONSTANT",
            DiagnosticCode::UndefinedPackage => "E_UNDEFINED_PACKAGE",
            DiagnosticCode::TypeMismatch => "E_TYPE_MISMATCH",
            DiagnosticCode::InvalidOperandType => "E_INVALID_OPERAND_TYPE",
            DiagnosticCode::IncompatibleTypes => "E_INCOMPATIBLE_TYPES",
            DiagnosticCode::ParamCountMismatch => "E_PARAM_COUNT_MISMATCH",
            DiagnosticCode::Overflow => "E_OVERFLOW",
            DiagnosticCode::Underflow => "E_UNDERFLOW",
            DiagnosticCode::DivisionByZero => "E_DIVISION_BY_ZERO",
            DiagnosticCode::CircularConstant => "E_CIRCULAR_CONSTANT",
            DiagnosticCode::NonConstantAlignment => "E4001",
            DiagnosticCode::UnknownTargetLanguage => "E_UNKNOWN_TARGET_LANGUAGE",
            DiagnosticCode::KeywordCollision => "W_KEYWORD_COLLISION",
            DiagnosticCode::WildcardConflict => "W_WILDCARD_CONFLICT",
            DiagnosticCode::AlwaysTrue => "W_ALWAYS_TRUE",
            DiagnosticCode::AlwaysFalse => "W_ALWAYS_FALSE",
            DiagnosticCode::UnusedImport => "W_UNUSED_IMPORT",
            DiagnosticCode::UnusedConstant => "W_UNUSED_CONSTANT",
            DiagnosticCode::UnusedConstraint => "W_UNUSED_CONSTRAINT",
        }
    }

    /// Default severity of this code, before any warnings-as-errors policy.
    pub fn default_severity(self) -> Severity {
        match self {
            DiagnosticCode::KeywordCollision
            | DiagnosticCode::WildcardConflict
            | DiagnosticCode::AlwaysTrue
            | DiagnosticCode::AlwaysFalse
            | DiagnosticCode::UnusedImport
            | DiagnosticCode::UnusedConstant
            | DiagnosticCode::UnusedConstraint => Severity::Warning,
            _ => Severity::Error,
        }
    }
}
