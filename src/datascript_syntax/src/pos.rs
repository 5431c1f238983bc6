use serde::{Deserialize, Serialize};
use std::fmt;

/// Source position carried by every AST node. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePos {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        SourcePos {
            file: file.into(),
            line,
            column,
        }
    }

    /// Position used by synthesized nodes that have no surface syntax.
    pub fn synthesized() -> Self {
        SourcePos {
            file: "<synthesized>".to_string(),
            line: 0,
            column: 0,
        }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
