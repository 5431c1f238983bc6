use crate::pos::SourcePos;
use serde::{Deserialize, Serialize};

/// Literal values. Integer literals store an unsigned 64-bit magnitude; a
/// negative number in source is a unary-neg node wrapping an `Int` literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int { pos: SourcePos, value: u64 },
    Bool { pos: SourcePos, value: bool },
    Str { pos: SourcePos, value: String },
}

impl Literal {
    pub fn pos(&self) -> &SourcePos {
        match self {
            Literal::Int { pos, .. } | Literal::Bool { pos, .. } | Literal::Str { pos, .. } => pos,
        }
    }
}
