use crate::pos::SourcePos;
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// `typedef NAME = <type>;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasDef {
    pub pos: SourcePos,
    pub name: String,
    pub target: Type,
    pub docstring: Option<String>,
}
