use crate::pos::SourcePos;
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// Typed parameter of a parameterized type, constraint or member function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub pos: SourcePos,
    pub ty: Type,
    pub name: String,
}
