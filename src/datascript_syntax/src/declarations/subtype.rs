use crate::expressions::Expr;
use crate::pos::SourcePos;
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// `subtype <base> NAME : <constraint>;`
///
/// The constraint refers to the parsed value through the distinguished name
/// `this`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtypeDef {
    pub pos: SourcePos,
    pub name: String,
    pub base: Type,
    pub constraint: Expr,
    pub docstring: Option<String>,
}
