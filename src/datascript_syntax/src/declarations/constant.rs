use crate::expressions::Expr;
use crate::pos::SourcePos;
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// `const <type> NAME = <expr>;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantDef {
    pub pos: SourcePos,
    pub name: String,
    pub ty: Type,
    pub value: Expr,
    pub docstring: Option<String>,
}
