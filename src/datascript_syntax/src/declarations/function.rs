use crate::declarations::param::Param;
use crate::expressions::Expr;
use crate::pos::SourcePos;
use crate::types::Type;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Return { pos: SourcePos, value: Expr },
    Expression { pos: SourcePos, expr: Expr },
}

impl Statement {
    pub fn pos(&self) -> &SourcePos {
        match self {
            Statement::Return { pos, .. } | Statement::Expression { pos, .. } => pos,
        }
    }
}

/// Member function inside a struct or union body:
/// `<ret-type> function name(params) { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub pos: SourcePos,
    pub name: String,
    pub return_type: Type,
    pub parameters: Vec<Param>,
    pub body: Vec<Statement>,
    pub docstring: Option<String>,
}
