use crate::declarations::param::Param;
use crate::expressions::Expr;
use crate::pos::SourcePos;
use serde::{Deserialize, Serialize};

/// `constraint NAME { <bool-expr> };` or
/// `constraint NAME(<type> p, ...) { <bool-expr> };`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDef {
    pub pos: SourcePos,
    pub name: String,
    pub params: Vec<Param>,
    pub condition: Expr,
    pub docstring: Option<String>,
}
