use crate::declarations::param::Param;
use crate::declarations::structure::BodyItem;
use crate::expressions::Expr;
use crate::pos::SourcePos;
use serde::{Deserialize, Serialize};

/// One alternative in a union. A simple typed field produces a one-item
/// case named after the field; an anonymous block `{ items } name;`
/// produces a case holding the whole item list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionCase {
    pub pos: SourcePos,
    pub case_name: String,
    pub items: Vec<BodyItem>,
    pub condition: Option<Expr>,
    pub is_anonymous_block: bool,
    pub docstring: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionDef {
    pub pos: SourcePos,
    pub name: String,
    pub parameters: Vec<Param>,
    pub cases: Vec<UnionCase>,
    pub docstring: Option<String>,
}
