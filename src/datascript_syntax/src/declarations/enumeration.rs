use crate::expressions::Expr;
use crate::pos::SourcePos;
use crate::types::Type;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumItem {
    pub pos: SourcePos,
    pub name: String,
    /// Omitted values auto-increment from the previous item, starting at 0.
    pub value: Option<Expr>,
    pub docstring: Option<String>,
}

/// `enum <int-type> NAME { ... };` or `bitmask <int-type> NAME { ... };`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    pub pos: SourcePos,
    pub name: String,
    pub base: Type,
    pub items: Vec<EnumItem>,
    pub is_bitmask: bool,
    pub docstring: Option<String>,
}
