use crate::declarations::param::Param;
use crate::declarations::structure::BodyItem;
use crate::expressions::Expr;
use crate::pos::SourcePos;
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// How a choice obtains its discriminator value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChoiceDiscriminator {
    /// `choice Name on <expr> { ... };` — evaluated in the enclosing scope.
    External(Expr),
    /// `choice Name : <type> { ... };` — read at the choice's start.
    Inline(Type),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareKind {
    Ge,
    Gt,
    Le,
    Lt,
    Ne,
}

impl CompareKind {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareKind::Ge => ">=",
            CompareKind::Gt => ">",
            CompareKind::Le => "<=",
            CompareKind::Lt => "<",
            CompareKind::Ne => "!=",
        }
    }
}

/// Case selector: exact value list, a half-open comparison, or `default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaseSelector {
    Exact(Vec<Expr>),
    Compare { kind: CompareKind, bound: Expr },
    Default,
}

impl CaseSelector {
    pub fn is_default(&self) -> bool {
        matches!(self, CaseSelector::Default)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceCase {
    pub pos: SourcePos,
    pub selector: CaseSelector,
    pub items: Vec<BodyItem>,
    pub field_name: String,
    pub is_anonymous_block: bool,
    pub docstring: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDef {
    pub pos: SourcePos,
    pub name: String,
    pub parameters: Vec<Param>,
    pub discriminator: ChoiceDiscriminator,
    pub cases: Vec<ChoiceCase>,
    pub docstring: Option<String>,
}
