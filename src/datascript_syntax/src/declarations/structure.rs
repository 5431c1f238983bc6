use crate::declarations::function::FunctionDef;
use crate::declarations::param::Param;
use crate::declarations::union::UnionCase;
use crate::expressions::Expr;
use crate::pos::SourcePos;
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// One field in a struct body, union case or choice case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub pos: SourcePos,
    pub ty: Type,
    pub name: String,
    /// `if <expr>` (or the `optional` synonym) guard.
    pub condition: Option<Expr>,
    /// Inline constraint: `<type> name : <expr>;`
    pub constraint: Option<Expr>,
    /// Default value: `<type> name = <expr>;`
    pub default_value: Option<Expr>,
    pub docstring: Option<String>,
}

/// Standalone `<expr>:` directive. The expression evaluates to an absolute
/// byte offset within the enclosing struct's buffer; the reader seeks there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDirective {
    pub pos: SourcePos,
    pub expr: Expr,
}

/// Standalone `align(<expr>):` directive. The reader advances to the next
/// N-aligned offset relative to the buffer start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentDirective {
    pub pos: SourcePos,
    pub expr: Expr,
}

/// `union { cases } name;` inside a composite body. Desugared to a
/// synthesized top-level union before semantic analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineUnionField {
    pub pos: SourcePos,
    pub cases: Vec<UnionCase>,
    pub field_name: String,
    pub condition: Option<Expr>,
    pub constraint: Option<Expr>,
    pub docstring: Option<String>,
}

/// `{ items } name;` inside a composite body. Desugared to a synthesized
/// top-level struct before semantic analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineStructField {
    pub pos: SourcePos,
    pub body: Vec<BodyItem>,
    pub field_name: String,
    pub condition: Option<Expr>,
    pub constraint: Option<Expr>,
    pub docstring: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyItem {
    Field(FieldDef),
    Label(LabelDirective),
    Align(AlignmentDirective),
    Function(FunctionDef),
    InlineUnion(InlineUnionField),
    InlineStruct(InlineStructField),
}

impl BodyItem {
    pub fn pos(&self) -> &SourcePos {
        match self {
            BodyItem::Field(f) => &f.pos,
            BodyItem::Label(l) => &l.pos,
            BodyItem::Align(a) => &a.pos,
            BodyItem::Function(f) => &f.pos,
            BodyItem::InlineUnion(u) => &u.pos,
            BodyItem::InlineStruct(s) => &s.pos,
        }
    }

    pub fn as_field(&self) -> Option<&FieldDef> {
        match self {
            BodyItem::Field(f) => Some(f),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDef {
    pub pos: SourcePos,
    pub name: String,
    pub parameters: Vec<Param>,
    pub body: Vec<BodyItem>,
    pub docstring: Option<String>,
}

impl StructDef {
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.body.iter().filter_map(BodyItem::as_field)
    }
}
