use crate::expressions::{BinaryOp, Literal, UnaryOp};
use crate::pos::SourcePos;
use serde::{Deserialize, Serialize};

/// A name occurrence in expression position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub pos: SourcePos,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub pos: SourcePos,
    pub op: UnaryOp,
    pub operand: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub pos: SourcePos,
    pub op: BinaryOp,
    pub left: Expr,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TernaryExpr {
    pub pos: SourcePos,
    pub condition: Expr,
    pub true_expr: Expr,
    pub false_expr: Expr,
}

/// `object.field`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAccessExpr {
    pub pos: SourcePos,
    pub object: Expr,
    pub field: String,
}

/// `array[index]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayIndexExpr {
    pub pos: SourcePos,
    pub array: Expr,
    pub index: Expr,
}

/// `callee(args...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub pos: SourcePos,
    pub callee: Expr,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    Identifier(Identifier),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    Ternary(Box<TernaryExpr>),
    FieldAccess(Box<FieldAccessExpr>),
    ArrayIndex(Box<ArrayIndexExpr>),
    Call(Box<CallExpr>),
}

impl Expr {
    pub fn pos(&self) -> &SourcePos {
        match self {
            Expr::Literal(lit) => lit.pos(),
            Expr::Identifier(id) => &id.pos,
            Expr::Unary(e) => &e.pos,
            Expr::Binary(e) => &e.pos,
            Expr::Ternary(e) => &e.pos,
            Expr::FieldAccess(e) => &e.pos,
            Expr::ArrayIndex(e) => &e.pos,
            Expr::Call(e) => &e.pos,
        }
    }

    /// The identifier name when this expression is a bare identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier(id) => Some(&id.name),
            _ => None,
        }
    }
}
