pub mod binary_operator;
pub mod expression;
pub mod literal;
pub mod unary_operator;

pub use binary_operator::BinaryOp;
pub use expression::{
    ArrayIndexExpr, BinaryExpr, CallExpr, Expr, FieldAccessExpr, Identifier, TernaryExpr,
    UnaryExpr,
};
pub use literal::Literal;
pub use unary_operator::UnaryOp;
