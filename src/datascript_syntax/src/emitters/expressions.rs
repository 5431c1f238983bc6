use crate::emitters::emit_trait::{Emit, EmitCtx, EmitError};
use crate::expressions::{Expr, Literal};
use std::fmt::Write;

fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out
}

/// Emit a sub-expression, parenthesizing anything that is not a primary or
/// postfix form so the printed text re-parses to the same tree regardless of
/// the surrounding precedence level.
fn emit_operand<W: Write>(expr: &Expr, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
    match expr {
        Expr::Literal(_)
        | Expr::Identifier(_)
        | Expr::FieldAccess(_)
        | Expr::ArrayIndex(_)
        | Expr::Call(_) => expr.emit(w, cx),
        _ => {
            w.write_char('(')?;
            expr.emit(w, cx)?;
            w.write_char(')')?;
            Ok(())
        }
    }
}

impl Emit for Literal {
    fn emit<W: Write>(&self, w: &mut W, _cx: &mut EmitCtx) -> Result<(), EmitError> {
        match self {
            Literal::Int { value, .. } => write!(w, "{}", value)?,
            Literal::Bool { value, .. } => write!(w, "{}", value)?,
            Literal::Str { value, .. } => write!(w, "\"{}\"", escape_string(value))?,
        }
        Ok(())
    }
}

impl Emit for Expr {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        match self {
            Expr::Literal(lit) => lit.emit(w, cx),
            Expr::Identifier(id) => {
                w.write_str(&id.name)?;
                Ok(())
            }
            Expr::Unary(e) => {
                w.write_str(e.op.symbol())?;
                emit_operand(&e.operand, w, cx)
            }
            Expr::Binary(e) => {
                emit_operand(&e.left, w, cx)?;
                write!(w, " {} ", e.op.symbol())?;
                emit_operand(&e.right, w, cx)
            }
            Expr::Ternary(e) => {
                emit_operand(&e.condition, w, cx)?;
                w.write_str(" ? ")?;
                emit_operand(&e.true_expr, w, cx)?;
                w.write_str(" : ")?;
                emit_operand(&e.false_expr, w, cx)
            }
            Expr::FieldAccess(e) => {
                emit_operand(&e.object, w, cx)?;
                write!(w, ".{}", e.field)?;
                Ok(())
            }
            Expr::ArrayIndex(e) => {
                emit_operand(&e.array, w, cx)?;
                w.write_char('[')?;
                e.index.emit(w, cx)?;
                w.write_char(']')?;
                Ok(())
            }
            Expr::Call(e) => {
                emit_operand(&e.callee, w, cx)?;
                w.write_char('(')?;
                for (i, arg) in e.arguments.iter().enumerate() {
                    if i > 0 {
                        w.write_str(", ")?;
                    }
                    arg.emit(w, cx)?;
                }
                w.write_char(')')?;
                Ok(())
            }
        }
    }
}
