use crate::errors::{external_failure, PResult};
use crate::identifier::identifier;
use crate::limits::MAX_EXPRESSION_DEPTH;
use crate::literals::{bool_literal, integer_literal, string_literal};
use crate::span::{pos, Span};
use crate::tokens::{tok, tok_dot, tok_not_followed_by, tok_tag};
use crate::trivia::ws;
use nom::error::{ErrorKind, ParseError as NomParseError};
use nom::Parser;
use nom_supreme::error::ErrorTree;
use nom_supreme::ParserExt;
use syntax::expressions::{
    ArrayIndexExpr, BinaryExpr, BinaryOp, CallExpr, Expr, FieldAccessExpr, Identifier,
    TernaryExpr, UnaryExpr, UnaryOp,
};

/// Parse a full expression. Public entry point used by every grammar rule
/// that embeds an expression.
pub fn parse_expression(input: Span<'_>) -> PResult<'_, Expr> {
    expr_at(input, 0)
}

fn deeper<'a>(input: Span<'a>, depth: usize) -> Result<usize, nom::Err<ErrorTree<Span<'a>>>> {
    if depth >= MAX_EXPRESSION_DEPTH {
        Err(external_failure(
            input,
            format!("expression nesting exceeds {} levels", MAX_EXPRESSION_DEPTH),
        ))
    } else {
        Ok(depth + 1)
    }
}

/// Ternary conditional, right-associative and lowest precedence.
fn expr_at(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    let depth = deeper(input, depth)?;
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (rest, condition) = logical_or(input, depth)?;
    let Ok((rest, _)) = tok('?')(rest) else {
        return Ok((rest, condition));
    };
    let (rest, true_expr) = expr_at(rest, depth)?;
    let (rest, _) = tok(':')
        .context("ternary expression")
        .parse(rest)
        .map_err(to_failure)?;
    let (rest, false_expr) = expr_at(rest, depth)?;
    Ok((
        rest,
        Expr::Ternary(Box::new(TernaryExpr {
            pos: start,
            condition,
            true_expr,
            false_expr,
        })),
    ))
}

fn to_failure(err: nom::Err<ErrorTree<Span<'_>>>) -> nom::Err<ErrorTree<Span<'_>>> {
    match err {
        nom::Err::Error(e) => nom::Err::Failure(e),
        other => other,
    }
}

/// Left-associative chain: `next (op next)*`, folding as it goes. The
/// operator parser returns the operator and the fold builds Binary nodes.
fn left_chain<'a>(
    input: Span<'a>,
    depth: usize,
    next: fn(Span<'a>, usize) -> PResult<'a, Expr>,
    op: fn(Span<'a>) -> PResult<'a, BinaryOp>,
) -> PResult<'a, Expr> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (mut rest, mut left) = next(input, depth)?;
    loop {
        let Ok((after_op, bop)) = op(rest) else {
            return Ok((rest, left));
        };
        let (after_rhs, right) = next(after_op, depth).map_err(to_failure)?;
        left = Expr::Binary(Box::new(BinaryExpr {
            pos: start.clone(),
            op: bop,
            left,
            right,
        }));
        rest = after_rhs;
    }
}

fn op_log_or(input: Span<'_>) -> PResult<'_, BinaryOp> {
    tok_tag("||")(input).map(|(rest, _)| (rest, BinaryOp::LogOr))
}

fn op_log_and(input: Span<'_>) -> PResult<'_, BinaryOp> {
    tok_tag("&&")(input).map(|(rest, _)| (rest, BinaryOp::LogAnd))
}

fn op_bit_or(input: Span<'_>) -> PResult<'_, BinaryOp> {
    tok_not_followed_by('|', '|')(input).map(|(rest, _)| (rest, BinaryOp::BitOr))
}

fn op_bit_xor(input: Span<'_>) -> PResult<'_, BinaryOp> {
    tok('^')(input).map(|(rest, _)| (rest, BinaryOp::BitXor))
}

fn op_bit_and(input: Span<'_>) -> PResult<'_, BinaryOp> {
    tok_not_followed_by('&', '&')(input).map(|(rest, _)| (rest, BinaryOp::BitAnd))
}

fn op_equality(input: Span<'_>) -> PResult<'_, BinaryOp> {
    if let Ok((rest, _)) = tok_tag("==")(input) {
        return Ok((rest, BinaryOp::Eq));
    }
    tok_tag("!=")(input).map(|(rest, _)| (rest, BinaryOp::Ne))
}

fn op_relational(input: Span<'_>) -> PResult<'_, BinaryOp> {
    if let Ok((rest, _)) = tok_tag("<=")(input) {
        return Ok((rest, BinaryOp::Le));
    }
    if let Ok((rest, _)) = tok_tag(">=")(input) {
        return Ok((rest, BinaryOp::Ge));
    }
    if let Ok((rest, c)) = tok_not_followed_by('<', '<')(input) {
        let _ = c;
        return Ok((rest, BinaryOp::Lt));
    }
    tok_not_followed_by('>', '>')(input).map(|(rest, _)| (rest, BinaryOp::Gt))
}

fn op_shift(input: Span<'_>) -> PResult<'_, BinaryOp> {
    if let Ok((rest, _)) = tok_tag("<<")(input) {
        return Ok((rest, BinaryOp::Shl));
    }
    tok_tag(">>")(input).map(|(rest, _)| (rest, BinaryOp::Shr))
}

fn op_additive(input: Span<'_>) -> PResult<'_, BinaryOp> {
    if let Ok((rest, _)) = tok('+')(input) {
        return Ok((rest, BinaryOp::Add));
    }
    tok('-')(input).map(|(rest, _)| (rest, BinaryOp::Sub))
}

fn op_multiplicative(input: Span<'_>) -> PResult<'_, BinaryOp> {
    if let Ok((rest, _)) = tok('*')(input) {
        return Ok((rest, BinaryOp::Mul));
    }
    if let Ok((rest, _)) = tok('/')(input) {
        return Ok((rest, BinaryOp::Div));
    }
    tok('%')(input).map(|(rest, _)| (rest, BinaryOp::Mod))
}

fn logical_or(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    left_chain(input, depth, logical_and, op_log_or)
}

fn logical_and(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    left_chain(input, depth, bitwise_or, op_log_and)
}

fn bitwise_or(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    left_chain(input, depth, bitwise_xor, op_bit_or)
}

fn bitwise_xor(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    left_chain(input, depth, bitwise_and, op_bit_xor)
}

fn bitwise_and(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    left_chain(input, depth, equality, op_bit_and)
}

fn equality(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    left_chain(input, depth, relational, op_equality)
}

fn relational(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    left_chain(input, depth, shift, op_relational)
}

fn shift(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    left_chain(input, depth, additive, op_shift)
}

fn additive(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    left_chain(input, depth, multiplicative, op_additive)
}

fn multiplicative(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    left_chain(input, depth, unary, op_multiplicative)
}

fn unary(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let op = if let Ok((rest, _)) = tok('-')(input) {
        Some((rest, UnaryOp::Neg))
    } else if let Ok((rest, _)) = tok('+')(input) {
        Some((rest, UnaryOp::Pos))
    } else if let Ok((rest, _)) = tok('~')(input) {
        Some((rest, UnaryOp::BitNot))
    } else if let Ok((rest, c)) = tok_not_followed_by('!', '=')(input) {
        let _ = c;
        Some((rest, UnaryOp::LogNot))
    } else {
        None
    };
    match op {
        Some((rest, op)) => {
            let depth = deeper(input, depth)?;
            let (rest, operand) = unary(rest, depth)?;
            Ok((
                rest,
                Expr::Unary(Box::new(UnaryExpr {
                    pos: start,
                    op,
                    operand,
                })),
            ))
        }
        None => postfix(input, depth),
    }
}

/// Postfix forms: `.field`, `[index]`, `(args)`, applied left to right.
fn postfix(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    let (mut rest, mut base) = primary(input, depth)?;
    loop {
        if let Ok((after_dot, _)) = tok_dot(rest) {
            let start = pos(&rest);
            let (after_field, field) = identifier(after_dot).map_err(to_failure)?;
            base = Expr::FieldAccess(Box::new(FieldAccessExpr {
                pos: start,
                object: base,
                field,
            }));
            rest = after_field;
            continue;
        }
        if let Ok((after_open, _)) = tok('[')(rest) {
            let start = pos(&rest);
            let depth = deeper(rest, depth)?;
            let (after_index, index) = expr_at(after_open, depth).map_err(to_failure)?;
            let (after_close, _) = tok(']')(after_index).map_err(to_failure)?;
            base = Expr::ArrayIndex(Box::new(ArrayIndexExpr {
                pos: start,
                array: base,
                index,
            }));
            rest = after_close;
            continue;
        }
        if let Ok((after_open, _)) = tok('(')(rest) {
            let start = pos(&rest);
            let depth = deeper(rest, depth)?;
            let (after_args, arguments) = argument_list(after_open, depth)?;
            let (after_close, _) = tok(')')(after_args).map_err(to_failure)?;
            base = Expr::Call(Box::new(CallExpr {
                pos: start,
                callee: base,
                arguments,
            }));
            rest = after_close;
            continue;
        }
        return Ok((rest, base));
    }
}

/// Comma-separated expression list, possibly empty (the caller owns the
/// surrounding parentheses).
pub fn argument_list(input: Span<'_>, depth: usize) -> PResult<'_, Vec<Expr>> {
    let mut args = Vec::new();
    let mut rest = match expr_at(input, depth) {
        Ok((rest, first)) => {
            args.push(first);
            rest
        }
        Err(err @ nom::Err::Failure(_)) => return Err(err),
        Err(_) => return Ok((input, args)),
    };
    while let Ok((after_comma, _)) = tok(',')(rest) {
        let (after_arg, arg) = expr_at(after_comma, depth).map_err(to_failure)?;
        args.push(arg);
        rest = after_arg;
    }
    Ok((rest, args))
}

fn primary(input: Span<'_>, depth: usize) -> PResult<'_, Expr> {
    let (input, _) = ws(input)?;
    if let Ok((rest, lit)) = bool_literal(input) {
        return Ok((rest, Expr::Literal(lit)));
    }
    match integer_literal(input) {
        Ok((rest, lit)) => return Ok((rest, Expr::Literal(lit))),
        Err(err @ nom::Err::Failure(_)) => return Err(err),
        Err(_) => {}
    }
    match string_literal(input) {
        Ok((rest, lit)) => return Ok((rest, Expr::Literal(lit))),
        Err(err @ nom::Err::Failure(_)) => return Err(err),
        Err(_) => {}
    }
    if let Ok((rest, name)) = identifier(input) {
        let start = pos(&input);
        return Ok((rest, Expr::Identifier(Identifier { pos: start, name })));
    }
    if let Ok((rest, _)) = tok('(')(input) {
        let depth = deeper(input, depth)?;
        let (rest, inner) = expr_at(rest, depth).map_err(to_failure)?;
        let (rest, _) = tok(')')(rest).map_err(to_failure)?;
        return Ok((rest, inner));
    }
    Err(nom::Err::Error(ErrorTree::from_error_kind(
        input,
        ErrorKind::Alt,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::new_span;

    fn parse(src: &str) -> Expr {
        let (rest, expr) = parse_expression(new_span(src, "t.ds")).unwrap();
        assert!(
            rest.fragment().trim().is_empty(),
            "unparsed input: {:?}",
            rest.fragment()
        );
        expr
    }

    #[test]
    fn precedence_add_mul() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let expr = parse("1 + 2 * 3");
        let Expr::Binary(add) = expr else {
            panic!("expected binary");
        };
        assert_eq!(add.op, BinaryOp::Add);
        let Expr::Binary(mul) = add.right else {
            panic!("expected nested multiplication");
        };
        assert_eq!(mul.op, BinaryOp::Mul);
    }

    #[test]
    fn shift_binds_tighter_than_relational() {
        let expr = parse("1 << 2 < 3");
        let Expr::Binary(rel) = expr else {
            panic!("expected binary");
        };
        assert_eq!(rel.op, BinaryOp::Lt);
        let Expr::Binary(shl) = rel.left else {
            panic!("expected shift on the left");
        };
        assert_eq!(shl.op, BinaryOp::Shl);
    }

    #[test]
    fn ternary_and_postfix() {
        let expr = parse("flags & 1 != 0 ? items[0].size : header.size(2)");
        assert!(matches!(expr, Expr::Ternary(_)));
    }

    #[test]
    fn unary_chain() {
        let expr = parse("~-x");
        let Expr::Unary(outer) = expr else {
            panic!("expected unary");
        };
        assert_eq!(outer.op, UnaryOp::BitNot);
        assert!(matches!(outer.operand, Expr::Unary(_)));
    }

    #[test]
    fn nesting_limit_is_enforced() {
        // Run on a large stack: the recursive descent gets deep before the
        // depth counter trips.
        std::thread::Builder::new()
            .stack_size(32 * 1024 * 1024)
            .spawn(|| {
                let src = format!("{}x{}", "(".repeat(1100), ")".repeat(1100));
                assert!(parse_expression(new_span(&src, "t.ds")).is_err());
            })
            .unwrap()
            .join()
            .unwrap();
    }
}
