use datascript_parser::Parser;
use syntax::declarations::Module;
use syntax::expressions::{BinaryOp, Expr};

fn parse(src: &str) -> Module {
    Parser::new().parse(src, "test.ds").expect("parse ok")
}

#[test]
fn simple_constraint_with_literal() {
    let module = parse("constraint IsValid { true };");
    assert_eq!(module.constraints.len(), 1);
    assert_eq!(module.constraints[0].name, "IsValid");
    assert!(module.constraints[0].params.is_empty());
    assert!(matches!(
        module.constraints[0].condition,
        Expr::Literal(syntax::expressions::Literal::Bool { value: true, .. })
    ));
}

#[test]
fn constraint_with_comparison() {
    let module = parse("constraint IsPositive { value > 0 };");
    let Expr::Binary(binary) = &module.constraints[0].condition else {
        panic!("expected binary condition");
    };
    assert_eq!(binary.op, BinaryOp::Gt);
}

#[test]
fn constraint_with_logical_and() {
    let module = parse("constraint InRange { value >= 0 && value <= 100 };");
    let Expr::Binary(binary) = &module.constraints[0].condition else {
        panic!("expected binary condition");
    };
    assert_eq!(binary.op, BinaryOp::LogAnd);
}

#[test]
fn constraint_with_masking() {
    let module = parse("constraint HasFlags { (flags & REQUIRED_MASK) == REQUIRED_MASK };");
    let Expr::Binary(binary) = &module.constraints[0].condition else {
        panic!("expected binary condition");
    };
    assert_eq!(binary.op, BinaryOp::Eq);
}

#[test]
fn constraint_with_ternary() {
    let module = parse("constraint CheckConditional { enabled ? value > 0 : true };");
    assert!(matches!(
        module.constraints[0].condition,
        Expr::Ternary(_)
    ));
}

#[test]
fn constraint_with_parameters() {
    let module = parse("constraint InBounds(uint32 lo, uint32 hi) { lo <= hi };");
    let c = &module.constraints[0];
    assert_eq!(c.params.len(), 2);
    assert_eq!(c.params[0].name, "lo");
    assert_eq!(c.params[1].name, "hi");
}

#[test]
fn constraint_with_negation() {
    let module = parse("constraint NotDisabled { !disabled };");
    assert!(matches!(module.constraints[0].condition, Expr::Unary(_)));
}

#[test]
fn simple_subtype() {
    let module = parse("subtype uint16 UserID : this > 0;");
    assert_eq!(module.subtypes.len(), 1);
    let s = &module.subtypes[0];
    assert_eq!(s.name, "UserID");
    let Expr::Binary(binary) = &s.constraint else {
        panic!("expected binary constraint");
    };
    assert_eq!(binary.op, BinaryOp::Gt);
    assert_eq!(binary.left.as_identifier(), Some("this"));
}

#[test]
fn subtype_with_compound_constraint() {
    let module = parse("subtype uint16 Port : this > 1024 && this < 65535;");
    let Expr::Binary(binary) = &module.subtypes[0].constraint else {
        panic!("expected binary constraint");
    };
    assert_eq!(binary.op, BinaryOp::LogAnd);
}

#[test]
fn subtype_referencing_constants() {
    let module = parse(
        r#"
        const uint16 MIN_PORT = 1024;
        const uint16 MAX_PORT = 65535;

        subtype uint16 Port : this > MIN_PORT && this < MAX_PORT;
        "#,
    );
    assert_eq!(module.constants.len(), 2);
    assert_eq!(module.subtypes.len(), 1);
}

#[test]
fn subtype_docstring() {
    let module = parse(
        r#"
        /** User identifier, must be positive */
        subtype uint16 UserID : this > 0;
        "#,
    );
    assert!(module.subtypes[0]
        .docstring
        .as_deref()
        .unwrap()
        .contains("must be positive"));
}
