use datascript_parser::Parser;
use syntax::declarations::Module;
use syntax::expressions::{BinaryOp, Expr, Literal, UnaryOp};

fn parse(src: &str) -> Module {
    Parser::new().parse(src, "test.ds").expect("parse ok")
}

fn const_value(module: &Module) -> &Expr {
    &module.constants[0].value
}

#[test]
fn integer_literal_bases() {
    for (src, expected) in [
        ("const uint32 X = 255;", 255u64),
        ("const uint32 X = 0xFF;", 255),
        ("const uint32 X = 0b11111111;", 255),
        ("const uint32 X = 11111111b;", 255),
        ("const uint32 X = 0377;", 255),
    ] {
        let module = parse(src);
        let Expr::Literal(Literal::Int { value, .. }) = const_value(&module) else {
            panic!("expected integer literal for {}", src);
        };
        assert_eq!(*value, expected, "wrong value for {}", src);
    }
}

#[test]
fn malformed_literals_are_errors() {
    for src in [
        "const uint32 X = 0x;",
        "const uint32 X = 0xG1;",
        "const uint32 X = 089;",
        "const uint64 X = 0x10000000000000000;",
    ] {
        assert!(
            Parser::new().parse(src, "test.ds").is_err(),
            "expected parse error for {}",
            src
        );
    }
}

#[test]
fn negative_number_is_unary_neg() {
    let module = parse("const int32 X = -5;");
    let Expr::Unary(unary) = const_value(&module) else {
        panic!("expected unary expression");
    };
    assert_eq!(unary.op, UnaryOp::Neg);
    let Expr::Literal(Literal::Int { value, .. }) = &unary.operand else {
        panic!("expected integer literal operand");
    };
    assert_eq!(*value, 5);
}

#[test]
fn string_literal_with_escapes() {
    let module = parse(r#"const string GREETING = "line\n\"quoted\"\ttab";"#);
    let Expr::Literal(Literal::Str { value, .. }) = const_value(&module) else {
        panic!("expected string literal");
    };
    assert_eq!(value, "line\n\"quoted\"\ttab");
}

#[test]
fn operator_precedence_matches_c() {
    // 2 + 3 * 4 == 14 shape-wise: Add(2, Mul(3, 4))
    let module = parse("const uint32 X = 2 + 3 * 4;");
    let Expr::Binary(add) = const_value(&module) else {
        panic!("expected binary");
    };
    assert_eq!(add.op, BinaryOp::Add);
    let Expr::Binary(mul) = &add.right else {
        panic!("expected multiplication on the right");
    };
    assert_eq!(mul.op, BinaryOp::Mul);
}

#[test]
fn bitwise_precedence() {
    // a | b & c parses as a | (b & c)
    let module = parse("const uint32 X = a | b & c;");
    let Expr::Binary(or) = const_value(&module) else {
        panic!("expected binary");
    };
    assert_eq!(or.op, BinaryOp::BitOr);
    let Expr::Binary(and) = &or.right else {
        panic!("expected bitand on the right");
    };
    assert_eq!(and.op, BinaryOp::BitAnd);
}

#[test]
fn shift_vs_relational() {
    let module = parse("const bool X = 1 << 4 < 32;");
    let Expr::Binary(rel) = const_value(&module) else {
        panic!("expected binary");
    };
    assert_eq!(rel.op, BinaryOp::Lt);
    let Expr::Binary(shl) = &rel.left else {
        panic!("expected shift on the left");
    };
    assert_eq!(shl.op, BinaryOp::Shl);
}

#[test]
fn function_call_without_arguments() {
    let module = parse("const uint8 X = foo();");
    let Expr::Call(call) = const_value(&module) else {
        panic!("expected call");
    };
    assert_eq!(call.callee.as_identifier(), Some("foo"));
    assert!(call.arguments.is_empty());
}

#[test]
fn function_call_with_argument() {
    let module = parse("const uint8 X = sizeof(data);");
    let Expr::Call(call) = const_value(&module) else {
        panic!("expected call");
    };
    assert_eq!(call.callee.as_identifier(), Some("sizeof"));
    assert_eq!(call.arguments.len(), 1);
    assert_eq!(call.arguments[0].as_identifier(), Some("data"));
}

#[test]
fn nested_function_calls() {
    let module = parse("const uint8 X = outer(inner(value));");
    let Expr::Call(outer) = const_value(&module) else {
        panic!("expected call");
    };
    assert_eq!(outer.callee.as_identifier(), Some("outer"));
    let Expr::Call(inner) = &outer.arguments[0] else {
        panic!("expected nested call");
    };
    assert_eq!(inner.callee.as_identifier(), Some("inner"));
}

#[test]
fn field_access_then_call() {
    let module = parse("const uint8 X = obj.method(1, 2);");
    let Expr::Call(call) = const_value(&module) else {
        panic!("expected call");
    };
    assert!(matches!(&call.callee, Expr::FieldAccess(_)));
    assert_eq!(call.arguments.len(), 2);
}

#[test]
fn array_index_chain() {
    let module = parse("const uint8 X = matrix[i][j];");
    let Expr::ArrayIndex(outer) = const_value(&module) else {
        panic!("expected indexing");
    };
    assert!(matches!(&outer.array, Expr::ArrayIndex(_)));
}
