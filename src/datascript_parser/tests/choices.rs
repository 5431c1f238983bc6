use datascript_parser::Parser;
use syntax::declarations::{
    BodyItem, CaseSelector, ChoiceDiscriminator, CompareKind, Module,
};
use syntax::types::Type;

fn parse(src: &str) -> Module {
    Parser::new().parse(src, "test.ds").expect("parse ok")
}

fn case_field<'a>(case: &'a syntax::declarations::ChoiceCase) -> &'a syntax::declarations::FieldDef {
    match case.items.first() {
        Some(BodyItem::Field(f)) => f,
        other => panic!("expected a field item, got {:?}", other),
    }
}

#[test]
fn choice_with_single_case() {
    let module = parse(
        r#"
        choice Message on type {
            case 1: uint8 byte_message;
        };
        "#,
    );
    assert_eq!(module.choices.len(), 1);
    let c = &module.choices[0];
    assert_eq!(c.name, "Message");
    assert!(matches!(c.discriminator, ChoiceDiscriminator::External(_)));
    assert_eq!(c.cases.len(), 1);
    let CaseSelector::Exact(exprs) = &c.cases[0].selector else {
        panic!("expected exact selector");
    };
    assert_eq!(exprs.len(), 1);
    assert_eq!(case_field(&c.cases[0]).name, "byte_message");
}

#[test]
fn choice_with_default_case() {
    let module = parse(
        r#"
        choice Message on type {
            case 1: uint8 byte_message;
            default: uint8[] raw_data;
        };
        "#,
    );
    let c = &module.choices[0];
    assert_eq!(c.cases.len(), 2);
    assert!(!c.cases[0].selector.is_default());
    assert!(c.cases[1].selector.is_default());
    assert_eq!(case_field(&c.cases[1]).name, "raw_data");
}

#[test]
fn choice_with_stacked_case_expressions() {
    let module = parse(
        r#"
        choice Value on tag {
            case 1:
            case 2:
            case 3: uint8 small_val;
            case 10: uint32 large_val;
        };
        "#,
    );
    let c = &module.choices[0];
    assert_eq!(c.cases.len(), 2);
    let CaseSelector::Exact(exprs) = &c.cases[0].selector else {
        panic!("expected exact selector");
    };
    assert_eq!(exprs.len(), 3);
    assert_eq!(case_field(&c.cases[0]).name, "small_val");
}

#[test]
fn choice_with_comma_separated_case_expressions() {
    let module = parse(
        r#"
        choice Value on tag {
            case 1, 2, 3: uint8 small_val;
        };
        "#,
    );
    let CaseSelector::Exact(exprs) = &module.choices[0].cases[0].selector else {
        panic!("expected exact selector");
    };
    assert_eq!(exprs.len(), 3);
}

#[test]
fn choice_with_inline_discriminator() {
    let module = parse(
        r#"
        choice ResourceNameOrId : uint16 {
            case 0xFFFF: uint16 ordinal;
            default: string name;
        };
        "#,
    );
    let c = &module.choices[0];
    let ChoiceDiscriminator::Inline(ty) = &c.discriminator else {
        panic!("expected inline discriminator");
    };
    let Type::Primitive(p) = ty else {
        panic!("expected primitive discriminator");
    };
    assert_eq!(p.bits, 16);
    assert!(!p.is_signed);
}

#[test]
fn choice_with_inline_struct_case() {
    let module = parse(
        r#"
        choice ResourceNameOrId : uint16 {
            case 0xFFFF: {
                uint16 marker;
                uint16 ordinal;
            } data;
            default:
                string name;
        };
        "#,
    );
    let c = &module.choices[0];
    assert_eq!(c.cases.len(), 2);
    assert!(c.cases[0].is_anonymous_block);
    assert_eq!(c.cases[0].field_name, "data");
    assert_eq!(c.cases[0].items.len(), 2);
    assert!(!c.cases[1].is_anonymous_block);
    assert_eq!(c.cases[1].field_name, "name");
}

#[test]
fn choice_with_empty_inline_struct() {
    let module = parse(
        r#"
        choice Optional on mode {
            case 0: {} empty;
            case 1: uint8 value;
        };
        "#,
    );
    let c = &module.choices[0];
    assert!(c.cases[0].is_anonymous_block);
    assert_eq!(c.cases[0].field_name, "empty");
    assert!(c.cases[0].items.is_empty());
}

#[test]
fn choice_with_comparator_cases() {
    let module = parse(
        r#"
        choice Ranged on value {
            case >= 0x80: uint32 extended;
            case < 0x10: uint8 tiny;
            case != 0: uint16 nonzero;
            default: uint8 other;
        };
        "#,
    );
    let c = &module.choices[0];
    assert_eq!(c.cases.len(), 4);
    let CaseSelector::Compare { kind, .. } = &c.cases[0].selector else {
        panic!("expected comparator selector");
    };
    assert_eq!(*kind, CompareKind::Ge);
    let CaseSelector::Compare { kind, .. } = &c.cases[1].selector else {
        panic!("expected comparator selector");
    };
    assert_eq!(*kind, CompareKind::Lt);
    let CaseSelector::Compare { kind, .. } = &c.cases[2].selector else {
        panic!("expected comparator selector");
    };
    assert_eq!(*kind, CompareKind::Ne);
}

#[test]
fn choice_with_big_endian_discriminator() {
    let module = parse(
        r#"
        choice BigEndianChoice : big uint16 {
            case 1: uint8 one;
        };
        "#,
    );
    let ChoiceDiscriminator::Inline(Type::Primitive(p)) = &module.choices[0].discriminator
    else {
        panic!("expected inline primitive discriminator");
    };
    assert_eq!(p.byte_order, syntax::types::Endian::Big);
}

#[test]
fn choice_docstring() {
    let module = parse(
        r#"
        /** Choice docstring */
        choice Data : uint16 {
            case 0:
                uint16 value;
            default:
                string name;
        };
        "#,
    );
    assert!(module.choices[0]
        .docstring
        .as_deref()
        .unwrap()
        .contains("Choice docstring"));
}

#[test]
fn choice_with_selector_field_access() {
    let module = parse(
        r#"
        choice PacketData on header.protocol {
            case 1: uint32 tcp;
            case 2: uint16 udp;
        };
        "#,
    );
    let ChoiceDiscriminator::External(selector) = &module.choices[0].discriminator else {
        panic!("expected external selector");
    };
    assert!(matches!(
        selector,
        syntax::expressions::Expr::FieldAccess(_)
    ));
}
