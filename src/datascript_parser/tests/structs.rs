use datascript_parser::Parser;
use syntax::declarations::{BodyItem, Module};
use syntax::types::{ArraySizing, BitFieldWidth, Endian, Type};

fn parse(src: &str) -> Module {
    Parser::new().parse(src, "test.ds").expect("parse ok")
}

#[test]
fn empty_struct() {
    let module = parse("struct Empty {};");
    assert_eq!(module.structs.len(), 1);
    assert_eq!(module.structs[0].name, "Empty");
    assert!(module.structs[0].body.is_empty());
}

#[test]
fn struct_with_primitive_fields() {
    let module = parse(
        r#"
        struct Point {
            int32 x;
            int32 y;
        };
        "#,
    );
    assert_eq!(module.structs.len(), 1);
    let s = &module.structs[0];
    assert_eq!(s.name, "Point");
    assert_eq!(s.body.len(), 2);
    let x = s.body[0].as_field().unwrap();
    assert_eq!(x.name, "x");
    let Type::Primitive(p) = &x.ty else {
        panic!("expected primitive, got {:?}", x.ty);
    };
    assert!(p.is_signed);
    assert_eq!(p.bits, 32);
}

#[test]
fn endianness_prefixes() {
    let module = parse(
        r#"
        struct Header {
            uint32 magic;
            little uint16 version;
            big uint64 timestamp;
        };
        "#,
    );
    let s = &module.structs[0];
    let field = |i: usize| s.body[i].as_field().unwrap();
    let prim = |i: usize| match &field(i).ty {
        Type::Primitive(p) => p.clone(),
        other => panic!("expected primitive, got {:?}", other),
    };
    assert_eq!(prim(0).byte_order, Endian::Unspec);
    assert_eq!(prim(1).byte_order, Endian::Little);
    assert_eq!(prim(2).byte_order, Endian::Big);
}

#[test]
fn bitfield_fields() {
    let module = parse(
        r#"
        struct Flags {
            bit:1 enabled;
            bit:3 level;
            bit:4 reserved;
        };
        "#,
    );
    let s = &module.structs[0];
    assert_eq!(s.body.len(), 3);
    let Type::BitField(bf) = &s.body[1].as_field().unwrap().ty else {
        panic!("expected bitfield");
    };
    assert_eq!(bf.width, BitFieldWidth::Fixed(3));
}

#[test]
fn conditional_array_with_if() {
    let module = parse(
        r#"
        struct TestIf {
            uint16 size;
            uint8 data[size] if size > 0;
        };
        "#,
    );
    let s = &module.structs[0];
    let data = s.body[1].as_field().unwrap();
    assert_eq!(data.name, "data");
    assert!(data.condition.is_some());
    let Type::Array(arr) = &data.ty else {
        panic!("expected array");
    };
    assert!(matches!(arr.sizing, ArraySizing::Fixed(_)));
}

#[test]
fn conditional_array_with_optional_keyword() {
    let module = parse(
        r#"
        struct TestOptional {
            uint16 size;
            uint8 data[size] optional size > 0;
        };
        "#,
    );
    let data = module.structs[0].body[1].as_field().unwrap();
    assert!(data.condition.is_some());
}

#[test]
fn field_with_constraint_and_default() {
    let module = parse(
        r#"
        struct Packet {
            uint32 magic : magic == 0x12345678;
            uint8 version = 1;
        };
        "#,
    );
    let s = &module.structs[0];
    assert!(s.body[0].as_field().unwrap().constraint.is_some());
    assert!(s.body[1].as_field().unwrap().default_value.is_some());
}

#[test]
fn label_and_alignment_directives() {
    let module = parse(
        r#"
        struct WithDirectives {
            uint32 data_offset;
            align(4):
            uint32 aligned_value;
            data_offset:
            uint8 data_value;
        };
        "#,
    );
    let s = &module.structs[0];
    assert_eq!(s.body.len(), 5);
    assert!(matches!(s.body[1], BodyItem::Align(_)));
    assert!(matches!(s.body[3], BodyItem::Label(_)));
}

#[test]
fn struct_docstring_attaches() {
    let module = parse(
        r#"
        /** This is a struct docstring */
        struct MyStruct {
            uint32 field;
        };
        "#,
    );
    let doc = module.structs[0].docstring.as_deref().unwrap();
    assert!(doc.contains("This is a struct docstring"));
}

#[test]
fn field_docstring_attaches() {
    let module = parse(
        r#"
        struct Test {
            uint16 size;

            /** Optional data array */
            uint8 data[size] optional size > 0;
        };
        "#,
    );
    let data = module.structs[0].body[1].as_field().unwrap();
    assert!(data
        .docstring
        .as_deref()
        .unwrap()
        .contains("Optional data array"));
}

#[test]
fn parameterized_struct() {
    let module = parse(
        r#"
        struct Record(uint16 n) {
            uint8 data[n];
        };
        "#,
    );
    let s = &module.structs[0];
    assert_eq!(s.parameters.len(), 1);
    assert_eq!(s.parameters[0].name, "n");
}

#[test]
fn inline_union_field() {
    let module = parse(
        r#"
        struct Message {
            uint8 kind;
            union {
                uint8 a;
                uint16 b;
            } payload;
        };
        "#,
    );
    let s = &module.structs[0];
    let BodyItem::InlineUnion(inline) = &s.body[1] else {
        panic!("expected inline union, got {:?}", s.body[1]);
    };
    assert_eq!(inline.field_name, "payload");
    assert_eq!(inline.cases.len(), 2);
}

#[test]
fn inline_struct_field() {
    let module = parse(
        r#"
        struct Outer {
            {
                uint8 x;
                uint8 y;
            } point;
        };
        "#,
    );
    let BodyItem::InlineStruct(inline) = &module.structs[0].body[0] else {
        panic!("expected inline struct");
    };
    assert_eq!(inline.field_name, "point");
    assert_eq!(inline.body.len(), 2);
}

#[test]
fn member_function() {
    let module = parse(
        r#"
        struct Sized {
            uint16 count;
            function uint32 total() {
                return count * 4;
            }
        };
        "#,
    );
    let BodyItem::Function(func) = &module.structs[0].body[1] else {
        panic!("expected member function");
    };
    assert_eq!(func.name, "total");
    assert_eq!(func.body.len(), 1);
}

#[test]
fn module_header_declarations() {
    let module = parse(
        r#"
        package demo.formats;
        import demo.common;
        import demo.codecs.*;
        little;

        const uint8 VERSION = 2;
        "#,
    );
    assert_eq!(module.package.as_ref().unwrap().dotted(), "demo.formats");
    assert_eq!(module.imports.len(), 2);
    assert!(!module.imports[0].is_wildcard);
    assert!(module.imports[1].is_wildcard);
    assert_eq!(module.default_endianness, Endian::Little);
    assert_eq!(module.constants.len(), 1);
}

#[test]
fn typedef_and_enum_and_bitmask() {
    let module = parse(
        r#"
        typedef DWORD = uint32;

        enum uint8 Color {
            RED = 0,
            GREEN = 1,
            BLUE
        };

        bitmask uint16 Caps {
            READ = 1,
            WRITE = 2
        };
        "#,
    );
    assert_eq!(module.type_aliases.len(), 1);
    assert_eq!(module.type_aliases[0].name, "DWORD");
    assert_eq!(module.enums.len(), 2);
    assert!(!module.enums[0].is_bitmask);
    assert_eq!(module.enums[0].items.len(), 3);
    assert!(module.enums[0].items[2].value.is_none());
    assert!(module.enums[1].is_bitmask);
}

#[test]
fn union_with_anonymous_block_and_condition() {
    let module = parse(
        r#"
        union Value {
            uint8 small : small < 100;
            {
                uint16 hi;
                uint16 lo;
            } pair : hi != 0;
        };
        "#,
    );
    let u = &module.unions[0];
    assert_eq!(u.cases.len(), 2);
    assert!(!u.cases[0].is_anonymous_block);
    assert_eq!(u.cases[0].case_name, "small");
    assert!(u.cases[0].condition.is_some());
    assert!(u.cases[1].is_anonymous_block);
    assert_eq!(u.cases[1].case_name, "pair");
    assert!(u.cases[1].condition.is_some());
    assert_eq!(u.cases[1].items.len(), 2);
}

#[test]
fn parse_errors_carry_position() {
    let err = Parser::new()
        .parse("struct Broken {", "broken.ds")
        .unwrap_err();
    assert_eq!(err.file, "broken.ds");
    assert!(err.line >= 1);
    assert!(!err.message.is_empty());
}

#[test]
fn overlong_identifier_is_rejected() {
    let long_name = "x".repeat(300);
    let src = format!("struct {} {{}};", long_name);
    assert!(Parser::new().parse(&src, "test.ds").is_err());
}
