use datascript_parser::Parser;
use syntax::{FormatOptions, Formatter};

fn format_src(src: &str) -> String {
    let module = Parser::new().parse(src, "test.ds").expect("parse ok");
    Formatter::new(FormatOptions::default())
        .format_module(&module)
        .expect("format ok")
}

/// Structural round trip: pretty-printing a parsed module and re-parsing
/// the output yields the same canonical text, so the two ASTs agree up to
/// position metadata.
fn assert_roundtrip(src: &str) {
    let once = format_src(src);
    let twice = format_src(&once);
    assert_eq!(once, twice, "formatter not a fixpoint for:\n{}", src);
}

#[test]
fn roundtrip_constants_and_subtypes() {
    assert_roundtrip(
        r#"
        const uint32 MAGIC = 0x89ABCDEF;
        const uint8 VERSION = 1 + 2 * 3;
        const bool STRICT = true;
        const string NAME = "da\tta";
        subtype uint16 Port : this > 1024 && this < 65535;
        "#,
    );
}

#[test]
fn roundtrip_struct_with_directives() {
    assert_roundtrip(
        r#"
        package demo.formats;
        import demo.common;
        little;

        /** File header */
        struct Header {
            uint32 magic : magic == 0x1234;
            little uint16 version = 1;
            uint32 data_offset;
            align(4):
            uint32 aligned;
            data_offset:
            uint8 data[16];
            uint8 tail[] if version > 1;
        };
        "#,
    );
}

#[test]
fn roundtrip_enum_union_choice() {
    assert_roundtrip(
        r#"
        enum uint8 Color {
            RED = 1,
            GREEN,
            /** the blue one */
            BLUE = 7
        };

        bitmask uint16 Caps {
            READ = 1,
            WRITE = 2
        };

        union Value {
            uint8 small : small < 100;
            {
                uint16 hi;
                uint16 lo;
            } pair;
        };

        choice Message : uint16 {
            case 0x1234: uint32 a;
            case >= 0x8000: uint16 high;
            default: uint16 b;
        };
        "#,
    );
}

#[test]
fn roundtrip_parameterized_and_inline_types() {
    assert_roundtrip(
        r#"
        struct Record(uint16 n) {
            uint8 data[n];
            union {
                uint8 a;
                uint16 b;
            } tail;
            {
                uint8 x;
            } block;
            function uint32 span() {
                return n * 2;
            }
        };

        struct Uses {
            Record(16) fixed;
            uint8 rest[..32];
        };
        "#,
    );
}

#[test]
fn formatted_output_parses_to_equal_structure() {
    let src = r#"
        struct Point {
            int32 x;
            int32 y;
        };
    "#;
    let module_a = Parser::new().parse(src, "a.ds").expect("parse ok");
    let printed = Formatter::new(FormatOptions::default())
        .format_module(&module_a)
        .expect("format ok");
    let module_b = Parser::new().parse(&printed, "b.ds").expect("reparse ok");
    assert_eq!(module_a.structs.len(), module_b.structs.len());
    assert_eq!(
        module_a.structs[0].body.len(),
        module_b.structs[0].body.len()
    );
    // Canonical text of both parses must agree exactly.
    let reprinted = Formatter::new(FormatOptions::default())
        .format_module(&module_b)
        .expect("format ok");
    assert_eq!(printed, reprinted);
}
