use datascript_syntax::declarations::{ConstantDef, Module};
use datascript_syntax::expressions::{Expr, Literal};
use datascript_syntax::types::{Endian, PrimitiveType, Type};
use datascript_syntax::SourcePos;

fn pos() -> SourcePos {
    SourcePos::new("test.ds", 1, 1)
}

#[test]
fn module_serializes_and_deserializes() {
    let mut module = Module::default();
    module.constants.push(ConstantDef {
        pos: pos(),
        name: "MAGIC".to_string(),
        ty: Type::Primitive(PrimitiveType {
            pos: pos(),
            is_signed: false,
            bits: 32,
            byte_order: Endian::Unspec,
        }),
        value: Expr::Literal(Literal::Int {
            pos: pos(),
            value: 0x1234,
        }),
        docstring: Some("file magic".to_string()),
    });

    let json = serde_json::to_string(&module).expect("serialize");
    let back: Module = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(module, back);
}

#[test]
fn default_module_is_big_endian() {
    let module = Module::default();
    assert_eq!(module.default_endianness, Endian::Big);
    assert!(module.package.is_none());
}
