use datascript_analysis::loader::ModuleSet;
use datascript_analysis::{analyze, AnalysisOptions};
use datascript_ir::{
    build_bundle, Bundle, Entity, IrDiscriminator, IrEndian, IrExpr, IrMember, IrSelector,
    IrType,
};
use datascript_parser::Parser;

fn bundle_for(src: &str) -> Bundle {
    let module = Parser::new().parse(src, "test.ds").expect("parse ok");
    let mut set = ModuleSet::from_main(module, "test.ds");
    let session = analyze(&mut set, AnalysisOptions::default());
    build_bundle(&set, &session)
}

#[test]
fn trivial_struct_bundle() {
    // S1: one struct, two int32 fields with static offsets 0 and 4.
    let bundle = bundle_for("struct Point { int32 x; int32 y; };");
    assert_eq!(bundle.len(), 1);
    let Entity::Struct(point) = &bundle.entities[0] else {
        panic!("expected struct entity");
    };
    assert_eq!(point.name, "Point");
    assert_eq!(point.size, Some(8));
    assert_eq!(point.alignment, 4);
    let fields: Vec<_> = point.fields().collect();
    assert_eq!(fields.len(), 2);
    for (field, (name, offset)) in fields.iter().zip([("x", 0), ("y", 4)]) {
        assert_eq!(field.name, name);
        assert_eq!(field.offset, Some(offset));
        let IrType::Int { bits, .. } = field.ty else {
            panic!("expected int32 field type, got {:?}", field.ty);
        };
        assert_eq!(bits, 32);
    }
}

#[test]
fn poisoned_constant_still_has_an_entry() {
    // S2: the overflowing constant is present but poisoned.
    let bundle = bundle_for("const uint64 X = 1 << 65;");
    assert_eq!(bundle.len(), 1);
    let Entity::Const(c) = &bundle.entities[0] else {
        panic!("expected constant entity");
    };
    assert_eq!(c.name, "X");
    assert!(c.poisoned);
    assert_eq!(c.value, None);
}

#[test]
fn resolved_constant_value() {
    let bundle = bundle_for("const uint32 MAGIC = 0x1234 * 2;");
    let Entity::Const(c) = &bundle.entities[0] else {
        panic!("expected constant entity");
    };
    assert_eq!(c.value, Some(0x2468));
    assert!(!c.poisoned);
}

#[test]
fn choice_dispatch_bundle() {
    // S6: inline uint16 discriminator, exact case then default, in order.
    let bundle = bundle_for(
        r#"
        choice C : uint16 {
            case 0x1234: uint32 a;
            default: uint16 b;
        };
        "#,
    );
    let Entity::Choice(c) = &bundle.entities[0] else {
        panic!("expected choice entity");
    };
    let IrDiscriminator::Inline(IrType::UInt { bits, .. }) = &c.discriminator else {
        panic!("expected inline uint16 discriminator, got {:?}", c.discriminator);
    };
    assert_eq!(*bits, 16);
    assert_eq!(c.cases.len(), 2);
    let IrSelector::Exact(exprs) = &c.cases[0].selector else {
        panic!("expected exact selector first");
    };
    assert_eq!(exprs, &vec![IrExpr::UInt(0x1234)]);
    assert!(matches!(c.cases[1].selector, IrSelector::Default));
}

#[test]
fn default_case_is_emitted_last() {
    let bundle = bundle_for(
        r#"
        choice C : uint8 {
            case 1: uint8 a;
            default: uint8 d;
            case 2: uint16 b;
        };
        "#,
    );
    let Entity::Choice(c) = &bundle.entities[0] else {
        panic!("expected choice entity");
    };
    assert_eq!(c.cases.len(), 3);
    assert!(matches!(c.cases[0].selector, IrSelector::Exact(_)));
    assert!(matches!(c.cases[1].selector, IrSelector::Exact(_)));
    assert!(matches!(c.cases[2].selector, IrSelector::Default));
    assert_eq!(c.cases[2].field_name, "d");
}

#[test]
fn entities_are_in_dependency_order() {
    let bundle = bundle_for(
        r#"
        struct Outer {
            Inner nested;
            uint8 tag;
        };
        struct Inner {
            uint16 v;
        };
        "#,
    );
    assert_eq!(bundle.len(), 2);
    assert_eq!(bundle.entities[0].name(), "Inner");
    assert_eq!(bundle.entities[1].name(), "Outer");
    let Entity::Struct(outer) = &bundle.entities[1] else {
        panic!("expected struct");
    };
    let nested = outer.fields().next().unwrap();
    let IrType::Entity { id, .. } = &nested.ty else {
        panic!("expected entity reference, got {:?}", nested.ty);
    };
    assert_eq!(bundle.get(*id).name(), "Inner");
}

#[test]
fn constant_references_are_bound() {
    let bundle = bundle_for(
        r#"
        const uint16 COUNT = 4;
        struct Data {
            uint8 items[COUNT];
        };
        "#,
    );
    let (const_id, _) = bundle.find("COUNT").unwrap();
    let Entity::Struct(data) = bundle.find("Data").unwrap().1 else {
        panic!("expected struct");
    };
    let field = data.fields().next().unwrap();
    let IrType::Array { sizing, .. } = &field.ty else {
        panic!("expected array type");
    };
    let datascript_ir::IrArraySizing::Fixed(size) = sizing else {
        panic!("expected fixed sizing");
    };
    assert_eq!(size, &IrExpr::ConstRef(const_id));
}

#[test]
fn field_references_and_conditions_are_lowered() {
    let bundle = bundle_for(
        r#"
        struct Packet {
            uint16 size;
            uint8 data[size] if size > 0;
        };
        "#,
    );
    let Entity::Struct(packet) = &bundle.entities[0] else {
        panic!("expected struct");
    };
    let data = packet.fields().nth(1).unwrap();
    let IrType::Array { sizing, .. } = &data.ty else {
        panic!("expected array");
    };
    let datascript_ir::IrArraySizing::Fixed(size) = sizing else {
        panic!("expected fixed-size array");
    };
    assert_eq!(size, &IrExpr::FieldRef("size".to_string()));
    let datascript_ir::IrCondition::Runtime(cond) = &data.condition else {
        panic!("expected runtime condition");
    };
    assert!(matches!(cond, IrExpr::Binary { .. }));
}

#[test]
fn enum_items_carry_resolved_values() {
    let bundle = bundle_for("enum uint8 Color { RED = 1, GREEN, BLUE = 7 };");
    let Entity::Enum(color) = &bundle.entities[0] else {
        panic!("expected enum entity");
    };
    let values: Vec<u64> = color.items.iter().map(|i| i.value).collect();
    assert_eq!(values, vec![1, 2, 7]);
    assert!(matches!(color.base, IrType::UInt { bits: 8, .. }));
}

#[test]
fn enum_item_access_becomes_enum_item_ref() {
    let bundle = bundle_for(
        r#"
        enum uint8 Kind { A = 1, B = 2 };
        struct S {
            uint8 tag;
            uint8 body if tag == Kind.B;
        };
        "#,
    );
    let (kind_id, _) = bundle.find("Kind").unwrap();
    let Entity::Struct(s) = bundle.find("S").unwrap().1 else {
        panic!("expected struct");
    };
    let body = s.fields().nth(1).unwrap();
    let datascript_ir::IrCondition::Runtime(IrExpr::Binary { right, .. }) = &body.condition
    else {
        panic!("expected runtime binary condition");
    };
    assert_eq!(
        **right,
        IrExpr::EnumItemRef {
            enum_id: kind_id,
            item: 1
        }
    );
}

#[test]
fn module_default_endianness_applies() {
    let bundle = bundle_for("little; struct S { uint32 v; };");
    let Entity::Struct(s) = &bundle.entities[0] else {
        panic!("expected struct");
    };
    let v = s.fields().next().unwrap();
    assert!(matches!(
        v.ty,
        IrType::UInt {
            bits: 32,
            endian: IrEndian::Little
        }
    ));
}

#[test]
fn type_alias_dissolves_into_primitive() {
    let bundle = bundle_for(
        r#"
        typedef DWORD = uint32;
        struct S {
            DWORD value;
        };
        "#,
    );
    // The alias produces no entity; the field is a plain primitive.
    assert_eq!(bundle.len(), 1);
    let Entity::Struct(s) = &bundle.entities[0] else {
        panic!("expected struct");
    };
    let value = s.fields().next().unwrap();
    assert!(matches!(value.ty, IrType::UInt { bits: 32, .. }));
}

#[test]
fn subtype_constraint_uses_self_ref() {
    let bundle = bundle_for("subtype uint16 Port : this > 1024;");
    let Entity::Subtype(port) = &bundle.entities[0] else {
        panic!("expected subtype entity");
    };
    let IrExpr::Binary { left, .. } = &port.constraint else {
        panic!("expected binary constraint");
    };
    assert_eq!(**left, IrExpr::SelfRef);
}

#[test]
fn labels_and_alignment_reach_the_reader() {
    let bundle = bundle_for(
        r#"
        struct WithDirectives {
            uint32 data_offset;
            align(8):
            uint64 aligned;
            data_offset:
            uint8 v;
        };
        "#,
    );
    let Entity::Struct(s) = &bundle.entities[0] else {
        panic!("expected struct");
    };
    assert!(matches!(s.members[1], IrMember::Align(IrExpr::UInt(8))));
    assert!(matches!(
        s.members[3],
        IrMember::Label(IrExpr::FieldRef(_))
    ));
}

#[test]
fn desugared_inline_union_is_referenced_by_index() {
    // S5 end to end: the synthesized union is a bundle entity and the field
    // points at it.
    let bundle = bundle_for(
        r#"
        struct Packet {
            uint8 tag;
            union {
                uint8 a;
                uint16 b;
            } payload;
        };
        "#,
    );
    assert_eq!(bundle.len(), 2);
    let (union_id, union_entity) = bundle.find("Packet_payload_union").unwrap();
    assert!(matches!(union_entity, Entity::Union(_)));
    let Entity::Struct(packet) = bundle.find("Packet").unwrap().1 else {
        panic!("expected struct");
    };
    let payload = packet.fields().nth(1).unwrap();
    let IrType::Entity { id, .. } = &payload.ty else {
        panic!("expected entity reference");
    };
    assert_eq!(*id, union_id);
}

#[test]
fn parameterized_reference_carries_arguments() {
    let bundle = bundle_for(
        r#"
        struct Record(uint16 n) {
            uint8 data[n];
        };
        struct Holder {
            Record(16) rec;
        };
        "#,
    );
    let Entity::Struct(holder) = bundle.find("Holder").unwrap().1 else {
        panic!("expected struct");
    };
    let rec = holder.fields().next().unwrap();
    let IrType::Entity { args, .. } = &rec.ty else {
        panic!("expected entity reference");
    };
    assert_eq!(args, &vec![IrExpr::UInt(16)]);

    let Entity::Struct(record) = bundle.find("Record").unwrap().1 else {
        panic!("expected struct");
    };
    let data = record.fields().next().unwrap();
    let IrType::Array { sizing, .. } = &data.ty else {
        panic!("expected array");
    };
    let datascript_ir::IrArraySizing::Fixed(size) = sizing else {
        panic!("expected fixed sizing");
    };
    // `n` is the first parameter of Record.
    assert_eq!(size, &IrExpr::ParamRef(0));
}
