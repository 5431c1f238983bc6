//! Phase 0: lift inline unions and inline structs out of composite bodies
//! into synthesized top-level definitions, so that after this pass every
//! field's declared type is a primitive, a qualified name or a type
//! instantiation.

use crate::loader::ModuleSet;
use std::collections::HashSet;
use syntax::declarations::{
    BodyItem, FieldDef, Module, Param, StructDef, UnionDef,
};
use syntax::expressions::{Expr, Identifier};
use syntax::types::{QualifiedName, Type, TypeInstantiation};
use syntax::SourcePos;

struct Desugarer {
    used_names: HashSet<String>,
    new_structs: Vec<StructDef>,
    new_unions: Vec<UnionDef>,
}

impl Desugarer {
    fn new(module: &Module) -> Self {
        let mut used_names = HashSet::new();
        for c in &module.constants {
            used_names.insert(c.name.clone());
        }
        for s in &module.subtypes {
            used_names.insert(s.name.clone());
        }
        for c in &module.constraints {
            used_names.insert(c.name.clone());
        }
        for t in &module.type_aliases {
            used_names.insert(t.name.clone());
        }
        for e in &module.enums {
            used_names.insert(e.name.clone());
        }
        for s in &module.structs {
            used_names.insert(s.name.clone());
        }
        for u in &module.unions {
            used_names.insert(u.name.clone());
        }
        for c in &module.choices {
            used_names.insert(c.name.clone());
        }
        Desugarer {
            used_names,
            new_structs: Vec::new(),
            new_unions: Vec::new(),
        }
    }

    /// Stable synthesized name: parent name + field name + kind suffix,
    /// with a numeric disambiguator only on collision.
    fn synthesize_name(&mut self, parent: &str, field: &str, suffix: &str) -> String {
        let base = format!("{}_{}_{}", parent, field, suffix);
        let mut candidate = base.clone();
        let mut counter = 1u32;
        while self.used_names.contains(&candidate) {
            candidate = format!("{}{}", base, counter);
            counter += 1;
        }
        self.used_names.insert(candidate.clone());
        candidate
    }

    /// The field type referencing a synthesized definition. When the parent
    /// is parameterized the reference forwards every parameter by name.
    fn reference_type(&self, name: &str, params: &[Param], pos: &SourcePos) -> Type {
        let qname = QualifiedName {
            pos: pos.clone(),
            parts: vec![name.to_string()],
        };
        if params.is_empty() {
            Type::Named(qname)
        } else {
            Type::Instantiation(TypeInstantiation {
                pos: pos.clone(),
                base: qname,
                arguments: params
                    .iter()
                    .map(|p| {
                        Expr::Identifier(Identifier {
                            pos: pos.clone(),
                            name: p.name.clone(),
                        })
                    })
                    .collect(),
            })
        }
    }

    fn desugar_items(&mut self, items: &mut Vec<BodyItem>, parent: &str, params: &[Param]) {
        for item in items.iter_mut() {
            match item {
                BodyItem::InlineUnion(inline) => {
                    let mut cases = std::mem::take(&mut inline.cases);
                    for case in &mut cases {
                        self.desugar_items(&mut case.items, parent, params);
                    }
                    let name = self.synthesize_name(parent, &inline.field_name, "union");
                    self.new_unions.push(UnionDef {
                        pos: inline.pos.clone(),
                        name: name.clone(),
                        parameters: params.to_vec(),
                        cases,
                        docstring: inline.docstring.clone(),
                    });
                    *item = BodyItem::Field(FieldDef {
                        pos: inline.pos.clone(),
                        ty: self.reference_type(&name, params, &inline.pos),
                        name: inline.field_name.clone(),
                        condition: inline.condition.take(),
                        constraint: inline.constraint.take(),
                        default_value: None,
                        docstring: inline.docstring.take(),
                    });
                }
                BodyItem::InlineStruct(inline) => {
                    let mut body = std::mem::take(&mut inline.body);
                    self.desugar_items(&mut body, parent, params);
                    let name = self.synthesize_name(parent, &inline.field_name, "struct");
                    self.new_structs.push(StructDef {
                        pos: inline.pos.clone(),
                        name: name.clone(),
                        parameters: params.to_vec(),
                        body,
                        docstring: inline.docstring.clone(),
                    });
                    *item = BodyItem::Field(FieldDef {
                        pos: inline.pos.clone(),
                        ty: self.reference_type(&name, params, &inline.pos),
                        name: inline.field_name.clone(),
                        condition: inline.condition.take(),
                        constraint: inline.constraint.take(),
                        default_value: None,
                        docstring: inline.docstring.take(),
                    });
                }
                _ => {}
            }
        }
    }
}

pub fn desugar_module(module: &mut Module) {
    let mut desugarer = Desugarer::new(module);

    let mut structs = std::mem::take(&mut module.structs);
    for s in &mut structs {
        let params = s.parameters.clone();
        desugarer.desugar_items(&mut s.body, &s.name.clone(), &params);
    }
    let mut unions = std::mem::take(&mut module.unions);
    for u in &mut unions {
        let params = u.parameters.clone();
        let name = u.name.clone();
        for case in &mut u.cases {
            desugarer.desugar_items(&mut case.items, &name, &params);
        }
    }
    let mut choices = std::mem::take(&mut module.choices);
    for c in &mut choices {
        let params = c.parameters.clone();
        let name = c.name.clone();
        for case in &mut c.cases {
            desugarer.desugar_items(&mut case.items, &name, &params);
        }
    }

    module.structs = structs;
    module.unions = unions;
    module.choices = choices;
    module.structs.extend(desugarer.new_structs);
    module.unions.extend(desugarer.new_unions);
}

/// Run the rewrite over every module in the set.
pub fn desugar_module_set(set: &mut ModuleSet) {
    desugar_module(&mut set.main.module);
    for loaded in &mut set.imported {
        desugar_module(&mut loaded.module);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datascript_parser::Parser;

    fn parse(src: &str) -> Module {
        Parser::new().parse(src, "test.ds").expect("parse ok")
    }

    #[test]
    fn inline_union_is_lifted() {
        let mut module = parse(
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
        desugar_module(&mut module);

        assert_eq!(module.unions.len(), 1);
        assert_eq!(module.unions[0].name, "Packet_payload_union");
        assert_eq!(module.unions[0].cases.len(), 2);

        let field = module.structs[0].body[1]
            .as_field()
            .expect("desugared field");
        assert_eq!(field.name, "payload");
        let Type::Named(q) = &field.ty else {
            panic!("expected qualified-name type, got {:?}", field.ty);
        };
        assert_eq!(q.parts, vec!["Packet_payload_union"]);
    }

    #[test]
    fn inline_struct_inherits_parameters() {
        let mut module = parse(
            r#"
            struct Record(uint16 n) {
                {
                    uint8 data[n];
                } block;
            };
            "#,
        );
        desugar_module(&mut module);

        assert_eq!(module.structs.len(), 2);
        let synthesized = &module.structs[1];
        assert_eq!(synthesized.name, "Record_block_struct");
        assert_eq!(synthesized.parameters.len(), 1);

        let field = module.structs[0].body[0].as_field().unwrap();
        let Type::Instantiation(inst) = &field.ty else {
            panic!("expected forwarding instantiation, got {:?}", field.ty);
        };
        assert_eq!(inst.base.parts, vec!["Record_block_struct"]);
        assert_eq!(inst.arguments.len(), 1);
    }

    #[test]
    fn no_inline_forms_survive() {
        let mut module = parse(
            r#"
            struct Outer {
                union {
                    { uint8 x; } inner;
                    uint16 y;
                } data;
            };
            "#,
        );
        desugar_module(&mut module);

        fn assert_no_inline(items: &[BodyItem]) {
            for item in items {
                assert!(
                    !matches!(item, BodyItem::InlineUnion(_) | BodyItem::InlineStruct(_)),
                    "inline item survived desugaring"
                );
            }
        }
        for s in &module.structs {
            assert_no_inline(&s.body);
        }
        for u in &module.unions {
            for case in &u.cases {
                assert_no_inline(&case.items);
            }
        }
    }
}
