//! Lower an analyzed module set to a bundle. Entities are emitted in
//! dependency order (imported modules before the main module, referenced
//! declarations before referencing ones), and every identifier in an
//! expression is rebound to a typed reference.

use crate::ids::EntityId;
use crate::model::*;
use datascript_analysis::ids::{DeclId, DeclKind, ModuleId};
use datascript_analysis::loader::ModuleSet;
use datascript_analysis::session::AnalysisSession;
use datascript_analysis::symbols::{decl_ref, DeclRef, Resolver};
use log::debug;
use std::collections::{HashMap, HashSet};
use syntax::declarations::{
    BodyItem, CaseSelector, ChoiceDiscriminator, CompareKind, FunctionDef, Statement,
};
use syntax::expressions::{Expr, Literal};
use syntax::types::{ArraySizing, BitFieldWidth, Endian, QualifiedName, StringEncoding, Type};

/// Names visible to an expression being lowered: the fields of the
/// enclosing composite and its ordered parameter list.
#[derive(Default, Clone)]
struct Scope {
    fields: Vec<String>,
    params: Vec<String>,
    in_subtype: bool,
}

impl Scope {
    fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p == name)
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }
}

struct Builder<'a> {
    set: &'a ModuleSet,
    session: &'a AnalysisSession,
    map: HashMap<DeclId, EntityId>,
    order: Vec<DeclId>,
    visiting: HashSet<DeclId>,
    /// Set while lowering the current entity when a reference failed.
    current_poisoned: bool,
    /// Guards against alias reference cycles while dissolving typedefs.
    alias_depth: u32,
}

const MAX_ALIAS_DEPTH: u32 = 64;

pub fn build_bundle(set: &ModuleSet, session: &AnalysisSession) -> Bundle {
    let mut builder = Builder {
        set,
        session,
        map: HashMap::new(),
        order: Vec::new(),
        visiting: HashSet::new(),
        current_poisoned: false,
        alias_depth: 0,
    };

    // Dependency-ordered id assignment: imported modules first, main last;
    // within each declaration a DFS over its type references.
    let mut roots: Vec<ModuleId> = set.iter().map(|(id, _)| id).collect();
    roots.rotate_left(1);
    for module_id in roots {
        for id in module_decl_ids(set, module_id) {
            builder.visit(id);
        }
    }

    let mut bundle = Bundle {
        name: bundle_name(set),
        entities: Vec::with_capacity(builder.order.len()),
    };
    let order = std::mem::take(&mut builder.order);
    for id in order {
        let entity = builder.lower_decl(id);
        bundle.entities.push(entity);
    }
    debug!(
        "built bundle '{}' with {} entities",
        bundle.name,
        bundle.entities.len()
    );
    bundle
}

fn bundle_name(set: &ModuleSet) -> String {
    if !set.main.package_name.is_empty() {
        return set.main.package_name.clone();
    }
    set.main
        .file_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "schema".to_string())
}

/// Declarations that become entities, in source order per kind. Type
/// aliases and named constraints lower structurally and emit nothing.
fn module_decl_ids(set: &ModuleSet, module_id: ModuleId) -> Vec<DeclId> {
    let module = &set.module(module_id).module;
    let mut ids = Vec::new();
    for i in 0..module.constants.len() {
        ids.push(DeclId::new(module_id, DeclKind::Constant, i));
    }
    for i in 0..module.enums.len() {
        ids.push(DeclId::new(module_id, DeclKind::Enum, i));
    }
    for i in 0..module.subtypes.len() {
        ids.push(DeclId::new(module_id, DeclKind::Subtype, i));
    }
    for i in 0..module.structs.len() {
        ids.push(DeclId::new(module_id, DeclKind::Struct, i));
    }
    for i in 0..module.unions.len() {
        ids.push(DeclId::new(module_id, DeclKind::Union, i));
    }
    for i in 0..module.choices.len() {
        ids.push(DeclId::new(module_id, DeclKind::Choice, i));
    }
    ids
}

impl<'a> Builder<'a> {
    fn resolver(&self) -> Resolver<'a> {
        Resolver::new(self.set, &self.session.symbols)
    }

    fn visit(&mut self, id: DeclId) {
        if self.map.contains_key(&id) || self.visiting.contains(&id) {
            return;
        }
        if id.kind == DeclKind::TypeAlias || id.kind == DeclKind::Constraint {
            // No entity of their own; chase what they point at.
            self.visiting.insert(id);
            match decl_ref(self.set, id) {
                DeclRef::TypeAlias(def) => self.visit_type_deps(&def.target, id.module),
                DeclRef::Constraint(def) => self.visit_expr_deps(&def.condition, id.module),
                _ => {}
            }
            self.visiting.remove(&id);
            return;
        }
        self.visiting.insert(id);
        self.visit_decl_deps(id);
        self.visiting.remove(&id);
        let entity_id = EntityId(self.order.len() as u32);
        self.map.insert(id, entity_id);
        self.order.push(id);
    }

    fn visit_decl_deps(&mut self, id: DeclId) {
        let module = id.module;
        match decl_ref(self.set, id) {
            DeclRef::Constant(def) => {
                self.visit_type_deps(&def.ty, module);
                self.visit_expr_deps(&def.value, module);
            }
            DeclRef::Subtype(def) => {
                self.visit_type_deps(&def.base, module);
                self.visit_expr_deps(&def.constraint, module);
            }
            DeclRef::Enum(def) => {
                self.visit_type_deps(&def.base, module);
                for item in &def.items {
                    if let Some(value) = &item.value {
                        self.visit_expr_deps(value, module);
                    }
                }
            }
            DeclRef::Struct(def) => {
                for p in &def.parameters {
                    self.visit_type_deps(&p.ty, module);
                }
                self.visit_item_deps(&def.body, module);
            }
            DeclRef::Union(def) => {
                for p in &def.parameters {
                    self.visit_type_deps(&p.ty, module);
                }
                for case in &def.cases {
                    self.visit_item_deps(&case.items, module);
                    if let Some(cond) = &case.condition {
                        self.visit_expr_deps(cond, module);
                    }
                }
            }
            DeclRef::Choice(def) => {
                for p in &def.parameters {
                    self.visit_type_deps(&p.ty, module);
                }
                match &def.discriminator {
                    ChoiceDiscriminator::External(e) => self.visit_expr_deps(e, module),
                    ChoiceDiscriminator::Inline(ty) => self.visit_type_deps(ty, module),
                }
                for case in &def.cases {
                    match &case.selector {
                        CaseSelector::Exact(exprs) => {
                            for e in exprs {
                                self.visit_expr_deps(e, module);
                            }
                        }
                        CaseSelector::Compare { bound, .. } => {
                            self.visit_expr_deps(bound, module)
                        }
                        CaseSelector::Default => {}
                    }
                    self.visit_item_deps(&case.items, module);
                }
            }
            DeclRef::TypeAlias(_) | DeclRef::Constraint(_) => {}
        }
    }

    fn visit_item_deps(&mut self, items: &[BodyItem], module: ModuleId) {
        for item in items {
            match item {
                BodyItem::Field(field) => {
                    self.visit_type_deps(&field.ty, module);
                    for expr in [&field.condition, &field.constraint, &field.default_value]
                        .into_iter()
                        .flatten()
                    {
                        self.visit_expr_deps(expr, module);
                    }
                }
                BodyItem::Label(l) => self.visit_expr_deps(&l.expr, module),
                BodyItem::Align(a) => self.visit_expr_deps(&a.expr, module),
                BodyItem::Function(f) => {
                    self.visit_type_deps(&f.return_type, module);
                    for p in &f.parameters {
                        self.visit_type_deps(&p.ty, module);
                    }
                    for stmt in &f.body {
                        match stmt {
                            Statement::Return { value, .. } => {
                                self.visit_expr_deps(value, module)
                            }
                            Statement::Expression { expr, .. } => {
                                self.visit_expr_deps(expr, module)
                            }
                        }
                    }
                }
                BodyItem::InlineUnion(_) | BodyItem::InlineStruct(_) => {}
            }
        }
    }

    fn visit_type_deps(&mut self, ty: &Type, module: ModuleId) {
        match ty {
            Type::Named(qname) => self.visit_qname(qname, module),
            Type::Instantiation(inst) => {
                self.visit_qname(&inst.base, module);
                for arg in &inst.arguments {
                    self.visit_expr_deps(arg, module);
                }
            }
            Type::Array(arr) => {
                self.visit_type_deps(&arr.element, module);
                match &arr.sizing {
                    ArraySizing::Fixed(e) => self.visit_expr_deps(e, module),
                    ArraySizing::Ranged { min, max } => {
                        if let Some(min) = min {
                            self.visit_expr_deps(min, module);
                        }
                        self.visit_expr_deps(max, module);
                    }
                    ArraySizing::Unsized => {}
                }
            }
            Type::BitField(bf) => {
                if let BitFieldWidth::Expr(e) = &bf.width {
                    self.visit_expr_deps(e, module);
                }
            }
            _ => {}
        }
    }

    fn visit_qname(&mut self, qname: &QualifiedName, module: ModuleId) {
        if let Some(target) = self.resolver().resolve_type(module, &qname.parts) {
            self.visit(target);
        }
    }

    fn visit_expr_deps(&mut self, expr: &Expr, module: ModuleId) {
        match expr {
            Expr::Identifier(id) => {
                if let Some(target) =
                    self.resolver().resolve_constant(module, &[id.name.clone()])
                {
                    self.visit(target);
                }
            }
            Expr::Unary(e) => self.visit_expr_deps(&e.operand, module),
            Expr::Binary(e) => {
                self.visit_expr_deps(&e.left, module);
                self.visit_expr_deps(&e.right, module);
            }
            Expr::Ternary(e) => {
                self.visit_expr_deps(&e.condition, module);
                self.visit_expr_deps(&e.true_expr, module);
                self.visit_expr_deps(&e.false_expr, module);
            }
            Expr::FieldAccess(e) => {
                // `Enum.ITEM` keeps the enum alive.
                if let Some(name) = e.object.as_identifier() {
                    if let Some(target) =
                        self.resolver().resolve_type(module, &[name.to_string()])
                    {
                        if target.kind == DeclKind::Enum {
                            self.visit(target);
                            return;
                        }
                    }
                }
                self.visit_expr_deps(&e.object, module);
            }
            Expr::ArrayIndex(e) => {
                self.visit_expr_deps(&e.array, module);
                self.visit_expr_deps(&e.index, module);
            }
            Expr::Call(e) => {
                self.visit_expr_deps(&e.callee, module);
                for arg in &e.arguments {
                    self.visit_expr_deps(arg, module);
                }
            }
            Expr::Literal(_) => {}
        }
    }

    // ------------------------------------------------------------------
    // Lowering
    // ------------------------------------------------------------------

    fn module_endian(&self, module: ModuleId) -> IrEndian {
        match self.set.module(module).module.default_endianness {
            Endian::Little => IrEndian::Little,
            _ => IrEndian::Big,
        }
    }

    fn lower_endian(&self, endian: Endian, module: ModuleId) -> IrEndian {
        match endian {
            Endian::Little => IrEndian::Little,
            Endian::Big => IrEndian::Big,
            Endian::Unspec => self.module_endian(module),
        }
    }

    fn lower_type(&mut self, ty: &Type, module: ModuleId, scope: &Scope) -> IrType {
        match ty {
            Type::Primitive(p) => {
                let endian = self.lower_endian(p.byte_order, module);
                if p.is_signed {
                    IrType::Int {
                        bits: p.bits,
                        endian,
                    }
                } else {
                    IrType::UInt {
                        bits: p.bits,
                        endian,
                    }
                }
            }
            Type::BitField(bf) => match &bf.width {
                BitFieldWidth::Fixed(w) => IrType::Bitfield(IrBitWidth::Const(*w)),
                BitFieldWidth::Expr(e) => IrType::Bitfield(IrBitWidth::Expr(Box::new(
                    self.lower_expr(e, module, scope),
                ))),
            },
            Type::Bool { .. } => IrType::Bool,
            Type::Str(s) => IrType::Str {
                encoding: match s.encoding {
                    StringEncoding::Utf8 => IrStrEncoding::Utf8,
                    StringEncoding::Utf16 => IrStrEncoding::Utf16,
                    StringEncoding::Utf32 => IrStrEncoding::Utf32,
                },
                endian: self.lower_endian(s.byte_order, module),
            },
            Type::Array(arr) => {
                let elem = Box::new(self.lower_type(&arr.element, module, scope));
                let sizing = match &arr.sizing {
                    ArraySizing::Fixed(e) => {
                        IrArraySizing::Fixed(self.lower_expr(e, module, scope))
                    }
                    ArraySizing::Ranged { min, max } => IrArraySizing::Ranged {
                        min: min.as_ref().map(|e| self.lower_expr(e, module, scope)),
                        max: self.lower_expr(max, module, scope),
                    },
                    ArraySizing::Unsized => IrArraySizing::Unsized,
                };
                IrType::Array { elem, sizing }
            }
            Type::Named(qname) => self.lower_named(qname, &[], module, scope),
            Type::Instantiation(inst) => {
                self.lower_named(&inst.base, &inst.arguments, module, scope)
            }
        }
    }

    fn lower_named(
        &mut self,
        qname: &QualifiedName,
        args: &[Expr],
        module: ModuleId,
        scope: &Scope,
    ) -> IrType {
        let Some(target) = self.resolver().resolve_type(module, &qname.parts) else {
            self.current_poisoned = true;
            return IrType::Unknown;
        };
        if target.kind == DeclKind::TypeAlias {
            let DeclRef::TypeAlias(def) = decl_ref(self.set, target) else {
                unreachable!("alias id resolves to alias decl");
            };
            if self.alias_depth >= MAX_ALIAS_DEPTH {
                self.current_poisoned = true;
                return IrType::Unknown;
            }
            // Aliases dissolve; the target's own module supplies defaults.
            self.alias_depth += 1;
            let lowered = self.lower_type(&def.target, target.module, scope);
            self.alias_depth -= 1;
            return lowered;
        }
        let lowered_args = args
            .iter()
            .map(|a| self.lower_expr(a, module, scope))
            .collect();
        match self.map.get(&target) {
            Some(&id) => IrType::Entity {
                id,
                args: lowered_args,
            },
            None => {
                self.current_poisoned = true;
                IrType::Unknown
            }
        }
    }

    fn lower_expr(&mut self, expr: &Expr, module: ModuleId, scope: &Scope) -> IrExpr {
        match expr {
            Expr::Literal(Literal::Int { value, .. }) => IrExpr::UInt(*value),
            Expr::Literal(Literal::Bool { value, .. }) => IrExpr::Bool(*value),
            Expr::Literal(Literal::Str { value, .. }) => IrExpr::Str(value.clone()),
            Expr::Identifier(id) => {
                if scope.in_subtype && id.name == "this" {
                    return IrExpr::SelfRef;
                }
                if scope.has_field(&id.name) {
                    return IrExpr::FieldRef(id.name.clone());
                }
                if let Some(index) = scope.param_index(&id.name) {
                    return IrExpr::ParamRef(index);
                }
                if let Some(target) =
                    self.resolver().resolve_constant(module, &[id.name.clone()])
                {
                    if let Some(&entity) = self.map.get(&target) {
                        return IrExpr::ConstRef(entity);
                    }
                }
                // Unresolvable; phase 2 reported it, the entity is marked.
                self.current_poisoned = true;
                IrExpr::FieldRef(id.name.clone())
            }
            Expr::Unary(e) => IrExpr::Unary {
                op: e.op,
                operand: Box::new(self.lower_expr(&e.operand, module, scope)),
            },
            Expr::Binary(e) => IrExpr::Binary {
                op: e.op,
                left: Box::new(self.lower_expr(&e.left, module, scope)),
                right: Box::new(self.lower_expr(&e.right, module, scope)),
            },
            Expr::Ternary(e) => IrExpr::Ternary {
                condition: Box::new(self.lower_expr(&e.condition, module, scope)),
                true_expr: Box::new(self.lower_expr(&e.true_expr, module, scope)),
                false_expr: Box::new(self.lower_expr(&e.false_expr, module, scope)),
            },
            Expr::FieldAccess(e) => {
                // `Enum.ITEM` becomes a bound enum item reference.
                if let Some(name) = e.object.as_identifier() {
                    if !scope.has_field(name) {
                        if let Some(target) =
                            self.resolver().resolve_type(module, &[name.to_string()])
                        {
                            if target.kind == DeclKind::Enum {
                                if let DeclRef::Enum(def) = decl_ref(self.set, target) {
                                    if let Some(item) =
                                        def.items.iter().position(|i| i.name == e.field)
                                    {
                                        if let Some(&enum_id) = self.map.get(&target) {
                                            return IrExpr::EnumItemRef { enum_id, item };
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                IrExpr::Member {
                    base: Box::new(self.lower_expr(&e.object, module, scope)),
                    field: e.field.clone(),
                }
            }
            Expr::ArrayIndex(e) => IrExpr::Index {
                base: Box::new(self.lower_expr(&e.array, module, scope)),
                index: Box::new(self.lower_expr(&e.index, module, scope)),
            },
            Expr::Call(e) => IrExpr::Call {
                callee: Box::new(self.lower_expr(&e.callee, module, scope)),
                args: e
                    .arguments
                    .iter()
                    .map(|a| self.lower_expr(a, module, scope))
                    .collect(),
            },
        }
    }

    fn lower_params(
        &mut self,
        params: &[syntax::declarations::Param],
        module: ModuleId,
        scope: &Scope,
    ) -> Vec<IrParam> {
        params
            .iter()
            .map(|p| IrParam {
                name: p.name.clone(),
                ty: self.lower_type(&p.ty, module, scope),
            })
            .collect()
    }

    fn lower_field(
        &mut self,
        field: &syntax::declarations::FieldDef,
        offset: Option<u64>,
        module: ModuleId,
        scope: &Scope,
    ) -> IrField {
        IrField {
            name: field.name.clone(),
            ty: self.lower_type(&field.ty, module, scope),
            offset,
            condition: match &field.condition {
                Some(cond) => IrCondition::Runtime(self.lower_expr(cond, module, scope)),
                None => IrCondition::Always,
            },
            constraint: field
                .constraint
                .as_ref()
                .map(|c| self.lower_expr(c, module, scope)),
            default_value: field
                .default_value
                .as_ref()
                .map(|d| self.lower_expr(d, module, scope)),
            doc: field.docstring.clone(),
        }
    }

    fn lower_function(
        &mut self,
        func: &FunctionDef,
        module: ModuleId,
        scope: &Scope,
    ) -> IrFunction {
        let mut inner = scope.clone();
        for p in &func.parameters {
            inner.params.push(p.name.clone());
        }
        IrFunction {
            name: func.name.clone(),
            return_type: self.lower_type(&func.return_type, module, scope),
            params: self.lower_params(&func.parameters, module, scope),
            body: func
                .body
                .iter()
                .map(|stmt| match stmt {
                    Statement::Return { value, .. } => {
                        IrStatement::Return(self.lower_expr(value, module, &inner))
                    }
                    Statement::Expression { expr, .. } => {
                        IrStatement::Expression(self.lower_expr(expr, module, &inner))
                    }
                })
                .collect(),
            doc: func.docstring.clone(),
        }
    }

    fn lower_members(
        &mut self,
        items: &[BodyItem],
        offsets: Option<&HashMap<usize, u64>>,
        module: ModuleId,
        scope: &Scope,
    ) -> Vec<IrMember> {
        let mut members = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match item {
                BodyItem::Field(field) => {
                    let offset = offsets.and_then(|o| o.get(&index).copied());
                    members.push(IrMember::Field(
                        self.lower_field(field, offset, module, scope),
                    ));
                }
                BodyItem::Label(l) => {
                    members.push(IrMember::Label(self.lower_expr(&l.expr, module, scope)))
                }
                BodyItem::Align(a) => {
                    members.push(IrMember::Align(self.lower_expr(&a.expr, module, scope)))
                }
                BodyItem::Function(f) => {
                    members.push(IrMember::Function(self.lower_function(f, module, scope)))
                }
                BodyItem::InlineUnion(_) | BodyItem::InlineStruct(_) => {}
            }
        }
        members
    }

    fn lower_decl(&mut self, id: DeclId) -> Entity {
        self.current_poisoned = self.session.is_poisoned(id);
        let module = id.module;
        match decl_ref(self.set, id) {
            DeclRef::Constant(def) => {
                let ty = self.lower_type(&def.ty, module, &Scope::default());
                let value = self.session.constant_values.get(&id).copied();
                Entity::Const(ConstEntity {
                    name: def.name.clone(),
                    ty,
                    value,
                    poisoned: self.current_poisoned,
                    doc: def.docstring.clone(),
                    loc: def.pos.clone(),
                })
            }
            DeclRef::Enum(def) => {
                let base = self.lower_type(&def.base, module, &Scope::default());
                let items = def
                    .items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| IrEnumItem {
                        name: item.name.clone(),
                        value: self
                            .session
                            .enum_item_values
                            .get(&(id, i))
                            .copied()
                            .unwrap_or(0),
                        doc: item.docstring.clone(),
                    })
                    .collect();
                Entity::Enum(EnumEntity {
                    name: def.name.clone(),
                    base,
                    items,
                    is_bitmask: def.is_bitmask,
                    doc: def.docstring.clone(),
                    loc: def.pos.clone(),
                })
            }
            DeclRef::Subtype(def) => {
                let scope = Scope {
                    in_subtype: true,
                    ..Default::default()
                };
                Entity::Subtype(SubtypeEntity {
                    name: def.name.clone(),
                    base: self.lower_type(&def.base, module, &scope),
                    constraint: self.lower_expr(&def.constraint, module, &scope),
                    doc: def.docstring.clone(),
                    loc: def.pos.clone(),
                })
            }
            DeclRef::Struct(def) => {
                let scope = Scope {
                    fields: def.fields().map(|f| f.name.clone()).collect(),
                    params: def.parameters.iter().map(|p| p.name.clone()).collect(),
                    in_subtype: false,
                };
                let layout = self.session.layouts.get(&id).cloned().unwrap_or_default();
                let params = self.lower_params(&def.parameters, module, &scope);
                let members = self.lower_members(
                    &def.body,
                    Some(&layout.field_offsets),
                    module,
                    &scope,
                );
                Entity::Struct(StructEntity {
                    name: def.name.clone(),
                    params,
                    members,
                    size: layout.size,
                    alignment: layout.alignment.max(1),
                    poisoned: self.current_poisoned,
                    doc: def.docstring.clone(),
                    loc: def.pos.clone(),
                })
            }
            DeclRef::Union(def) => {
                let mut fields = Vec::new();
                for case in &def.cases {
                    for item in &case.items {
                        if let BodyItem::Field(f) = item {
                            fields.push(f.name.clone());
                        }
                    }
                }
                let scope = Scope {
                    fields,
                    params: def.parameters.iter().map(|p| p.name.clone()).collect(),
                    in_subtype: false,
                };
                let layout = self.session.layouts.get(&id).cloned().unwrap_or_default();
                let params = self.lower_params(&def.parameters, module, &scope);
                let cases = def
                    .cases
                    .iter()
                    .map(|case| IrUnionCase {
                        name: case.case_name.clone(),
                        members: self.lower_members(&case.items, None, module, &scope),
                        condition: case
                            .condition
                            .as_ref()
                            .map(|c| self.lower_expr(c, module, &scope)),
                        doc: case.docstring.clone(),
                    })
                    .collect();
                Entity::Union(UnionEntity {
                    name: def.name.clone(),
                    params,
                    cases,
                    size: layout.size,
                    alignment: layout.alignment.max(1),
                    poisoned: self.current_poisoned,
                    doc: def.docstring.clone(),
                    loc: def.pos.clone(),
                })
            }
            DeclRef::Choice(def) => {
                let mut fields = Vec::new();
                for case in &def.cases {
                    for item in &case.items {
                        if let BodyItem::Field(f) = item {
                            fields.push(f.name.clone());
                        }
                    }
                }
                let scope = Scope {
                    fields,
                    params: def.parameters.iter().map(|p| p.name.clone()).collect(),
                    in_subtype: false,
                };
                let params = self.lower_params(&def.parameters, module, &scope);
                let discriminator = match &def.discriminator {
                    ChoiceDiscriminator::External(e) => {
                        IrDiscriminator::External(self.lower_expr(e, module, &scope))
                    }
                    ChoiceDiscriminator::Inline(ty) => {
                        IrDiscriminator::Inline(self.lower_type(ty, module, &scope))
                    }
                };
                // Source order, default case last.
                let mut cases = Vec::new();
                let mut default_case = None;
                for case in &def.cases {
                    let selector = match &case.selector {
                        CaseSelector::Exact(exprs) => IrSelector::Exact(
                            exprs
                                .iter()
                                .map(|e| self.lower_expr(e, module, &scope))
                                .collect(),
                        ),
                        CaseSelector::Compare { kind, bound } => {
                            let bound = self.lower_expr(bound, module, &scope);
                            match kind {
                                CompareKind::Ge => IrSelector::Ge(bound),
                                CompareKind::Gt => IrSelector::Gt(bound),
                                CompareKind::Le => IrSelector::Le(bound),
                                CompareKind::Lt => IrSelector::Lt(bound),
                                CompareKind::Ne => IrSelector::Ne(bound),
                            }
                        }
                        CaseSelector::Default => IrSelector::Default,
                    };
                    let lowered = IrChoiceCase {
                        selector,
                        field_name: case.field_name.clone(),
                        members: self.lower_members(&case.items, None, module, &scope),
                        doc: case.docstring.clone(),
                    };
                    if case.selector.is_default() {
                        default_case = Some(lowered);
                    } else {
                        cases.push(lowered);
                    }
                }
                cases.extend(default_case);
                Entity::Choice(ChoiceEntity {
                    name: def.name.clone(),
                    params,
                    discriminator,
                    cases,
                    poisoned: self.current_poisoned,
                    doc: def.docstring.clone(),
                    loc: def.pos.clone(),
                })
            }
            DeclRef::TypeAlias(_) | DeclRef::Constraint(_) => {
                unreachable!("aliases and constraints are not entities")
            }
        }
    }
}
