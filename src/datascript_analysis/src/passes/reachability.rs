//! Phase 7: mark declarations reachable from the main module's exports and
//! warn about unreferenced imports and unused constants and constraints in
//! imported modules.

use crate::diagnostics::code::DiagnosticCode;
use crate::diagnostics::diagnostic::Diagnostic;
use crate::ids::{DeclId, DeclKind, ModuleId};
use crate::loader::ModuleSet;
use crate::passes::AnalyzerPass;
use crate::session::AnalysisSession;
use crate::symbols::{decl_ref, DeclRef, Resolver, SymbolTable};
use std::collections::HashSet;
use syntax::declarations::{BodyItem, ChoiceDiscriminator};
use syntax::expressions::Expr;
use syntax::types::{ArraySizing, BitFieldWidth, Type};

struct Marker<'a> {
    set: &'a ModuleSet,
    symbols: &'a SymbolTable,
    reachable: HashSet<DeclId>,
}

impl<'a> Marker<'a> {
    fn mark(&mut self, id: DeclId) {
        if !self.reachable.insert(id) {
            return;
        }
        match decl_ref(self.set, id) {
            DeclRef::Constant(def) => {
                self.visit_type(&def.ty, id.module);
                self.visit_expr(&def.value, id.module);
            }
            DeclRef::Subtype(def) => {
                self.visit_type(&def.base, id.module);
                self.visit_expr(&def.constraint, id.module);
            }
            DeclRef::Constraint(def) => {
                for p in &def.params {
                    self.visit_type(&p.ty, id.module);
                }
                self.visit_expr(&def.condition, id.module);
            }
            DeclRef::TypeAlias(def) => self.visit_type(&def.target, id.module),
            DeclRef::Enum(def) => {
                self.visit_type(&def.base, id.module);
                for item in &def.items {
                    if let Some(value) = &item.value {
                        self.visit_expr(value, id.module);
                    }
                }
            }
            DeclRef::Struct(def) => {
                for p in &def.parameters {
                    self.visit_type(&p.ty, id.module);
                }
                self.visit_items(&def.body, id.module);
            }
            DeclRef::Union(def) => {
                for p in &def.parameters {
                    self.visit_type(&p.ty, id.module);
                }
                for case in &def.cases {
                    self.visit_items(&case.items, id.module);
                    if let Some(cond) = &case.condition {
                        self.visit_expr(cond, id.module);
                    }
                }
            }
            DeclRef::Choice(def) => {
                for p in &def.parameters {
                    self.visit_type(&p.ty, id.module);
                }
                match &def.discriminator {
                    ChoiceDiscriminator::External(selector) => {
                        self.visit_expr(selector, id.module)
                    }
                    ChoiceDiscriminator::Inline(ty) => self.visit_type(ty, id.module),
                }
                for case in &def.cases {
                    if let syntax::declarations::CaseSelector::Exact(exprs) = &case.selector {
                        for expr in exprs {
                            self.visit_expr(expr, id.module);
                        }
                    }
                    if let syntax::declarations::CaseSelector::Compare { bound, .. } =
                        &case.selector
                    {
                        self.visit_expr(bound, id.module);
                    }
                    self.visit_items(&case.items, id.module);
                }
            }
        }
    }

    fn visit_items(&mut self, items: &[BodyItem], module: ModuleId) {
        for item in items {
            match item {
                BodyItem::Field(field) => {
                    self.visit_type(&field.ty, module);
                    for expr in [&field.condition, &field.constraint, &field.default_value]
                        .into_iter()
                        .flatten()
                    {
                        self.visit_expr(expr, module);
                    }
                }
                BodyItem::Label(label) => self.visit_expr(&label.expr, module),
                BodyItem::Align(align) => self.visit_expr(&align.expr, module),
                BodyItem::Function(func) => {
                    self.visit_type(&func.return_type, module);
                    for p in &func.parameters {
                        self.visit_type(&p.ty, module);
                    }
                    for stmt in &func.body {
                        match stmt {
                            syntax::declarations::Statement::Return { value, .. } => {
                                self.visit_expr(value, module)
                            }
                            syntax::declarations::Statement::Expression { expr, .. } => {
                                self.visit_expr(expr, module)
                            }
                        }
                    }
                }
                BodyItem::InlineUnion(_) | BodyItem::InlineStruct(_) => {}
            }
        }
    }

    fn visit_type(&mut self, ty: &Type, module: ModuleId) {
        match ty {
            Type::Named(qname) => {
                let resolver = Resolver::new(self.set, self.symbols);
                if let Some(target) = resolver.resolve_type(module, &qname.parts) {
                    self.mark(target);
                }
            }
            Type::Instantiation(inst) => {
                let resolver = Resolver::new(self.set, self.symbols);
                if let Some(target) = resolver.resolve_type(module, &inst.base.parts) {
                    self.mark(target);
                }
                for arg in &inst.arguments {
                    self.visit_expr(arg, module);
                }
            }
            Type::Array(arr) => {
                self.visit_type(&arr.element, module);
                match &arr.sizing {
                    ArraySizing::Fixed(size) => self.visit_expr(size, module),
                    ArraySizing::Ranged { min, max } => {
                        if let Some(min) = min {
                            self.visit_expr(min, module);
                        }
                        self.visit_expr(max, module);
                    }
                    ArraySizing::Unsized => {}
                }
            }
            Type::BitField(bf) => {
                if let BitFieldWidth::Expr(expr) = &bf.width {
                    self.visit_expr(expr, module);
                }
            }
            _ => {}
        }
    }

    fn visit_expr(&mut self, expr: &Expr, module: ModuleId) {
        match expr {
            Expr::Identifier(id) => {
                let resolver = Resolver::new(self.set, self.symbols);
                if let Some(target) = resolver.resolve_constant(module, &[id.name.clone()]) {
                    self.mark(target);
                }
            }
            Expr::Unary(e) => self.visit_expr(&e.operand, module),
            Expr::Binary(e) => {
                self.visit_expr(&e.left, module);
                self.visit_expr(&e.right, module);
            }
            Expr::Ternary(e) => {
                self.visit_expr(&e.condition, module);
                self.visit_expr(&e.true_expr, module);
                self.visit_expr(&e.false_expr, module);
            }
            Expr::FieldAccess(e) => self.visit_expr(&e.object, module),
            Expr::ArrayIndex(e) => {
                self.visit_expr(&e.array, module);
                self.visit_expr(&e.index, module);
            }
            Expr::Call(e) => {
                // A call to a named constraint keeps that constraint alive.
                if let Some(name) = e.callee.as_identifier() {
                    if let Some(target) = self.symbols.find_constraint(module, name) {
                        self.mark(target);
                    }
                } else {
                    self.visit_expr(&e.callee, module);
                }
                for arg in &e.arguments {
                    self.visit_expr(arg, module);
                }
            }
            Expr::Literal(_) => {}
        }
    }
}

pub struct Reachability;

impl AnalyzerPass for Reachability {
    fn id(&self) -> &'static str {
        "reachability"
    }

    fn run(&self, set: &ModuleSet, session: &mut AnalysisSession) {
        let symbols = std::mem::take(&mut session.symbols);

        let mut marker = Marker {
            set,
            symbols: &symbols,
            reachable: HashSet::new(),
        };

        // Every top-level definition in the main module is a root.
        let main = &set.main.module;
        for (kind, count) in [
            (DeclKind::Constant, main.constants.len()),
            (DeclKind::Subtype, main.subtypes.len()),
            (DeclKind::Constraint, main.constraints.len()),
            (DeclKind::TypeAlias, main.type_aliases.len()),
            (DeclKind::Enum, main.enums.len()),
            (DeclKind::Struct, main.structs.len()),
            (DeclKind::Union, main.unions.len()),
            (DeclKind::Choice, main.choices.len()),
        ] {
            for i in 0..count {
                marker.mark(DeclId::new(ModuleId::MAIN, kind, i));
            }
        }

        let reachable = marker.reachable;
        let mut diags = Vec::new();

        // Unused constants and constraints in imported modules.
        for (module_id, loaded) in set.iter() {
            if module_id.is_main() {
                continue;
            }
            for (i, c) in loaded.module.constants.iter().enumerate() {
                if !reachable.contains(&DeclId::new(module_id, DeclKind::Constant, i)) {
                    diags.push(Diagnostic::warning(
                        DiagnosticCode::UnusedConstant,
                        format!("constant '{}' is never used", c.name),
                        c.pos.clone(),
                    ));
                }
            }
            for (i, c) in loaded.module.constraints.iter().enumerate() {
                if !reachable.contains(&DeclId::new(module_id, DeclKind::Constraint, i)) {
                    diags.push(Diagnostic::warning(
                        DiagnosticCode::UnusedConstraint,
                        format!("constraint '{}' is never used", c.name),
                        c.pos.clone(),
                    ));
                }
            }
        }

        // Imports from which nothing is reachable.
        let mut reachable_modules: HashSet<ModuleId> = HashSet::new();
        for id in &reachable {
            reachable_modules.insert(id.module);
        }
        for (_, loaded) in set.iter() {
            for import in &loaded.module.imports {
                let dotted = import.dotted();
                let targets: Vec<ModuleId> = if import.is_wildcard {
                    set.iter()
                        .filter(|(id, m)| !id.is_main() && m.package_name == dotted)
                        .map(|(id, _)| id)
                        .collect()
                } else {
                    set.package_module(&dotted).into_iter().collect()
                };
                if !targets.is_empty()
                    && !targets.iter().any(|t| reachable_modules.contains(t))
                {
                    diags.push(Diagnostic::warning(
                        DiagnosticCode::UnusedImport,
                        format!("import '{}' is never used", dotted),
                        import.pos.clone(),
                    ));
                }
            }
        }

        session.symbols = symbols;
        session.reachable = reachable;
        for d in diags {
            session.diagnostics.add(d);
        }
    }
}
