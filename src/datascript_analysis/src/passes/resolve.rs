//! Phase 2: resolve every qualified-name occurrence in type position to a
//! declaration, check parameterized-type arity, and resolve identifier
//! references inside constant value expressions.

use crate::diagnostics::code::DiagnosticCode;
use crate::diagnostics::diagnostic::Diagnostic;
use crate::ids::{DeclId, DeclKind, ModuleId};
use crate::loader::ModuleSet;
use crate::passes::AnalyzerPass;
use crate::session::AnalysisSession;
use crate::symbols::{decl_ref, Resolver};
use syntax::declarations::{BodyItem, ChoiceDiscriminator, Module};
use syntax::expressions::Expr;
use syntax::types::{QualifiedName, Type};

pub struct NameResolution;

impl AnalyzerPass for NameResolution {
    fn id(&self) -> &'static str {
        "resolve"
    }

    fn run(&self, set: &ModuleSet, session: &mut AnalysisSession) {
        for (module_id, loaded) in set.iter() {
            resolve_module(module_id, &loaded.module, set, session);
        }
    }
}

fn resolve_module(
    module_id: ModuleId,
    module: &Module,
    set: &ModuleSet,
    session: &mut AnalysisSession,
) {
    for (i, c) in module.constants.iter().enumerate() {
        let owner = DeclId::new(module_id, DeclKind::Constant, i);
        resolve_type(&c.ty, module_id, owner, set, session);
        resolve_constant_expr(&c.value, module_id, set, session);
    }
    for (i, s) in module.subtypes.iter().enumerate() {
        let owner = DeclId::new(module_id, DeclKind::Subtype, i);
        resolve_type(&s.base, module_id, owner, set, session);
    }
    for (i, a) in module.type_aliases.iter().enumerate() {
        let owner = DeclId::new(module_id, DeclKind::TypeAlias, i);
        resolve_type(&a.target, module_id, owner, set, session);
    }
    for (i, e) in module.enums.iter().enumerate() {
        let owner = DeclId::new(module_id, DeclKind::Enum, i);
        resolve_type(&e.base, module_id, owner, set, session);
        // Item values are compile-time constant expressions.
        for item in &e.items {
            if let Some(value) = &item.value {
                resolve_constant_expr(value, module_id, set, session);
            }
        }
    }
    for (i, s) in module.structs.iter().enumerate() {
        let owner = DeclId::new(module_id, DeclKind::Struct, i);
        for p in &s.parameters {
            resolve_type(&p.ty, module_id, owner, set, session);
        }
        resolve_body(&s.body, module_id, owner, set, session);
    }
    for (i, u) in module.unions.iter().enumerate() {
        let owner = DeclId::new(module_id, DeclKind::Union, i);
        for p in &u.parameters {
            resolve_type(&p.ty, module_id, owner, set, session);
        }
        for case in &u.cases {
            resolve_body(&case.items, module_id, owner, set, session);
        }
    }
    for (i, c) in module.choices.iter().enumerate() {
        let owner = DeclId::new(module_id, DeclKind::Choice, i);
        for p in &c.parameters {
            resolve_type(&p.ty, module_id, owner, set, session);
        }
        if let ChoiceDiscriminator::Inline(ty) = &c.discriminator {
            resolve_type(ty, module_id, owner, set, session);
        }
        for case in &c.cases {
            resolve_body(&case.items, module_id, owner, set, session);
        }
    }
    for (i, c) in module.constraints.iter().enumerate() {
        let owner = DeclId::new(module_id, DeclKind::Constraint, i);
        for p in &c.params {
            resolve_type(&p.ty, module_id, owner, set, session);
        }
    }
}

fn resolve_body(
    items: &[BodyItem],
    module_id: ModuleId,
    owner: DeclId,
    set: &ModuleSet,
    session: &mut AnalysisSession,
) {
    for item in items {
        match item {
            BodyItem::Field(field) => {
                resolve_type(&field.ty, module_id, owner, set, session);
            }
            BodyItem::Function(func) => {
                resolve_type(&func.return_type, module_id, owner, set, session);
                for p in &func.parameters {
                    resolve_type(&p.ty, module_id, owner, set, session);
                }
            }
            _ => {}
        }
    }
}

/// Resolve one qualified name in type position. Unresolvable names poison
/// the owning declaration so downstream phases skip it.
fn resolve_name(
    qname: &QualifiedName,
    arg_count: Option<usize>,
    module_id: ModuleId,
    owner: DeclId,
    set: &ModuleSet,
    session: &mut AnalysisSession,
) {
    if !qname.is_simple() {
        let package = qname.parts[..qname.parts.len() - 1].join(".");
        if set.package_module(&package).is_none() {
            session.diagnostics.add(Diagnostic::error(
                DiagnosticCode::UndefinedPackage,
                format!("package '{}' not found in imports", package),
                qname.pos.clone(),
            ));
            session.poison(owner);
            return;
        }
    }
    let resolved = Resolver::new(set, &session.symbols).resolve_type(module_id, &qname.parts);
    let Some(target) = resolved else {
        session.diagnostics.add(Diagnostic::error(
            DiagnosticCode::UndefinedType,
            format!("type '{}' not found", qname.dotted()),
            qname.pos.clone(),
        ));
        session.poison(owner);
        return;
    };

    let declared = decl_ref(set, target).param_count();
    let supplied = arg_count.unwrap_or(0);
    if declared != supplied {
        session.diagnostics.add(Diagnostic::error(
            DiagnosticCode::ParamCountMismatch,
            format!(
                "type '{}' expects {} parameter(s) but got {}",
                qname.dotted(),
                declared,
                supplied
            ),
            qname.pos.clone(),
        ));
        session.poison(owner);
    }
}

fn resolve_type(
    ty: &Type,
    module_id: ModuleId,
    owner: DeclId,
    set: &ModuleSet,
    session: &mut AnalysisSession,
) {
    match ty {
        Type::Named(qname) => {
            resolve_name(qname, None, module_id, owner, set, session);
        }
        Type::Instantiation(inst) => {
            resolve_name(
                &inst.base,
                Some(inst.arguments.len()),
                module_id,
                owner,
                set,
                session,
            );
        }
        // Size expressions inside array types reference fields and
        // constants; the type and constant phases check those.
        Type::Array(arr) => {
            resolve_type(&arr.element, module_id, owner, set, session);
        }
        _ => {}
    }
}

/// Identifiers inside a constant's value expression can only reference
/// other constants; anything else is undefined here.
fn resolve_constant_expr(
    expr: &Expr,
    module_id: ModuleId,
    set: &ModuleSet,
    session: &mut AnalysisSession,
) {
    match expr {
        Expr::Identifier(id) => {
            let resolver = Resolver::new(set, &session.symbols);
            if resolver
                .resolve_constant(module_id, &[id.name.clone()])
                .is_none()
            {
                session.diagnostics.add(Diagnostic::error(
                    DiagnosticCode::UndefinedConstant,
                    format!("constant '{}' not found", id.name),
                    id.pos.clone(),
                ));
            }
        }
        Expr::Unary(e) => resolve_constant_expr(&e.operand, module_id, set, session),
        Expr::Binary(e) => {
            resolve_constant_expr(&e.left, module_id, set, session);
            resolve_constant_expr(&e.right, module_id, set, session);
        }
        Expr::Ternary(e) => {
            resolve_constant_expr(&e.condition, module_id, set, session);
            resolve_constant_expr(&e.true_expr, module_id, set, session);
            resolve_constant_expr(&e.false_expr, module_id, set, session);
        }
        Expr::Literal(_) => {}
        // Field access, indexing and calls cannot appear in a constant
        // initializer's evaluable subset; the evaluator rejects them.
        _ => {}
    }
}
