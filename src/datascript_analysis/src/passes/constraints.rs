//! Phase 6: statically decidable conditions. A guard or constraint that
//! always holds (or never holds) is suspicious but legal, so this phase
//! only warns.

use crate::diagnostics::code::DiagnosticCode;
use crate::diagnostics::diagnostic::Diagnostic;
use crate::ids::{DeclId, ModuleId};
use crate::loader::ModuleSet;
use crate::passes::const_eval::{evaluate_expr, ConstValue, EvalContext};
use crate::passes::AnalyzerPass;
use crate::session::AnalysisSession;
use crate::symbols::SymbolTable;
use std::collections::{HashMap, HashSet};
use syntax::declarations::BodyItem;
use syntax::expressions::Expr;
use syntax::SourcePos;

pub struct ConstraintValidation;

impl AnalyzerPass for ConstraintValidation {
    fn id(&self) -> &'static str {
        "constraints"
    }

    fn run(&self, set: &ModuleSet, session: &mut AnalysisSession) {
        let symbols = std::mem::take(&mut session.symbols);
        let constant_values = std::mem::take(&mut session.constant_values);
        let mut diags = Vec::new();

        for (module_id, loaded) in set.iter() {
            let mut check = |expr: &Expr, what: &str, pos: &SourcePos| {
                check_condition(
                    expr,
                    what,
                    pos,
                    module_id,
                    set,
                    &symbols,
                    &constant_values,
                    &mut diags,
                );
            };

            let module = &loaded.module;
            for s in &module.structs {
                for item in &s.body {
                    if let BodyItem::Field(field) = item {
                        if let Some(cond) = &field.condition {
                            check(cond, "field condition", &field.pos);
                        }
                        if let Some(constraint) = &field.constraint {
                            check(constraint, "field constraint", &field.pos);
                        }
                    }
                }
            }
            for u in &module.unions {
                for case in &u.cases {
                    if let Some(cond) = &case.condition {
                        check(cond, "union case condition", &case.pos);
                    }
                    for item in &case.items {
                        if let BodyItem::Field(field) = item {
                            if let Some(cond) = &field.condition {
                                check(cond, "field condition", &field.pos);
                            }
                        }
                    }
                }
            }
            for c in &module.constraints {
                check(&c.condition, "constraint condition", &c.pos);
            }
            for s in &module.subtypes {
                check(&s.constraint, "subtype constraint", &s.pos);
            }
        }

        session.symbols = symbols;
        session.constant_values = constant_values;
        for d in diags {
            session.diagnostics.add(d);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn check_condition(
    expr: &Expr,
    what: &str,
    pos: &SourcePos,
    module: ModuleId,
    set: &ModuleSet,
    symbols: &SymbolTable,
    constant_values: &HashMap<DeclId, u64>,
    diags: &mut Vec<Diagnostic>,
) {
    let ctx = EvalContext {
        set,
        symbols,
        constant_values,
    };
    let mut stack = HashSet::new();
    let mut sink = None;
    match evaluate_expr(expr, module, &ctx, &mut stack, &mut sink) {
        Some(ConstValue::Bool(true)) => {
            diags.push(Diagnostic::warning(
                DiagnosticCode::AlwaysTrue,
                format!("{} is always true", what),
                pos.clone(),
            ));
        }
        Some(ConstValue::Bool(false)) => {
            diags.push(Diagnostic::warning(
                DiagnosticCode::AlwaysFalse,
                format!("{} is always false; this path is dead", what),
                pos.clone(),
            ));
        }
        // Runtime-dependent or non-boolean; nothing to report here.
        _ => {}
    }
}
