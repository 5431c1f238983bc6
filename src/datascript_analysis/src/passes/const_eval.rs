//! Phase 4: evaluate compile-time expressions with signed 64-bit checked
//! arithmetic. Constants and enum items get stored values; alignment
//! directive arguments are validated; duplicate exact choice-case values
//! are detected once their expressions evaluate.

use crate::diagnostics::code::DiagnosticCode;
use crate::diagnostics::diagnostic::Diagnostic;
use crate::ids::{DeclId, DeclKind, ModuleId};
use crate::loader::ModuleSet;
use crate::passes::AnalyzerPass;
use crate::session::AnalysisSession;
use crate::symbols::{decl_ref, DeclRef, Resolver, SymbolTable};
use std::collections::{HashMap, HashSet};
use syntax::declarations::{BodyItem, CaseSelector, Module};
use syntax::expressions::{BinaryOp, Expr, Literal, UnaryOp};
use syntax::SourcePos;

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl ConstValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// Everything the evaluator needs to chase constant references across
/// modules.
pub struct EvalContext<'a> {
    pub set: &'a ModuleSet,
    pub symbols: &'a SymbolTable,
    pub constant_values: &'a HashMap<DeclId, u64>,
}

/// Evaluate `expr` as seen from `module`. `diags` is optional so later
/// phases can probe expressions silently; pass `Some` to report overflow,
/// division by zero and circular references.
pub fn evaluate_expr(
    expr: &Expr,
    module: ModuleId,
    ctx: &EvalContext<'_>,
    stack: &mut HashSet<DeclId>,
    diags: &mut Option<&mut Vec<Diagnostic>>,
) -> Option<ConstValue> {
    match expr {
        Expr::Literal(Literal::Int { value, .. }) => Some(ConstValue::Int(*value as i64)),
        Expr::Literal(Literal::Bool { value, .. }) => Some(ConstValue::Bool(*value)),
        Expr::Literal(Literal::Str { value, .. }) => Some(ConstValue::Str(value.clone())),
        Expr::Identifier(id) => {
            let resolver = Resolver::new(ctx.set, ctx.symbols);
            let target = resolver.resolve_constant(module, &[id.name.clone()])?;
            if stack.contains(&target) {
                report(
                    diags,
                    DiagnosticCode::CircularConstant,
                    format!("circular constant dependency for '{}'", id.name),
                    &id.pos,
                );
                return None;
            }
            if let Some(cached) = ctx.constant_values.get(&target) {
                return Some(ConstValue::Int(*cached as i64));
            }
            let DeclRef::Constant(def) = decl_ref(ctx.set, target) else {
                return None;
            };
            stack.insert(target);
            let result = evaluate_expr(&def.value, target.module, ctx, stack, diags);
            stack.remove(&target);
            result
        }
        Expr::Unary(e) => {
            let operand = evaluate_expr(&e.operand, module, ctx, stack, diags)?;
            match (&operand, e.op) {
                (ConstValue::Int(v), UnaryOp::Neg) => {
                    if *v == i64::MIN {
                        report(
                            diags,
                            DiagnosticCode::Overflow,
                            "integer overflow in negation".to_string(),
                            &e.pos,
                        );
                        return None;
                    }
                    Some(ConstValue::Int(-v))
                }
                (ConstValue::Int(v), UnaryOp::Pos) => Some(ConstValue::Int(*v)),
                (ConstValue::Int(v), UnaryOp::BitNot) => Some(ConstValue::Int(!v)),
                (ConstValue::Bool(v), UnaryOp::LogNot) => Some(ConstValue::Bool(!v)),
                _ => None,
            }
        }
        Expr::Binary(e) => {
            let left = evaluate_expr(&e.left, module, ctx, stack, diags)?;
            let right = evaluate_expr(&e.right, module, ctx, stack, diags)?;
            evaluate_binary(&left, &right, e.op, &e.pos, diags)
        }
        Expr::Ternary(e) => {
            let cond = evaluate_expr(&e.condition, module, ctx, stack, diags)?;
            // Both branches must be well-typed; evaluating both keeps
            // diagnostics complete. The condition still selects the result.
            let true_val = evaluate_expr(&e.true_expr, module, ctx, stack, diags);
            let false_val = evaluate_expr(&e.false_expr, module, ctx, stack, diags);
            match cond.as_bool()? {
                true => true_val,
                false => false_val,
            }
        }
        // Field access, indexing and calls depend on runtime data.
        _ => None,
    }
}

fn report(
    diags: &mut Option<&mut Vec<Diagnostic>>,
    code: DiagnosticCode,
    message: String,
    pos: &SourcePos,
) {
    if let Some(diags) = diags {
        diags.push(Diagnostic::error(code, message, pos.clone()));
    }
}

fn evaluate_binary(
    left: &ConstValue,
    right: &ConstValue,
    op: BinaryOp,
    pos: &SourcePos,
    diags: &mut Option<&mut Vec<Diagnostic>>,
) -> Option<ConstValue> {
    if let (ConstValue::Int(l), ConstValue::Int(r)) = (left, right) {
        let (l, r) = (*l, *r);
        return match op {
            BinaryOp::Add => match l.checked_add(r) {
                Some(v) => Some(ConstValue::Int(v)),
                None => {
                    report(
                        diags,
                        DiagnosticCode::Overflow,
                        "integer overflow in addition".to_string(),
                        pos,
                    );
                    None
                }
            },
            BinaryOp::Sub => match l.checked_sub(r) {
                Some(v) => Some(ConstValue::Int(v)),
                None => {
                    report(
                        diags,
                        DiagnosticCode::Underflow,
                        "integer underflow in subtraction".to_string(),
                        pos,
                    );
                    None
                }
            },
            BinaryOp::Mul => match l.checked_mul(r) {
                Some(v) => Some(ConstValue::Int(v)),
                None => {
                    report(
                        diags,
                        DiagnosticCode::Overflow,
                        "integer overflow in multiplication".to_string(),
                        pos,
                    );
                    None
                }
            },
            BinaryOp::Div => {
                if r == 0 {
                    report(
                        diags,
                        DiagnosticCode::DivisionByZero,
                        "division by zero".to_string(),
                        pos,
                    );
                    return None;
                }
                match l.checked_div(r) {
                    Some(v) => Some(ConstValue::Int(v)),
                    None => {
                        report(
                            diags,
                            DiagnosticCode::Overflow,
                            "integer overflow in division".to_string(),
                            pos,
                        );
                        None
                    }
                }
            }
            BinaryOp::Mod => {
                if r == 0 {
                    report(
                        diags,
                        DiagnosticCode::DivisionByZero,
                        "modulo by zero".to_string(),
                        pos,
                    );
                    return None;
                }
                l.checked_rem(r).map(ConstValue::Int)
            }
            BinaryOp::BitAnd => Some(ConstValue::Int(l & r)),
            BinaryOp::BitOr => Some(ConstValue::Int(l | r)),
            BinaryOp::BitXor => Some(ConstValue::Int(l ^ r)),
            BinaryOp::Shl | BinaryOp::Shr => {
                if !(0..64).contains(&r) {
                    report(
                        diags,
                        DiagnosticCode::Overflow,
                        "shift amount out of range".to_string(),
                        pos,
                    );
                    return None;
                }
                let v = if op == BinaryOp::Shl { l << r } else { l >> r };
                Some(ConstValue::Int(v))
            }
            BinaryOp::Eq => Some(ConstValue::Bool(l == r)),
            BinaryOp::Ne => Some(ConstValue::Bool(l != r)),
            BinaryOp::Lt => Some(ConstValue::Bool(l < r)),
            BinaryOp::Gt => Some(ConstValue::Bool(l > r)),
            BinaryOp::Le => Some(ConstValue::Bool(l <= r)),
            BinaryOp::Ge => Some(ConstValue::Bool(l >= r)),
            BinaryOp::LogAnd | BinaryOp::LogOr => None,
        };
    }
    if let (ConstValue::Bool(l), ConstValue::Bool(r)) = (left, right) {
        let (l, r) = (*l, *r);
        return match op {
            BinaryOp::LogAnd => Some(ConstValue::Bool(l && r)),
            BinaryOp::LogOr => Some(ConstValue::Bool(l || r)),
            BinaryOp::Eq => Some(ConstValue::Bool(l == r)),
            BinaryOp::Ne => Some(ConstValue::Bool(l != r)),
            _ => None,
        };
    }
    if let (ConstValue::Str(l), ConstValue::Str(r)) = (left, right) {
        return match op {
            BinaryOp::Eq => Some(ConstValue::Bool(l == r)),
            BinaryOp::Ne => Some(ConstValue::Bool(l != r)),
            _ => None,
        };
    }
    None
}

pub struct ConstantEvaluation;

impl AnalyzerPass for ConstantEvaluation {
    fn id(&self) -> &'static str {
        "const-eval"
    }

    fn run(&self, set: &ModuleSet, session: &mut AnalysisSession) {
        let symbols = std::mem::take(&mut session.symbols);
        let mut constant_values = std::mem::take(&mut session.constant_values);
        let mut enum_item_values = std::mem::take(&mut session.enum_item_values);
        let mut poisoned = Vec::new();
        let mut diags = Vec::new();

        for (module_id, loaded) in set.iter() {
            evaluate_module(
                module_id,
                &loaded.module,
                set,
                &symbols,
                &mut constant_values,
                &mut enum_item_values,
                &mut poisoned,
                &mut diags,
            );
        }

        session.symbols = symbols;
        session.constant_values = constant_values;
        session.enum_item_values = enum_item_values;
        for id in poisoned {
            session.poison(id);
        }
        for d in diags {
            session.diagnostics.add(d);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn evaluate_module(
    module_id: ModuleId,
    module: &Module,
    set: &ModuleSet,
    symbols: &SymbolTable,
    constant_values: &mut HashMap<DeclId, u64>,
    enum_item_values: &mut HashMap<(DeclId, usize), u64>,
    poisoned: &mut Vec<DeclId>,
    diags: &mut Vec<Diagnostic>,
) {
    // Constants.
    for (i, c) in module.constants.iter().enumerate() {
        let id = DeclId::new(module_id, DeclKind::Constant, i);
        if constant_values.contains_key(&id) {
            continue;
        }
        let ctx = EvalContext {
            set,
            symbols,
            constant_values,
        };
        let mut stack = HashSet::new();
        stack.insert(id);
        let mut sink = Some(&mut *diags);
        let value = evaluate_expr(&c.value, module_id, &ctx, &mut stack, &mut sink);
        match value {
            Some(ConstValue::Int(v)) => {
                constant_values.insert(id, v as u64);
            }
            Some(_) => {
                // Boolean and string constants are legal but only integers
                // feed sizes; nothing to store.
            }
            None => poisoned.push(id),
        }
    }

    // Enum items with auto-increment.
    for (i, e) in module.enums.iter().enumerate() {
        let enum_id = DeclId::new(module_id, DeclKind::Enum, i);
        let mut next_value: i64 = 0;
        for (item_index, item) in e.items.iter().enumerate() {
            let mut current = next_value;
            if let Some(value_expr) = &item.value {
                let ctx = EvalContext {
                    set,
                    symbols,
                    constant_values,
                };
                let mut stack = HashSet::new();
                let mut sink = Some(&mut *diags);
                if let Some(ConstValue::Int(v)) =
                    evaluate_expr(value_expr, module_id, &ctx, &mut stack, &mut sink)
                {
                    current = v;
                }
            }
            enum_item_values.insert((enum_id, item_index), current as u64);
            next_value = current.wrapping_add(1);
        }
    }

    // Alignment directives must be constant integers.
    let check_alignment = |items: &[BodyItem],
                               constant_values: &HashMap<DeclId, u64>,
                               diags: &mut Vec<Diagnostic>| {
        for item in items {
            if let BodyItem::Align(align) = item {
                let ctx = EvalContext {
                    set,
                    symbols,
                    constant_values,
                };
                let mut stack = HashSet::new();
                let mut sink = None;
                let value = evaluate_expr(&align.expr, module_id, &ctx, &mut stack, &mut sink);
                if !matches!(value, Some(ConstValue::Int(_))) {
                    diags.push(Diagnostic::error(
                        DiagnosticCode::NonConstantAlignment,
                        "alignment expression must be a constant integer".to_string(),
                        align.pos.clone(),
                    ));
                }
            }
        }
    };
    for s in &module.structs {
        check_alignment(&s.body, constant_values, diags);
    }
    for u in &module.unions {
        for case in &u.cases {
            check_alignment(&case.items, constant_values, diags);
        }
    }

    // Exact choice-case values must be pairwise distinct.
    for c in &module.choices {
        let mut seen: HashMap<i64, SourcePos> = HashMap::new();
        for case in &c.cases {
            let CaseSelector::Exact(exprs) = &case.selector else {
                continue;
            };
            for expr in exprs {
                let ctx = EvalContext {
                    set,
                    symbols,
                    constant_values,
                };
                let mut stack = HashSet::new();
                let mut sink = None;
                let Some(ConstValue::Int(v)) =
                    evaluate_expr(expr, module_id, &ctx, &mut stack, &mut sink)
                else {
                    continue;
                };
                if let Some(prior) = seen.get(&v) {
                    diags.push(
                        Diagnostic::error(
                            DiagnosticCode::DuplicateDefinition,
                            format!("duplicate case value {} in choice '{}'", v, c.name),
                            expr.pos().clone(),
                        )
                        .with_related(prior.clone(), "previous case with this value here"),
                    );
                } else {
                    seen.insert(v, expr.pos().clone());
                }
            }
        }
    }
}
