//! Phase 3: classify every expression into a type category and enforce the
//! operator rules. An `Unknown` category is tolerated everywhere so that an
//! error reported once (usually in phase 2) never cascades.

use crate::diagnostics::code::DiagnosticCode;
use crate::diagnostics::diagnostic::Diagnostic;
use crate::ids::ModuleId;
use crate::loader::ModuleSet;
use crate::passes::AnalyzerPass;
use crate::session::AnalysisSession;
use crate::symbols::{decl_ref, DeclRef, Resolver, SymbolTable};
use syntax::declarations::{
    BodyItem, CaseSelector, ChoiceDef, ChoiceDiscriminator, Module, Statement, StructDef,
    UnionDef,
};
use syntax::expressions::{Expr, Literal, UnaryOp};
use syntax::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCat {
    Integer,
    Boolean,
    Str,
    Array,
    UserDefined,
    BitField,
    Unknown,
}

impl TypeCat {
    fn name(self) -> &'static str {
        match self {
            TypeCat::Integer => "integer",
            TypeCat::Boolean => "boolean",
            TypeCat::Str => "string",
            TypeCat::Array => "array",
            TypeCat::UserDefined => "user-defined",
            TypeCat::BitField => "bitfield",
            TypeCat::Unknown => "unknown",
        }
    }
}

/// Surface classification of a declared type. Qualified names are
/// user-defined regardless of what they resolve to; finer distinctions are
/// the later phases' business.
pub fn categorize_type(ty: &Type) -> TypeCat {
    match ty {
        Type::Primitive(_) => TypeCat::Integer,
        Type::BitField(_) => TypeCat::BitField,
        Type::Bool { .. } => TypeCat::Boolean,
        Type::Str(_) => TypeCat::Str,
        Type::Array(_) => TypeCat::Array,
        Type::Named(_) | Type::Instantiation(_) => TypeCat::UserDefined,
    }
}

/// Lexical scope for expression checking: fields and member functions of
/// the composite under scrutiny, plus its type parameters.
#[derive(Default)]
struct ExprScope<'a> {
    fields: Vec<(&'a str, &'a Type)>,
    functions: Vec<(&'a str, &'a Type)>,
    params: Vec<(&'a str, &'a Type)>,
    /// Category of `this` inside a subtype constraint.
    self_category: Option<TypeCat>,
}

impl<'a> ExprScope<'a> {
    fn from_struct(def: &'a StructDef) -> Self {
        let mut scope = ExprScope::default();
        for item in &def.body {
            match item {
                BodyItem::Field(f) => scope.fields.push((f.name.as_str(), &f.ty)),
                BodyItem::Function(f) => {
                    scope.functions.push((f.name.as_str(), &f.return_type))
                }
                _ => {}
            }
        }
        for p in &def.parameters {
            scope.params.push((p.name.as_str(), &p.ty));
        }
        scope
    }

    fn from_union(def: &'a UnionDef) -> Self {
        let mut scope = ExprScope::default();
        for case in &def.cases {
            for item in &case.items {
                match item {
                    BodyItem::Field(f) => scope.fields.push((f.name.as_str(), &f.ty)),
                    BodyItem::Function(f) => {
                        scope.functions.push((f.name.as_str(), &f.return_type))
                    }
                    _ => {}
                }
            }
        }
        for p in &def.parameters {
            scope.params.push((p.name.as_str(), &p.ty));
        }
        scope
    }

    fn from_choice(def: &'a ChoiceDef) -> Self {
        let mut scope = ExprScope::default();
        for case in &def.cases {
            for item in &case.items {
                if let BodyItem::Field(f) = item {
                    scope.fields.push((f.name.as_str(), &f.ty));
                }
            }
        }
        for p in &def.parameters {
            scope.params.push((p.name.as_str(), &p.ty));
        }
        scope
    }

    fn field_type(&self, name: &str) -> Option<&'a Type> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, t)| *t)
    }

    fn function_return(&self, name: &str) -> Option<&'a Type> {
        self.functions
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, t)| *t)
    }

    fn param_type(&self, name: &str) -> Option<&'a Type> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, t)| *t)
    }
}

struct Checker<'a> {
    set: &'a ModuleSet,
    symbols: &'a SymbolTable,
    module: ModuleId,
    diags: Vec<Diagnostic>,
}

impl<'a> Checker<'a> {
    fn error(&mut self, code: DiagnosticCode, message: String, pos: &syntax::SourcePos) {
        self.diags.push(Diagnostic::error(code, message, pos.clone()));
    }

    fn check_expr(&mut self, expr: &Expr, scope: &ExprScope<'_>) -> TypeCat {
        match expr {
            Expr::Literal(Literal::Int { .. }) => TypeCat::Integer,
            Expr::Literal(Literal::Bool { .. }) => TypeCat::Boolean,
            Expr::Literal(Literal::Str { .. }) => TypeCat::Str,
            Expr::Identifier(id) => {
                if id.name == "this" {
                    if let Some(cat) = scope.self_category {
                        return cat;
                    }
                }
                if let Some(ty) = scope.field_type(&id.name) {
                    return categorize_type(ty);
                }
                if let Some(ty) = scope.param_type(&id.name) {
                    return categorize_type(ty);
                }
                let resolver = Resolver::new(self.set, self.symbols);
                if let Some(constant) =
                    resolver.resolve_constant(self.module, &[id.name.clone()])
                {
                    if let DeclRef::Constant(def) = decl_ref(self.set, constant) {
                        return categorize_type(&def.ty);
                    }
                }
                // Unresolved identifiers were reported in phase 2 where that
                // is an error; suppress cascades here.
                TypeCat::Unknown
            }
            Expr::Unary(e) => {
                let operand = self.check_expr(&e.operand, scope);
                match e.op {
                    UnaryOp::Neg | UnaryOp::Pos | UnaryOp::BitNot => {
                        if !matches!(operand, TypeCat::Integer | TypeCat::Unknown) {
                            self.error(
                                DiagnosticCode::InvalidOperandType,
                                format!(
                                    "operator '{}' requires an integer operand, but got '{}'",
                                    e.op.symbol(),
                                    operand.name()
                                ),
                                &e.pos,
                            );
                        }
                        TypeCat::Integer
                    }
                    UnaryOp::LogNot => {
                        if !matches!(operand, TypeCat::Boolean | TypeCat::Unknown) {
                            self.error(
                                DiagnosticCode::InvalidOperandType,
                                format!(
                                    "operator '!' requires a boolean operand, but got '{}'",
                                    operand.name()
                                ),
                                &e.pos,
                            );
                        }
                        TypeCat::Boolean
                    }
                }
            }
            Expr::Binary(e) => {
                let left = self.check_expr(&e.left, scope);
                let right = self.check_expr(&e.right, scope);
                if e.op.is_comparison() {
                    if left != right && left != TypeCat::Unknown && right != TypeCat::Unknown {
                        self.error(
                            DiagnosticCode::IncompatibleTypes,
                            format!(
                                "operator '{}' requires compatible operands, but got '{}' and '{}'",
                                e.op.symbol(),
                                left.name(),
                                right.name()
                            ),
                            &e.pos,
                        );
                    }
                    TypeCat::Boolean
                } else if e.op.is_logical() {
                    for (side, cat) in [("left", left), ("right", right)] {
                        if !matches!(cat, TypeCat::Boolean | TypeCat::Unknown) {
                            self.error(
                                DiagnosticCode::InvalidOperandType,
                                format!(
                                    "operator '{}' requires boolean operands, but the {} operand is '{}'",
                                    e.op.symbol(),
                                    side,
                                    cat.name()
                                ),
                                &e.pos,
                            );
                        }
                    }
                    TypeCat::Boolean
                } else {
                    for (side, cat) in [("left", left), ("right", right)] {
                        if !matches!(cat, TypeCat::Integer | TypeCat::Unknown) {
                            self.error(
                                DiagnosticCode::InvalidOperandType,
                                format!(
                                    "operator '{}' requires integer operands, but the {} operand is '{}'",
                                    e.op.symbol(),
                                    side,
                                    cat.name()
                                ),
                                &e.pos,
                            );
                        }
                    }
                    TypeCat::Integer
                }
            }
            Expr::Ternary(e) => {
                let cond = self.check_expr(&e.condition, scope);
                let true_cat = self.check_expr(&e.true_expr, scope);
                let false_cat = self.check_expr(&e.false_expr, scope);
                if !matches!(cond, TypeCat::Boolean | TypeCat::Unknown) {
                    self.error(
                        DiagnosticCode::TypeMismatch,
                        "ternary condition must be boolean".to_string(),
                        &e.pos,
                    );
                }
                if true_cat != false_cat
                    && true_cat != TypeCat::Unknown
                    && false_cat != TypeCat::Unknown
                {
                    self.error(
                        DiagnosticCode::IncompatibleTypes,
                        "ternary branches have incompatible types".to_string(),
                        &e.pos,
                    );
                }
                true_cat
            }
            Expr::ArrayIndex(e) => {
                self.check_expr(&e.array, scope);
                let index = self.check_expr(&e.index, scope);
                if !matches!(index, TypeCat::Integer | TypeCat::Unknown) {
                    self.error(
                        DiagnosticCode::InvalidOperandType,
                        "array index must be integer".to_string(),
                        &e.pos,
                    );
                }
                TypeCat::Unknown
            }
            Expr::FieldAccess(e) => {
                self.check_expr(&e.object, scope);
                // When the object is a bare identifier bound to a field of a
                // struct type in scope, look the member up in that struct.
                if let Some(name) = e.object.as_identifier() {
                    if let Some(obj_ty) = scope.field_type(name) {
                        if let Some(qname) = obj_ty.referenced_name() {
                            let resolver = Resolver::new(self.set, self.symbols);
                            if let Some(target) =
                                resolver.resolve_type(self.module, &qname.parts)
                            {
                                if let DeclRef::Struct(def) = decl_ref(self.set, target) {
                                    if let Some(member) =
                                        def.fields().find(|f| f.name == e.field)
                                    {
                                        return categorize_type(&member.ty);
                                    }
                                }
                            }
                        }
                    }
                }
                TypeCat::Unknown
            }
            Expr::Call(e) => {
                for arg in &e.arguments {
                    self.check_expr(arg, scope);
                }
                if let Some(name) = e.callee.as_identifier() {
                    if let Some(ret) = scope.function_return(name) {
                        return categorize_type(ret);
                    }
                } else {
                    self.check_expr(&e.callee, scope);
                }
                TypeCat::Unknown
            }
        }
    }

    fn check_boolean(
        &mut self,
        expr: &Expr,
        scope: &ExprScope<'_>,
        what: &str,
        pos: &syntax::SourcePos,
    ) {
        let cat = self.check_expr(expr, scope);
        if !matches!(cat, TypeCat::Boolean | TypeCat::Unknown) {
            self.error(
                DiagnosticCode::TypeMismatch,
                format!("{} must be boolean", what),
                pos,
            );
        }
    }

    fn check_module(&mut self, module: &Module) {
        // Constants: value category against declared category.
        for c in &module.constants {
            let value = self.check_expr(&c.value, &ExprScope::default());
            let declared = categorize_type(&c.ty);
            if value != declared && value != TypeCat::Unknown && declared != TypeCat::Unknown {
                self.error(
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "constant value type '{}' does not match declared type '{}'",
                        value.name(),
                        declared.name()
                    ),
                    &c.pos,
                );
            }
        }

        // Subtype constraints are boolean predicates over `this`.
        for s in &module.subtypes {
            let scope = ExprScope {
                self_category: Some(categorize_type(&s.base)),
                ..Default::default()
            };
            self.check_boolean(&s.constraint, &scope, "subtype constraint", &s.pos);
        }

        // Enum base types and item values must be integer.
        for e in &module.enums {
            if categorize_type(&e.base) != TypeCat::Integer {
                self.error(
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "{} base type must be an integer type",
                        if e.is_bitmask { "bitmask" } else { "enum" }
                    ),
                    &e.pos,
                );
            }
            for item in &e.items {
                if let Some(value) = &item.value {
                    let cat = self.check_expr(value, &ExprScope::default());
                    if !matches!(cat, TypeCat::Integer | TypeCat::Unknown) {
                        self.error(
                            DiagnosticCode::TypeMismatch,
                            "enum item value must be integer".to_string(),
                            &item.pos,
                        );
                    }
                }
            }
        }

        for s in &module.structs {
            let scope = ExprScope::from_struct(s);
            self.check_body(&s.body, &scope);
        }

        for u in &module.unions {
            let scope = ExprScope::from_union(u);
            for case in &u.cases {
                self.check_body(&case.items, &scope);
                if let Some(cond) = &case.condition {
                    self.check_boolean(cond, &scope, "union case condition", &case.pos);
                }
            }
        }

        for c in &module.choices {
            let scope = ExprScope::from_choice(c);
            let selector_cat = match &c.discriminator {
                ChoiceDiscriminator::External(selector) => self.check_expr(selector, &scope),
                ChoiceDiscriminator::Inline(ty) => {
                    let cat = categorize_type(ty);
                    if !matches!(
                        cat,
                        TypeCat::Integer | TypeCat::BitField | TypeCat::UserDefined
                    ) {
                        self.error(
                            DiagnosticCode::TypeMismatch,
                            "choice discriminator must be an integer type".to_string(),
                            &c.pos,
                        );
                    }
                    cat
                }
            };
            for case in &c.cases {
                match &case.selector {
                    CaseSelector::Exact(exprs) => {
                        for expr in exprs {
                            let cat = self.check_expr(expr, &scope);
                            if cat != selector_cat
                                && cat != TypeCat::Unknown
                                && selector_cat != TypeCat::Unknown
                            {
                                self.error(
                                    DiagnosticCode::TypeMismatch,
                                    "case expression type does not match selector type"
                                        .to_string(),
                                    expr.pos(),
                                );
                            }
                        }
                    }
                    CaseSelector::Compare { bound, .. } => {
                        let cat = self.check_expr(bound, &scope);
                        if !matches!(cat, TypeCat::Integer | TypeCat::Unknown) {
                            self.error(
                                DiagnosticCode::TypeMismatch,
                                "case bound must be integer".to_string(),
                                bound.pos(),
                            );
                        }
                    }
                    CaseSelector::Default => {}
                }
                self.check_body(&case.items, &scope);
            }
        }

        for c in &module.constraints {
            let mut scope = ExprScope::default();
            for p in &c.params {
                scope.params.push((p.name.as_str(), &p.ty));
            }
            self.check_boolean(&c.condition, &scope, "constraint condition", &c.pos);
        }
    }

    fn check_body(&mut self, items: &[BodyItem], scope: &ExprScope<'_>) {
        for item in items {
            match item {
                BodyItem::Field(field) => {
                    if let Some(cond) = &field.condition {
                        self.check_boolean(cond, scope, "field condition", &field.pos);
                    }
                    if let Some(constraint) = &field.constraint {
                        self.check_boolean(constraint, scope, "field constraint", &field.pos);
                    }
                    if let Some(default) = &field.default_value {
                        let cat = self.check_expr(default, scope);
                        let declared = categorize_type(&field.ty);
                        if cat != declared
                            && cat != TypeCat::Unknown
                            && declared != TypeCat::Unknown
                        {
                            self.error(
                                DiagnosticCode::TypeMismatch,
                                format!(
                                    "default value type '{}' does not match field type '{}'",
                                    cat.name(),
                                    declared.name()
                                ),
                                &field.pos,
                            );
                        }
                    }
                    self.check_type_exprs(&field.ty, scope);
                }
                BodyItem::Label(label) => {
                    let cat = self.check_expr(&label.expr, scope);
                    if !matches!(cat, TypeCat::Integer | TypeCat::Unknown) {
                        self.error(
                            DiagnosticCode::TypeMismatch,
                            "label offset must be integer".to_string(),
                            &label.pos,
                        );
                    }
                }
                BodyItem::Align(align) => {
                    let cat = self.check_expr(&align.expr, scope);
                    if !matches!(cat, TypeCat::Integer | TypeCat::Unknown) {
                        self.error(
                            DiagnosticCode::TypeMismatch,
                            "alignment must be integer".to_string(),
                            &align.pos,
                        );
                    }
                }
                BodyItem::Function(func) => {
                    let declared = categorize_type(&func.return_type);
                    let mut inner_params: Vec<(&str, &Type)> = scope.params.clone();
                    for p in &func.parameters {
                        inner_params.push((p.name.as_str(), &p.ty));
                    }
                    let inner = ExprScope {
                        fields: scope.fields.clone(),
                        functions: scope.functions.clone(),
                        params: inner_params,
                        self_category: scope.self_category,
                    };
                    for stmt in &func.body {
                        match stmt {
                            Statement::Return { pos, value } => {
                                let cat = self.check_expr(value, &inner);
                                if cat != declared
                                    && cat != TypeCat::Unknown
                                    && declared != TypeCat::Unknown
                                {
                                    self.error(
                                        DiagnosticCode::TypeMismatch,
                                        format!(
                                            "return value type '{}' does not match declared return type '{}'",
                                            cat.name(),
                                            declared.name()
                                        ),
                                        pos,
                                    );
                                }
                            }
                            Statement::Expression { expr, .. } => {
                                self.check_expr(expr, &inner);
                            }
                        }
                    }
                }
                // Gone after phase 0.
                BodyItem::InlineUnion(_) | BodyItem::InlineStruct(_) => {}
            }
        }
    }

    /// Array size and bitfield width expressions buried in a type must be
    /// integer.
    fn check_type_exprs(&mut self, ty: &Type, scope: &ExprScope<'_>) {
        match ty {
            Type::Array(arr) => {
                use syntax::types::ArraySizing;
                match &arr.sizing {
                    ArraySizing::Fixed(size) => {
                        let cat = self.check_expr(size, scope);
                        if !matches!(cat, TypeCat::Integer | TypeCat::Unknown) {
                            self.error(
                                DiagnosticCode::TypeMismatch,
                                "array size must be integer".to_string(),
                                size.pos(),
                            );
                        }
                    }
                    ArraySizing::Ranged { min, max } => {
                        for expr in min.iter().chain(std::iter::once(max)) {
                            let cat = self.check_expr(expr, scope);
                            if !matches!(cat, TypeCat::Integer | TypeCat::Unknown) {
                                self.error(
                                    DiagnosticCode::TypeMismatch,
                                    "array bound must be integer".to_string(),
                                    expr.pos(),
                                );
                            }
                        }
                    }
                    ArraySizing::Unsized => {}
                }
                self.check_type_exprs(&arr.element, scope);
            }
            Type::BitField(bf) => {
                if let syntax::types::BitFieldWidth::Expr(expr) = &bf.width {
                    let cat = self.check_expr(expr, scope);
                    if !matches!(cat, TypeCat::Integer | TypeCat::Unknown) {
                        self.error(
                            DiagnosticCode::TypeMismatch,
                            "bitfield width must be integer".to_string(),
                            expr.pos(),
                        );
                    }
                }
            }
            Type::Instantiation(inst) => {
                for arg in &inst.arguments {
                    self.check_expr(arg, scope);
                }
            }
            _ => {}
        }
    }
}

pub struct TypeChecking;

impl AnalyzerPass for TypeChecking {
    fn id(&self) -> &'static str {
        "typecheck"
    }

    fn run(&self, set: &ModuleSet, session: &mut AnalysisSession) {
        let symbols = std::mem::take(&mut session.symbols);
        let mut all_diags = Vec::new();
        for (module_id, loaded) in set.iter() {
            let mut checker = Checker {
                set,
                symbols: &symbols,
                module: module_id,
                diags: Vec::new(),
            };
            checker.check_module(&loaded.module);
            all_diags.extend(checker.diags);
        }
        session.symbols = symbols;
        for d in all_diags {
            session.diagnostics.add(d);
        }
    }
}
