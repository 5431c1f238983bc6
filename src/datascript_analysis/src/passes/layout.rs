//! Phase 5: compute sizes, alignments and field offsets. Primitives align
//! to their own size, bitfields and strings are byte-aligned, and a
//! variable-size field makes everything after it variable. Label and
//! alignment directives are reader-time instructions and do not perturb
//! the layout map.

use crate::diagnostics::code::DiagnosticCode;
use crate::diagnostics::diagnostic::Diagnostic;
use crate::ids::{DeclId, DeclKind, ModuleId};
use crate::loader::ModuleSet;
use crate::passes::const_eval::{evaluate_expr, ConstValue, EvalContext};
use crate::passes::AnalyzerPass;
use crate::session::{AnalysisSession, CompositeLayout, TypeInfo};
use crate::symbols::{decl_ref, DeclRef, Resolver, SymbolTable};
use std::collections::{HashMap, HashSet};
use syntax::declarations::{BodyItem, StructDef, UnionDef};
use syntax::expressions::Expr;
use syntax::types::{ArraySizing, BitFieldWidth, Type};

fn align_offset(offset: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return offset;
    }
    offset.div_ceil(alignment) * alignment
}

pub struct LayoutCalculator<'a> {
    set: &'a ModuleSet,
    symbols: &'a SymbolTable,
    constant_values: &'a HashMap<DeclId, u64>,
    layouts: HashMap<DeclId, CompositeLayout>,
    /// Guard against recursive composites.
    in_progress: HashSet<DeclId>,
    diags: Vec<Diagnostic>,
}

impl<'a> LayoutCalculator<'a> {
    pub fn new(
        set: &'a ModuleSet,
        symbols: &'a SymbolTable,
        constant_values: &'a HashMap<DeclId, u64>,
    ) -> Self {
        LayoutCalculator {
            set,
            symbols,
            constant_values,
            layouts: HashMap::new(),
            in_progress: HashSet::new(),
            diags: Vec::new(),
        }
    }

    /// Silently evaluate an expression to a non-negative integer.
    fn eval_uint(&self, expr: &Expr, module: ModuleId) -> Option<u64> {
        let ctx = EvalContext {
            set: self.set,
            symbols: self.symbols,
            constant_values: self.constant_values,
        };
        let mut stack = HashSet::new();
        let mut sink = None;
        match evaluate_expr(expr, module, &ctx, &mut stack, &mut sink)? {
            ConstValue::Int(v) if v >= 0 => Some(v as u64),
            _ => None,
        }
    }

    pub fn type_info(&mut self, ty: &Type, module: ModuleId) -> TypeInfo {
        match ty {
            Type::Primitive(p) => {
                let size = u64::from(p.bits) / 8;
                TypeInfo::fixed(size, size, p.is_signed)
            }
            Type::BitField(bf) => {
                let width = match &bf.width {
                    BitFieldWidth::Fixed(w) => Some(*w),
                    BitFieldWidth::Expr(expr) => {
                        let value = self.eval_uint(expr, module);
                        if value.is_none() {
                            self.diags.push(Diagnostic::error(
                                DiagnosticCode::IncompatibleTypes,
                                "bitfield width must be a compile-time constant expression"
                                    .to_string(),
                                bf.pos.clone(),
                            ));
                        }
                        value
                    }
                };
                match width {
                    Some(0) => {
                        self.diags.push(Diagnostic::error(
                            DiagnosticCode::IncompatibleTypes,
                            "bitfield width must be at least 1".to_string(),
                            bf.pos.clone(),
                        ));
                        TypeInfo::fixed(1, 1, false)
                    }
                    Some(w) => TypeInfo::fixed(w.div_ceil(8), 1, false),
                    None => TypeInfo::fixed(1, 1, false),
                }
            }
            Type::Bool { .. } => TypeInfo::fixed(1, 1, false),
            Type::Str(_) => TypeInfo::variable(),
            Type::Array(arr) => {
                let element = self.type_info(&arr.element, module);
                match &arr.sizing {
                    ArraySizing::Fixed(size_expr) => {
                        match (self.eval_uint(size_expr, module), element.size) {
                            (Some(n), Some(elem_size)) if !element.is_variable => {
                                let total = elem_size.saturating_mul(n);
                                TypeInfo {
                                    size: Some(total),
                                    alignment: element.alignment,
                                    is_variable: false,
                                    is_signed: false,
                                    min_size: Some(total),
                                    max_size: Some(total),
                                }
                            }
                            // Size referencing a field, or a variable
                            // element: variable overall.
                            _ => TypeInfo {
                                alignment: element.alignment,
                                ..TypeInfo::variable()
                            },
                        }
                    }
                    ArraySizing::Ranged { min, max } => {
                        let min_count = min.as_ref().and_then(|e| self.eval_uint(e, module));
                        let max_count = self.eval_uint(max, module);
                        let elem_size = if element.is_variable {
                            None
                        } else {
                            element.size
                        };
                        TypeInfo {
                            size: None,
                            alignment: element.alignment,
                            is_variable: true,
                            is_signed: false,
                            min_size: elem_size
                                .map(|s| s.saturating_mul(min_count.unwrap_or(0))),
                            max_size: elem_size
                                .zip(max_count)
                                .map(|(s, n)| s.saturating_mul(n)),
                        }
                    }
                    ArraySizing::Unsized => TypeInfo {
                        alignment: element.alignment,
                        ..TypeInfo::variable()
                    },
                }
            }
            Type::Named(_) | Type::Instantiation(_) => {
                let qname = ty.referenced_name().expect("named type has a name");
                let resolver = Resolver::new(self.set, self.symbols);
                let Some(target) = resolver.resolve_type(module, &qname.parts) else {
                    // Unresolved; phase 2 reported it.
                    return TypeInfo::fixed(0, 1, false);
                };
                self.decl_type_info(target)
            }
        }
    }

    fn decl_type_info(&mut self, id: DeclId) -> TypeInfo {
        match decl_ref(self.set, id) {
            DeclRef::Enum(def) => self.indirect_type_info(id, &def.base),
            DeclRef::Subtype(def) => self.indirect_type_info(id, &def.base),
            DeclRef::TypeAlias(def) => self.indirect_type_info(id, &def.target),
            DeclRef::Struct(_) | DeclRef::Union(_) => {
                let layout = self.composite_layout(id);
                TypeInfo {
                    size: layout.size,
                    alignment: layout.alignment,
                    is_variable: layout.is_variable,
                    is_signed: false,
                    min_size: layout.size,
                    max_size: layout.size,
                }
            }
            DeclRef::Choice(_) => TypeInfo::variable(),
            DeclRef::Constant(_) | DeclRef::Constraint(_) => TypeInfo::fixed(0, 1, false),
        }
    }

    /// Follow an enum base, subtype base or alias target, guarding against
    /// reference cycles through the same declaration.
    fn indirect_type_info(&mut self, id: DeclId, target: &Type) -> TypeInfo {
        if !self.in_progress.insert(id) {
            return TypeInfo::variable();
        }
        let info = self.type_info(target, id.module);
        self.in_progress.remove(&id);
        info
    }

    /// Layout of a struct or union, memoized. Recursive composites are
    /// treated as variable-size.
    pub fn composite_layout(&mut self, id: DeclId) -> CompositeLayout {
        if let Some(layout) = self.layouts.get(&id) {
            return layout.clone();
        }
        if !self.in_progress.insert(id) {
            return CompositeLayout {
                size: None,
                alignment: 1,
                is_variable: true,
                field_offsets: HashMap::new(),
            };
        }
        let layout = match decl_ref(self.set, id) {
            DeclRef::Struct(def) => self.struct_layout(def, id.module),
            DeclRef::Union(def) => self.union_layout(def, id.module),
            _ => CompositeLayout::default(),
        };
        self.in_progress.remove(&id);
        self.layouts.insert(id, layout.clone());
        layout
    }

    fn struct_layout(&mut self, def: &StructDef, module: ModuleId) -> CompositeLayout {
        let mut offset: Option<u64> = Some(0);
        let mut max_alignment = 1u64;
        let mut field_offsets = HashMap::new();

        for (index, item) in def.body.iter().enumerate() {
            let BodyItem::Field(field) = item else {
                continue;
            };
            let info = self.type_info(&field.ty, module);
            max_alignment = max_alignment.max(info.alignment);
            if let Some(current) = offset {
                let aligned = align_offset(current, info.alignment);
                field_offsets.insert(index, aligned);
                offset = match info.size {
                    Some(size) if !info.is_variable => Some(aligned + size),
                    _ => None,
                };
            }
        }

        let size = offset.map(|o| align_offset(o, max_alignment));
        CompositeLayout {
            size,
            alignment: max_alignment,
            is_variable: size.is_none(),
            field_offsets,
        }
    }

    fn union_layout(&mut self, def: &UnionDef, module: ModuleId) -> CompositeLayout {
        let mut max_size: Option<u64> = Some(0);
        let mut max_alignment = 1u64;
        let mut field_offsets = HashMap::new();

        let mut flat_index = 0usize;
        for case in &def.cases {
            for item in &case.items {
                let BodyItem::Field(field) = item else {
                    flat_index += 1;
                    continue;
                };
                let info = self.type_info(&field.ty, module);
                max_alignment = max_alignment.max(info.alignment);
                // All union cases start at offset 0.
                field_offsets.insert(flat_index, 0);
                max_size = match (max_size, info.size) {
                    (Some(current), Some(size)) if !info.is_variable => {
                        Some(current.max(size))
                    }
                    _ => None,
                };
                flat_index += 1;
            }
        }

        let size = max_size.map(|s| align_offset(s, max_alignment));
        CompositeLayout {
            size,
            alignment: max_alignment,
            is_variable: size.is_none(),
            field_offsets,
        }
    }
}

pub struct SizeCalculation;

impl AnalyzerPass for SizeCalculation {
    fn id(&self) -> &'static str {
        "layout"
    }

    fn run(&self, set: &ModuleSet, session: &mut AnalysisSession) {
        let symbols = std::mem::take(&mut session.symbols);
        let constant_values = std::mem::take(&mut session.constant_values);

        let mut calculator = LayoutCalculator::new(set, &symbols, &constant_values);
        for (module_id, loaded) in set.iter() {
            for i in 0..loaded.module.structs.len() {
                calculator.composite_layout(DeclId::new(module_id, DeclKind::Struct, i));
            }
            for i in 0..loaded.module.unions.len() {
                calculator.composite_layout(DeclId::new(module_id, DeclKind::Union, i));
            }
        }
        let LayoutCalculator {
            layouts, diags, ..
        } = calculator;

        session.symbols = symbols;
        session.constant_values = constant_values;
        session.layouts = layouts;
        for d in diags {
            session.diagnostics.add(d);
        }
    }
}
