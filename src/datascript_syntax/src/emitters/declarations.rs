use crate::declarations::{
    BodyItem, CaseSelector, ChoiceCase, ChoiceDef, ChoiceDiscriminator, ConstantDef,
    ConstraintDef, EnumDef, FieldDef, FunctionDef, Param, Statement, StructDef, SubtypeDef,
    TypeAliasDef, UnionCase, UnionDef,
};
use crate::emitters::emit_trait::{emit_docstring, Emit, EmitCtx, EmitError};
use std::fmt::Write;

fn emit_params<W: Write>(params: &[Param], w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
    if params.is_empty() {
        return Ok(());
    }
    w.write_char('(')?;
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            w.write_str(", ")?;
        }
        p.ty.emit(w, cx)?;
        write!(w, " {}", p.name)?;
    }
    w.write_char(')')?;
    Ok(())
}

impl Emit for ConstantDef {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        emit_docstring(&self.docstring, w, cx)?;
        cx.write_indent(w)?;
        w.write_str("const ")?;
        self.ty.emit(w, cx)?;
        write!(w, " {} = ", self.name)?;
        self.value.emit(w, cx)?;
        w.write_str(";\n")?;
        Ok(())
    }
}

impl Emit for SubtypeDef {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        emit_docstring(&self.docstring, w, cx)?;
        cx.write_indent(w)?;
        w.write_str("subtype ")?;
        self.base.emit(w, cx)?;
        write!(w, " {} : ", self.name)?;
        self.constraint.emit(w, cx)?;
        w.write_str(";\n")?;
        Ok(())
    }
}

impl Emit for ConstraintDef {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        emit_docstring(&self.docstring, w, cx)?;
        cx.write_indent(w)?;
        write!(w, "constraint {}", self.name)?;
        emit_params(&self.params, w, cx)?;
        w.write_str(" { ")?;
        self.condition.emit(w, cx)?;
        w.write_str(" };\n")?;
        Ok(())
    }
}

impl Emit for TypeAliasDef {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        emit_docstring(&self.docstring, w, cx)?;
        cx.write_indent(w)?;
        write!(w, "typedef {} = ", self.name)?;
        self.target.emit(w, cx)?;
        w.write_str(";\n")?;
        Ok(())
    }
}

impl Emit for EnumDef {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        emit_docstring(&self.docstring, w, cx)?;
        cx.write_indent(w)?;
        w.write_str(if self.is_bitmask { "bitmask " } else { "enum " })?;
        self.base.emit(w, cx)?;
        write!(w, " {} {{\n", self.name)?;
        cx.indent += 1;
        for (i, item) in self.items.iter().enumerate() {
            emit_docstring(&item.docstring, w, cx)?;
            cx.write_indent(w)?;
            w.write_str(&item.name)?;
            if let Some(value) = &item.value {
                w.write_str(" = ")?;
                value.emit(w, cx)?;
            }
            if i + 1 < self.items.len() {
                w.write_char(',')?;
            }
            w.write_char('\n')?;
        }
        cx.indent -= 1;
        cx.write_indent(w)?;
        w.write_str("};\n")?;
        Ok(())
    }
}

impl Emit for FieldDef {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        emit_docstring(&self.docstring, w, cx)?;
        cx.write_indent(w)?;
        self.ty.emit(w, cx)?;
        write!(w, " {}", self.name)?;
        if let Some(constraint) = &self.constraint {
            w.write_str(" : ")?;
            constraint.emit(w, cx)?;
        }
        if let Some(default) = &self.default_value {
            w.write_str(" = ")?;
            default.emit(w, cx)?;
        }
        if let Some(condition) = &self.condition {
            w.write_str(" if ")?;
            condition.emit(w, cx)?;
        }
        w.write_str(";\n")?;
        Ok(())
    }
}

impl Emit for FunctionDef {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        emit_docstring(&self.docstring, w, cx)?;
        cx.write_indent(w)?;
        w.write_str("function ")?;
        self.return_type.emit(w, cx)?;
        write!(w, " {}", self.name)?;
        if self.parameters.is_empty() {
            w.write_str("()")?;
        } else {
            emit_params(&self.parameters, w, cx)?;
        }
        w.write_str(" {\n")?;
        cx.indent += 1;
        for stmt in &self.body {
            cx.write_indent(w)?;
            match stmt {
                Statement::Return { value, .. } => {
                    w.write_str("return ")?;
                    value.emit(w, cx)?;
                }
                Statement::Expression { expr, .. } => expr.emit(w, cx)?,
            }
            w.write_str(";\n")?;
        }
        cx.indent -= 1;
        cx.write_indent(w)?;
        w.write_str("}\n")?;
        Ok(())
    }
}

fn emit_body_items<W: Write>(
    items: &[BodyItem],
    w: &mut W,
    cx: &mut EmitCtx,
) -> Result<(), EmitError> {
    for item in items {
        item.emit(w, cx)?;
    }
    Ok(())
}

impl Emit for BodyItem {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        match self {
            BodyItem::Field(f) => f.emit(w, cx),
            BodyItem::Label(l) => {
                cx.write_indent(w)?;
                l.expr.emit(w, cx)?;
                w.write_str(":\n")?;
                Ok(())
            }
            BodyItem::Align(a) => {
                cx.write_indent(w)?;
                w.write_str("align(")?;
                a.expr.emit(w, cx)?;
                w.write_str("):\n")?;
                Ok(())
            }
            BodyItem::Function(f) => f.emit(w, cx),
            BodyItem::InlineUnion(u) => {
                emit_docstring(&u.docstring, w, cx)?;
                cx.write_indent(w)?;
                w.write_str("union {\n")?;
                cx.indent += 1;
                for case in &u.cases {
                    case.emit(w, cx)?;
                }
                cx.indent -= 1;
                cx.write_indent(w)?;
                write!(w, "}} {}", u.field_name)?;
                if let Some(constraint) = &u.constraint {
                    w.write_str(" : ")?;
                    constraint.emit(w, cx)?;
                }
                if let Some(condition) = &u.condition {
                    w.write_str(" if ")?;
                    condition.emit(w, cx)?;
                }
                w.write_str(";\n")?;
                Ok(())
            }
            BodyItem::InlineStruct(s) => {
                emit_docstring(&s.docstring, w, cx)?;
                cx.write_indent(w)?;
                w.write_str("{\n")?;
                cx.indent += 1;
                emit_body_items(&s.body, w, cx)?;
                cx.indent -= 1;
                cx.write_indent(w)?;
                write!(w, "}} {}", s.field_name)?;
                if let Some(constraint) = &s.constraint {
                    w.write_str(" : ")?;
                    constraint.emit(w, cx)?;
                }
                if let Some(condition) = &s.condition {
                    w.write_str(" if ")?;
                    condition.emit(w, cx)?;
                }
                w.write_str(";\n")?;
                Ok(())
            }
        }
    }
}

impl Emit for StructDef {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        emit_docstring(&self.docstring, w, cx)?;
        cx.write_indent(w)?;
        write!(w, "struct {}", self.name)?;
        emit_params(&self.parameters, w, cx)?;
        w.write_str(" {\n")?;
        cx.indent += 1;
        emit_body_items(&self.body, w, cx)?;
        cx.indent -= 1;
        cx.write_indent(w)?;
        w.write_str("};\n")?;
        Ok(())
    }
}

impl Emit for UnionCase {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        if self.is_anonymous_block {
            emit_docstring(&self.docstring, w, cx)?;
            cx.write_indent(w)?;
            w.write_str("{\n")?;
            cx.indent += 1;
            emit_body_items(&self.items, w, cx)?;
            cx.indent -= 1;
            cx.write_indent(w)?;
            write!(w, "}} {}", self.case_name)?;
            if let Some(condition) = &self.condition {
                w.write_str(" : ")?;
                condition.emit(w, cx)?;
            }
            w.write_str(";\n")?;
            Ok(())
        } else {
            // Simple case: one field whose inline-constraint slot carries the
            // case condition.
            match self.items.first() {
                Some(BodyItem::Field(field)) => {
                    let mut field = field.clone();
                    field.constraint = self.condition.clone();
                    field.emit(w, cx)
                }
                _ => emit_body_items(&self.items, w, cx),
            }
        }
    }
}

impl Emit for UnionDef {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        emit_docstring(&self.docstring, w, cx)?;
        cx.write_indent(w)?;
        write!(w, "union {}", self.name)?;
        emit_params(&self.parameters, w, cx)?;
        w.write_str(" {\n")?;
        cx.indent += 1;
        for case in &self.cases {
            case.emit(w, cx)?;
        }
        cx.indent -= 1;
        cx.write_indent(w)?;
        w.write_str("};\n")?;
        Ok(())
    }
}

impl Emit for ChoiceCase {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        emit_docstring(&self.docstring, w, cx)?;
        match &self.selector {
            CaseSelector::Exact(exprs) => {
                for (i, expr) in exprs.iter().enumerate() {
                    cx.write_indent(w)?;
                    w.write_str("case ")?;
                    expr.emit(w, cx)?;
                    w.write_char(':')?;
                    if i + 1 < exprs.len() {
                        w.write_char('\n')?;
                    }
                }
            }
            CaseSelector::Compare { kind, bound } => {
                cx.write_indent(w)?;
                write!(w, "case {} ", kind.symbol())?;
                bound.emit(w, cx)?;
                w.write_char(':')?;
            }
            CaseSelector::Default => {
                cx.write_indent(w)?;
                w.write_str("default:")?;
            }
        }
        w.write_char('\n')?;
        cx.indent += 1;
        if self.is_anonymous_block {
            cx.write_indent(w)?;
            w.write_str("{\n")?;
            cx.indent += 1;
            emit_body_items(&self.items, w, cx)?;
            cx.indent -= 1;
            cx.write_indent(w)?;
            write!(w, "}} {};\n", self.field_name)?;
        } else {
            emit_body_items(&self.items, w, cx)?;
        }
        cx.indent -= 1;
        Ok(())
    }
}

impl Emit for ChoiceDef {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        emit_docstring(&self.docstring, w, cx)?;
        cx.write_indent(w)?;
        write!(w, "choice {}", self.name)?;
        emit_params(&self.parameters, w, cx)?;
        match &self.discriminator {
            ChoiceDiscriminator::External(selector) => {
                w.write_str(" on ")?;
                selector.emit(w, cx)?;
            }
            ChoiceDiscriminator::Inline(ty) => {
                w.write_str(" : ")?;
                ty.emit(w, cx)?;
            }
        }
        w.write_str(" {\n")?;
        cx.indent += 1;
        for case in &self.cases {
            case.emit(w, cx)?;
        }
        cx.indent -= 1;
        cx.write_indent(w)?;
        w.write_str("};\n")?;
        Ok(())
    }
}
