use crate::declarations::Module;
use crate::emitters::emit_trait::{Emit, EmitCtx, EmitError};
use crate::types::Endian;
use std::fmt::Write;

impl Emit for Module {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        if let Some(package) = &self.package {
            write!(w, "package {};\n", package.dotted())?;
        }
        for import in &self.imports {
            write!(w, "import {}", import.dotted())?;
            if import.is_wildcard {
                w.write_str(".*")?;
            }
            w.write_str(";\n")?;
        }
        if self.default_endianness == Endian::Little {
            w.write_str("little;\n")?;
        }
        for c in &self.constants {
            c.emit(w, cx)?;
        }
        for s in &self.subtypes {
            s.emit(w, cx)?;
        }
        for c in &self.constraints {
            c.emit(w, cx)?;
        }
        for t in &self.type_aliases {
            t.emit(w, cx)?;
        }
        for e in &self.enums {
            e.emit(w, cx)?;
        }
        for s in &self.structs {
            s.emit(w, cx)?;
        }
        for u in &self.unions {
            u.emit(w, cx)?;
        }
        for c in &self.choices {
            c.emit(w, cx)?;
        }
        Ok(())
    }
}
