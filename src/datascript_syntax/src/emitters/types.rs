use crate::emitters::emit_trait::{Emit, EmitCtx, EmitError};
use crate::types::{ArraySizing, BitFieldWidth, Endian, StringEncoding, Type};
use std::fmt::Write;

fn emit_endian_prefix<W: Write>(endian: Endian, w: &mut W) -> Result<(), EmitError> {
    match endian {
        Endian::Little => w.write_str("little ")?,
        Endian::Big => w.write_str("big ")?,
        Endian::Unspec => {}
    }
    Ok(())
}

impl Emit for Type {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError> {
        match self {
            Type::Primitive(p) => {
                emit_endian_prefix(p.byte_order, w)?;
                w.write_str(&p.keyword())?;
                Ok(())
            }
            Type::BitField(bf) => match &bf.width {
                BitFieldWidth::Fixed(n) => {
                    write!(w, "bit:{}", n)?;
                    Ok(())
                }
                BitFieldWidth::Expr(e) => {
                    w.write_str("bit:(")?;
                    e.emit(w, cx)?;
                    w.write_char(')')?;
                    Ok(())
                }
            },
            Type::Bool { .. } => {
                w.write_str("bool")?;
                Ok(())
            }
            Type::Str(s) => {
                if s.encoding != StringEncoding::Utf8 {
                    emit_endian_prefix(s.byte_order, w)?;
                }
                w.write_str(s.encoding.keyword())?;
                Ok(())
            }
            Type::Named(q) => {
                w.write_str(&q.dotted())?;
                Ok(())
            }
            Type::Array(arr) => {
                arr.element.emit(w, cx)?;
                match &arr.sizing {
                    ArraySizing::Fixed(size) => {
                        w.write_char('[')?;
                        size.emit(w, cx)?;
                        w.write_char(']')?;
                    }
                    ArraySizing::Ranged { min, max } => {
                        w.write_char('[')?;
                        if let Some(min) = min {
                            min.emit(w, cx)?;
                        }
                        w.write_str("..")?;
                        max.emit(w, cx)?;
                        w.write_char(']')?;
                    }
                    ArraySizing::Unsized => w.write_str("[]")?,
                }
                Ok(())
            }
            Type::Instantiation(inst) => {
                w.write_str(&inst.base.dotted())?;
                w.write_char('(')?;
                for (i, arg) in inst.arguments.iter().enumerate() {
                    if i > 0 {
                        w.write_str(", ")?;
                    }
                    arg.emit(w, cx)?;
                }
                w.write_char(')')?;
                Ok(())
            }
        }
    }
}
