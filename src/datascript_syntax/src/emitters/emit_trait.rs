use std::fmt::{self, Write};

#[derive(Debug)]
pub struct EmitError(pub fmt::Error);

impl From<fmt::Error> for EmitError {
    fn from(e: fmt::Error) -> Self {
        EmitError(e)
    }
}

#[derive(Default)]
pub struct EmitCtx {
    pub indent: usize,
}

impl EmitCtx {
    pub fn new() -> Self {
        Self { indent: 0 }
    }

    pub fn write_indent<W: Write>(&self, w: &mut W) -> Result<(), EmitError> {
        for _ in 0..self.indent {
            w.write_str("    ")?;
        }
        Ok(())
    }
}

pub trait Emit {
    fn emit<W: Write>(&self, w: &mut W, cx: &mut EmitCtx) -> Result<(), EmitError>;
}

pub struct Emitter;

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self
    }

    pub fn write<T: Emit>(&self, item: &T) -> Result<String, EmitError> {
        let mut s = String::new();
        let mut cx = EmitCtx::new();
        item.emit(&mut s, &mut cx)?;
        Ok(s)
    }
}

/// Emit a docstring as a `/** ... */` block, one source line per line,
/// in the shape the doc-comment scanner normalizes back to the same string.
pub fn emit_docstring<W: Write>(
    doc: &Option<String>,
    w: &mut W,
    cx: &mut EmitCtx,
) -> Result<(), EmitError> {
    let Some(text) = doc else {
        return Ok(());
    };
    cx.write_indent(w)?;
    w.write_str("/**\n")?;
    for line in text.lines() {
        cx.write_indent(w)?;
        if line.is_empty() {
            w.write_str(" *\n")?;
        } else {
            write!(w, " * {}\n", line)?;
        }
    }
    cx.write_indent(w)?;
    w.write_str(" */\n")?;
    Ok(())
}
