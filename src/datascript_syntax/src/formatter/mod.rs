use crate::declarations::Module;
use crate::emitters::{Emit, EmitCtx, EmitError};

/// Canonical-form options. The printer always uses four-space indents and
/// `\n` newlines; options exist so callers can pin them explicitly in tests.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub newline: &'static str,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions { newline: "\n" }
    }
}

/// Pretty-printer producing canonical schema text from an AST. Output is
/// designed to re-parse to a structurally identical module, which the
/// round-trip tests rely on.
pub struct Formatter {
    opts: FormatOptions,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(FormatOptions::default())
    }
}

impl Formatter {
    pub fn new(opts: FormatOptions) -> Self {
        Formatter { opts }
    }

    pub fn format_module(&self, module: &Module) -> Result<String, EmitError> {
        let mut out = String::new();
        let mut cx = EmitCtx::new();
        module.emit(&mut out, &mut cx)?;
        if self.opts.newline != "\n" {
            out = out.replace('\n', self.opts.newline);
        }
        Ok(out)
    }
}
