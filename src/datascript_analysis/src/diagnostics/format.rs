use crate::diagnostics::diagnostic::Diagnostic;
use crate::diagnostics::severity::Severity;
use std::fmt::Write;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Render one diagnostic in the canonical form:
/// `file:line:column: <level>[<code>]: <message>` plus indented follow-up
/// lines for the related location and the suggestion.
pub fn render(d: &Diagnostic, use_color: bool) -> String {
    let mut out = String::new();
    let (color, reset) = if use_color {
        let c = match d.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Note => CYAN,
        };
        (c, RESET)
    } else {
        ("", "")
    };
    let _ = write!(
        out,
        "{}: {}{}[{}]{}: {}",
        d.pos,
        color,
        d.severity,
        d.code.as_str(),
        reset,
        d.message
    );
    if let Some(related) = &d.related {
        let _ = write!(out, "\n  {}: note: {}", related.pos, related.message);
    }
    if let Some(suggestion) = &d.suggestion {
        let _ = write!(out, "\n  suggestion: {}", suggestion);
    }
    out
}

/// Render a whole list, one diagnostic per line block.
pub fn render_all<'a>(
    diagnostics: impl IntoIterator<Item = &'a Diagnostic>,
    use_color: bool,
) -> String {
    let mut out = String::new();
    for d in diagnostics {
        out.push_str(&render(d, use_color));
        out.push('\n');
    }
    out
}
