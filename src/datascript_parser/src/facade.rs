use crate::declarations::parse_module;
use crate::errors::{error_tree_to_parse_error, ParseError};
use crate::span::new_span;
use crate::trivia::ws;
use nom::Finish;
use syntax::declarations::Module;

/// Public parser facade.
#[derive(Default)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Parser
    }

    /// Parse a complete schema source. `file` is stamped into every node
    /// position and into any parse error.
    pub fn parse(&self, source: &str, file: &str) -> Result<Module, ParseError> {
        let span = new_span(source, file);
        match parse_module(span).finish() {
            Ok((remaining, module)) => {
                // Anything but trivia after the last declaration is an error.
                let (remaining, _) = ws(remaining).finish().map_err(|e| {
                    error_tree_to_parse_error(file, &e)
                })?;
                if remaining.fragment().is_empty() {
                    Ok(module)
                } else {
                    Err(ParseError {
                        file: file.to_string(),
                        line: remaining.location_line(),
                        column: remaining.get_utf8_column() as u32,
                        message: format!(
                            "unexpected trailing input: {:?}",
                            remaining.fragment().chars().take(40).collect::<String>()
                        ),
                    })
                }
            }
            Err(tree) => Err(error_tree_to_parse_error(file, &tree)),
        }
    }
}
