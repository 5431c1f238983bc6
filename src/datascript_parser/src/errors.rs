use crate::span::Span;
use nom::IResult;
use nom_supreme::error::{BaseErrorKind, ErrorTree, StackContext};
use thiserror::Error;

pub type PResult<'a, O> = IResult<Span<'a>, O, ErrorTree<Span<'a>>>;

/// Unrecoverable failure at `location` with a free-form message. Used for
/// limit violations and malformed literals where backtracking would only
/// produce a worse diagnostic.
pub fn external_failure(
    location: Span<'_>,
    message: impl Into<String>,
) -> nom::Err<ErrorTree<Span<'_>>> {
    nom::Err::Failure(ErrorTree::Base {
        location,
        kind: BaseErrorKind::External(message.into().into()),
    })
}

/// Structured parse failure with the position of the deepest error and the
/// expectation that was not met. The parser never panics on malformed input;
/// this is the only failure surface.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{file}:{line}:{column}: error: {message}")]
pub struct ParseError {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Build a failure message from a nom-supreme error tree: pick the branch
/// that progressed furthest into the input and describe what was expected
/// there, with the innermost grammar context for orientation.
pub fn error_tree_to_parse_error(file: &str, tree: &ErrorTree<Span<'_>>) -> ParseError {
    let deepest = deepest_base(tree);
    match deepest {
        Some((location, kind, contexts)) => {
            let expected = match kind {
                BaseErrorKind::Expected(expectation) => format!("expected {}", expectation),
                BaseErrorKind::Kind(k) => format!("unexpected token ({:?})", k),
                BaseErrorKind::External(e) => e.to_string(),
            };
            let message = match contexts.last() {
                Some(ctx) => format!("{} while parsing {}", expected, ctx),
                None => expected,
            };
            ParseError {
                file: file.to_string(),
                line: location.0,
                column: location.1,
                message,
            }
        }
        None => ParseError {
            file: file.to_string(),
            line: 1,
            column: 1,
            message: "unexpected token".to_string(),
        },
    }
}

type DeepestBase<'t> = (
    (u32, u32),
    &'t BaseErrorKind<&'static str, Box<dyn std::error::Error + Send + Sync + 'static>>,
    Vec<&'static str>,
);

fn deepest_base<'t>(tree: &'t ErrorTree<Span<'_>>) -> Option<DeepestBase<'t>> {
    fn walk<'t>(
        tree: &'t ErrorTree<Span<'_>>,
        contexts: &mut Vec<&'static str>,
        best: &mut Option<(usize, DeepestBase<'t>)>,
    ) {
        match tree {
            ErrorTree::Base { location, kind } => {
                let offset = location.location_offset();
                let candidate = (
                    (location.location_line(), location.get_utf8_column() as u32),
                    kind,
                    contexts.clone(),
                );
                match best {
                    Some((best_offset, _)) if *best_offset >= offset => {}
                    _ => *best = Some((offset, candidate)),
                }
            }
            ErrorTree::Stack { base, contexts: cs } => {
                let pushed = cs
                    .iter()
                    .filter_map(|(_, c)| match c {
                        StackContext::Context(name) => Some(*name),
                        StackContext::Kind(_) => None,
                    })
                    .collect::<Vec<_>>();
                contexts.extend(&pushed);
                walk(base, contexts, best);
                contexts.truncate(contexts.len() - pushed.len());
            }
            ErrorTree::Alt(alternatives) => {
                for alt in alternatives {
                    walk(alt, contexts, best);
                }
            }
        }
    }

    let mut best = None;
    walk(tree, &mut Vec::new(), &mut best);
    best.map(|(_, found)| found)
}
