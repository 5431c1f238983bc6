use crate::errors::PResult;
use crate::span::Span;
use nom::bytes::complete::{tag, take_until};
use nom::character::complete::multispace1;
use nom::error::{ErrorKind, ParseError as NomParseError};
use nom_supreme::error::ErrorTree;

/// Skip one piece of trivia: whitespace, a `//` line comment, or a block
/// comment (doc blocks included). Fails when the input starts with none.
fn trivia_piece(input: Span<'_>) -> PResult<'_, ()> {
    if let Ok((rest, _)) = multispace1::<_, ErrorTree<Span>>(input) {
        return Ok((rest, ()));
    }
    if input.fragment().starts_with("//") {
        let end = input
            .fragment()
            .find('\n')
            .map(|i| i + 1)
            .unwrap_or(input.fragment().len());
        let (rest, _) = nom::bytes::complete::take::<_, _, ErrorTree<Span>>(end)(input)?;
        return Ok((rest, ()));
    }
    if input.fragment().starts_with("/*") {
        let (after_open, _) = tag::<_, _, ErrorTree<Span>>("/*")(input)?;
        let (after_body, _) = take_until::<_, _, ErrorTree<Span>>("*/")(after_open)?;
        let (rest, _) = tag::<_, _, ErrorTree<Span>>("*/")(after_body)?;
        return Ok((rest, ()));
    }
    Err(nom::Err::Error(ErrorTree::from_error_kind(
        input,
        ErrorKind::Space,
    )))
}

/// Skip any run of whitespace and comments. Never fails.
pub fn ws(mut input: Span<'_>) -> PResult<'_, ()> {
    loop {
        match trivia_piece(input) {
            Ok((rest, _)) => input = rest,
            Err(_) => return Ok((input, ())),
        }
    }
}

/// Skip trivia while capturing the last `/** ... */` doc comment seen, so a
/// docstring separated from its declaration only by blank lines and ordinary
/// comments still attaches. Returns `None` when no doc comment precedes the
/// next token, or when the comment normalizes to the empty string.
pub fn leading_doc(mut input: Span<'_>) -> PResult<'_, Option<String>> {
    let mut doc: Option<String> = None;
    loop {
        if input.fragment().starts_with("/**") && !input.fragment().starts_with("/**/") {
            let (after_open, _) = tag::<_, _, ErrorTree<Span>>("/**")(input)?;
            let (after_body, body) = take_until::<_, _, ErrorTree<Span>>("*/")(after_open)?;
            let (rest, _) = tag::<_, _, ErrorTree<Span>>("*/")(after_body)?;
            doc = normalize_docstring(body.fragment());
            input = rest;
            continue;
        }
        match trivia_piece(input) {
            Ok((rest, _)) => input = rest,
            Err(_) => return Ok((input, doc)),
        }
    }
}

/// Strip the Javadoc frame from a doc-comment body: per line, leading
/// whitespace and asterisk runs go, trailing whitespace goes, and blank
/// lines at both ends are dropped. Idempotent by construction.
pub fn normalize_docstring(body: &str) -> Option<String> {
    let mut lines: Vec<&str> = body
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .collect();
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::new_span;

    #[test]
    fn ws_skips_comments_and_whitespace() {
        let input = new_span("  // line\n  /* block */  x", "t.ds");
        let (rest, _) = ws(input).unwrap();
        assert_eq!(*rest.fragment(), "x");
    }

    #[test]
    fn leading_doc_captures_last_doc_block() {
        let input = new_span("/** first */\n/** second */\nstruct", "t.ds");
        let (rest, doc) = leading_doc(input).unwrap();
        assert_eq!(*rest.fragment(), "struct");
        assert_eq!(doc.as_deref(), Some("second"));
    }

    #[test]
    fn docstring_normalization_is_idempotent() {
        let body = "\n * Line one\n *\n * Line two\n ";
        let once = normalize_docstring(body).unwrap();
        let twice = normalize_docstring(&once).unwrap();
        assert_eq!(once, "Line one\n\nLine two");
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_docstring_becomes_absent() {
        assert_eq!(normalize_docstring("  \n * \n "), None);
    }
}
