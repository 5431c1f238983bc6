use crate::errors::{external_failure, PResult};
use crate::keywords::is_keyword;
use crate::limits::MAX_IDENTIFIER_LENGTH;
use crate::span::Span;
use crate::trivia::ws;
use nom::bytes::complete::take_while1;
use nom::error::{ErrorKind, ParseError as NomParseError};
use nom::sequence::preceded;
use nom::Parser;
use nom_supreme::error::{BaseErrorKind, ErrorTree, Expectation};

fn ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A raw word: identifier-shaped, keywords included. Used by the type
/// grammar to classify primitive keywords before falling back to names.
pub fn word(input: Span<'_>) -> PResult<'_, Span<'_>> {
    let (rest, w) = preceded(ws, take_while1(ident_char)).parse(input)?;
    if w.fragment()
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
    {
        return Err(nom::Err::Error(ErrorTree::Base {
            location: input,
            kind: BaseErrorKind::Expected(Expectation::Alpha),
        }));
    }
    Ok((rest, w))
}

/// An identifier: a word that is not a keyword and fits the length cap.
pub fn identifier(input: Span<'_>) -> PResult<'_, String> {
    let (rest, w) = word(input)?;
    if is_keyword(w.fragment()) {
        return Err(nom::Err::Error(ErrorTree::from_error_kind(
            input,
            ErrorKind::Tag,
        )));
    }
    if w.fragment().len() > MAX_IDENTIFIER_LENGTH {
        return Err(external_failure(
            w,
            format!("identifier exceeds {} bytes", MAX_IDENTIFIER_LENGTH),
        ));
    }
    Ok((rest, w.fragment().to_string()))
}
