use crate::errors::PResult;
use crate::span::Span;
use crate::trivia::ws;
use nom::bytes::complete::tag;
use nom::character::complete::char as nom_char;
use nom::combinator::{not, peek};
use nom::sequence::preceded;
use nom::Parser;
use nom_supreme::tag::complete::tag as sup_tag;

/// Single punctuation character, preceded by any trivia.
pub fn tok(expected: char) -> impl FnMut(Span) -> PResult<char> {
    move |input: Span| preceded(ws, nom_char(expected)).parse(input)
}

/// Multi-character punctuation (`..`, `<<`, `==`, ...), preceded by trivia.
pub fn tok_tag(expected: &'static str) -> impl FnMut(Span) -> PResult<Span> {
    move |input: Span| preceded(ws, sup_tag(expected)).parse(input)
}

/// Punctuation that must not be followed by `disallow` (distinguishes `&`
/// from `&&`, `<` from `<<`, and the like).
pub fn tok_not_followed_by(
    expected: char,
    disallow: char,
) -> impl FnMut(Span) -> PResult<char> {
    move |input: Span| {
        preceded(ws, nom_char(expected))
            .and(not(nom_char(disallow)))
            .map(|(c, _)| c)
            .parse(input)
    }
}

/// Peek a punctuation character after trivia without consuming anything.
pub fn peek_tok(expected: char) -> impl FnMut(Span) -> PResult<char> {
    move |input: Span| peek(preceded(ws, nom_char(expected))).parse(input)
}

/// `..` range separator; must not match a single `.`.
pub fn tok_dotdot(input: Span) -> PResult<Span> {
    preceded(ws, sup_tag("..")).parse(input)
}

/// A single `.` that is not the start of `..`.
pub fn tok_dot(input: Span) -> PResult<char> {
    preceded(ws, nom_char('.'))
        .and(not(tag(".")))
        .map(|(c, _)| c)
        .parse(input)
}
