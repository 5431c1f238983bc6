use crate::errors::PResult;
use crate::span::Span;
use crate::trivia::ws;
use nom::bytes::complete::tag;
use nom::character::complete::satisfy;
use nom::combinator::{not, peek};
use nom::sequence::{preceded, terminated};
use nom::Parser;
use nom_supreme::ParserExt;

/// Reserved words of the schema language. Identifiers may not collide with
/// any of these.
pub static KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "const", "package", "import", "struct", "union", "choice", "enum",
    "bitmask", "subtype", "constraint", "function", "return", "if", "on",
    "case", "default", "align", "little", "big", "bool", "string",
    "u16string", "u32string", "bit", "typedef", "optional", "true", "false",
    "uint8", "uint16", "uint32", "uint64", "uint128",
    "int8", "int16", "int32", "int64", "int128",
};

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}

fn ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Exact keyword with a word boundary, preceded by trivia.
pub fn kw(word: &'static str) -> impl FnMut(Span) -> PResult<Span> {
    move |input: Span| {
        preceded(
            ws,
            terminated(tag(word), not(satisfy(ident_continue))),
        )
        .context(word)
        .parse(input)
    }
}

/// Peek a keyword without consuming it.
pub fn peek_kw(word: &'static str) -> impl FnMut(Span) -> PResult<Span> {
    move |input: Span| peek(kw(word)).parse(input)
}
