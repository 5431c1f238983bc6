use crate::errors::{external_failure, PResult};
use crate::keywords::kw;
use crate::limits::MAX_STRING_LITERAL_LENGTH;
use crate::span::{pos, Span};
use crate::trivia::ws;
use nom::bytes::complete::take_while1;
use nom::character::complete::char as nom_char;
use nom::error::{ErrorKind, ParseError as NomParseError};
use nom::sequence::preceded;
use nom::Parser;
use nom_supreme::error::ErrorTree;
use syntax::expressions::Literal;

fn literal_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Decode an integer literal word in any of the supported bases:
/// decimal, `0x` hex, `0b`/trailing-`b` binary, leading-`0` octal.
/// Overflow past 64 bits and malformed digits are invalid-literal errors.
fn decode_integer(word: &str) -> Result<u64, String> {
    let lower = word.to_ascii_lowercase();
    let (digits, radix): (&str, u32) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else if let Some(rest) = lower.strip_suffix('b') {
        (rest, 2)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        (lower.as_str(), 10)
    };
    if digits.is_empty() {
        return Err(format!("invalid integer literal '{}'", word));
    }
    u64::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => {
            format!("integer literal '{}' overflows 64 bits", word)
        }
        _ => format!("invalid integer literal '{}'", word),
    })
}

/// Integer literal token. The sign of a negative number comes from a
/// surrounding unary-neg expression, never from the literal itself.
pub fn integer_literal(input: Span<'_>) -> PResult<'_, Literal> {
    let start = pos(&input);
    let (rest, word) = preceded(ws, take_while1(literal_char)).parse(input)?;
    let first = word.fragment().chars().next().unwrap_or('\0');
    if !first.is_ascii_digit() {
        return Err(nom::Err::Error(ErrorTree::from_error_kind(
            input,
            ErrorKind::Digit,
        )));
    }
    match decode_integer(word.fragment()) {
        Ok(value) => Ok((rest, Literal::Int { pos: start, value })),
        Err(message) => Err(external_failure(word, message)),
    }
}

pub fn bool_literal(input: Span<'_>) -> PResult<'_, Literal> {
    let start = pos(&input);
    if let Ok((rest, _)) = kw("true")(input) {
        return Ok((
            rest,
            Literal::Bool {
                pos: start,
                value: true,
            },
        ));
    }
    let (rest, _) = kw("false")(input)?;
    Ok((
        rest,
        Literal::Bool {
            pos: start,
            value: false,
        },
    ))
}

/// String literal with `\n \r \t \\ \"` escapes; any other escaped byte is
/// preserved verbatim, backslash included.
pub fn string_literal(input: Span<'_>) -> PResult<'_, Literal> {
    let (after_ws, _) = ws(input)?;
    let start = pos(&after_ws);
    let (mut cursor, _) = nom_char::<_, ErrorTree<Span>>('"')(after_ws)?;
    let mut value = String::new();
    let mut chars = cursor.fragment().char_indices();
    loop {
        let Some((offset, ch)) = chars.next() else {
            return Err(external_failure(cursor, "unterminated string literal"));
        };
        match ch {
            '"' => {
                let consumed = offset + 1;
                let (rest, _) =
                    nom::bytes::complete::take::<_, _, ErrorTree<Span>>(consumed)(cursor)?;
                cursor = rest;
                break;
            }
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, 't')) => value.push('\t'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, '"')) => value.push('"'),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => {
                    return Err(external_failure(cursor, "unterminated string literal"));
                }
            },
            other => value.push(other),
        }
        if value.len() > MAX_STRING_LITERAL_LENGTH {
            return Err(external_failure(
                cursor,
                format!("string literal exceeds {} bytes", MAX_STRING_LITERAL_LENGTH),
            ));
        }
    }
    Ok((
        cursor,
        Literal::Str {
            pos: start,
            value,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::new_span;

    fn int_value(src: &str) -> u64 {
        match integer_literal(new_span(src, "t.ds")).unwrap().1 {
            Literal::Int { value, .. } => value,
            other => panic!("expected int literal, got {:?}", other),
        }
    }

    #[test]
    fn decodes_all_bases() {
        assert_eq!(int_value("42"), 42);
        assert_eq!(int_value("0x2A"), 42);
        assert_eq!(int_value("0b101010"), 42);
        assert_eq!(int_value("101010b"), 42);
        assert_eq!(int_value("052"), 42);
        assert_eq!(int_value("0"), 0);
        assert_eq!(int_value("0xFFFFFFFFFFFFFFFF"), u64::MAX);
    }

    #[test]
    fn rejects_malformed_literals() {
        assert!(integer_literal(new_span("0x", "t.ds")).is_err());
        assert!(integer_literal(new_span("0xG1", "t.ds")).is_err());
        assert!(integer_literal(new_span("089", "t.ds")).is_err());
        assert!(integer_literal(new_span("0x10000000000000000", "t.ds")).is_err());
    }

    #[test]
    fn string_escapes() {
        let (_, lit) = string_literal(new_span(r#""a\tb\n\"q\"""#, "t.ds")).unwrap();
        match lit {
            Literal::Str { value, .. } => assert_eq!(value, "a\tb\n\"q\""),
            other => panic!("expected string literal, got {:?}", other),
        }
    }
}
