use crate::errors::{external_failure, PResult};
use crate::expressions::{argument_list, parse_expression};
use crate::identifier::{identifier, word};
use crate::keywords::is_keyword;
use crate::literals::integer_literal;
use crate::span::{pos, Span};
use crate::tokens::{tok, tok_dot, tok_dotdot};
use crate::trivia::ws;
use nom::error::{ErrorKind, ParseError as NomParseError};
use nom_supreme::error::ErrorTree;
use syntax::expressions::Literal;
use syntax::types::{
    ArraySizing, ArrayType, BitFieldType, BitFieldWidth, Endian, PrimitiveType, QualifiedName,
    StringEncoding, StringType, Type, TypeInstantiation,
};

/// Integer primitive keywords to (signedness, width).
fn primitive_spec(word: &str) -> Option<(bool, u32)> {
    let (is_signed, width_str) = if let Some(rest) = word.strip_prefix("uint") {
        (false, rest)
    } else if let Some(rest) = word.strip_prefix("int") {
        (true, rest)
    } else {
        return None;
    };
    match width_str {
        "8" => Some((is_signed, 8)),
        "16" => Some((is_signed, 16)),
        "32" => Some((is_signed, 32)),
        "64" => Some((is_signed, 64)),
        "128" => Some((is_signed, 128)),
        _ => None,
    }
}

/// Dotted name: `ident (. ident)*`.
pub fn qualified_name(input: Span<'_>) -> PResult<'_, QualifiedName> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (mut rest, first) = identifier(input)?;
    let mut parts = vec![first];
    while let Ok((after_dot, _)) = tok_dot(rest) {
        let Ok((after_part, part)) = identifier(after_dot) else {
            break;
        };
        parts.push(part);
        rest = after_part;
    }
    Ok((rest, QualifiedName { pos: start, parts }))
}

fn bitfield(input: Span<'_>) -> PResult<'_, Type> {
    let start = pos(&input);
    let (rest, _) = tok(':')(input)?;
    if let Ok((rest, _)) = tok('(')(rest) {
        let (rest, width_expr) = parse_expression(rest)?;
        let (rest, _) = tok(')')(rest)?;
        return Ok((
            rest,
            Type::BitField(BitFieldType {
                pos: start,
                width: BitFieldWidth::Expr(width_expr),
            }),
        ));
    }
    let (rest, lit) = integer_literal(rest)?;
    let Literal::Int { value, .. } = lit else {
        return Err(nom::Err::Error(ErrorTree::from_error_kind(
            input,
            ErrorKind::Digit,
        )));
    };
    if value == 0 {
        return Err(external_failure(input, "bitfield width must be at least 1"));
    }
    Ok((
        rest,
        Type::BitField(BitFieldType {
            pos: start,
            width: BitFieldWidth::Fixed(value),
        }),
    ))
}

/// Base type without array suffixes: primitive, bitfield, string flavor,
/// bool, qualified name or type instantiation. An endianness keyword may
/// prefix integer primitives and the wide string types.
fn base_type(input: Span<'_>) -> PResult<'_, Type> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (after_word, w) = word(input)?;
    let text = *w.fragment();

    let (byte_order, after_prefix, prefixed) = match text {
        "little" => (Endian::Little, after_word, true),
        "big" => (Endian::Big, after_word, true),
        _ => (Endian::Unspec, input, false),
    };

    let (after_word, w) = if prefixed {
        word(after_prefix)?
    } else {
        (after_word, w)
    };
    let text = *w.fragment();

    if let Some((is_signed, bits)) = primitive_spec(text) {
        return Ok((
            after_word,
            Type::Primitive(PrimitiveType {
                pos: start,
                is_signed,
                bits,
                byte_order,
            }),
        ));
    }
    match text {
        "string" | "u16string" | "u32string" => {
            let encoding = match text {
                "string" => StringEncoding::Utf8,
                "u16string" => StringEncoding::Utf16,
                _ => StringEncoding::Utf32,
            };
            if encoding == StringEncoding::Utf8 && prefixed {
                // No byte order on a single-byte encoding.
                return Err(nom::Err::Error(ErrorTree::from_error_kind(
                    input,
                    ErrorKind::Tag,
                )));
            }
            return Ok((
                after_word,
                Type::Str(StringType {
                    pos: start,
                    encoding,
                    byte_order,
                }),
            ));
        }
        "bool" if !prefixed => {
            return Ok((after_word, Type::Bool { pos: start }));
        }
        "bit" if !prefixed => {
            return bitfield(after_word).map(|(rest, ty)| (rest, reposition_bitfield(ty, start)));
        }
        _ => {}
    }
    if prefixed || is_keyword(text) {
        return Err(nom::Err::Error(ErrorTree::from_error_kind(
            input,
            ErrorKind::Tag,
        )));
    }

    // User-defined type reference, possibly parameterized.
    let (rest, qname) = qualified_name(input)?;
    if let Ok((after_open, _)) = tok('(')(rest) {
        let (after_args, arguments) = argument_list(after_open, 0)?;
        if !arguments.is_empty() {
            if let Ok((after_close, _)) = tok(')')(after_args) {
                return Ok((
                    after_close,
                    Type::Instantiation(TypeInstantiation {
                        pos: start,
                        base: qname,
                        arguments,
                    }),
                ));
            }
        }
    }
    Ok((rest, Type::Named(qname)))
}

fn reposition_bitfield(ty: Type, start: syntax::SourcePos) -> Type {
    match ty {
        Type::BitField(bf) => Type::BitField(BitFieldType { pos: start, ..bf }),
        other => other,
    }
}

/// Full type: base type plus any number of array suffixes, applied left to
/// right (`uint8[4][]` is an unsized array of 4-byte arrays).
pub fn parse_type(input: Span<'_>) -> PResult<'_, Type> {
    let (input, _) = ws(input)?;
    let (rest, ty) = base_type(input)?;
    array_suffixes(rest, ty)
}

/// Any number of `[...]` array suffixes wrapped around `ty`. Also used
/// after a field name, where C-style declarations put the suffix.
pub fn array_suffixes(input: Span<'_>, ty: Type) -> PResult<'_, Type> {
    let start = ty.pos().clone();
    let (mut rest, mut ty) = (input, ty);
    loop {
        let Ok((after_open, _)) = tok('[')(rest) else {
            return Ok((rest, ty));
        };
        // Unsized: T[]
        if let Ok((after_close, _)) = tok(']')(after_open) {
            ty = Type::Array(Box::new(ArrayType {
                pos: start.clone(),
                element: ty,
                sizing: ArraySizing::Unsized,
            }));
            rest = after_close;
            continue;
        }
        // Ranged with omitted minimum: T[..max]
        if let Ok((after_dots, _)) = tok_dotdot(after_open) {
            let (after_max, max) = parse_expression(after_dots)?;
            let (after_close, _) = tok(']')(after_max)?;
            ty = Type::Array(Box::new(ArrayType {
                pos: start.clone(),
                element: ty,
                sizing: ArraySizing::Ranged { min: None, max },
            }));
            rest = after_close;
            continue;
        }
        let (after_expr, first) = parse_expression(after_open)?;
        // Ranged: T[min..max]
        if let Ok((after_dots, _)) = tok_dotdot(after_expr) {
            let (after_max, max) = parse_expression(after_dots)?;
            let (after_close, _) = tok(']')(after_max)?;
            ty = Type::Array(Box::new(ArrayType {
                pos: start.clone(),
                element: ty,
                sizing: ArraySizing::Ranged {
                    min: Some(first),
                    max,
                },
            }));
            rest = after_close;
            continue;
        }
        // Fixed: T[size]
        let (after_close, _) = tok(']')(after_expr)?;
        ty = Type::Array(Box::new(ArrayType {
            pos: start.clone(),
            element: ty,
            sizing: ArraySizing::Fixed(first),
        }));
        rest = after_close;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::new_span;

    fn parse(src: &str) -> Type {
        let (rest, ty) = parse_type(new_span(src, "t.ds")).unwrap();
        assert!(rest.fragment().trim().is_empty());
        ty
    }

    #[test]
    fn primitives_with_endianness() {
        let Type::Primitive(p) = parse("little uint16") else {
            panic!("expected primitive");
        };
        assert!(!p.is_signed);
        assert_eq!(p.bits, 16);
        assert_eq!(p.byte_order, Endian::Little);

        let Type::Primitive(p) = parse("int128") else {
            panic!("expected primitive");
        };
        assert!(p.is_signed);
        assert_eq!(p.bits, 128);
        assert_eq!(p.byte_order, Endian::Unspec);
    }

    #[test]
    fn bitfield_forms() {
        let Type::BitField(bf) = parse("bit:3") else {
            panic!("expected bitfield");
        };
        assert_eq!(bf.width, BitFieldWidth::Fixed(3));

        let Type::BitField(bf) = parse("bit:(N + 1)") else {
            panic!("expected bitfield");
        };
        assert!(matches!(bf.width, BitFieldWidth::Expr(_)));
    }

    #[test]
    fn array_suffixes() {
        let Type::Array(arr) = parse("uint8[]") else {
            panic!("expected array");
        };
        assert_eq!(arr.sizing, ArraySizing::Unsized);

        let Type::Array(arr) = parse("uint8[16]") else {
            panic!("expected array");
        };
        assert!(matches!(arr.sizing, ArraySizing::Fixed(_)));

        let Type::Array(arr) = parse("uint8[4..16]") else {
            panic!("expected array");
        };
        assert!(matches!(
            arr.sizing,
            ArraySizing::Ranged { min: Some(_), .. }
        ));

        let Type::Array(arr) = parse("uint8[..16]") else {
            panic!("expected array");
        };
        assert!(matches!(arr.sizing, ArraySizing::Ranged { min: None, .. }));
    }

    #[test]
    fn qualified_and_instantiated() {
        let Type::Named(q) = parse("pkg.sub.Header") else {
            panic!("expected named type");
        };
        assert_eq!(q.parts, vec!["pkg", "sub", "Header"]);

        let Type::Instantiation(inst) = parse("Record(16, 2)") else {
            panic!("expected instantiation");
        };
        assert_eq!(inst.base.parts, vec!["Record"]);
        assert_eq!(inst.arguments.len(), 2);
    }
}
