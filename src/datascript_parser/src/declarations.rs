use crate::errors::{external_failure, PResult};
use crate::expressions::parse_expression;
use crate::identifier::identifier;
use crate::keywords::{kw, peek_kw};
use crate::span::{pos, Span};
use crate::tokens::{peek_tok, tok};
use crate::trivia::{leading_doc, ws};
use crate::types::{array_suffixes, parse_type};
use log::trace;
use nom::error::{ErrorKind, ParseError as NomParseError};
use nom_supreme::error::ErrorTree;
use syntax::declarations::{
    AlignmentDirective, BodyItem, CaseSelector, ChoiceCase, ChoiceDef, ChoiceDiscriminator,
    CompareKind, ConstantDef, ConstraintDef, EnumDef, EnumItem, FieldDef, FunctionDef,
    ImportDecl, InlineStructField, InlineUnionField, LabelDirective, Module, PackageDecl, Param,
    Statement, StructDef, SubtypeDef, TypeAliasDef, UnionCase, UnionDef,
};
use syntax::types::Endian;

fn to_failure(err: nom::Err<ErrorTree<Span<'_>>>) -> nom::Err<ErrorTree<Span<'_>>> {
    match err {
        nom::Err::Error(e) => nom::Err::Failure(e),
        other => other,
    }
}

fn dotted_name(input: Span<'_>) -> PResult<'_, Vec<String>> {
    let (mut rest, first) = identifier(input)?;
    let mut parts = vec![first];
    loop {
        let Ok((after_dot, _)) = tok('.')(rest) else {
            return Ok((rest, parts));
        };
        // A trailing `.*` belongs to the import parser.
        if peek_tok('*')(after_dot).is_ok() {
            return Ok((rest, parts));
        }
        let (after_part, part) = identifier(after_dot).map_err(to_failure)?;
        parts.push(part);
        rest = after_part;
    }
}

/// Typed parameter list: `(type name, type name, ...)`. Returns an empty
/// list when the next token is not `(`.
fn opt_param_list(input: Span<'_>) -> PResult<'_, Vec<Param>> {
    let Ok((mut rest, _)) = tok('(')(input) else {
        return Ok((input, Vec::new()));
    };
    let mut params = Vec::new();
    loop {
        let (after, _) = ws(rest)?;
        let start = pos(&after);
        let (after_ty, ty) = parse_type(rest).map_err(to_failure)?;
        let (after_name, name) = identifier(after_ty).map_err(to_failure)?;
        params.push(Param {
            pos: start,
            ty,
            name,
        });
        if let Ok((after_comma, _)) = tok(',')(after_name) {
            rest = after_comma;
            continue;
        }
        let (after_close, _) = tok(')')(after_name).map_err(to_failure)?;
        return Ok((after_close, params));
    }
}

/// Field definition core, up to but not including the terminating `;`:
/// `<type> name [: constraint] [= default] [if|optional guard]`.
fn field_core<'a>(input: Span<'a>, doc: Option<String>) -> PResult<'a, FieldDef> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (rest, ty) = parse_type(input)?;
    let (rest, name) = identifier(rest)?;
    // C-style declarations put array suffixes after the name.
    let (mut rest, ty) = array_suffixes(rest, ty)?;

    let mut constraint = None;
    if let Ok((after_colon, _)) = tok(':')(rest) {
        let (after_expr, expr) = parse_expression(after_colon).map_err(to_failure)?;
        constraint = Some(expr);
        rest = after_expr;
    }

    let mut default_value = None;
    if let Ok((after_eq, _)) = tok('=')(rest) {
        let (after_expr, expr) = parse_expression(after_eq).map_err(to_failure)?;
        default_value = Some(expr);
        rest = after_expr;
    }

    let mut condition = None;
    let guard = kw("if")(rest).or_else(|_| kw("optional")(rest));
    if let Ok((after_kw, _)) = guard {
        let (after_expr, expr) = parse_expression(after_kw).map_err(to_failure)?;
        condition = Some(expr);
        rest = after_expr;
    }

    Ok((
        rest,
        FieldDef {
            pos: start,
            ty,
            name,
            condition,
            constraint,
            default_value,
            docstring: doc,
        },
    ))
}

fn parse_field<'a>(input: Span<'a>, doc: Option<String>) -> PResult<'a, FieldDef> {
    let (rest, field) = field_core(input, doc)?;
    let (rest, _) = tok(';')(rest)?;
    Ok((rest, field))
}

fn parse_function<'a>(input: Span<'a>, doc: Option<String>) -> PResult<'a, FunctionDef> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (rest, _) = kw("function")(input)?;
    let (rest, return_type) = parse_type(rest).map_err(to_failure)?;
    let (rest, name) = identifier(rest).map_err(to_failure)?;
    let (rest, parameters) = explicit_param_list(rest).map_err(to_failure)?;
    let (mut rest, _) = tok('{')(rest).map_err(to_failure)?;

    let mut body = Vec::new();
    loop {
        if let Ok((after_close, _)) = tok('}')(rest) {
            rest = after_close;
            break;
        }
        let (after, _) = ws(rest)?;
        let stmt_pos = pos(&after);
        if let Ok((after_return, _)) = kw("return")(rest) {
            let (after_expr, value) = parse_expression(after_return).map_err(to_failure)?;
            let (after_semi, _) = tok(';')(after_expr).map_err(to_failure)?;
            body.push(Statement::Return {
                pos: stmt_pos,
                value,
            });
            rest = after_semi;
            continue;
        }
        let (after_expr, expr) = parse_expression(rest).map_err(to_failure)?;
        let (after_semi, _) = tok(';')(after_expr).map_err(to_failure)?;
        body.push(Statement::Expression {
            pos: stmt_pos,
            expr,
        });
        rest = after_semi;
    }
    Ok((
        rest,
        FunctionDef {
            pos: start,
            name,
            return_type,
            parameters,
            body,
            docstring: doc,
        },
    ))
}

/// Parameter list where the parentheses are mandatory (functions).
fn explicit_param_list(input: Span<'_>) -> PResult<'_, Vec<Param>> {
    let (rest, _) = tok('(')(input)?;
    if let Ok((after_close, _)) = tok(')')(rest) {
        return Ok((after_close, Vec::new()));
    }
    let mut params = Vec::new();
    let mut rest = rest;
    loop {
        let (after, _) = ws(rest)?;
        let start = pos(&after);
        let (after_ty, ty) = parse_type(rest).map_err(to_failure)?;
        let (after_name, name) = identifier(after_ty).map_err(to_failure)?;
        params.push(Param {
            pos: start,
            ty,
            name,
        });
        if let Ok((after_comma, _)) = tok(',')(after_name) {
            rest = after_comma;
            continue;
        }
        let (after_close, _) = tok(')')(after_name).map_err(to_failure)?;
        return Ok((after_close, params));
    }
}

/// One struct-body item. Also used for anonymous blocks in union and choice
/// cases after desugaring kept the same item shape.
fn parse_body_item(input: Span<'_>) -> PResult<'_, BodyItem> {
    let (rest, doc) = leading_doc(input)?;
    let start = pos(&rest);

    // align(N):
    if let Ok((after_kw, _)) = kw("align")(rest) {
        let (after_open, _) = tok('(')(after_kw).map_err(to_failure)?;
        let (after_expr, expr) = parse_expression(after_open).map_err(to_failure)?;
        let (after_close, _) = tok(')')(after_expr).map_err(to_failure)?;
        let (after_colon, _) = tok(':')(after_close).map_err(to_failure)?;
        return Ok((
            after_colon,
            BodyItem::Align(AlignmentDirective {
                pos: start,
                expr,
            }),
        ));
    }

    if peek_kw("function")(rest).is_ok() {
        let (after, func) = parse_function(rest, doc)?;
        return Ok((after, BodyItem::Function(func)));
    }

    // Inline union: union { cases } name;
    if let Ok((after_kw, _)) = kw("union")(rest) {
        if let Ok((after_open, _)) = tok('{')(after_kw) {
            let (after_cases, cases) = union_case_list(after_open)?;
            let (after_close, _) = tok('}')(after_cases).map_err(to_failure)?;
            let (mut after, field_name) = identifier(after_close).map_err(to_failure)?;
            let mut constraint = None;
            if let Ok((after_colon, _)) = tok(':')(after) {
                let (after_expr, expr) = parse_expression(after_colon).map_err(to_failure)?;
                constraint = Some(expr);
                after = after_expr;
            }
            let mut condition = None;
            if let Ok((after_if, _)) = kw("if")(after).or_else(|_| kw("optional")(after)) {
                let (after_expr, expr) = parse_expression(after_if).map_err(to_failure)?;
                condition = Some(expr);
                after = after_expr;
            }
            let (after_semi, _) = tok(';')(after).map_err(to_failure)?;
            return Ok((
                after_semi,
                BodyItem::InlineUnion(InlineUnionField {
                    pos: start,
                    cases,
                    field_name,
                    condition,
                    constraint,
                    docstring: doc,
                }),
            ));
        }
    }

    // Inline struct: { items } name;
    if let Ok((after_open, _)) = tok('{')(rest) {
        let (after_items, body) = body_item_list(after_open)?;
        let (after_close, _) = tok('}')(after_items).map_err(to_failure)?;
        let (mut after, field_name) = identifier(after_close).map_err(to_failure)?;
        let mut constraint = None;
        if let Ok((after_colon, _)) = tok(':')(after) {
            let (after_expr, expr) = parse_expression(after_colon).map_err(to_failure)?;
            constraint = Some(expr);
            after = after_expr;
        }
        let mut condition = None;
        if let Ok((after_if, _)) = kw("if")(after).or_else(|_| kw("optional")(after)) {
            let (after_expr, expr) = parse_expression(after_if).map_err(to_failure)?;
            condition = Some(expr);
            after = after_expr;
        }
        let (after_semi, _) = tok(';')(after).map_err(to_failure)?;
        return Ok((
            after_semi,
            BodyItem::InlineStruct(InlineStructField {
                pos: start,
                body,
                field_name,
                condition,
                constraint,
                docstring: doc,
            }),
        ));
    }

    // A typed field, or failing that a label directive `expr:`.
    match parse_field(rest, doc) {
        Ok((after, field)) => Ok((after, BodyItem::Field(field))),
        Err(err @ nom::Err::Failure(_)) => Err(err),
        Err(_) => {
            let (after_expr, expr) = parse_expression(rest)?;
            let (after_colon, _) = tok(':')(after_expr)?;
            Ok((
                after_colon,
                BodyItem::Label(LabelDirective {
                    pos: start,
                    expr,
                }),
            ))
        }
    }
}

fn body_item_list(input: Span<'_>) -> PResult<'_, Vec<BodyItem>> {
    let mut items = Vec::new();
    let mut rest = input;
    loop {
        if peek_tok('}')(rest).is_ok() {
            return Ok((rest, items));
        }
        let (after, item) = parse_body_item(rest)?;
        items.push(item);
        rest = after;
    }
}

fn union_case_list(input: Span<'_>) -> PResult<'_, Vec<UnionCase>> {
    let mut cases = Vec::new();
    let mut rest = input;
    loop {
        if peek_tok('}')(rest).is_ok() {
            return Ok((rest, cases));
        }
        let (after, case) = parse_union_case(rest)?;
        cases.push(case);
        rest = after;
    }
}

fn parse_union_case(input: Span<'_>) -> PResult<'_, UnionCase> {
    let (rest, doc) = leading_doc(input)?;
    let start = pos(&rest);

    // Anonymous block: { items } name [: condition];
    if let Ok((after_open, _)) = tok('{')(rest) {
        let (after_items, items) = body_item_list(after_open)?;
        let (after_close, _) = tok('}')(after_items).map_err(to_failure)?;
        let (mut after, case_name) = identifier(after_close).map_err(to_failure)?;
        let mut condition = None;
        if let Ok((after_colon, _)) = tok(':')(after) {
            let (after_expr, expr) = parse_expression(after_colon).map_err(to_failure)?;
            condition = Some(expr);
            after = after_expr;
        }
        let (after_semi, _) = tok(';')(after).map_err(to_failure)?;
        return Ok((
            after_semi,
            UnionCase {
                pos: start,
                case_name,
                items,
                condition,
                is_anonymous_block: true,
                docstring: doc,
            },
        ));
    }

    // Simple case: a single field; its inline-constraint slot carries the
    // case condition.
    let (after, mut field) = parse_field(rest, doc.clone())?;
    let condition = field.constraint.take();
    let case_name = field.name.clone();
    Ok((
        after,
        UnionCase {
            pos: start,
            case_name,
            items: vec![BodyItem::Field(field)],
            condition,
            is_anonymous_block: false,
            docstring: doc,
        },
    ))
}

/// Case body shared by choice cases: either `{ items } name;` or a single
/// field definition.
fn choice_case_body(input: Span<'_>) -> PResult<'_, (Vec<BodyItem>, String, bool)> {
    if let Ok((after_open, _)) = tok('{')(input) {
        let (after_items, items) = body_item_list(after_open)?;
        let (after_close, _) = tok('}')(after_items).map_err(to_failure)?;
        let (after_name, name) = identifier(after_close).map_err(to_failure)?;
        let (after_semi, _) = tok(';')(after_name).map_err(to_failure)?;
        return Ok((after_semi, (items, name, true)));
    }
    let (after, field) = parse_field(input, None)?;
    let name = field.name.clone();
    Ok((after, (vec![BodyItem::Field(field)], name, false)))
}

fn compare_kind(input: Span<'_>) -> PResult<'_, CompareKind> {
    use crate::tokens::tok_tag;
    if let Ok((rest, _)) = tok_tag(">=")(input) {
        return Ok((rest, CompareKind::Ge));
    }
    if let Ok((rest, _)) = tok_tag("<=")(input) {
        return Ok((rest, CompareKind::Le));
    }
    if let Ok((rest, _)) = tok_tag("!=")(input) {
        return Ok((rest, CompareKind::Ne));
    }
    if let Ok((rest, _)) = tok('>')(input) {
        return Ok((rest, CompareKind::Gt));
    }
    let (rest, _) = tok('<')(input)?;
    Ok((rest, CompareKind::Lt))
}

fn parse_choice_case(input: Span<'_>) -> PResult<'_, ChoiceCase> {
    let (rest, doc) = leading_doc(input)?;
    let start = pos(&rest);

    // default: <body>
    if let Ok((after_kw, _)) = kw("default")(rest) {
        let (after_colon, _) = tok(':')(after_kw).map_err(to_failure)?;
        let (after_body, (items, field_name, anonymous)) =
            choice_case_body(after_colon).map_err(to_failure)?;
        return Ok((
            after_body,
            ChoiceCase {
                pos: start,
                selector: CaseSelector::Default,
                items,
                field_name,
                is_anonymous_block: anonymous,
                docstring: doc,
            },
        ));
    }

    let (after_case, _) = kw("case")(rest)?;

    // Comparator form: case >= expr: <body>
    if let Ok((after_op, op)) = compare_kind(after_case) {
        let (after_bound, bound) = parse_expression(after_op).map_err(to_failure)?;
        let (after_colon, _) = tok(':')(after_bound).map_err(to_failure)?;
        let (after_body, (items, field_name, anonymous)) =
            choice_case_body(after_colon).map_err(to_failure)?;
        return Ok((
            after_body,
            ChoiceCase {
                pos: start,
                selector: CaseSelector::Compare { kind: op, bound },
                items,
                field_name,
                is_anonymous_block: anonymous,
                docstring: doc,
            },
        ));
    }

    // Exact form: one or more stacked `case e1[, e2]*:` labels, then a body.
    let mut exprs = Vec::new();
    let mut rest = after_case;
    loop {
        let (after_expr, expr) = parse_expression(rest).map_err(to_failure)?;
        exprs.push(expr);
        rest = after_expr;
        if let Ok((after_comma, _)) = tok(',')(rest) {
            rest = after_comma;
            continue;
        }
        let (after_colon, _) = tok(':')(rest).map_err(to_failure)?;
        rest = after_colon;
        // Stacked label: another `case` keyword (but not `default`).
        if let Ok((after_more, _)) = kw("case")(rest) {
            rest = after_more;
            continue;
        }
        break;
    }
    let (after_body, (items, field_name, anonymous)) =
        choice_case_body(rest).map_err(to_failure)?;
    Ok((
        after_body,
        ChoiceCase {
            pos: start,
            selector: CaseSelector::Exact(exprs),
            items,
            field_name,
            is_anonymous_block: anonymous,
            docstring: doc,
        },
    ))
}

fn parse_struct<'a>(input: Span<'a>, doc: Option<String>) -> PResult<'a, StructDef> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (rest, _) = kw("struct")(input)?;
    let (rest, name) = identifier(rest).map_err(to_failure)?;
    let (rest, parameters) = opt_param_list(rest)?;
    let (rest, _) = tok('{')(rest).map_err(to_failure)?;
    let (rest, body) = body_item_list(rest)?;
    let (rest, _) = tok('}')(rest).map_err(to_failure)?;
    let (rest, _) = tok(';')(rest).map_err(to_failure)?;
    trace!("parsed struct '{}' with {} body items", name, body.len());
    Ok((
        rest,
        StructDef {
            pos: start,
            name,
            parameters,
            body,
            docstring: doc,
        },
    ))
}

fn parse_union<'a>(input: Span<'a>, doc: Option<String>) -> PResult<'a, UnionDef> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (rest, _) = kw("union")(input)?;
    let (rest, name) = identifier(rest).map_err(to_failure)?;
    let (rest, parameters) = opt_param_list(rest)?;
    let (rest, _) = tok('{')(rest).map_err(to_failure)?;
    let (rest, cases) = union_case_list(rest)?;
    let (rest, _) = tok('}')(rest).map_err(to_failure)?;
    let (rest, _) = tok(';')(rest).map_err(to_failure)?;
    Ok((
        rest,
        UnionDef {
            pos: start,
            name,
            parameters,
            cases,
            docstring: doc,
        },
    ))
}

fn parse_choice<'a>(input: Span<'a>, doc: Option<String>) -> PResult<'a, ChoiceDef> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (rest, _) = kw("choice")(input)?;
    let (rest, name) = identifier(rest).map_err(to_failure)?;
    let (rest, parameters) = opt_param_list(rest)?;

    let (rest, discriminator) = if let Ok((after_on, _)) = kw("on")(rest) {
        let (after_expr, selector) = parse_expression(after_on).map_err(to_failure)?;
        (after_expr, ChoiceDiscriminator::External(selector))
    } else {
        let (after_colon, _) = tok(':')(rest).map_err(to_failure)?;
        let (after_ty, ty) = parse_type(after_colon).map_err(to_failure)?;
        (after_ty, ChoiceDiscriminator::Inline(ty))
    };

    let (mut rest, _) = tok('{')(rest).map_err(to_failure)?;
    let mut cases = Vec::new();
    loop {
        if let Ok((after_close, _)) = tok('}')(rest) {
            rest = after_close;
            break;
        }
        let (after_case, case) = parse_choice_case(rest)?;
        cases.push(case);
        rest = after_case;
    }
    let (rest, _) = tok(';')(rest).map_err(to_failure)?;
    Ok((
        rest,
        ChoiceDef {
            pos: start,
            name,
            parameters,
            discriminator,
            cases,
            docstring: doc,
        },
    ))
}

fn parse_enum<'a>(input: Span<'a>, is_bitmask: bool, doc: Option<String>) -> PResult<'a, EnumDef> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (rest, _) = kw(if is_bitmask { "bitmask" } else { "enum" })(input)?;
    let (rest, base) = parse_type(rest).map_err(to_failure)?;
    let (rest, name) = identifier(rest).map_err(to_failure)?;
    let (mut rest, _) = tok('{')(rest).map_err(to_failure)?;

    let mut items = Vec::new();
    loop {
        if let Ok((after_close, _)) = tok('}')(rest) {
            rest = after_close;
            break;
        }
        let (after_doc, item_doc) = leading_doc(rest)?;
        let item_pos = pos(&after_doc);
        let (after_name, item_name) = identifier(after_doc).map_err(to_failure)?;
        let mut value = None;
        let mut after = after_name;
        if let Ok((after_eq, _)) = tok('=')(after) {
            let (after_expr, expr) = parse_expression(after_eq).map_err(to_failure)?;
            value = Some(expr);
            after = after_expr;
        }
        items.push(EnumItem {
            pos: item_pos,
            name: item_name,
            value,
            docstring: item_doc,
        });
        if let Ok((after_comma, _)) = tok(',')(after) {
            rest = after_comma;
            continue;
        }
        rest = after;
    }
    let (rest, _) = tok(';')(rest).map_err(to_failure)?;
    Ok((
        rest,
        EnumDef {
            pos: start,
            name,
            base,
            items,
            is_bitmask,
            docstring: doc,
        },
    ))
}

fn parse_constant<'a>(input: Span<'a>, doc: Option<String>) -> PResult<'a, ConstantDef> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (rest, _) = kw("const")(input)?;
    let (rest, ty) = parse_type(rest).map_err(to_failure)?;
    let (rest, name) = identifier(rest).map_err(to_failure)?;
    let (rest, _) = tok('=')(rest).map_err(to_failure)?;
    let (rest, value) = parse_expression(rest).map_err(to_failure)?;
    let (rest, _) = tok(';')(rest).map_err(to_failure)?;
    Ok((
        rest,
        ConstantDef {
            pos: start,
            name,
            ty,
            value,
            docstring: doc,
        },
    ))
}

fn parse_subtype<'a>(input: Span<'a>, doc: Option<String>) -> PResult<'a, SubtypeDef> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (rest, _) = kw("subtype")(input)?;
    let (rest, base) = parse_type(rest).map_err(to_failure)?;
    let (rest, name) = identifier(rest).map_err(to_failure)?;
    let (rest, _) = tok(':')(rest).map_err(to_failure)?;
    let (rest, constraint) = parse_expression(rest).map_err(to_failure)?;
    let (rest, _) = tok(';')(rest).map_err(to_failure)?;
    Ok((
        rest,
        SubtypeDef {
            pos: start,
            name,
            base,
            constraint,
            docstring: doc,
        },
    ))
}

fn parse_constraint<'a>(input: Span<'a>, doc: Option<String>) -> PResult<'a, ConstraintDef> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (rest, _) = kw("constraint")(input)?;
    let (rest, name) = identifier(rest).map_err(to_failure)?;
    let (rest, params) = opt_param_list(rest)?;
    let (rest, _) = tok('{')(rest).map_err(to_failure)?;
    let (rest, condition) = parse_expression(rest).map_err(to_failure)?;
    let (rest, _) = tok('}')(rest).map_err(to_failure)?;
    let (rest, _) = tok(';')(rest).map_err(to_failure)?;
    Ok((
        rest,
        ConstraintDef {
            pos: start,
            name,
            params,
            condition,
            docstring: doc,
        },
    ))
}

fn parse_type_alias<'a>(input: Span<'a>, doc: Option<String>) -> PResult<'a, TypeAliasDef> {
    let (input, _) = ws(input)?;
    let start = pos(&input);
    let (rest, _) = kw("typedef")(input)?;
    let (rest, name) = identifier(rest).map_err(to_failure)?;
    let (rest, _) = tok('=')(rest).map_err(to_failure)?;
    let (rest, target) = parse_type(rest).map_err(to_failure)?;
    let (rest, _) = tok(';')(rest).map_err(to_failure)?;
    Ok((
        rest,
        TypeAliasDef {
            pos: start,
            name,
            target,
            docstring: doc,
        },
    ))
}

/// Parse a whole module. Consumes trailing trivia; the facade checks that
/// nothing but trivia remains.
pub fn parse_module(input: Span<'_>) -> PResult<'_, Module> {
    let mut module = Module::default();
    let mut rest = input;
    trace!("parsing module, input length {}", input.fragment().len());
    loop {
        let (after_doc, doc) = leading_doc(rest)?;
        if after_doc.fragment().is_empty() {
            return Ok((after_doc, module));
        }
        let decl_pos = pos(&after_doc);

        if let Ok((after_kw, _)) = kw("package")(after_doc) {
            if module.package.is_some() {
                return Err(external_failure(after_doc, "duplicate package declaration"));
            }
            let (after_name, parts) = dotted_name(after_kw).map_err(to_failure)?;
            let (after_semi, _) = tok(';')(after_name).map_err(to_failure)?;
            module.package = Some(PackageDecl {
                pos: decl_pos,
                parts,
            });
            rest = after_semi;
            continue;
        }
        if let Ok((after_kw, _)) = kw("import")(after_doc) {
            let (after_name, parts) = dotted_name(after_kw).map_err(to_failure)?;
            let mut is_wildcard = false;
            let mut after = after_name;
            if let Ok((after_dot, _)) = tok('.')(after) {
                let (after_star, _) = tok('*')(after_dot).map_err(to_failure)?;
                is_wildcard = true;
                after = after_star;
            }
            let (after_semi, _) = tok(';')(after).map_err(to_failure)?;
            module.imports.push(ImportDecl {
                pos: decl_pos,
                parts,
                is_wildcard,
            });
            rest = after_semi;
            continue;
        }
        // Standalone byte-order directive: `little;` / `big;`
        if let Ok((after_kw, _)) = kw("little")(after_doc) {
            if let Ok((after_semi, _)) = tok(';')(after_kw) {
                module.default_endianness = Endian::Little;
                rest = after_semi;
                continue;
            }
        }
        if let Ok((after_kw, _)) = kw("big")(after_doc) {
            if let Ok((after_semi, _)) = tok(';')(after_kw) {
                module.default_endianness = Endian::Big;
                rest = after_semi;
                continue;
            }
        }

        if peek_kw("const")(after_doc).is_ok() {
            let (after, decl) = parse_constant(after_doc, doc)?;
            module.constants.push(decl);
            rest = after;
            continue;
        }
        if peek_kw("subtype")(after_doc).is_ok() {
            let (after, decl) = parse_subtype(after_doc, doc)?;
            module.subtypes.push(decl);
            rest = after;
            continue;
        }
        if peek_kw("constraint")(after_doc).is_ok() {
            let (after, decl) = parse_constraint(after_doc, doc)?;
            module.constraints.push(decl);
            rest = after;
            continue;
        }
        if peek_kw("typedef")(after_doc).is_ok() {
            let (after, decl) = parse_type_alias(after_doc, doc)?;
            module.type_aliases.push(decl);
            rest = after;
            continue;
        }
        if peek_kw("enum")(after_doc).is_ok() {
            let (after, decl) = parse_enum(after_doc, false, doc)?;
            module.enums.push(decl);
            rest = after;
            continue;
        }
        if peek_kw("bitmask")(after_doc).is_ok() {
            let (after, decl) = parse_enum(after_doc, true, doc)?;
            module.enums.push(decl);
            rest = after;
            continue;
        }
        if peek_kw("struct")(after_doc).is_ok() {
            let (after, decl) = parse_struct(after_doc, doc)?;
            module.structs.push(decl);
            rest = after;
            continue;
        }
        if peek_kw("union")(after_doc).is_ok() {
            let (after, decl) = parse_union(after_doc, doc)?;
            module.unions.push(decl);
            rest = after;
            continue;
        }
        if peek_kw("choice")(after_doc).is_ok() {
            let (after, decl) = parse_choice(after_doc, doc)?;
            module.choices.push(decl);
            rest = after;
            continue;
        }

        return Err(nom::Err::Error(ErrorTree::from_error_kind(
            after_doc,
            ErrorKind::Alt,
        )));
    }
}
