use nom_locate::LocatedSpan;
use syntax::SourcePos;

/// Parser input: a located span over the source text, carrying the file name
/// as extra data so every node can stamp a full `SourcePos`.
pub type Span<'a> = LocatedSpan<&'a str, &'a str>;

pub fn new_span<'a>(source: &'a str, file: &'a str) -> Span<'a> {
    Span::new_extra(source, file)
}

/// Source position at the start of `input`.
pub fn pos(input: &Span<'_>) -> SourcePos {
    SourcePos::new(
        input.extra,
        input.location_line(),
        input.get_utf8_column() as u32,
    )
}
