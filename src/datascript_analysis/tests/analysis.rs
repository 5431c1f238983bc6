use datascript_analysis::ids::{DeclId, DeclKind, ModuleId};
use datascript_analysis::loader::{load_modules, ModuleSet};
use datascript_analysis::{analyze, AnalysisOptions, DiagnosticCode, Severity};
use datascript_parser::Parser;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn set_from(src: &str) -> ModuleSet {
    let module = Parser::new().parse(src, "test.ds").expect("parse ok");
    ModuleSet::from_main(module, "test.ds")
}

fn run(src: &str) -> datascript_analysis::AnalysisSession {
    let mut set = set_from(src);
    analyze(&mut set, AnalysisOptions::default())
}

fn codes(session: &datascript_analysis::AnalysisSession) -> Vec<DiagnosticCode> {
    session
        .diagnostics
        .diagnostics
        .iter()
        .map(|d| d.code)
        .collect()
}

#[test]
fn trivial_struct_layout() {
    // Two int32 fields: size 8, alignment 4, offsets 0 and 4.
    let mut set = set_from("struct Point { int32 x; int32 y; };");
    let session = analyze(&mut set, AnalysisOptions::default());
    assert!(!session.diagnostics.has_errors());

    let id = DeclId::new(ModuleId::MAIN, DeclKind::Struct, 0);
    let layout = session.layouts.get(&id).expect("layout computed");
    assert_eq!(layout.size, Some(8));
    assert_eq!(layout.alignment, 4);
    assert_eq!(layout.field_offsets.get(&0), Some(&0));
    assert_eq!(layout.field_offsets.get(&1), Some(&4));
}

#[test]
fn mixed_alignment_layout() {
    // uint8 at 0, uint32 at 4 (padded), uint16 at 8; size padded to 12.
    let session = run("struct Mixed { uint8 a; uint32 b; uint16 c; };");
    let id = DeclId::new(ModuleId::MAIN, DeclKind::Struct, 0);
    let layout = session.layouts.get(&id).unwrap();
    assert_eq!(layout.field_offsets.get(&0), Some(&0));
    assert_eq!(layout.field_offsets.get(&1), Some(&4));
    assert_eq!(layout.field_offsets.get(&2), Some(&8));
    assert_eq!(layout.alignment, 4);
    assert_eq!(layout.size, Some(12));
}

#[test]
fn variable_field_makes_struct_variable() {
    let session = run("struct V { uint16 len; string name; uint8 tail; };");
    let id = DeclId::new(ModuleId::MAIN, DeclKind::Struct, 0);
    let layout = session.layouts.get(&id).unwrap();
    assert!(layout.is_variable);
    assert_eq!(layout.size, None);
    // Offsets stop at the variable field.
    assert_eq!(layout.field_offsets.get(&0), Some(&0));
    assert_eq!(layout.field_offsets.get(&1), Some(&2));
    assert_eq!(layout.field_offsets.get(&2), None);
}

#[test]
fn constant_overflow_is_reported_and_poisons() {
    // 1 << 65: shift amount outside [0, 63].
    let session = run("const uint64 X = 1 << 65;");
    let codes = codes(&session);
    assert_eq!(
        codes
            .iter()
            .filter(|c| **c == DiagnosticCode::Overflow)
            .count(),
        1
    );
    let id = DeclId::new(ModuleId::MAIN, DeclKind::Constant, 0);
    assert!(session.is_poisoned(id));
}

#[test]
fn arithmetic_overflow_detected() {
    let session = run("const uint64 X = 9223372036854775807 + 1;");
    assert!(codes(&session).contains(&DiagnosticCode::Overflow));
}

#[test]
fn division_by_zero_detected() {
    let session = run("const uint32 X = 10 / 0;");
    assert!(codes(&session).contains(&DiagnosticCode::DivisionByZero));
}

#[test]
fn circular_constants_detected() {
    let session = run("const uint32 A = B + 1; const uint32 B = A + 1;");
    assert!(codes(&session).contains(&DiagnosticCode::CircularConstant));
}

#[test]
fn constant_chain_evaluates() {
    let session = run(
        "const uint32 BASE = 0x10; const uint32 DOUBLE = BASE * 2; const uint32 PLUS = DOUBLE + 2;",
    );
    assert!(!session.diagnostics.has_errors());
    let value = |i: usize| {
        session
            .constant_values
            .get(&DeclId::new(ModuleId::MAIN, DeclKind::Constant, i))
            .copied()
    };
    assert_eq!(value(0), Some(16));
    assert_eq!(value(1), Some(32));
    assert_eq!(value(2), Some(34));
}

#[test]
fn enum_values_auto_increment() {
    let session = run("enum uint8 Color { RED = 1, GREEN, BLUE = 7, EXTRA };");
    let id = DeclId::new(ModuleId::MAIN, DeclKind::Enum, 0);
    let value = |i: usize| session.enum_item_values.get(&(id, i)).copied();
    assert_eq!(value(0), Some(1));
    assert_eq!(value(1), Some(2));
    assert_eq!(value(2), Some(7));
    assert_eq!(value(3), Some(8));
}

#[test]
fn parameter_count_mismatch_message() {
    // S3: Record declared with one parameter, referenced with none.
    let session = run(
        r#"
        struct Record(uint16 n) {
            uint8 data[n];
        };
        struct Holder {
            Record rec;
        };
        "#,
    );
    let diag = session
        .diagnostics
        .diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::ParamCountMismatch)
        .expect("param count mismatch reported");
    assert!(
        diag.message.contains("expects 1 parameter(s) but got 0"),
        "unexpected message: {}",
        diag.message
    );
}

#[test]
fn duplicate_definition_reported_once_with_related() {
    let session = run("struct Foo { uint8 a; }; struct Foo { uint8 b; };");
    let duplicates: Vec<_> = session
        .diagnostics
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::DuplicateDefinition)
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0].related.is_some());
}

#[test]
fn cross_kind_name_reuse_is_legal() {
    // Each declaration kind has its own namespace; a constant and a struct
    // may share a name.
    let session = run("const uint8 Foo = 1; struct Foo { uint8 a; };");
    assert!(!codes(&session).contains(&DiagnosticCode::DuplicateDefinition));

    let session = run("enum uint8 Foo { A }; struct Foo { uint8 a; };");
    assert!(!codes(&session).contains(&DiagnosticCode::DuplicateDefinition));
}

#[test]
fn bitfield_operands_are_rejected_in_arithmetic() {
    // Bitfield is its own category; arithmetic and indexing require integer.
    let session = run(
        r#"
        struct S {
            bit:4 x;
            uint8 arr[x + 1];
        };
        "#,
    );
    assert!(codes(&session).contains(&DiagnosticCode::InvalidOperandType));

    let session = run(
        r#"
        struct S {
            bit:4 x;
            uint8 data[4];
            uint8 pick if data[x] > 0;
        };
        "#,
    );
    assert!(codes(&session).contains(&DiagnosticCode::InvalidOperandType));
}

#[test]
fn undefined_type_reported_without_cascade() {
    // The unknown type errors once; the comparison against the field of
    // unknown category must not add a second error.
    let session = run(
        r#"
        struct S {
            Missing thing;
            uint8 level if thing.mode > 3;
        };
        "#,
    );
    let codes = codes(&session);
    assert!(codes.contains(&DiagnosticCode::UndefinedType));
    assert!(!codes.contains(&DiagnosticCode::InvalidOperandType));
    assert!(!codes.contains(&DiagnosticCode::IncompatibleTypes));
}

#[test]
fn undefined_constant_in_initializer() {
    let session = run("const uint32 X = NOPE + 1;");
    assert!(codes(&session).contains(&DiagnosticCode::UndefinedConstant));
}

#[test]
fn boolean_guard_type_is_enforced() {
    let session = run("struct S { uint8 size; uint8 data[size] if size; };");
    assert!(codes(&session).contains(&DiagnosticCode::TypeMismatch));
}

#[test]
fn operand_type_errors() {
    let session = run(r#"const uint32 X = 1 + true;"#);
    assert!(codes(&session).contains(&DiagnosticCode::InvalidOperandType));
}

#[test]
fn non_constant_alignment_is_e4001() {
    let session = run(
        r#"
        struct S {
            uint8 n;
            align(n):
            uint32 value;
        };
        "#,
    );
    let diag = session
        .diagnostics
        .diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::NonConstantAlignment)
        .expect("E4001 reported");
    assert_eq!(diag.code.as_str(), "E4001");
}

#[test]
fn constant_alignment_is_accepted() {
    let session = run(
        r#"
        const uint8 ALIGN = 8;
        struct S {
            uint8 pad;
            align(ALIGN):
            uint64 value;
        };
        "#,
    );
    assert!(!codes(&session).contains(&DiagnosticCode::NonConstantAlignment));
}

#[test]
fn always_true_and_false_conditions_warn() {
    let session = run(
        r#"
        struct S {
            uint8 a if 1 == 1;
            uint8 b if 1 == 2;
        };
        "#,
    );
    let codes = codes(&session);
    assert!(codes.contains(&DiagnosticCode::AlwaysTrue));
    assert!(codes.contains(&DiagnosticCode::AlwaysFalse));
}

#[test]
fn warnings_as_errors_upgrades() {
    let mut set = set_from("struct S { uint8 a if 1 == 1; };");
    let options = AnalysisOptions {
        warnings_as_errors: true,
        ..Default::default()
    };
    let session = analyze(&mut set, options);
    assert!(session.diagnostics.has_errors());
    assert_eq!(session.diagnostics.warning_count(), 0);
}

#[test]
fn warning_suppression_by_code() {
    let mut set = set_from("struct S { uint8 a if 1 == 1; };");
    let mut options = AnalysisOptions::default();
    options
        .disabled_warnings
        .insert("W_ALWAYS_TRUE".to_string());
    let session = analyze(&mut set, options);
    assert!(!codes(&session).contains(&DiagnosticCode::AlwaysTrue));
}

#[test]
fn unknown_target_language_is_reported() {
    let mut set = set_from("struct S { uint8 a; };");
    let mut options = AnalysisOptions::default();
    options.target_languages.insert("cobol".to_string());
    let session = analyze(&mut set, options);
    let diag = session
        .diagnostics
        .diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::UnknownTargetLanguage)
        .expect("unknown target language reported");
    assert!(diag.suggestion.as_deref().unwrap().contains("cpp"));
}

#[test]
fn keyword_collision_warns_with_suggestion() {
    // `class` is a C++ keyword.
    let session = run("struct class { uint8 a; };");
    let diag = session
        .diagnostics
        .diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::KeywordCollision)
        .expect("keyword collision warning");
    assert_eq!(diag.severity, Severity::Warning);
    assert!(diag.suggestion.as_deref().unwrap().contains("class_"));
}

#[test]
fn duplicate_choice_case_values() {
    let session = run(
        r#"
        choice C : uint16 {
            case 1: uint8 a;
            case 1: uint16 b;
        };
        "#,
    );
    assert!(codes(&session).contains(&DiagnosticCode::DuplicateDefinition));
}

#[test]
fn diagnostics_sorted_by_position_within_phase() {
    let session = run(
        r#"
        const uint32 A = 1 / 0;
        const uint32 B = 2 / 0;
        "#,
    );
    let div_positions: Vec<u32> = session
        .diagnostics
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::DivisionByZero)
        .map(|d| d.pos.line)
        .collect();
    let mut sorted = div_positions.clone();
    sorted.sort_unstable();
    assert_eq!(div_positions, sorted);
}

#[test]
fn wildcard_conflict_warns_and_first_import_wins() {
    // S4: two wildcard-imported packages both export `Point`.
    let dir = TempDir::new().unwrap();
    let write = |rel: &str, content: &str| {
        let path = dir.path().join(rel);
        if let Some(parent) = Path::new(&path).parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    };
    write(
        "main.ds",
        "import geo.*;\nimport gfx.*;\nstruct Use { Point p; };",
    );
    write("geo/point.ds", "package geo; struct Point { int32 x; };");
    write(
        "gfx/point.ds",
        "package gfx; struct Point { float_bits y; }; struct float_bits { uint32 v; };",
    );
    let mut set = load_modules(&dir.path().join("main.ds"), &[]).unwrap();
    let session = analyze(&mut set, AnalysisOptions::default());

    let conflict = session
        .diagnostics
        .diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::WildcardConflict)
        .expect("wildcard conflict warning");
    assert!(conflict
        .suggestion
        .as_deref()
        .unwrap()
        .contains("gfx.Point"));
    // The first import stays bound; Use.p resolves without errors.
    assert!(!session
        .diagnostics
        .diagnostics
        .iter()
        .any(|d| d.code == DiagnosticCode::UndefinedType));
}

#[test]
fn unused_import_and_constant_warn() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("util")).unwrap();
    fs::write(
        dir.path().join("main.ds"),
        "import util.extra;\nstruct Main { uint8 v; };",
    )
    .unwrap();
    fs::write(
        dir.path().join("util/extra.ds"),
        "package util.extra; const uint8 UNUSED = 3;",
    )
    .unwrap();
    let mut set = load_modules(&dir.path().join("main.ds"), &[]).unwrap();
    let session = analyze(&mut set, AnalysisOptions::default());
    let codes = codes(&session);
    assert!(codes.contains(&DiagnosticCode::UnusedImport));
    assert!(codes.contains(&DiagnosticCode::UnusedConstant));
}

#[test]
fn used_import_does_not_warn() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("util")).unwrap();
    fs::write(
        dir.path().join("main.ds"),
        "import util.extra;\nstruct Main { util.extra.Header h; };",
    )
    .unwrap();
    fs::write(
        dir.path().join("util/extra.ds"),
        "package util.extra; struct Header { uint8 v; };",
    )
    .unwrap();
    let mut set = load_modules(&dir.path().join("main.ds"), &[]).unwrap();
    let session = analyze(&mut set, AnalysisOptions::default());
    assert!(!codes(&session).contains(&DiagnosticCode::UnusedImport));
}
