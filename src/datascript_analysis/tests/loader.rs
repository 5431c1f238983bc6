use datascript_analysis::loader::{load_modules, LoadError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn loads_single_module() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "main.ds",
        "package app; struct Point { int32 x; int32 y; };",
    );
    let set = load_modules(&dir.path().join("main.ds"), &[]).unwrap();
    assert_eq!(set.main.package_name, "app");
    assert!(set.imported.is_empty());
    assert_eq!(set.main.module.structs.len(), 1);
}

#[test]
fn resolves_imports_from_main_directory() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "main.ds",
        "import common.types; struct Use { common.types.Shared s; };",
    );
    write(
        dir.path(),
        "common/types.ds",
        "package common.types; struct Shared { uint8 v; };",
    );
    let set = load_modules(&dir.path().join("main.ds"), &[]).unwrap();
    assert_eq!(set.imported.len(), 1);
    assert_eq!(set.imported[0].package_name, "common.types");
    assert_eq!(set.package_index.get("common.types"), Some(&0));
}

#[test]
fn deduplicates_diamond_imports() {
    // main imports a and b; both import shared. shared must load once.
    let dir = TempDir::new().unwrap();
    write(dir.path(), "main.ds", "import pkg.a; import pkg.b;");
    write(dir.path(), "pkg/a.ds", "package pkg.a; import pkg.shared;");
    write(dir.path(), "pkg/b.ds", "package pkg.b; import pkg.shared;");
    write(
        dir.path(),
        "pkg/shared.ds",
        "package pkg.shared; const uint8 V = 1;",
    );
    let set = load_modules(&dir.path().join("main.ds"), &[]).unwrap();
    assert_eq!(set.imported.len(), 3);
    let mut paths: Vec<_> = set.imported.iter().map(|m| m.file_path.clone()).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 3, "canonical paths must be unique");
}

#[test]
fn mutual_imports_terminate() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "main.ds", "import pkg.a;");
    write(dir.path(), "pkg/a.ds", "package pkg.a; import pkg.b;");
    write(dir.path(), "pkg/b.ds", "package pkg.b; import pkg.a;");
    let set = load_modules(&dir.path().join("main.ds"), &[]).unwrap();
    assert_eq!(set.imported.len(), 2);
}

#[test]
fn missing_import_lists_probed_paths_in_order() {
    let dir = TempDir::new().unwrap();
    let extra = TempDir::new().unwrap();
    write(dir.path(), "main.ds", "import no.such.thing;");
    let err = load_modules(
        &dir.path().join("main.ds"),
        &[extra.path().to_path_buf()],
    )
    .unwrap_err();
    let LoadError::ImportNotFound { name, searched } = &err else {
        panic!("expected ImportNotFound, got {:?}", err);
    };
    assert_eq!(name, "no.such.thing");
    assert!(searched.len() >= 2);
    // Probe order: main-file directory first, then the user path.
    assert!(searched[0].starts_with(dir.path()));
    assert!(searched[1].starts_with(extra.path()));
    let message = err.to_string();
    for probed in searched {
        assert!(
            message.contains(&probed.display().to_string()),
            "message must list every probed path; missing {}",
            probed.display()
        );
    }
}

#[test]
fn wildcard_import_loads_every_schema_in_directory() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "main.ds", "import shapes.*;");
    write(
        dir.path(),
        "shapes/circle.ds",
        "package shapes; struct Circle { uint32 r; };",
    );
    write(
        dir.path(),
        "shapes/square.ds",
        "package shapes; struct Square { uint32 side; };",
    );
    write(dir.path(), "shapes/readme.txt", "not a schema");
    let set = load_modules(&dir.path().join("main.ds"), &[]).unwrap();
    assert_eq!(set.imported.len(), 2);
    for m in &set.imported {
        assert_eq!(m.package_name, "shapes");
    }
}

#[test]
fn parse_error_in_import_carries_path() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "main.ds", "import bad.schema;");
    write(dir.path(), "bad/schema.ds", "struct Broken {");
    let err = load_modules(&dir.path().join("main.ds"), &[]).unwrap_err();
    let LoadError::Parse { path, .. } = &err else {
        panic!("expected Parse error, got {:?}", err);
    };
    assert!(path.display().to_string().contains("schema.ds"));
}
