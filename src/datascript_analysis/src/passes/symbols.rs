//! Phase 1: collect per-module symbol tables, detect duplicate definitions,
//! build the wildcard-import overlay and check identifiers against target
//! language keyword sets.

use crate::diagnostics::code::DiagnosticCode;
use crate::diagnostics::diagnostic::Diagnostic;
use crate::ids::{DeclId, DeclKind, ModuleId};
use crate::loader::ModuleSet;
use crate::passes::AnalyzerPass;
use crate::session::AnalysisSession;
use crate::symbols::{ModuleSymbols, SymbolTable, WildcardOverlay};
use log::debug;
use syntax::declarations::{BodyItem, Module};
use syntax::SourcePos;

pub struct SymbolCollection;

impl AnalyzerPass for SymbolCollection {
    fn id(&self) -> &'static str {
        "symbols"
    }

    fn run(&self, set: &ModuleSet, session: &mut AnalysisSession) {
        report_unknown_target_languages(set, session);

        let mut table = SymbolTable::default();
        for (module_id, loaded) in set.iter() {
            let mut symbols = ModuleSymbols::default();
            collect_module(
                module_id,
                &loaded.module,
                &mut symbols,
                session,
            );
            table.modules.push(symbols);
        }

        // Wildcard overlays need every module's own table first.
        for (module_id, loaded) in set.iter() {
            let overlay = build_overlay(module_id, &loaded.module, set, &table, session);
            table.overlays.push(overlay);
        }

        debug!(
            "collected symbols for {} modules ({} diagnostics so far)",
            table.modules.len(),
            session.diagnostics.len()
        );
        session.symbols = table;
    }
}

fn report_unknown_target_languages(set: &ModuleSet, session: &mut AnalysisSession) {
    let unknown: Vec<String> = session
        .options
        .target_languages
        .iter()
        .filter(|lang| !session.options.registry.has_language(lang))
        .cloned()
        .collect();
    if unknown.is_empty() {
        return;
    }
    let available = session.options.registry.available_languages();
    let suggestion = if available.is_empty() {
        "available languages: none (no renderers registered)".to_string()
    } else {
        format!("available languages: {}", available.join(", "))
    };
    let pos = SourcePos::new(set.main.file_path.display().to_string(), 1, 1);
    session.diagnostics.add(
        Diagnostic::error(
            DiagnosticCode::UnknownTargetLanguage,
            format!("unknown target language(s): {}", unknown.join(", ")),
            pos,
        )
        .with_suggestion(suggestion),
    );
}

/// Warn when an identifier collides with a keyword in any checked target
/// language.
fn validate_identifier(
    identifier: &str,
    pos: &SourcePos,
    symbol_kind: &str,
    session: &mut AnalysisSession,
) {
    let registry = &session.options.registry;
    let checked: Vec<&str> = if session.options.target_languages.is_empty() {
        registry.available_languages()
    } else {
        session
            .options
            .target_languages
            .iter()
            .map(|s| s.as_str())
            .filter(|lang| registry.has_language(lang))
            .collect()
    };

    let conflicts: Vec<&str> = checked
        .into_iter()
        .filter(|lang| registry.is_keyword(lang, identifier))
        .collect();
    if conflicts.is_empty() {
        return;
    }
    let sanitized = registry.sanitize(identifier);
    session.diagnostics.add(
        Diagnostic::warning(
            DiagnosticCode::KeywordCollision,
            format!(
                "{} '{}' conflicts with a keyword in {}",
                symbol_kind,
                identifier,
                conflicts.join(", ")
            ),
            pos.clone(),
        )
        .with_suggestion(format!("consider renaming to '{}'", sanitized)),
    );
}

struct Entry<'a> {
    kind: DeclKind,
    index: usize,
    name: &'a str,
    pos: &'a SourcePos,
    symbol_kind: &'a str,
}

fn module_entries(module: &Module) -> Vec<Entry<'_>> {
    let mut entries = Vec::new();
    for (i, d) in module.constants.iter().enumerate() {
        entries.push(Entry {
            kind: DeclKind::Constant,
            index: i,
            name: &d.name,
            pos: &d.pos,
            symbol_kind: "constant",
        });
    }
    for (i, d) in module.subtypes.iter().enumerate() {
        entries.push(Entry {
            kind: DeclKind::Subtype,
            index: i,
            name: &d.name,
            pos: &d.pos,
            symbol_kind: "subtype",
        });
    }
    for (i, d) in module.constraints.iter().enumerate() {
        entries.push(Entry {
            kind: DeclKind::Constraint,
            index: i,
            name: &d.name,
            pos: &d.pos,
            symbol_kind: "constraint",
        });
    }
    for (i, d) in module.type_aliases.iter().enumerate() {
        entries.push(Entry {
            kind: DeclKind::TypeAlias,
            index: i,
            name: &d.name,
            pos: &d.pos,
            symbol_kind: "type alias",
        });
    }
    for (i, d) in module.enums.iter().enumerate() {
        entries.push(Entry {
            kind: DeclKind::Enum,
            index: i,
            name: &d.name,
            pos: &d.pos,
            symbol_kind: if d.is_bitmask { "bitmask" } else { "enum" },
        });
    }
    for (i, d) in module.structs.iter().enumerate() {
        entries.push(Entry {
            kind: DeclKind::Struct,
            index: i,
            name: &d.name,
            pos: &d.pos,
            symbol_kind: "struct",
        });
    }
    for (i, d) in module.unions.iter().enumerate() {
        entries.push(Entry {
            kind: DeclKind::Union,
            index: i,
            name: &d.name,
            pos: &d.pos,
            symbol_kind: "union",
        });
    }
    for (i, d) in module.choices.iter().enumerate() {
        entries.push(Entry {
            kind: DeclKind::Choice,
            index: i,
            name: &d.name,
            pos: &d.pos,
            symbol_kind: "choice",
        });
    }
    entries
}

fn insert(symbols: &mut ModuleSymbols, kind: DeclKind, name: &str, index: usize) {
    let table = match kind {
        DeclKind::Constant => &mut symbols.constants,
        DeclKind::Subtype => &mut symbols.subtypes,
        DeclKind::Constraint => &mut symbols.constraints,
        DeclKind::TypeAlias => &mut symbols.type_aliases,
        DeclKind::Enum => &mut symbols.enums,
        DeclKind::Struct => &mut symbols.structs,
        DeclKind::Union => &mut symbols.unions,
        DeclKind::Choice => &mut symbols.choices,
    };
    table.insert(name.to_string(), index as u32);
}

fn collect_module(
    module_id: ModuleId,
    module: &Module,
    symbols: &mut ModuleSymbols,
    session: &mut AnalysisSession,
) {
    for entry in module_entries(module) {
        validate_identifier(entry.name, entry.pos, entry.symbol_kind, session);

        // Each kind has its own namespace; a duplicate is a redefinition
        // within the same kind's table.
        if let Some(prior_index) = symbols.find(entry.kind, entry.name) {
            let prior = decl_ref_by_parts(module, entry.kind, prior_index as usize);
            session.diagnostics.add(
                Diagnostic::error(
                    DiagnosticCode::DuplicateDefinition,
                    format!(
                        "{} '{}' is already defined in this module",
                        entry.symbol_kind, entry.name
                    ),
                    entry.pos.clone(),
                )
                .with_related(prior.clone(), "previous definition here"),
            );
            session.poison(DeclId::new(module_id, entry.kind, entry.index));
            continue;
        }
        insert(symbols, entry.kind, entry.name, entry.index);
    }

    // Member-level identifier checks (field names, case names, enum items).
    for s in &module.structs {
        for item in &s.body {
            if let BodyItem::Field(field) = item {
                validate_identifier(&field.name, &field.pos, "field", session);
            }
        }
    }
    for u in &module.unions {
        for case in &u.cases {
            validate_identifier(&case.case_name, &case.pos, "union case", session);
            for item in &case.items {
                if let BodyItem::Field(field) = item {
                    validate_identifier(&field.name, &field.pos, "field", session);
                }
            }
        }
    }
    for e in &module.enums {
        for item in &e.items {
            validate_identifier(&item.name, &item.pos, "enum item", session);
        }
    }
    for c in &module.choices {
        for case in &c.cases {
            for item in &case.items {
                if let BodyItem::Field(field) = item {
                    validate_identifier(&field.name, &field.pos, "field", session);
                }
            }
        }
    }
}

fn decl_ref_by_parts(module: &Module, kind: DeclKind, index: usize) -> SourcePos {
    match kind {
        DeclKind::Constant => module.constants[index].pos.clone(),
        DeclKind::Subtype => module.subtypes[index].pos.clone(),
        DeclKind::Constraint => module.constraints[index].pos.clone(),
        DeclKind::TypeAlias => module.type_aliases[index].pos.clone(),
        DeclKind::Enum => module.enums[index].pos.clone(),
        DeclKind::Struct => module.structs[index].pos.clone(),
        DeclKind::Union => module.unions[index].pos.clone(),
        DeclKind::Choice => module.choices[index].pos.clone(),
    }
}

/// Merge wildcard-imported symbols into a flat secondary lookup table.
/// First import wins; later conflicting symbols warn with a
/// qualified-name suggestion.
fn build_overlay(
    module_id: ModuleId,
    module: &Module,
    set: &ModuleSet,
    table: &SymbolTable,
    session: &mut AnalysisSession,
) -> WildcardOverlay {
    let _ = module_id;
    let mut overlay = WildcardOverlay::default();
    for import in &module.imports {
        if !import.is_wildcard {
            continue;
        }
        let pkg_name = import.dotted();
        let targets: Vec<ModuleId> = set
            .iter()
            .filter(|(id, m)| !id.is_main() && m.package_name == pkg_name)
            .map(|(id, _)| id)
            .collect();
        if targets.is_empty() {
            session.diagnostics.add(Diagnostic::error(
                DiagnosticCode::UndefinedPackage,
                format!("package '{}' not found in imports", pkg_name),
                import.pos.clone(),
            ));
            continue;
        }
        for target in targets {
            let target_symbols = table.module(target);
            let entries = module_entries(&set.module(target).module);
            for entry in entries {
                if target_symbols.find(entry.kind, entry.name).is_none() {
                    // Dropped as a duplicate during collection.
                    continue;
                }
                let id = DeclId::new(target, entry.kind, entry.index);
                let slot = overlay.kind_table_mut(entry.kind);
                if slot.contains_key(entry.name) {
                    session.diagnostics.add(
                        Diagnostic::warning(
                            DiagnosticCode::WildcardConflict,
                            format!(
                                "wildcard import of {} '{}' conflicts with an existing symbol",
                                entry.symbol_kind, entry.name
                            ),
                            import.pos.clone(),
                        )
                        .with_suggestion(format!(
                            "use the qualified name {}.{}",
                            pkg_name, entry.name
                        )),
                    );
                    continue;
                }
                slot.insert(entry.name.to_string(), id);
            }
        }
    }
    overlay
}
