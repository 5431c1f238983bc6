use crate::ids::ModuleId;
use datascript_parser::{ParseError, Parser};
use log::debug;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use syntax::declarations::Module;
use thiserror::Error;

pub const SCHEMA_EXTENSION: &str = "ds";
pub const SEARCH_PATH_ENV: &str = "DATASCRIPT_PATH";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("import '{name}' not found; searched:\n{}", format_searched(.searched))]
    ImportNotFound {
        name: String,
        searched: Vec<PathBuf>,
    },
    /// Kept in the taxonomy for eagerly-resolving loaders; the BFS loader
    /// cannot produce it because already-seen files are skipped.
    #[error("circular import involving '{name}'")]
    CircularImport { name: String },
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error in '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

fn format_searched(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One parsed file with its canonical path and declared package name.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    pub file_path: PathBuf,
    pub module: Module,
    pub package_name: String,
}

/// The main module plus everything transitively imported, deduplicated by
/// canonical path.
#[derive(Debug, Clone)]
pub struct ModuleSet {
    pub main: LoadedModule,
    pub imported: Vec<LoadedModule>,
    /// Package name to index in `imported`.
    pub package_index: HashMap<String, usize>,
}

impl ModuleSet {
    /// Single-module set, used by tests and by callers that already hold
    /// parsed source.
    pub fn from_main(module: Module, file_path: impl Into<PathBuf>) -> Self {
        let package_name = module.package_name();
        ModuleSet {
            main: LoadedModule {
                file_path: file_path.into(),
                module,
                package_name,
            },
            imported: Vec::new(),
            package_index: HashMap::new(),
        }
    }

    pub fn module(&self, id: ModuleId) -> &LoadedModule {
        if id.is_main() {
            &self.main
        } else {
            &self.imported[id.0 as usize - 1]
        }
    }

    pub fn module_mut(&mut self, id: ModuleId) -> &mut LoadedModule {
        if id.is_main() {
            &mut self.main
        } else {
            &mut self.imported[id.0 as usize - 1]
        }
    }

    /// Main module first, then imported modules in load order.
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &LoadedModule)> {
        std::iter::once((ModuleId::MAIN, &self.main)).chain(
            self.imported
                .iter()
                .enumerate()
                .map(|(i, m)| (ModuleId::imported(i), m)),
        )
    }

    pub fn len(&self) -> usize {
        self.imported.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn package_module(&self, package: &str) -> Option<ModuleId> {
        self.package_index
            .get(package)
            .map(|&i| ModuleId::imported(i))
    }
}

fn parse_file(path: &Path) -> Result<LoadedModule, LoadError> {
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parser = Parser::new();
    let module = parser
        .parse(&source, &path.display().to_string())
        .map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let package_name = module.package_name();
    Ok(LoadedModule {
        file_path: path.to_path_buf(),
        module,
        package_name,
    })
}

/// Effective search roots: main-file directory, user paths in order, the
/// working directory if absent, then `DATASCRIPT_PATH` entries.
fn build_search_paths(main_path: &Path, user_search_paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut search_paths = Vec::new();
    match main_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => search_paths.push(PathBuf::from(".")),
        Some(parent) => search_paths.push(parent.to_path_buf()),
        None => search_paths.push(PathBuf::from(".")),
    }
    search_paths.extend(user_search_paths.iter().cloned());
    if let Ok(cwd) = std::env::current_dir() {
        if !search_paths.contains(&cwd) {
            search_paths.push(cwd);
        }
    }
    if let Ok(env_paths) = std::env::var(SEARCH_PATH_ENV) {
        for entry in env_paths.split(':').filter(|e| !e.is_empty()) {
            search_paths.push(PathBuf::from(entry));
        }
    }
    search_paths
}

/// `["a", "b", "c"]` -> `a/b/c.ds`
fn import_to_rel_path(parts: &[String]) -> PathBuf {
    let mut path = PathBuf::new();
    for part in parts {
        path.push(part);
    }
    path.set_extension(SCHEMA_EXTENSION);
    path
}

/// Probe each search root in order; first existing regular file wins.
/// All probed candidates are recorded for the not-found message.
fn resolve_import(
    parts: &[String],
    search_paths: &[PathBuf],
    searched: &mut Vec<PathBuf>,
) -> Option<PathBuf> {
    let rel_path = import_to_rel_path(parts);
    for root in search_paths {
        let candidate = root.join(&rel_path);
        searched.push(candidate.clone());
        if candidate.is_file() {
            return candidate.canonicalize().ok();
        }
    }
    None
}

/// Wildcard import: the first root containing the package directory wins;
/// its `.ds` files are enumerated non-recursively, sorted for determinism.
fn resolve_wildcard_import(parts: &[String], search_paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut dir = PathBuf::new();
    for part in parts {
        dir.push(part);
    }
    for root in search_paths {
        let candidate_dir = root.join(&dir);
        if !candidate_dir.is_dir() {
            continue;
        }
        let mut files: Vec<PathBuf> = globwalk::GlobWalkerBuilder::from_patterns(
            &candidate_dir,
            &[format!("*.{}", SCHEMA_EXTENSION)],
        )
        .max_depth(1)
        .build()
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.path().canonicalize().ok())
        .collect();
        files.sort();
        return files;
    }
    Vec::new()
}

/// Load the main schema and every transitive import, breadth-first. Each
/// canonical path is parsed exactly once.
pub fn load_modules(
    main_path: &Path,
    user_search_paths: &[PathBuf],
) -> Result<ModuleSet, LoadError> {
    let search_paths = build_search_paths(main_path, user_search_paths);
    debug!(
        "loading '{}' with {} search paths",
        main_path.display(),
        search_paths.len()
    );

    let canonical_main = main_path
        .canonicalize()
        .map_err(|source| LoadError::Io {
            path: main_path.to_path_buf(),
            source,
        })?;
    let main = parse_file(&canonical_main)?;

    let mut result = ModuleSet {
        main,
        imported: Vec::new(),
        package_index: HashMap::new(),
    };

    let mut seen: HashSet<PathBuf> = HashSet::new();
    seen.insert(canonical_main);

    // BFS over module indices; usize::MAX marks the main module.
    let mut queue: VecDeque<usize> = VecDeque::new();
    queue.push_back(usize::MAX);

    while let Some(current) = queue.pop_front() {
        let imports = if current == usize::MAX {
            result.main.module.imports.clone()
        } else {
            result.imported[current].module.imports.clone()
        };

        for import in &imports {
            if import.is_wildcard {
                for file_path in resolve_wildcard_import(&import.parts, &search_paths) {
                    if !seen.insert(file_path.clone()) {
                        continue;
                    }
                    let loaded = parse_file(&file_path)?;
                    if !loaded.package_name.is_empty() {
                        result
                            .package_index
                            .entry(loaded.package_name.clone())
                            .or_insert(result.imported.len());
                    }
                    result.imported.push(loaded);
                    queue.push_back(result.imported.len() - 1);
                }
            } else {
                let mut searched = Vec::new();
                let Some(file_path) =
                    resolve_import(&import.parts, &search_paths, &mut searched)
                else {
                    return Err(LoadError::ImportNotFound {
                        name: import.dotted(),
                        searched,
                    });
                };
                if !seen.insert(file_path.clone()) {
                    continue;
                }
                let loaded = parse_file(&file_path)?;
                result
                    .package_index
                    .entry(import.dotted())
                    .or_insert(result.imported.len());
                result.imported.push(loaded);
                queue.push_back(result.imported.len() - 1);
            }
        }
    }

    Ok(result)
}
