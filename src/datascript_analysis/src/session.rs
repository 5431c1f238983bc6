use crate::diagnostics::collection::DiagnosticCollection;
use crate::ids::DeclId;
use crate::options::AnalysisOptions;
use crate::symbols::SymbolTable;
use std::collections::{HashMap, HashSet};

/// Size, alignment and variability of one type occurrence. `size: None`
/// means variable (not known until read time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub size: Option<u64>,
    pub alignment: u64,
    pub is_variable: bool,
    pub is_signed: bool,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
}

impl TypeInfo {
    pub fn fixed(size: u64, alignment: u64, is_signed: bool) -> Self {
        TypeInfo {
            size: Some(size),
            alignment,
            is_variable: false,
            is_signed,
            min_size: Some(size),
            max_size: Some(size),
        }
    }

    pub fn variable() -> Self {
        TypeInfo {
            size: None,
            alignment: 1,
            is_variable: true,
            is_signed: false,
            min_size: None,
            max_size: None,
        }
    }
}

/// Computed layout of a struct or union. Field offsets are keyed by the
/// field's position in the declaration body (body-item index for structs;
/// `(case index, item index)` flattened for unions is not needed since all
/// union fields sit at offset 0).
#[derive(Debug, Clone, Default)]
pub struct CompositeLayout {
    pub size: Option<u64>,
    pub alignment: u64,
    pub is_variable: bool,
    /// Offsets of fixed-offset fields by body-item index. A field after a
    /// variable-size field has no static offset and no entry here.
    pub field_offsets: HashMap<usize, u64>,
}

/// Mutable state threaded through the analysis phases. All cross-phase
/// artifacts are keyed by `DeclId` handles, never node addresses.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    pub options: AnalysisOptions,
    pub diagnostics: DiagnosticCollection,
    pub symbols: SymbolTable,
    /// Evaluated integer constants as u64 bit patterns.
    pub constant_values: HashMap<DeclId, u64>,
    /// Evaluated enum item values: (enum decl, item index) -> value.
    pub enum_item_values: HashMap<(DeclId, usize), u64>,
    /// Struct and union layouts.
    pub layouts: HashMap<DeclId, CompositeLayout>,
    /// Declarations whose analysis failed structurally; later phases and
    /// the IR builder skip them but continue on siblings.
    pub poisoned: HashSet<DeclId>,
    /// Declarations reachable from the main module's exports.
    pub reachable: HashSet<DeclId>,
}

impl AnalysisSession {
    pub fn new(options: AnalysisOptions) -> Self {
        AnalysisSession {
            options,
            ..Default::default()
        }
    }

    pub fn poison(&mut self, id: DeclId) {
        self.poisoned.insert(id);
    }

    pub fn is_poisoned(&self, id: DeclId) -> bool {
        self.poisoned.contains(&id)
    }
}
