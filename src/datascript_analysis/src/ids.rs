use serde::{Deserialize, Serialize};

/// Index of a module within a `ModuleSet`: 0 is the main module, `n + 1`
/// is `imported[n]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(pub u32);

impl ModuleId {
    pub const MAIN: ModuleId = ModuleId(0);

    pub fn imported(index: usize) -> Self {
        ModuleId(index as u32 + 1)
    }

    pub fn is_main(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeclKind {
    Constant,
    Subtype,
    Constraint,
    TypeAlias,
    Enum,
    Struct,
    Union,
    Choice,
}

/// Stable handle to a top-level declaration: module index, declaration
/// kind, and position within that kind's source-ordered list. Analysis
/// tables are keyed on these instead of node addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclId {
    pub module: ModuleId,
    pub kind: DeclKind,
    pub index: u32,
}

impl DeclId {
    pub fn new(module: ModuleId, kind: DeclKind, index: usize) -> Self {
        DeclId {
            module,
            kind,
            index: index as u32,
        }
    }
}
