use crate::ids::{DeclId, DeclKind, ModuleId};
use crate::loader::ModuleSet;
use std::collections::BTreeMap;
use syntax::declarations::{
    ChoiceDef, ConstantDef, ConstraintDef, EnumDef, StructDef, SubtypeDef, TypeAliasDef, UnionDef,
};
use syntax::SourcePos;

/// Per-module named-entity tables, one map per declaration kind. Values are
/// indices into the module's source-ordered declaration lists.
#[derive(Debug, Clone, Default)]
pub struct ModuleSymbols {
    pub constants: BTreeMap<String, u32>,
    pub subtypes: BTreeMap<String, u32>,
    pub constraints: BTreeMap<String, u32>,
    pub type_aliases: BTreeMap<String, u32>,
    pub enums: BTreeMap<String, u32>,
    pub structs: BTreeMap<String, u32>,
    pub unions: BTreeMap<String, u32>,
    pub choices: BTreeMap<String, u32>,
}

impl ModuleSymbols {
    fn kind_table(&self, kind: DeclKind) -> &BTreeMap<String, u32> {
        match kind {
            DeclKind::Constant => &self.constants,
            DeclKind::Subtype => &self.subtypes,
            DeclKind::Constraint => &self.constraints,
            DeclKind::TypeAlias => &self.type_aliases,
            DeclKind::Enum => &self.enums,
            DeclKind::Struct => &self.structs,
            DeclKind::Union => &self.unions,
            DeclKind::Choice => &self.choices,
        }
    }

    pub fn find(&self, kind: DeclKind, name: &str) -> Option<u32> {
        self.kind_table(kind).get(name).copied()
    }

    /// Search the type namespace (everything except constants and
    /// constraints) for `name`.
    pub fn find_type(&self, name: &str) -> Option<(DeclKind, u32)> {
        for kind in TYPE_NAMESPACE {
            if let Some(index) = self.find(kind, name) {
                return Some((kind, index));
            }
        }
        None
    }
}

pub const TYPE_NAMESPACE: [DeclKind; 6] = [
    DeclKind::Struct,
    DeclKind::Union,
    DeclKind::Choice,
    DeclKind::Enum,
    DeclKind::Subtype,
    DeclKind::TypeAlias,
];

/// Overlay of symbols brought in by wildcard imports, secondary to the
/// module's own tables. One independent map per declaration kind, like the
/// per-module tables; first import wins on conflict within a kind.
#[derive(Debug, Clone, Default)]
pub struct WildcardOverlay {
    pub constants: BTreeMap<String, DeclId>,
    pub subtypes: BTreeMap<String, DeclId>,
    pub constraints: BTreeMap<String, DeclId>,
    pub type_aliases: BTreeMap<String, DeclId>,
    pub enums: BTreeMap<String, DeclId>,
    pub structs: BTreeMap<String, DeclId>,
    pub unions: BTreeMap<String, DeclId>,
    pub choices: BTreeMap<String, DeclId>,
}

impl WildcardOverlay {
    fn kind_table(&self, kind: DeclKind) -> &BTreeMap<String, DeclId> {
        match kind {
            DeclKind::Constant => &self.constants,
            DeclKind::Subtype => &self.subtypes,
            DeclKind::Constraint => &self.constraints,
            DeclKind::TypeAlias => &self.type_aliases,
            DeclKind::Enum => &self.enums,
            DeclKind::Struct => &self.structs,
            DeclKind::Union => &self.unions,
            DeclKind::Choice => &self.choices,
        }
    }

    pub fn kind_table_mut(&mut self, kind: DeclKind) -> &mut BTreeMap<String, DeclId> {
        match kind {
            DeclKind::Constant => &mut self.constants,
            DeclKind::Subtype => &mut self.subtypes,
            DeclKind::Constraint => &mut self.constraints,
            DeclKind::TypeAlias => &mut self.type_aliases,
            DeclKind::Enum => &mut self.enums,
            DeclKind::Struct => &mut self.structs,
            DeclKind::Union => &mut self.unions,
            DeclKind::Choice => &mut self.choices,
        }
    }

    pub fn find(&self, kind: DeclKind, name: &str) -> Option<DeclId> {
        self.kind_table(kind).get(name).copied()
    }

    /// Search the type namespace, in the same kind order the per-module
    /// lookup uses.
    pub fn find_type(&self, name: &str) -> Option<DeclId> {
        for kind in TYPE_NAMESPACE {
            if let Some(id) = self.find(kind, name) {
                return Some(id);
            }
        }
        None
    }
}

/// Symbol tables for the whole module set: one `ModuleSymbols` per module
/// (main first) plus a per-module wildcard overlay.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub modules: Vec<ModuleSymbols>,
    pub overlays: Vec<WildcardOverlay>,
}

impl SymbolTable {
    pub fn module(&self, id: ModuleId) -> &ModuleSymbols {
        &self.modules[id.0 as usize]
    }

    pub fn overlay(&self, id: ModuleId) -> &WildcardOverlay {
        &self.overlays[id.0 as usize]
    }

    /// Resolve a single-segment type name from `module`: own tables first,
    /// wildcard overlay second.
    pub fn find_type(&self, module: ModuleId, name: &str) -> Option<DeclId> {
        if let Some((kind, index)) = self.module(module).find_type(name) {
            return Some(DeclId {
                module,
                kind,
                index,
            });
        }
        self.overlay(module).find_type(name)
    }

    pub fn find_constant(&self, module: ModuleId, name: &str) -> Option<DeclId> {
        if let Some(index) = self.module(module).find(DeclKind::Constant, name) {
            return Some(DeclId {
                module,
                kind: DeclKind::Constant,
                index,
            });
        }
        self.overlay(module).find(DeclKind::Constant, name)
    }

    pub fn find_constraint(&self, module: ModuleId, name: &str) -> Option<DeclId> {
        if let Some(index) = self.module(module).find(DeclKind::Constraint, name) {
            return Some(DeclId {
                module,
                kind: DeclKind::Constraint,
                index,
            });
        }
        self.overlay(module).find(DeclKind::Constraint, name)
    }
}

/// Borrowed view of a top-level declaration.
#[derive(Debug, Clone, Copy)]
pub enum DeclRef<'a> {
    Constant(&'a ConstantDef),
    Subtype(&'a SubtypeDef),
    Constraint(&'a ConstraintDef),
    TypeAlias(&'a TypeAliasDef),
    Enum(&'a EnumDef),
    Struct(&'a StructDef),
    Union(&'a UnionDef),
    Choice(&'a ChoiceDef),
}

impl<'a> DeclRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            DeclRef::Constant(d) => &d.name,
            DeclRef::Subtype(d) => &d.name,
            DeclRef::Constraint(d) => &d.name,
            DeclRef::TypeAlias(d) => &d.name,
            DeclRef::Enum(d) => &d.name,
            DeclRef::Struct(d) => &d.name,
            DeclRef::Union(d) => &d.name,
            DeclRef::Choice(d) => &d.name,
        }
    }

    pub fn pos(&self) -> &'a SourcePos {
        match self {
            DeclRef::Constant(d) => &d.pos,
            DeclRef::Subtype(d) => &d.pos,
            DeclRef::Constraint(d) => &d.pos,
            DeclRef::TypeAlias(d) => &d.pos,
            DeclRef::Enum(d) => &d.pos,
            DeclRef::Struct(d) => &d.pos,
            DeclRef::Union(d) => &d.pos,
            DeclRef::Choice(d) => &d.pos,
        }
    }

    /// Declared parameter count for parameterized types; zero for the rest.
    pub fn param_count(&self) -> usize {
        match self {
            DeclRef::Struct(d) => d.parameters.len(),
            DeclRef::Union(d) => d.parameters.len(),
            DeclRef::Choice(d) => d.parameters.len(),
            _ => 0,
        }
    }
}

/// Fetch the declaration a `DeclId` points at.
pub fn decl_ref<'a>(set: &'a ModuleSet, id: DeclId) -> DeclRef<'a> {
    let module = &set.module(id.module).module;
    let i = id.index as usize;
    match id.kind {
        DeclKind::Constant => DeclRef::Constant(&module.constants[i]),
        DeclKind::Subtype => DeclRef::Subtype(&module.subtypes[i]),
        DeclKind::Constraint => DeclRef::Constraint(&module.constraints[i]),
        DeclKind::TypeAlias => DeclRef::TypeAlias(&module.type_aliases[i]),
        DeclKind::Enum => DeclRef::Enum(&module.enums[i]),
        DeclKind::Struct => DeclRef::Struct(&module.structs[i]),
        DeclKind::Union => DeclRef::Union(&module.unions[i]),
        DeclKind::Choice => DeclRef::Choice(&module.choices[i]),
    }
}

/// Deterministic name-to-declaration resolution shared by phase 2, the
/// later phases and the IR builder.
pub struct Resolver<'a> {
    pub set: &'a ModuleSet,
    pub symbols: &'a SymbolTable,
}

impl<'a> Resolver<'a> {
    pub fn new(set: &'a ModuleSet, symbols: &'a SymbolTable) -> Self {
        Resolver { set, symbols }
    }

    /// Resolve a qualified type name as seen from `module`. Multi-segment
    /// names select an imported module by exact package prefix; the last
    /// segment is looked up there.
    pub fn resolve_type(&self, module: ModuleId, parts: &[String]) -> Option<DeclId> {
        if parts.len() == 1 {
            return self.symbols.find_type(module, &parts[0]);
        }
        let package = parts[..parts.len() - 1].join(".");
        let target = self.set.package_module(&package)?;
        let name = parts.last().expect("qualified name has segments");
        let (kind, index) = self.symbols.module(target).find_type(name)?;
        Some(DeclId {
            module: target,
            kind,
            index,
        })
    }

    pub fn resolve_constant(&self, module: ModuleId, parts: &[String]) -> Option<DeclId> {
        if parts.len() == 1 {
            return self.symbols.find_constant(module, &parts[0]);
        }
        let package = parts[..parts.len() - 1].join(".");
        let target = self.set.package_module(&package)?;
        let name = parts.last().expect("qualified name has segments");
        let index = self
            .symbols
            .module(target)
            .find(DeclKind::Constant, name)?;
        Some(DeclId {
            module: target,
            kind: DeclKind::Constant,
            index,
        })
    }
}
