use crate::declarations::choice::ChoiceDef;
use crate::declarations::constant::ConstantDef;
use crate::declarations::constraint::ConstraintDef;
use crate::declarations::enumeration::EnumDef;
use crate::declarations::import::{ImportDecl, PackageDecl};
use crate::declarations::structure::StructDef;
use crate::declarations::subtype::SubtypeDef;
use crate::declarations::type_alias::TypeAliasDef;
use crate::declarations::union::UnionDef;
use crate::types::Endian;
use serde::{Deserialize, Serialize};

/// One parsed schema file. Declaration lists preserve source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    /// Module default for primitives with unspecified byte order.
    pub default_endianness: Endian,
    pub constants: Vec<ConstantDef>,
    pub subtypes: Vec<SubtypeDef>,
    pub constraints: Vec<ConstraintDef>,
    pub type_aliases: Vec<TypeAliasDef>,
    pub enums: Vec<EnumDef>,
    pub structs: Vec<StructDef>,
    pub unions: Vec<UnionDef>,
    pub choices: Vec<ChoiceDef>,
}

impl Default for Module {
    fn default() -> Self {
        Module {
            package: None,
            imports: Vec::new(),
            default_endianness: Endian::Big,
            constants: Vec::new(),
            subtypes: Vec::new(),
            constraints: Vec::new(),
            type_aliases: Vec::new(),
            enums: Vec::new(),
            structs: Vec::new(),
            unions: Vec::new(),
            choices: Vec::new(),
        }
    }
}

impl Module {
    pub fn package_name(&self) -> String {
        self.package
            .as_ref()
            .map(|p| p.dotted())
            .unwrap_or_default()
    }
}
