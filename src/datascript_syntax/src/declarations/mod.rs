pub mod choice;
pub mod constant;
pub mod constraint;
pub mod enumeration;
pub mod function;
pub mod import;
pub mod module;
pub mod param;
pub mod structure;
pub mod subtype;
pub mod type_alias;
pub mod union;

pub use choice::{CaseSelector, ChoiceCase, ChoiceDef, ChoiceDiscriminator, CompareKind};
pub use constant::ConstantDef;
pub use constraint::ConstraintDef;
pub use enumeration::{EnumDef, EnumItem};
pub use function::{FunctionDef, Statement};
pub use import::{ImportDecl, PackageDecl};
pub use module::Module;
pub use param::Param;
pub use structure::{
    AlignmentDirective, BodyItem, FieldDef, InlineStructField, InlineUnionField, LabelDirective,
    StructDef,
};
pub use subtype::SubtypeDef;
pub use type_alias::TypeAliasDef;
pub use union::{UnionCase, UnionDef};
