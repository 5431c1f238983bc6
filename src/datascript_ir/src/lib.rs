pub mod builder;
pub mod ids;
pub mod model;

pub use builder::build_bundle;
pub use ids::EntityId;
pub use model::{
    Bundle, ChoiceEntity, ConstEntity, Entity, EnumEntity, IrArraySizing, IrBitWidth,
    IrChoiceCase, IrCondition, IrDiscriminator, IrEndian, IrEnumItem, IrExpr, IrField,
    IrFunction, IrMember, IrParam, IrSelector, IrStatement, IrStrEncoding, IrType,
    IrUnionCase, StructEntity, SubtypeEntity, UnionEntity,
};
