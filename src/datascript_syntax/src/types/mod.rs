pub mod primitive;
pub mod type_;

pub use primitive::{Endian, PrimitiveType, StringEncoding};
pub use type_::{
    ArraySizing, ArrayType, BitFieldType, BitFieldWidth, QualifiedName, StringType, Type,
    TypeInstantiation,
};
