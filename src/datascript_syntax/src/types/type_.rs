use crate::expressions::Expr;
use crate::pos::SourcePos;
use crate::types::primitive::{Endian, PrimitiveType, StringEncoding};
use serde::{Deserialize, Serialize};

/// Width of a `bit:` field, either a literal or a compile-time expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BitFieldWidth {
    Fixed(u64),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitFieldType {
    pub pos: SourcePos,
    pub width: BitFieldWidth,
}

/// `string`, `u16string` or `u32string`. Only the wide encodings carry a
/// byte order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringType {
    pub pos: SourcePos,
    pub encoding: StringEncoding,
    pub byte_order: Endian,
}

/// Dotted path naming a user-defined type, e.g. `pkg.sub.Header`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifiedName {
    pub pos: SourcePos,
    pub parts: Vec<String>,
}

impl QualifiedName {
    pub fn dotted(&self) -> String {
        self.parts.join(".")
    }

    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1
    }
}

/// Array sizing discipline (fixed / ranged / read-to-end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArraySizing {
    Fixed(Expr),
    Ranged { min: Option<Expr>, max: Expr },
    Unsized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayType {
    pub pos: SourcePos,
    pub element: Type,
    pub sizing: ArraySizing,
}

/// Reference to a parameterized type with argument expressions, e.g.
/// `Record(16)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInstantiation {
    pub pos: SourcePos,
    pub base: QualifiedName,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Primitive(PrimitiveType),
    BitField(BitFieldType),
    Bool { pos: SourcePos },
    Str(StringType),
    Named(QualifiedName),
    Array(Box<ArrayType>),
    Instantiation(TypeInstantiation),
}

impl Type {
    pub fn pos(&self) -> &SourcePos {
        match self {
            Type::Primitive(t) => &t.pos,
            Type::BitField(t) => &t.pos,
            Type::Bool { pos } => pos,
            Type::Str(t) => &t.pos,
            Type::Named(t) => &t.pos,
            Type::Array(t) => &t.pos,
            Type::Instantiation(t) => &t.pos,
        }
    }

    /// The qualified name when this is a plain named reference or an
    /// instantiation of one.
    pub fn referenced_name(&self) -> Option<&QualifiedName> {
        match self {
            Type::Named(q) => Some(q),
            Type::Instantiation(inst) => Some(&inst.base),
            _ => None,
        }
    }
}
