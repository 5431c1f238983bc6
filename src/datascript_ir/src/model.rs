//! The bundle handed to renderers: a topologically ordered, self-contained
//! entity list. Once built it holds no references into the AST; every name
//! occurrence has been rebound to a typed reference.

use crate::ids::EntityId;
use serde::{Deserialize, Serialize};
use syntax::expressions::{BinaryOp, UnaryOp};
use syntax::SourcePos;

/// Byte order of a multi-byte primitive, with the module default already
/// applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrEndian {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrStrEncoding {
    Utf8,
    Utf16,
    Utf32,
}

/// Bitfield width: constant when it evaluated at compile time, otherwise
/// the expression the reader evaluates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrBitWidth {
    Const(u64),
    Expr(Box<IrExpr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrArraySizing {
    Fixed(IrExpr),
    Ranged {
        min: Option<IrExpr>,
        max: IrExpr,
    },
    Unsized,
}

/// Type reference: a primitive descriptor or a bundle entity index. Entity
/// references carry instantiation arguments when the target is
/// parameterized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrType {
    UInt {
        bits: u32,
        endian: IrEndian,
    },
    Int {
        bits: u32,
        endian: IrEndian,
    },
    Bitfield(IrBitWidth),
    Bool,
    Str {
        encoding: IrStrEncoding,
        endian: IrEndian,
    },
    Array {
        elem: Box<IrType>,
        sizing: IrArraySizing,
    },
    Entity {
        id: EntityId,
        args: Vec<IrExpr>,
    },
    /// Size not determinable at compile time and no entity to point at;
    /// produced for references whose resolution failed (the owning entity
    /// is poisoned).
    Unknown,
}

impl IrType {
    pub fn entity(id: EntityId) -> Self {
        IrType::Entity {
            id,
            args: Vec::new(),
        }
    }
}

/// Mirror of the AST expression tree with identifiers pre-bound. Renderers
/// map reference kinds; they never resolve names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrExpr {
    UInt(u64),
    Bool(bool),
    Str(String),
    /// Field of the immediately enclosing composite, by name.
    FieldRef(String),
    /// Constant entity in this bundle.
    ConstRef(EntityId),
    /// Parameter of the enclosing parameterized type, by position.
    ParamRef(usize),
    EnumItemRef {
        enum_id: EntityId,
        item: usize,
    },
    /// The value under scrutiny inside a subtype constraint.
    SelfRef,
    Unary {
        op: UnaryOp,
        operand: Box<IrExpr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<IrExpr>,
        right: Box<IrExpr>,
    },
    Ternary {
        condition: Box<IrExpr>,
        true_expr: Box<IrExpr>,
        false_expr: Box<IrExpr>,
    },
    Member {
        base: Box<IrExpr>,
        field: String,
    },
    Index {
        base: Box<IrExpr>,
        index: Box<IrExpr>,
    },
    Call {
        callee: Box<IrExpr>,
        args: Vec<IrExpr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrCondition {
    Always,
    Runtime(IrExpr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrField {
    pub name: String,
    pub ty: IrType,
    /// Static byte offset within the composite, when layout could compute
    /// one.
    pub offset: Option<u64>,
    pub condition: IrCondition,
    pub constraint: Option<IrExpr>,
    pub default_value: Option<IrExpr>,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrParam {
    pub name: String,
    pub ty: IrType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrStatement {
    Return(IrExpr),
    Expression(IrExpr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrFunction {
    pub name: String,
    pub return_type: IrType,
    pub params: Vec<IrParam>,
    pub body: Vec<IrStatement>,
    pub doc: Option<String>,
}

/// One entry in a composite body, in declaration order. Labels and
/// alignment directives drive the generated reader (seek to an absolute
/// offset; advance to the next aligned offset relative to the buffer
/// start), and do not affect the static layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrMember {
    Field(IrField),
    Label(IrExpr),
    Align(IrExpr),
    Function(IrFunction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrEnumItem {
    pub name: String,
    pub value: u64,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumEntity {
    pub name: String,
    pub base: IrType,
    pub items: Vec<IrEnumItem>,
    pub is_bitmask: bool,
    pub doc: Option<String>,
    pub loc: SourcePos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtypeEntity {
    pub name: String,
    pub base: IrType,
    pub constraint: IrExpr,
    pub doc: Option<String>,
    pub loc: SourcePos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstEntity {
    pub name: String,
    pub ty: IrType,
    /// Resolved u64 bit pattern; sign reinterpretation is the renderer's
    /// job. `None` when evaluation failed (the entity is poisoned) or the
    /// constant is not an integer.
    pub value: Option<u64>,
    pub poisoned: bool,
    pub doc: Option<String>,
    pub loc: SourcePos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructEntity {
    pub name: String,
    pub params: Vec<IrParam>,
    pub members: Vec<IrMember>,
    pub size: Option<u64>,
    pub alignment: u64,
    pub poisoned: bool,
    pub doc: Option<String>,
    pub loc: SourcePos,
}

impl StructEntity {
    pub fn fields(&self) -> impl Iterator<Item = &IrField> {
        self.members.iter().filter_map(|m| match m {
            IrMember::Field(f) => Some(f),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrUnionCase {
    pub name: String,
    pub members: Vec<IrMember>,
    pub condition: Option<IrExpr>,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionEntity {
    pub name: String,
    pub params: Vec<IrParam>,
    pub cases: Vec<IrUnionCase>,
    pub size: Option<u64>,
    pub alignment: u64,
    pub poisoned: bool,
    pub doc: Option<String>,
    pub loc: SourcePos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrDiscriminator {
    /// Expression evaluated in the enclosing scope.
    External(IrExpr),
    /// Primitive read at the choice's start.
    Inline(IrType),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrSelector {
    Exact(Vec<IrExpr>),
    Ge(IrExpr),
    Gt(IrExpr),
    Le(IrExpr),
    Lt(IrExpr),
    Ne(IrExpr),
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrChoiceCase {
    pub selector: IrSelector,
    pub field_name: String,
    pub members: Vec<IrMember>,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceEntity {
    pub name: String,
    pub params: Vec<IrParam>,
    pub discriminator: IrDiscriminator,
    /// Source order, except that a default case always comes last.
    pub cases: Vec<IrChoiceCase>,
    pub poisoned: bool,
    pub doc: Option<String>,
    pub loc: SourcePos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Enum(EnumEntity),
    Subtype(SubtypeEntity),
    Const(ConstEntity),
    Struct(StructEntity),
    Union(UnionEntity),
    Choice(ChoiceEntity),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Enum(e) => &e.name,
            Entity::Subtype(e) => &e.name,
            Entity::Const(e) => &e.name,
            Entity::Struct(e) => &e.name,
            Entity::Union(e) => &e.name,
            Entity::Choice(e) => &e.name,
        }
    }

    pub fn loc(&self) -> &SourcePos {
        match self {
            Entity::Enum(e) => &e.loc,
            Entity::Subtype(e) => &e.loc,
            Entity::Const(e) => &e.loc,
            Entity::Struct(e) => &e.loc,
            Entity::Union(e) => &e.loc,
            Entity::Choice(e) => &e.loc,
        }
    }
}

/// Entities in dependency order: every entity reference points at an
/// earlier index except inside reference cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub name: String,
    pub entities: Vec<Entity>,
}

impl Bundle {
    pub fn get(&self, id: EntityId) -> &Entity {
        &self.entities[id.index()]
    }

    pub fn find(&self, name: &str) -> Option<(EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .find(|(_, e)| e.name() == name)
            .map(|(i, e)| (EntityId(i as u32), e))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
