use crate::pos::SourcePos;
use serde::{Deserialize, Serialize};

/// Byte order of a multi-byte primitive. `Unspec` inherits the module default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endian {
    Unspec,
    Little,
    Big,
}

impl Default for Endian {
    fn default() -> Self {
        Endian::Unspec
    }
}

/// Fixed-width integer primitive: `uint8` .. `uint128`, `int8` .. `int128`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveType {
    pub pos: SourcePos,
    pub is_signed: bool,
    /// 8, 16, 32, 64 or 128.
    pub bits: u32,
    pub byte_order: Endian,
}

impl PrimitiveType {
    pub fn keyword(&self) -> String {
        format!("{}int{}", if self.is_signed { "" } else { "u" }, self.bits)
    }
}

/// Character encoding of a string primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringEncoding {
    Utf8,
    Utf16,
    Utf32,
}

impl StringEncoding {
    pub fn keyword(self) -> &'static str {
        match self {
            StringEncoding::Utf8 => "string",
            StringEncoding::Utf16 => "u16string",
            StringEncoding::Utf32 => "u32string",
        }
    }
}
