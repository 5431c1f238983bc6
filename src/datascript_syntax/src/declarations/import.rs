use crate::pos::SourcePos;
use serde::{Deserialize, Serialize};

/// `package a.b.c;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDecl {
    pub pos: SourcePos,
    pub parts: Vec<String>,
}

impl PackageDecl {
    pub fn dotted(&self) -> String {
        self.parts.join(".")
    }
}

/// `import a.b.c;` or `import a.b.*;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub pos: SourcePos,
    pub parts: Vec<String>,
    pub is_wildcard: bool,
}

impl ImportDecl {
    pub fn dotted(&self) -> String {
        self.parts.join(".")
    }
}
