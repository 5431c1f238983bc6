use std::collections::BTreeMap;

static CPP_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "alignas", "alignof", "auto", "bool", "break", "case", "catch", "char",
    "class", "const", "constexpr", "continue", "default", "delete", "do",
    "double", "else", "enum", "explicit", "export", "extern", "false",
    "float", "for", "friend", "goto", "if", "inline", "int", "long",
    "mutable", "namespace", "new", "noexcept", "nullptr", "operator",
    "private", "protected", "public", "register", "return", "short",
    "signed", "sizeof", "static", "struct", "switch", "template", "this",
    "throw", "true", "try", "typedef", "typeid", "typename", "union",
    "unsigned", "using", "virtual", "void", "volatile", "while",
};

static RUST_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "as", "async", "await", "break", "const", "continue", "crate", "dyn",
    "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "static", "struct", "super", "trait", "true", "type", "unsafe",
    "use", "where", "while",
};

/// Keyword sets for the code-generation targets a schema may be rendered
/// to. Phase 1 consults this to warn about identifiers that would collide
/// in a target language. Read-only after construction.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: BTreeMap<&'static str, &'static phf::Set<&'static str>>,
}

impl LanguageRegistry {
    /// Registry with the built-in renderer targets.
    pub fn builtin() -> Self {
        let mut languages = BTreeMap::new();
        languages.insert("cpp", &CPP_KEYWORDS);
        languages.insert("rust", &RUST_KEYWORDS);
        LanguageRegistry { languages }
    }

    pub fn empty() -> Self {
        LanguageRegistry {
            languages: BTreeMap::new(),
        }
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }

    pub fn available_languages(&self) -> Vec<&'static str> {
        self.languages.keys().copied().collect()
    }

    pub fn is_keyword(&self, language: &str, identifier: &str) -> bool {
        self.languages
            .get(language)
            .is_some_and(|set| set.contains(identifier))
    }

    /// Sanitized replacement for an identifier that collides with a target
    /// keyword.
    pub fn sanitize(&self, identifier: &str) -> String {
        format!("{}_", identifier)
    }
}
