// Semantic middle-end, organized by concern:
//
//   1. Symbol Collection     - per-module tables plus wildcard overlay
//   2. Name Resolution       - type and constant references
//   3. Type Checking         - expression categories
//   4. Constant Evaluation   - compile-time values with overflow detection
//   5. Size Calculation      - layouts, offsets, alignment
//   6. Constraint Validation - always-true / always-false conditions
//   7. Reachability          - unused imports, constants, constraints
//
// Phase 0 (desugaring of inline composite types) runs before the session
// phases and rewrites the module set in place.

pub mod diagnostics;
pub mod ids;
pub mod loader;
pub mod options;
pub mod passes;
pub mod pipeline;
pub mod registry;
pub mod session;
pub mod symbols;

pub use diagnostics::code::DiagnosticCode;
pub use diagnostics::collection::DiagnosticCollection;
pub use diagnostics::diagnostic::Diagnostic;
pub use diagnostics::severity::Severity;
pub use ids::{DeclId, DeclKind, ModuleId};
pub use loader::{load_modules, LoadError, LoadedModule, ModuleSet};
pub use options::AnalysisOptions;
pub use pipeline::analyze;
pub use registry::LanguageRegistry;
pub use session::AnalysisSession;

// Downstream crates reach the parser and AST through here.
pub use datascript_parser as parser;
pub use datascript_parser::syntax;
