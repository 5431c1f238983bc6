pub mod declarations;
pub mod emit_trait;
pub mod expressions;
pub mod module;
pub mod types;

pub use emit_trait::{Emit, EmitCtx, EmitError, Emitter};
