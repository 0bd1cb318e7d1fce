pub mod compiler;
pub mod pipeline;

pub use crate::domain::model::{CompileResult, CompiledUnit, EmitKind, SourceFile};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
