pub mod config;
pub mod core;
pub mod domain;
pub mod lex;
pub mod parse;
pub mod text;
pub mod utils;

pub use config::{cli::LocalStorage, BuildSettings};

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{compiler::CompilerEngine, pipeline::CompilePipeline};
pub use utils::error::{OstaError, Result};
