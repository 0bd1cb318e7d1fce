use crate::core::{CompileResult, ConfigProvider, EmitKind, Pipeline, SourceFile, Storage};
use crate::domain::model::CompiledUnit;
use crate::lex::registry::TokenRegistry;
use crate::lex::Lexer;
use crate::parse::cst::Cst;
use crate::parse::grammar::parse_program;
use crate::parse::visitor::IlGenerator;
use crate::parse::ast::Ast;
use crate::utils::error::{OstaError, Result};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Reads sources through a [`Storage`], runs the front-end over each file
/// and writes the requested artifacts next to each other in the output directory.
pub struct CompilePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> CompilePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn compile_unit(registry: &Arc<TokenRegistry>, source: &SourceFile) -> Result<CompiledUnit> {
        let tokens = Lexer::with_registry(source.contents.as_str(), Arc::clone(registry)).tokenize()?;
        let cst = Cst::from_tokens(&tokens)?;
        let program = parse_program(&source.contents)?;

        let mut generator = IlGenerator::new();
        program.accept(&mut generator);

        Ok(CompiledUnit {
            path: source.path.clone(),
            tokens,
            cst_dot: cst.to_dot(),
            program,
            il: generator.into_il(),
        })
    }

    fn artifact(unit: &CompiledUnit, kind: EmitKind) -> Result<Vec<u8>> {
        let data = match kind {
            EmitKind::Tokens => serde_json::to_vec_pretty(&unit.tokens)?,
            EmitKind::Cst => unit.cst_dot.clone().into_bytes(),
            EmitKind::Ast => serde_json::to_vec_pretty(&unit.program)?,
            EmitKind::Il => unit.il.clone().into_bytes(),
        };
        Ok(data)
    }
}

/// File name without directories or the `.osta` extension.
pub fn source_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(path)
        .to_string()
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CompilePipeline<S, C> {
    async fn load_sources(&self) -> Result<Vec<SourceFile>> {
        let paths = self.config.sources();
        if paths.is_empty() {
            return Err(OstaError::MissingConfigError {
                field: "sources".to_string(),
            });
        }

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            tracing::debug!("Loading source {}", path);
            let bytes = self
                .storage
                .read_file(path)
                .await
                .map_err(|e| OstaError::in_source(path.as_str(), e))?;
            let contents = String::from_utf8(bytes).map_err(|e| {
                OstaError::in_source(
                    path.as_str(),
                    std::io::Error::new(std::io::ErrorKind::InvalidData, e),
                )
            })?;
            sources.push(SourceFile {
                path: path.clone(),
                contents,
            });
        }

        Ok(sources)
    }

    async fn compile(&self, sources: Vec<SourceFile>) -> Result<CompileResult> {
        let registry = Arc::new(TokenRegistry::standard()?);
        let mut units = Vec::with_capacity(sources.len());

        for source in &sources {
            let unit = Self::compile_unit(&registry, source)
                .map_err(|e| OstaError::in_source(source.path.as_str(), e))?;
            tracing::debug!(
                "Compiled {}: {} tokens, {} statements",
                unit.path,
                unit.tokens.len(),
                unit.program.statements.len()
            );
            units.push(unit);
        }

        Ok(CompileResult { units })
    }

    async fn emit(&self, result: CompileResult) -> Result<String> {
        let output_path = self.config.output_path();

        let mut stems = HashSet::new();
        for unit in &result.units {
            let stem = source_stem(&unit.path);
            if !stems.insert(stem.clone()) {
                return Err(OstaError::ConfigValidationError {
                    field: "sources".to_string(),
                    message: format!(
                        "More than one source is named '{}'; their artifacts would overwrite each other",
                        stem
                    ),
                });
            }
        }

        for unit in &result.units {
            let stem = source_stem(&unit.path);
            for kind in self.config.emit_kinds() {
                let file = Path::new(output_path).join(format!("{}.{}", stem, kind.extension()));
                let data = Self::artifact(unit, *kind)?;
                tracing::debug!("Writing {} ({} bytes)", file.display(), data.len());
                self.storage
                    .write_file(&file.to_string_lossy(), &data)
                    .await?;
            }
        }

        Ok(output_path.to_string())
    }
}
