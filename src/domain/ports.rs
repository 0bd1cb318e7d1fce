use crate::domain::model::{CompileResult, EmitKind, SourceFile};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn sources(&self) -> &[String];
    fn output_path(&self) -> &str;
    fn emit_kinds(&self) -> &[EmitKind];
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn load_sources(&self) -> Result<Vec<SourceFile>>;
    async fn compile(&self, sources: Vec<SourceFile>) -> Result<CompileResult>;
    async fn emit(&self, result: CompileResult) -> Result<String>;
}
