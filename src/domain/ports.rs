use crate::domain::model::{AccountKey, Dataset, ExportArtifact, ResolutionResult, ResolveSummary};
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
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn account_column(&self) -> &str;
    fn target_column(&self) -> &str;
}

/// One lookup capability, two deploy-time implementations (remote API call or
/// browser scrape). `open`/`close` bracket the whole batch; `resolve` never
/// fails hard, it reports each row's outcome as a sentinel.
#[async_trait]
pub trait Resolver: Send {
    async fn open(&mut self) -> Result<()>;
    async fn resolve(&mut self, key: &AccountKey) -> ResolutionResult;
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn resolve(&self, dataset: Dataset) -> Result<ResolveSummary>;
    async fn load(&self, summary: ResolveSummary) -> Result<ExportArtifact>;
}
