pub mod engine;
pub mod pipeline;
pub mod session;

pub use crate::domain::model::{
    AccountKey, Dataset, ExportArtifact, Record, ResolutionResult, ResolveSummary,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Resolver, Storage};
pub use crate::utils::error::Result;
