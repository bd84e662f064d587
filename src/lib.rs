pub mod config;
pub mod core;
pub mod domain;
pub mod excel;
pub mod resolvers;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};
pub use config::{ResolverSettings, Strategy, TomlConfig};

pub use self::core::{engine::ResolverEngine, pipeline::ResolvePipeline};
pub use domain::model::{AccountKey, Dataset, ExportArtifact, Record, ResolutionResult};
pub use resolvers::{BrowserConfig, BrowserSession, RemoteLookup};
pub use utils::error::{ResolverError, Result};
