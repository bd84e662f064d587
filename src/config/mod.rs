#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, LocalStorage};
pub use toml_config::TomlConfig;

use crate::resolvers::BrowserConfig;
use serde::{Deserialize, Serialize};

/// Which lookup strategy the deployment uses. Chosen once per run by the
/// caller, never branched on inside the resolver loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Remote,
    Browser,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Remote => write!(f, "remote"),
            Strategy::Browser => write!(f, "browser"),
        }
    }
}

/// Strategy plus the endpoints and pacing it needs, assembled from either
/// configuration source.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub strategy: Strategy,
    pub api_endpoint: String,
    pub browser: BrowserConfig,
}
