use crate::config::{ResolverSettings, Strategy};
use crate::domain::ports::ConfigProvider;
use crate::resolvers::BrowserConfig;
use crate::utils::error::{ResolverError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deployment configuration file. Strategy selection lives here so switching
/// between the remote service and the browser scrape is a deploy change, not
/// a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub resolver: ResolverSection,
    pub io: IoSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSection {
    pub strategy: Strategy,
    pub api_endpoint: Option<String>,
    pub page_url: Option<String>,
    pub webdriver_url: Option<String>,
    pub wait_timeout_seconds: Option<u64>,
    pub settle_seconds: Option<u64>,
    pub reset_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoSection {
    pub input_path: String,
    pub output_path: String,
    pub account_column: String,
    pub target_column: String,
}

impl TomlConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ResolverError::ConfigError {
            message: format!("invalid TOML configuration: {}", e),
        })
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        let defaults = BrowserConfig::default();
        ResolverSettings {
            strategy: self.resolver.strategy,
            api_endpoint: self.resolver.api_endpoint.clone().unwrap_or_default(),
            browser: BrowserConfig {
                webdriver_url: self
                    .resolver
                    .webdriver_url
                    .clone()
                    .unwrap_or(defaults.webdriver_url),
                page_url: self.resolver.page_url.clone().unwrap_or(defaults.page_url),
                wait_timeout: self
                    .resolver
                    .wait_timeout_seconds
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.wait_timeout),
                poll_interval: defaults.poll_interval,
                settle_delay: self
                    .resolver
                    .settle_seconds
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.settle_delay),
                reset_delay: self
                    .resolver
                    .reset_seconds
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.reset_delay),
            },
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("io.input_path", &self.io.input_path)?;
        validation::validate_file_extension("io.input_path", &self.io.input_path, &["xlsx", "xls"])?;
        validation::validate_path("io.output_path", &self.io.output_path)?;
        validation::validate_non_empty_string("io.account_column", &self.io.account_column)?;
        validation::validate_non_empty_string("io.target_column", &self.io.target_column)?;

        match self.resolver.strategy {
            Strategy::Remote => {
                let endpoint = validation::validate_required_field(
                    "resolver.api_endpoint",
                    &self.resolver.api_endpoint,
                )?;
                validation::validate_url("resolver.api_endpoint", endpoint)?;
            }
            Strategy::Browser => {
                if let Some(page_url) = &self.resolver.page_url {
                    validation::validate_url("resolver.page_url", page_url)?;
                }
                if let Some(webdriver_url) = &self.resolver.webdriver_url {
                    validation::validate_url("resolver.webdriver_url", webdriver_url)?;
                }
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.io.input_path
    }

    fn output_path(&self) -> &str {
        &self.io.output_path
    }

    fn account_column(&self) -> &str {
        &self.io.account_column
    }

    fn target_column(&self) -> &str {
        &self.io.target_column
    }
}
