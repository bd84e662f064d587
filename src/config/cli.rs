use crate::config::{ResolverSettings, Strategy};
use crate::domain::ports::{ConfigProvider, Storage};
use crate::resolvers::BrowserConfig;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "account-resolver")]
#[command(about = "Resolve customer IDs for a spreadsheet of account numbers")]
pub struct CliConfig {
    /// Deployment configuration file (TOML); replaces the flags below.
    #[arg(long)]
    pub config: Option<String>,

    /// Uploaded spreadsheet (.xlsx/.xls).
    #[arg(long, required_unless_present = "config")]
    pub input: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Column holding the raw account numbers.
    #[arg(long, default_value = "Account Number")]
    pub account_column: String,

    /// Column the resolved customer IDs are written to (created if missing).
    #[arg(long, default_value = "Customer ID")]
    pub target_column: String,

    #[arg(long, value_enum, default_value_t = Strategy::Remote)]
    pub strategy: Strategy,

    /// Lookup service endpoint (remote strategy).
    #[arg(long)]
    pub api_endpoint: Option<String>,

    /// Billing site search page (browser strategy).
    #[arg(long, default_value = "https://bill.pitc.com.pk/pescobill")]
    pub page_url: String,

    /// WebDriver server the browser strategy connects to.
    #[arg(long, default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log system resource usage per phase")]
    pub monitor: bool,
}

impl CliConfig {
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            strategy: self.strategy,
            api_endpoint: self.api_endpoint.clone().unwrap_or_default(),
            browser: BrowserConfig {
                webdriver_url: self.webdriver_url.clone(),
                page_url: self.page_url.clone(),
                ..BrowserConfig::default()
            },
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let input = validation::validate_required_field("input", &self.input)?;
        validation::validate_path("input", input)?;
        validation::validate_file_extension("input", input, &["xlsx", "xls"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("account_column", &self.account_column)?;
        validation::validate_non_empty_string("target_column", &self.target_column)?;

        match self.strategy {
            Strategy::Remote => {
                let endpoint =
                    validation::validate_required_field("api_endpoint", &self.api_endpoint)?;
                validation::validate_url("api_endpoint", endpoint)?;
            }
            Strategy::Browser => {
                validation::validate_url("page_url", &self.page_url)?;
                validation::validate_url("webdriver_url", &self.webdriver_url)?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        self.input.as_deref().unwrap_or("")
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn account_column(&self) -> &str {
        &self.account_column
    }

    fn target_column(&self) -> &str {
        &self.target_column
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
