use account_resolver::config::{ResolverSettings, Strategy, TomlConfig};
use account_resolver::domain::ports::{ConfigProvider, Resolver};
use account_resolver::utils::{logger, validation::Validate};
use account_resolver::{
    BrowserSession, CliConfig, LocalStorage, RemoteLookup, ResolvePipeline, ResolverEngine,
};
use clap::Parser;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting account-resolver");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let monitor = cli.monitor;
    let result = match cli.config.clone() {
        Some(config_path) => {
            let config = match TomlConfig::load(&config_path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("❌ Failed to load configuration file: {}", e);
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = config.validate() {
                tracing::error!("❌ Configuration validation failed: {}", e);
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
            let settings = config.resolver_settings();
            run(config, settings, monitor).await
        }
        None => {
            if let Err(e) = cli.validate() {
                tracing::error!("❌ Configuration validation failed: {}", e);
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
            let settings = cli.resolver_settings();
            run(cli, settings, monitor).await
        }
    };

    match result {
        Ok(output_path) => {
            tracing::info!("✅ Resolution completed successfully!");
            println!("✅ Resolution completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("❌ Batch failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn run<C>(
    config: C,
    settings: ResolverSettings,
    monitor: bool,
) -> account_resolver::Result<String>
where
    C: ConfigProvider + 'static,
{
    tracing::info!("Resolution strategy: {}", settings.strategy);
    match settings.strategy {
        Strategy::Remote => {
            tracing::info!("Using remote lookup at {}", settings.api_endpoint);
            let resolver = RemoteLookup::new(settings.api_endpoint.clone());
            run_engine(config, resolver, monitor).await
        }
        Strategy::Browser => {
            tracing::info!("Using browser scrape against {}", settings.browser.page_url);
            let resolver = BrowserSession::new(settings.browser.clone());
            run_engine(config, resolver, monitor).await
        }
    }
}

async fn run_engine<C, R>(config: C, resolver: R, monitor: bool) -> account_resolver::Result<String>
where
    C: ConfigProvider + 'static,
    R: Resolver + 'static,
{
    let output_dir = config.output_path().to_string();
    let storage = LocalStorage::new(".".to_string());
    let pipeline = ResolvePipeline::new(storage, config, resolver);
    let mut engine = ResolverEngine::new_with_monitoring(pipeline, monitor);

    let artifact = engine.run().await?;
    let output_path = Path::new(&output_dir).join(&artifact.file_name);
    Ok(output_path.to_string_lossy().into_owned())
}
