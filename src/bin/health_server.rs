use clap::Parser;
use foodie_app::config::toml_config::TomlConfig;
use foodie_app::core::ConfigProvider;
use foodie_app::server::{serve, HealthState};
use foodie_app::utils::{logger, monitor::SystemMonitor, validation::Validate};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "health_server")]
#[command(about = "Serves the /health endpoint")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Address to bind; overrides the config file
    #[arg(short, long)]
    bind: Option<String>,

    /// Deployment environment reported in the health body
    #[arg(long)]
    environment: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_server_logger();

    let config = match &args.config {
        Some(path) => {
            let config = match TomlConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            };
            if let Err(e) = config.validate() {
                tracing::error!("❌ Configuration validation failed: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(1);
            }
            Some(config)
        }
        None => None,
    };

    let bind = args
        .bind
        .clone()
        .or_else(|| config.as_ref().map(|c| c.server_bind().to_string()))
        .unwrap_or_else(|| foodie_app::config::toml_config::DEFAULT_SERVER_BIND.to_string());
    let environment = args
        .environment
        .clone()
        .or_else(|| std::env::var("APP_ENV").ok())
        .or_else(|| config.as_ref().map(|c| c.environment().to_string()))
        .unwrap_or_else(|| foodie_app::config::DEFAULT_ENVIRONMENT.to_string());
    let version = config
        .as_ref()
        .map(|c| c.server_version().to_string())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    let monitor = SystemMonitor::new()?;
    let state = HealthState::new(Arc::new(monitor), version, environment);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("Shutdown signal received");
    })
    .await?;

    Ok(())
}
