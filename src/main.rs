use clap::Parser;
use foodie_app::core::ConfigProvider;
use foodie_app::utils::error::ErrorSeverity;
use foodie_app::utils::{logger, validation::Validate};
use foodie_app::{
    AppEngine, CliConfig, ConnectivityProbe, HttpHealthCheck, ManifestClient, Screen, TomlConfig,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting foodie-app");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let outcome = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => run(config, cli.probe_only).await,
                Err(e) => Err(e),
            }
        }
        None => run(cli.clone(), cli.probe_only).await,
    };

    match outcome {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!(
                "❌ foodie-app failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

/// 回傳程式結束碼；連線失敗不是致命錯誤
async fn run<C: ConfigProvider + Validate>(config: C, probe_only: bool) -> foodie_app::Result<i32> {
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    let settings = config.probe_settings()?;
    let http = reqwest::Client::builder().build()?;
    let check = HttpHealthCheck::new(http, config.health_url(), settings.timeout)
        .with_app_id(config.app_id());
    tracing::info!("🔍 Backend URL: {}", config.backend_url());
    tracing::info!("🔍 Health URL: {}", check.url());
    tracing::info!("🔍 App ID: {}", config.app_id());

    let probe = ConnectivityProbe::new(check, settings);

    if probe_only {
        let result = probe.run().await;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(if result.success { 0 } else { 2 });
    }

    let backend = Arc::new(
        ManifestClient::new(config.backend_url(), config.request_timeout())?
            .with_app_id(config.app_id()),
    );
    let engine = AppEngine::new(probe, Arc::clone(&backend));

    let mut report = engine.start().await;
    println!("{}", report.banner);
    if let Some(error) = &report.probe.error {
        if !report.probe.success {
            println!("   last error after {} attempt(s): {}", report.probe.attempts, error);
        }
    }

    if report.session.screen() == Screen::Landing {
        match config.credentials() {
            Some(credentials) => {
                if report.session.login(&credentials).await.is_err() {
                    if let Some(notice) = report.session.take_notice() {
                        eprintln!("❌ {}", notice);
                    }
                    return Ok(1);
                }
            }
            None => {
                println!("👋 Not logged in. Pass --email and --password to open the dashboard.");
                println!("🔗 Admin panel: {}", backend.admin_url());
                return Ok(0);
            }
        }
    }

    let Some(mut dashboard) = report.session.dashboard() else {
        return Ok(0);
    };

    if let Err(e) = dashboard.load().await {
        if let Some(notice) = dashboard.notice() {
            eprintln!("⚠️ {}", notice);
        }
        // 暫時性錯誤只提示重試，其餘視為失敗
        if e.is_retryable() {
            eprintln!("💡 {}", e.recovery_suggestion());
            return Ok(0);
        }
        return Ok(1);
    }

    let owner = dashboard.owner();
    println!("🍽️ FoodieApp Dashboard - Welcome, {} ({})", owner.name, owner.email);
    if dashboard.restaurants().is_empty() {
        println!("   No restaurants yet.");
    }
    for restaurant in dashboard.restaurants() {
        println!(
            "   • {} - {}",
            restaurant.name,
            restaurant.address.as_deref().unwrap_or("no address")
        );
    }

    if let Some(selected) = dashboard.selected_restaurant() {
        println!("📋 Menu for \"{}\":", selected.name);
        if dashboard.selected_menu().is_empty() {
            println!("   No menu items for this restaurant yet.");
        }
        for item in dashboard.selected_menu() {
            println!("   • {} ${:.2} [{}]", item.name, item.price, item.category);
        }
    }
    println!("🔗 Admin panel: {}", backend.admin_url());

    Ok(0)
}
