use anyhow::Context;
use clap::Parser;
use f1bet::adapters::provider::build_provider;
use f1bet::adapters::random::{SeededRandom, ThreadRandom};
use f1bet::domain::ports::RandomSource;
use f1bet::utils::{logger, validation::Validate};
use f1bet::{build_router, AppConfig, AppState, CliArgs};
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "f1bet.toml";

fn load_config(args: &CliArgs) -> f1bet::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            AppConfig::from_file(DEFAULT_CONFIG_FILE)?
        }
        None => AppConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let provider = build_provider(&config.provider)?;
    let random: Box<dyn RandomSource> = match config.odds.seed {
        Some(seed) => {
            tracing::info!("🎲 Odds drawn from fixed seed {}", seed);
            Box::new(SeededRandom::new(seed))
        }
        None => Box::new(ThreadRandom::new()),
    };

    let state = AppState::in_memory(provider, random, config.provider.max_concurrency);
    let app = build_router(state, Duration::from_secs(config.idempotency.ttl_seconds));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!("🌐 f1bet listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown signal received"),
                Err(e) => {
                    // 無法註冊訊號時持續服務
                    tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
        .context("server error")?;

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            // 設定無效時以預設值初始化日誌再回報
            logger::init_logger("info", false, args.verbose);
            tracing::error!("❌ Configuration failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(&config.logging.level, config.logging.json, args.verbose);

    tracing::info!("Starting f1bet (provider mode: {})", config.provider.mode);
    if args.verbose {
        tracing::debug!("Effective config: {:?}", config);
    }

    if let Err(e) = serve(config).await {
        tracing::error!("❌ f1bet stopped: {:#}", e);
        eprintln!("❌ {:#}", e);
        std::process::exit(3);
    }

    tracing::info!("✅ f1bet stopped cleanly");
}
