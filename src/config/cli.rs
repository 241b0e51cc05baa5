use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "f1bet")]
#[command(about = "Betting backend for Formula 1 sessions")]
pub struct CliArgs {
    #[arg(short, long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Listen address, e.g. 0.0.0.0:8080")]
    pub bind: Option<String>,

    #[arg(long, help = "Provider adapter: stub or http")]
    pub provider_mode: Option<String>,

    #[arg(long, help = "Base URL of the F1 data provider")]
    pub provider_url: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    /// 命令列參數優先於檔案設定
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind_addr = bind.clone();
        }
        if let Some(mode) = &self.provider_mode {
            config.provider.mode = mode.to_ascii_lowercase();
        }
        if let Some(url) = &self.provider_url {
            config.provider.base_url = url.clone();
        }
    }
}
