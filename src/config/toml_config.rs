use crate::utils::error::{F1BetError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const PROVIDER_MODE_STUB: &str = "stub";
pub const PROVIDER_MODE_HTTP: &str = "http";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub odds: OddsConfig,
    pub idempotency: IdempotencyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub mode: String,
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    pub max_concurrency: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mode: PROVIDER_MODE_STUB.to_string(),
            base_url: "https://provider.example.com".to_string(),
            timeout_ms: 2000,
            retry_attempts: 3,
            retry_backoff_ms: 100,
            max_concurrency: 4,
        }
    }
}

impl ProviderConfig {
    pub fn is_http(&self) -> bool {
        self.mode == PROVIDER_MODE_HTTP
    }
}

/// Odds are drawn from entropy unless a seed is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsConfig {
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdempotencyConfig {
    pub ttl_seconds: u64,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self { ttl_seconds: 300 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(F1BetError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| F1BetError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PROVIDER_URL})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| F1BetError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_one_of(
            "provider.mode",
            &self.provider.mode,
            &[PROVIDER_MODE_STUB, PROVIDER_MODE_HTTP],
        )?;

        // 只有 http 模式才需要真正的端點
        if self.provider.is_http() {
            validation::validate_url("provider.base_url", &self.provider.base_url)?;
        }

        validation::validate_positive_number("provider.timeout_ms", self.provider.timeout_ms, 1)?;
        validation::validate_positive_number(
            "provider.retry_attempts",
            u64::from(self.provider.retry_attempts),
            1,
        )?;
        validation::validate_positive_number(
            "provider.max_concurrency",
            self.provider.max_concurrency as u64,
            1,
        )?;

        if self.server.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(F1BetError::InvalidConfigValueError {
                field: "server.bind_addr".to_string(),
                value: self.server.bind_addr.clone(),
                reason: "Expected host:port".to_string(),
            });
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
