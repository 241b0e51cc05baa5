#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::{
    AppConfig, IdempotencyConfig, LoggingConfig, OddsConfig, ProviderConfig, ServerConfig,
    PROVIDER_MODE_HTTP, PROVIDER_MODE_STUB,
};
