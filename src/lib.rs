pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod utils;
pub mod web;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use config::AppConfig;
pub use utils::error::{F1BetError, ProviderError, Result};
pub use web::{build_router, AppState};
