pub mod http;
pub mod stub;

pub use http::HttpF1Provider;
pub use stub::StubF1Provider;

use crate::config::ProviderConfig;
use crate::domain::ports::F1Provider;
use crate::utils::error::Result;
use std::sync::Arc;

/// 依設定選擇 provider 實作
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn F1Provider>> {
    if config.is_http() {
        tracing::info!("Using HTTP provider at {}", config.base_url);
        Ok(Arc::new(HttpF1Provider::new(config)?))
    } else {
        tracing::info!("Using stub provider");
        Ok(Arc::new(StubF1Provider::new()))
    }
}
