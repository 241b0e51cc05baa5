use crate::config::ProviderConfig;
use crate::domain::model::SessionType;
use crate::domain::ports::{F1Provider, ProviderDriver, ProviderSession, ProviderSessionFilter};
use crate::utils::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

type ProviderResult<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionPayload {
    id: Option<String>,
    name: Option<String>,
    session_type: Option<String>,
    country: Option<String>,
    year: Option<i32>,
    start_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriverPayload {
    id: Option<String>,
    full_name: Option<String>,
}

fn invalid(field: &str, reason: impl Into<String>) -> ProviderError {
    ProviderError::InvalidPayload {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn required<T>(field: &str, value: Option<T>) -> ProviderResult<T> {
    value.ok_or_else(|| invalid(field, "missing required field"))
}

fn required_text(field: &str, value: Option<String>) -> ProviderResult<String> {
    let text = required(field, value)?;
    if text.trim().is_empty() {
        return Err(invalid(field, "must not be blank"));
    }
    Ok(text)
}

impl SessionPayload {
    fn into_session(self) -> ProviderResult<ProviderSession> {
        let id = required_text("id", self.id)?;
        // 事件 id 直接沿用 session id
        Uuid::parse_str(&id).map_err(|e| invalid("id", format!("not a UUID: {}", e)))?;

        let session_type = required_text("sessionType", self.session_type)?
            .parse::<SessionType>()
            .map_err(|e| invalid("sessionType", e.to_string()))?;

        let start_time = DateTime::parse_from_rfc3339(&required_text("startTime", self.start_time)?)
            .map_err(|e| invalid("startTime", e.to_string()))?
            .with_timezone(&Utc);

        Ok(ProviderSession {
            id,
            name: required_text("name", self.name)?,
            session_type,
            country: required_text("country", self.country)?,
            year: required("year", self.year)?,
            start_time,
        })
    }
}

impl DriverPayload {
    fn into_driver(self) -> ProviderResult<ProviderDriver> {
        Ok(ProviderDriver {
            id: required_text("id", self.id)?,
            full_name: required_text("fullName", self.full_name)?,
        })
    }
}

/// Adapter for a remote F1 data provider speaking JSON over HTTP.
pub struct HttpF1Provider {
    client: Client,
    base_url: String,
    timeout: Duration,
    retry_attempts: u32,
    retry_backoff: Duration,
}

impl HttpF1Provider {
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("f1bet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProviderError::Transport)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_ms),
            retry_attempts: config.retry_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// 帶重試的 GET；只有暫時性錯誤會重試
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> ProviderResult<T> {
        let mut attempt = 1;
        loop {
            match self.get_once(url, query).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_retryable() && attempt < self.retry_attempts => {
                    let delay = self.retry_backoff * attempt;
                    tracing::warn!(
                        "Provider call to {} failed (attempt {}/{}): {}; retrying in {:?}",
                        url,
                        attempt,
                        self.retry_attempts,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if err.is_retryable() && self.retry_attempts > 1 => {
                    tracing::error!("Provider call to {} gave up after {} attempts", url, attempt);
                    return Err(ProviderError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> ProviderResult<T> {
        tracing::debug!("Provider request: GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, url))?;

        let status = response.status();
        tracing::debug!("Provider response status: {}", status);

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, url))
    }
}

#[async_trait]
impl F1Provider for HttpF1Provider {
    async fn list_sessions(
        &self,
        filter: &ProviderSessionFilter,
    ) -> ProviderResult<Vec<ProviderSession>> {
        let mut query = Vec::new();
        if let Some(session_type) = filter.session_type {
            query.push(("sessionType", session_type.to_string()));
        }
        if let Some(year) = filter.year {
            query.push(("year", year.to_string()));
        }
        if let Some(country) = &filter.country {
            query.push(("country", country.clone()));
        }

        let url = format!("{}/sessions", self.base_url);
        let payload: Vec<SessionPayload> = self.get_json(&url, &query).await?;

        payload.into_iter().map(SessionPayload::into_session).collect()
    }

    async fn list_drivers(&self, session_id: &str) -> ProviderResult<Vec<ProviderDriver>> {
        let url = format!("{}/sessions/{}/drivers", self.base_url, session_id);
        let payload: Vec<DriverPayload> = self.get_json(&url, &[]).await?;

        payload.into_iter().map(DriverPayload::into_driver).collect()
    }
}
