use crate::domain::model::SessionType;
use crate::domain::ports::{F1Provider, ProviderDriver, ProviderSession, ProviderSessionFilter};
use crate::utils::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

/// Fixed provider data for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StubF1Provider;

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .unwrap_or_default()
}

impl StubF1Provider {
    pub fn new() -> Self {
        Self
    }

    fn sessions() -> Vec<ProviderSession> {
        vec![
            ProviderSession {
                id: "550e8400-e29b-41d4-a716-446655440001".to_string(),
                name: "Australian GP - Race".to_string(),
                session_type: SessionType::Race,
                country: "Australia".to_string(),
                year: 2025,
                start_time: at(2025, 3, 16, 5),
            },
            ProviderSession {
                id: "550e8400-e29b-41d4-a716-446655440002".to_string(),
                name: "Monaco GP - Qualifying".to_string(),
                session_type: SessionType::Qualifying,
                country: "Monaco".to_string(),
                year: 2025,
                start_time: at(2025, 5, 24, 14),
            },
            ProviderSession {
                id: "550e8400-e29b-41d4-a716-446655440003".to_string(),
                name: "British GP - Practice".to_string(),
                session_type: SessionType::Practice,
                country: "UK".to_string(),
                year: 2025,
                start_time: at(2025, 7, 4, 10),
            },
        ]
    }
}

#[async_trait]
impl F1Provider for StubF1Provider {
    async fn list_sessions(
        &self,
        filter: &ProviderSessionFilter,
    ) -> Result<Vec<ProviderSession>, ProviderError> {
        Ok(Self::sessions()
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect())
    }

    async fn list_drivers(&self, _session_id: &str) -> Result<Vec<ProviderDriver>, ProviderError> {
        Ok([
            ("d1", "Lewis Hamilton"),
            ("d2", "Max Verstappen"),
            ("d3", "Charles Leclerc"),
        ]
        .into_iter()
        .map(|(id, name)| ProviderDriver {
            id: id.to_string(),
            full_name: name.to_string(),
        })
        .collect())
    }
}
