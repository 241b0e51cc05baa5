use crate::domain::model::{Event, Market, Selection};
use crate::domain::odds::OddsPolicy;
use crate::domain::ports::{
    EventRepository, F1Provider, ProviderDriver, ProviderSession, ProviderSessionFilter,
    RandomSource,
};
use crate::utils::error::{ProviderError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const DEFAULT_PAGE: usize = 0;
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct EventPage {
    pub items: Vec<Event>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

pub struct ListEventsService {
    provider: Arc<dyn F1Provider>,
    events: Arc<dyn EventRepository>,
    odds_policy: OddsPolicy,
    random: Mutex<Box<dyn RandomSource>>,
    max_concurrency: usize,
}

impl ListEventsService {
    pub fn new(
        provider: Arc<dyn F1Provider>,
        events: Arc<dyn EventRepository>,
        odds_policy: OddsPolicy,
        random: Box<dyn RandomSource>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            provider,
            events,
            odds_policy,
            random: Mutex::new(random),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Lists provider sessions as bettable events, creating any event not seen before.
    pub async fn list(
        &self,
        filter: &ProviderSessionFilter,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Result<EventPage> {
        let sessions = self.provider.list_sessions(filter).await?;
        tracing::debug!("Provider returned {} sessions", sessions.len());

        // buffered 保留 provider 的順序
        let events: Vec<Event> = stream::iter(sessions.into_iter().map(|s| self.resolve_event(s)))
            .buffered(self.max_concurrency)
            .try_collect()
            .await?;

        let page = match page {
            Some(p) if p >= 0 => p as usize,
            _ => DEFAULT_PAGE,
        };
        let size = match size {
            Some(s) if s > 0 => s as usize,
            _ => DEFAULT_PAGE_SIZE,
        };

        let total = events.len();
        let items = events
            .into_iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .collect();

        Ok(EventPage {
            items,
            page,
            size,
            total,
        })
    }

    async fn resolve_event(&self, session: ProviderSession) -> Result<Event> {
        let event_id = Uuid::parse_str(&session.id).map_err(|e| ProviderError::InvalidPayload {
            field: "id".to_string(),
            reason: e.to_string(),
        })?;

        if let Some(existing) = self.events.find_by_id(event_id) {
            return Ok(existing);
        }

        let drivers = self.provider.list_drivers(&session.id).await?;
        let selections = self.price_drivers(drivers);

        let event = Event::new(
            event_id,
            session.name,
            session.session_type,
            session.country,
            session.year,
            Market::winner(selections),
        )?
        .with_start_time(session.start_time);

        let stored = self.events.insert_if_absent(event);
        tracing::info!(
            "📅 Event {} ({}) available with {} selections",
            stored.id(),
            stored.name(),
            stored.market().selections().len()
        );
        Ok(stored)
    }

    fn price_drivers(&self, drivers: Vec<ProviderDriver>) -> Vec<Selection> {
        let mut random = self
            .random
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        drivers
            .into_iter()
            .map(|driver| {
                let odds = self.odds_policy.random_from(&mut **random);
                Selection::new(Uuid::new_v4(), driver.id, driver.full_name, odds)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryEventRepository;
    use crate::adapters::provider::StubF1Provider;
    use crate::adapters::random::SeededRandom;
    use crate::domain::model::SessionType;
    use crate::utils::error::F1BetError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service_with(provider: Arc<dyn F1Provider>) -> (ListEventsService, Arc<InMemoryEventRepository>) {
        let events = Arc::new(InMemoryEventRepository::new());
        let service = ListEventsService::new(
            provider,
            events.clone(),
            OddsPolicy::new(),
            Box::new(SeededRandom::new(7)),
            2,
        );
        (service, events)
    }

    /// Counts driver lookups so tests can see when the provider is consulted.
    struct CountingProvider {
        inner: StubF1Provider,
        driver_calls: AtomicUsize,
    }

    #[async_trait]
    impl F1Provider for CountingProvider {
        async fn list_sessions(
            &self,
            filter: &ProviderSessionFilter,
        ) -> std::result::Result<Vec<ProviderSession>, ProviderError> {
            self.inner.list_sessions(filter).await
        }

        async fn list_drivers(
            &self,
            session_id: &str,
        ) -> std::result::Result<Vec<ProviderDriver>, ProviderError> {
            self.driver_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_drivers(session_id).await
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl F1Provider for FailingProvider {
        async fn list_sessions(
            &self,
            _filter: &ProviderSessionFilter,
        ) -> std::result::Result<Vec<ProviderSession>, ProviderError> {
            Err(ProviderError::Status {
                status: 503,
                url: "http://provider/sessions".to_string(),
            })
        }

        async fn list_drivers(
            &self,
            _session_id: &str,
        ) -> std::result::Result<Vec<ProviderDriver>, ProviderError> {
            Ok(Vec::new())
        }
    }

    /// Answers driver lookups slowly, earliest sessions slowest, and tracks
    /// how many lookups are in flight.
    struct SlowProvider {
        sessions: Vec<ProviderSession>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        driver_calls: AtomicUsize,
    }

    impl SlowProvider {
        fn with_sessions(count: usize) -> Self {
            let sessions = (0..count)
                .map(|i| ProviderSession {
                    id: Uuid::new_v4().to_string(),
                    name: format!("Session {}", i),
                    session_type: SessionType::Race,
                    country: "Italy".to_string(),
                    year: 2025,
                    start_time: chrono::Utc::now(),
                })
                .collect();
            Self {
                sessions,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                driver_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl F1Provider for SlowProvider {
        async fn list_sessions(
            &self,
            _filter: &ProviderSessionFilter,
        ) -> std::result::Result<Vec<ProviderSession>, ProviderError> {
            Ok(self.sessions.clone())
        }

        async fn list_drivers(
            &self,
            session_id: &str,
        ) -> std::result::Result<Vec<ProviderDriver>, ProviderError> {
            self.driver_calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let position = self
                .sessions
                .iter()
                .position(|s| s.id == session_id)
                .unwrap_or(0);
            let delay = (self.sessions.len() - position) as u64 * 10;
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![
                ProviderDriver {
                    id: format!("{}-a", session_id),
                    full_name: "Driver A".to_string(),
                },
                ProviderDriver {
                    id: format!("{}-b", session_id),
                    full_name: "Driver B".to_string(),
                },
            ])
        }
    }

    fn selection_ids(page: &EventPage) -> Vec<Uuid> {
        page.items
            .iter()
            .flat_map(|e| e.market().selections().iter().map(|s| s.id))
            .collect()
    }

    #[tokio::test]
    async fn test_driver_lookups_are_bounded_and_keep_session_order() {
        let provider = Arc::new(SlowProvider::with_sessions(6));
        let (service, _) = service_with(provider.clone());

        let page = service
            .list(&ProviderSessionFilter::default(), None, None)
            .await
            .unwrap();

        let names: Vec<&str> = page.items.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["Session 0", "Session 1", "Session 2", "Session 3", "Session 4", "Session 5"]
        );
        assert_eq!(provider.driver_calls.load(Ordering::SeqCst), 6);
        // service_with 設定的上限為 2
        assert_eq!(provider.max_in_flight.load(Ordering::SeqCst), 2);
        assert_eq!(provider.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_racing_listings_see_the_same_selections() {
        let provider = Arc::new(SlowProvider::with_sessions(3));
        let (service, events) = service_with(provider.clone());
        let filter = ProviderSessionFilter::default();

        let (first, second) = tokio::join!(
            service.list(&filter, None, None),
            service.list(&filter, None, None)
        );
        let first = first.unwrap();
        let second = second.unwrap();

        assert_eq!(selection_ids(&first), selection_ids(&second));
        for event in &first.items {
            let stored = events.find_by_id(event.id()).unwrap();
            assert_eq!(stored.market().selections(), event.market().selections());
        }
    }

    #[tokio::test]
    async fn test_list_builds_and_stores_events() {
        let (service, events) = service_with(Arc::new(StubF1Provider::new()));

        let page = service
            .list(&ProviderSessionFilter::default(), None, None)
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.page, 0);
        assert_eq!(page.size, 20);
        assert_eq!(page.items[0].name(), "Australian GP - Race");
        assert_eq!(page.items[0].market().selections().len(), 3);
        assert!(page.items[0].start_time().is_some());
        assert!(events.find_by_id(page.items[0].id()).is_some());
    }

    #[tokio::test]
    async fn test_second_listing_reuses_stored_events() {
        let provider = Arc::new(CountingProvider {
            inner: StubF1Provider::new(),
            driver_calls: AtomicUsize::new(0),
        });
        let (service, _) = service_with(provider.clone());

        let first = service
            .list(&ProviderSessionFilter::default(), None, None)
            .await
            .unwrap();
        let second = service
            .list(&ProviderSessionFilter::default(), None, None)
            .await
            .unwrap();

        assert_eq!(provider.driver_calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            first.items[0].market().selections()[0].id,
            second.items[0].market().selections()[0].id
        );
    }

    #[tokio::test]
    async fn test_pagination_and_defaults() {
        let (service, _) = service_with(Arc::new(StubF1Provider::new()));
        let filter = ProviderSessionFilter::default();

        let page = service.list(&filter, Some(1), Some(2)).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 3);
        assert_eq!(page.items[0].name(), "British GP - Practice");

        let past_end = service.list(&filter, Some(5), Some(2)).await.unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 3);

        let fallback = service.list(&filter, Some(-1), Some(0)).await.unwrap();
        assert_eq!(fallback.page, 0);
        assert_eq!(fallback.size, 20);
        assert_eq!(fallback.items.len(), 3);
    }

    #[tokio::test]
    async fn test_filter_is_forwarded() {
        let (service, _) = service_with(Arc::new(StubF1Provider::new()));
        let filter = ProviderSessionFilter {
            session_type: Some(SessionType::Qualifying),
            ..Default::default()
        };

        let page = service.list(&filter, None, None).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].country(), "Monaco");
    }

    #[tokio::test]
    async fn test_provider_failure_is_propagated() {
        let (service, _) = service_with(Arc::new(FailingProvider));

        let err = service
            .list(&ProviderSessionFilter::default(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, F1BetError::Provider(ProviderError::Status { status: 503, .. })));
    }
}
