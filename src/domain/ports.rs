use crate::domain::model::{Bet, Event, SessionType, User};
use crate::utils::error::{ProviderError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A session as reported by the external F1 data provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSession {
    pub id: String,
    pub name: String,
    pub session_type: SessionType,
    pub country: String,
    pub year: i32,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDriver {
    pub id: String,
    pub full_name: String,
}

/// Optional filters; `None` means "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderSessionFilter {
    pub session_type: Option<SessionType>,
    pub year: Option<i32>,
    pub country: Option<String>,
}

impl ProviderSessionFilter {
    pub fn matches(&self, session: &ProviderSession) -> bool {
        self.session_type.map_or(true, |t| t == session.session_type)
            && self.year.map_or(true, |y| y == session.year)
            && self
                .country
                .as_deref()
                .map_or(true, |c| c.eq_ignore_ascii_case(&session.country))
    }
}

#[async_trait]
pub trait F1Provider: Send + Sync {
    async fn list_sessions(
        &self,
        filter: &ProviderSessionFilter,
    ) -> std::result::Result<Vec<ProviderSession>, ProviderError>;

    async fn list_drivers(
        &self,
        session_id: &str,
    ) -> std::result::Result<Vec<ProviderDriver>, ProviderError>;
}

pub trait RandomSource: Send {
    /// Uniform draw in `[0, bound)`.
    fn next_int(&mut self, bound: u32) -> u32;
}

// Repositories keep a version per entry; `update` fails on a stale expected version.

pub trait UserRepository: Send + Sync {
    /// Accounts are opened on first lookup.
    fn find_or_create(&self, id: Uuid) -> User;
    fn save(&self, user: User) -> User;
    fn update(&self, user: User, expected_version: u64) -> Result<User>;
    fn version_of(&self, id: Uuid) -> u64;
}

pub trait EventRepository: Send + Sync {
    fn find_by_id(&self, id: Uuid) -> Option<Event>;
    fn save(&self, event: Event) -> Event;
    /// Stores the event unless one with the same id exists; returns whichever is stored.
    fn insert_if_absent(&self, event: Event) -> Event;
    fn update(&self, event: Event, expected_version: u64) -> Result<Event>;
    fn find_page(&self, page: usize, size: usize) -> Vec<Event>;
    fn version_of(&self, id: Uuid) -> u64;
}

pub trait BetRepository: Send + Sync {
    fn find_by_id(&self, id: Uuid) -> Option<Bet>;
    fn save(&self, bet: Bet) -> Bet;
    fn update(&self, bet: Bet, expected_version: u64) -> Result<Bet>;
    fn find_by_event(&self, event_id: Uuid) -> Vec<Bet>;
    fn version_of(&self, id: Uuid) -> u64;
}

pub trait IdempotencyRepository: Send + Sync {
    fn find(&self, user_id: Uuid, key: &str) -> Option<Uuid>;
    /// The first mapping recorded for a key wins.
    fn save(&self, user_id: Uuid, key: &str, bet_id: Uuid);
}
