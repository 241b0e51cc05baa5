use crate::adapters::memory::{
    InMemoryBetRepository, InMemoryEventRepository, InMemoryIdempotencyRepository,
    InMemoryUserRepository,
};
use crate::app::{
    ListEventsService, PlaceBetService, RecordOutcomeService, UnitOfWork, UserBalanceService,
};
use crate::domain::odds::OddsPolicy;
use crate::domain::ports::{F1Provider, RandomSource};
use std::sync::Arc;

/// Services shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub list_events: Arc<ListEventsService>,
    pub place_bet: Arc<PlaceBetService>,
    pub record_outcome: Arc<RecordOutcomeService>,
    pub user_balance: Arc<UserBalanceService>,
}

impl AppState {
    /// Wires every service onto fresh in-memory repositories.
    pub fn in_memory(
        provider: Arc<dyn F1Provider>,
        random: Box<dyn RandomSource>,
        max_concurrency: usize,
    ) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let events = Arc::new(InMemoryEventRepository::new());
        let bets = Arc::new(InMemoryBetRepository::new());
        let idempotency = Arc::new(InMemoryIdempotencyRepository::new());
        let unit_of_work = UnitOfWork::new();

        Self {
            list_events: Arc::new(ListEventsService::new(
                provider,
                events.clone(),
                OddsPolicy::new(),
                random,
                max_concurrency,
            )),
            place_bet: Arc::new(PlaceBetService::new(
                users.clone(),
                events.clone(),
                bets.clone(),
                idempotency,
                unit_of_work.clone(),
            )),
            record_outcome: Arc::new(RecordOutcomeService::new(
                events,
                bets,
                users.clone(),
                unit_of_work,
            )),
            user_balance: Arc::new(UserBalanceService::new(users)),
        }
    }
}
