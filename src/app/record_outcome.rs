use crate::app::unit_of_work::UnitOfWork;
use crate::domain::model::{BetStatus, EventState};
use crate::domain::ports::{BetRepository, EventRepository, UserRepository};
use crate::utils::error::{F1BetError, Result};
use std::sync::Arc;
use uuid::Uuid;

pub struct RecordOutcomeService {
    events: Arc<dyn EventRepository>,
    bets: Arc<dyn BetRepository>,
    users: Arc<dyn UserRepository>,
    unit_of_work: UnitOfWork,
}

impl RecordOutcomeService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        bets: Arc<dyn BetRepository>,
        users: Arc<dyn UserRepository>,
        unit_of_work: UnitOfWork,
    ) -> Self {
        Self {
            events,
            bets,
            users,
            unit_of_work,
        }
    }

    /// Settles every bet on the event; recording an already settled event is a no-op.
    pub fn record(&self, event_id: Uuid, winning_driver_id: &str) -> Result<()> {
        self.unit_of_work
            .run(|| self.record_locked(event_id, winning_driver_id))
    }

    fn record_locked(&self, event_id: Uuid, winning_driver_id: &str) -> Result<()> {
        let mut event = self
            .events
            .find_by_id(event_id)
            .ok_or_else(|| F1BetError::illegal_event_state("Event not found"))?;

        if event.state() == EventState::Settled {
            tracing::debug!("Event {} already settled", event_id);
            return Ok(());
        }
        if !event.market().contains_driver(winning_driver_id) {
            return Err(F1BetError::invalid_bet(format!(
                "Driver {} is not part of event {}",
                winning_driver_id, event_id
            )));
        }

        let mut version = self.events.version_of(event_id);
        if event.state() == EventState::Scheduled {
            event.mark_finished()?;
            self.events.update(event.clone(), version)?;
            version += 1;
        }

        let mut winners = 0;
        // 中途失敗重試時跳過已結算的注單
        let bets: Vec<_> = self
            .bets
            .find_by_event(event_id)
            .into_iter()
            .filter(|b| b.status() == BetStatus::Pending)
            .collect();
        let total = bets.len();
        for mut bet in bets {
            let won = event
                .market()
                .selection(bet.selection_id())
                .is_some_and(|s| s.driver_id == winning_driver_id);
            let bet_version = self.bets.version_of(bet.id());

            if won {
                bet.mark_won()?;
                self.bets.update(bet.clone(), bet_version)?;

                // 派彩 = 押注金額 × 鎖定賠率
                let user = self.users.find_or_create(bet.user_id());
                let user_version = self.users.version_of(user.id());
                let credited = user.balance().add(&bet.payout())?;
                self.users
                    .update(user.with_balance(credited), user_version)?;
                winners += 1;
            } else {
                bet.mark_lost()?;
                self.bets.update(bet, bet_version)?;
            }
        }

        // 所有注單處理完才標記為已結算
        event.mark_settled()?;
        self.events.update(event, version)?;

        tracing::info!(
            "🏁 Event {} settled: winner={} bets={} winners={}",
            event_id,
            winning_driver_id,
            total,
            winners
        );
        Ok(())
    }
}
