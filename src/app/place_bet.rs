use crate::app::unit_of_work::UnitOfWork;
use crate::domain::model::Bet;
use crate::domain::money::Money;
use crate::domain::ports::{BetRepository, EventRepository, IdempotencyRepository, UserRepository};
use crate::utils::error::{F1BetError, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PlaceBetCommand {
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub selection_id: Uuid,
    pub stake: Decimal,
    pub currency: String,
    pub idempotency_key: Option<String>,
}

impl PlaceBetCommand {
    fn key(&self) -> Option<&str> {
        self.idempotency_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}

pub struct PlaceBetService {
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventRepository>,
    bets: Arc<dyn BetRepository>,
    idempotency: Arc<dyn IdempotencyRepository>,
    unit_of_work: UnitOfWork,
}

impl PlaceBetService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        events: Arc<dyn EventRepository>,
        bets: Arc<dyn BetRepository>,
        idempotency: Arc<dyn IdempotencyRepository>,
        unit_of_work: UnitOfWork,
    ) -> Self {
        Self {
            users,
            events,
            bets,
            idempotency,
            unit_of_work,
        }
    }

    pub fn place(&self, command: &PlaceBetCommand) -> Result<Bet> {
        self.unit_of_work.run(|| self.place_locked(command))
    }

    fn place_locked(&self, command: &PlaceBetCommand) -> Result<Bet> {
        // 1. 重複請求直接回傳既有注單
        if let Some(key) = command.key() {
            if let Some(bet_id) = self.idempotency.find(command.user_id, key) {
                tracing::debug!("Idempotency key {} already maps to bet {}", key, bet_id);
                return self
                    .bets
                    .find_by_id(bet_id)
                    .ok_or_else(|| F1BetError::invalid_bet("Idempotent bet not found"));
            }
        }

        // 2-3. 事件與選項
        let event = self
            .events
            .find_by_id(command.event_id)
            .ok_or_else(|| F1BetError::invalid_bet("Event not found"))?;
        let selection = event
            .market()
            .selection(command.selection_id)
            .ok_or_else(|| F1BetError::invalid_bet("Selection not part of the event"))?;

        // 4-5. 金額與餘額
        let stake = Money::stake(command.currency.as_str(), command.stake)?;
        let user = self.users.find_or_create(command.user_id);
        if user.balance().currency() != stake.currency() || user.balance().amount() < stake.amount()
        {
            return Err(F1BetError::insufficient_balance("Insufficient balance"));
        }

        // 6. 建立注單並鎖定賠率
        let bet = Bet::new(
            Uuid::new_v4(),
            command.user_id,
            command.selection_id,
            stake.clone(),
            selection.odds,
            &event,
        )?;

        // 7. 先扣款再存注單
        let version = self.users.version_of(user.id());
        self.users
            .update(user.with_balance(user.balance().subtract(&stake)?), version)?;
        let bet = self.bets.save(bet);

        // 8. 記錄冪等鍵
        if let Some(key) = command.key() {
            self.idempotency.save(command.user_id, key, bet.id());
        }

        tracing::info!(
            "🎯 Bet {} placed: user={} event={} stake={} odds={}",
            bet.id(),
            bet.user_id(),
            bet.event_id(),
            bet.stake(),
            bet.captured_odds().decimal()
        );
        Ok(bet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryBetRepository, InMemoryEventRepository, InMemoryIdempotencyRepository,
        InMemoryUserRepository,
    };
    use crate::domain::model::{BetStatus, Event, Market, Selection, SessionType};
    use crate::domain::odds::Odds;

    struct Fixture {
        users: Arc<InMemoryUserRepository>,
        bets: Arc<InMemoryBetRepository>,
        service: PlaceBetService,
        event: Event,
        selection_id: Uuid,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let events = Arc::new(InMemoryEventRepository::new());
        let bets = Arc::new(InMemoryBetRepository::new());
        let selection_id = Uuid::new_v4();
        let event = Event::new(
            Uuid::new_v4(),
            "Bahrain GP",
            SessionType::Race,
            "BH",
            2025,
            Market::winner(vec![
                Selection::new(selection_id, "d1", "Norris", Odds::THREE),
                Selection::new(Uuid::new_v4(), "d2", "Piastri", Odds::TWO),
            ]),
        )
        .unwrap();
        events.save(event.clone());

        let service = PlaceBetService::new(
            users.clone(),
            events,
            bets.clone(),
            Arc::new(InMemoryIdempotencyRepository::new()),
            UnitOfWork::new(),
        );

        Fixture {
            users,
            bets,
            service,
            event,
            selection_id,
        }
    }

    fn command(f: &Fixture, user_id: Uuid, stake: &str) -> PlaceBetCommand {
        PlaceBetCommand {
            user_id,
            event_id: f.event.id(),
            selection_id: f.selection_id,
            stake: stake.parse().unwrap(),
            currency: "EUR".to_string(),
            idempotency_key: None,
        }
    }

    #[test]
    fn test_place_bet_debits_stake_and_captures_odds() {
        let f = fixture();
        let user_id = Uuid::new_v4();

        let bet = f.service.place(&command(&f, user_id, "10.00")).unwrap();

        assert_eq!(bet.status(), BetStatus::Pending);
        assert_eq!(bet.captured_odds(), Odds::THREE);
        assert_eq!(bet.stake().amount().to_string(), "10.00");
        assert_eq!(
            f.users.find_or_create(user_id).balance().amount().to_string(),
            "90.00"
        );
        assert!(f.bets.find_by_id(bet.id()).is_some());
    }

    #[test]
    fn test_insufficient_balance_leaves_no_bet() {
        let f = fixture();
        let user_id = Uuid::new_v4();

        let err = f.service.place(&command(&f, user_id, "100.01")).unwrap_err();

        assert!(matches!(err, F1BetError::InsufficientBalance { .. }));
        assert!(f.bets.find_by_event(f.event.id()).is_empty());
        assert_eq!(
            f.users.find_or_create(user_id).balance().amount().to_string(),
            "100.00"
        );
    }

    #[test]
    fn test_currency_mismatch_is_insufficient_balance() {
        let f = fixture();
        let mut cmd = command(&f, Uuid::new_v4(), "5.00");
        cmd.currency = "USD".to_string();

        let err = f.service.place(&cmd).unwrap_err();
        assert!(matches!(err, F1BetError::InsufficientBalance { .. }));
    }

    #[test]
    fn test_rejects_unknown_event_foreign_selection_and_bad_stake() {
        let f = fixture();

        let mut unknown_event = command(&f, Uuid::new_v4(), "5.00");
        unknown_event.event_id = Uuid::new_v4();
        assert!(matches!(
            f.service.place(&unknown_event),
            Err(F1BetError::InvalidBet { ref message }) if message == "Event not found"
        ));

        let mut foreign = command(&f, Uuid::new_v4(), "5.00");
        foreign.selection_id = Uuid::new_v4();
        assert!(matches!(
            f.service.place(&foreign),
            Err(F1BetError::InvalidBet { .. })
        ));

        let zero = command(&f, Uuid::new_v4(), "0");
        assert!(matches!(
            f.service.place(&zero),
            Err(F1BetError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_same_idempotency_key_returns_same_bet() {
        let f = fixture();
        let user_id = Uuid::new_v4();
        let mut cmd = command(&f, user_id, "10.00");
        cmd.idempotency_key = Some("abc-123".to_string());

        let first = f.service.place(&cmd).unwrap();
        let second = f.service.place(&cmd).unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(f.bets.find_by_event(f.event.id()).len(), 1);
        assert_eq!(
            f.users.find_or_create(user_id).balance().amount().to_string(),
            "90.00"
        );
    }

    #[test]
    fn test_blank_idempotency_key_is_ignored() {
        let f = fixture();
        let mut cmd = command(&f, Uuid::new_v4(), "1.00");
        cmd.idempotency_key = Some("   ".to_string());

        let first = f.service.place(&cmd).unwrap();
        let second = f.service.place(&cmd).unwrap();
        assert_ne!(first.id(), second.id());
    }
}
