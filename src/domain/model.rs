use crate::domain::money::Money;
use crate::domain::odds::Odds;
use crate::utils::error::{F1BetError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "EUR";
pub const WINNER_MARKET: &str = "WINNER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    Race,
    Qualifying,
    Practice,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Race => "RACE",
            SessionType::Qualifying => "QUALIFYING",
            SessionType::Practice => "PRACTICE",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = F1BetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RACE" => Ok(SessionType::Race),
            "QUALIFYING" => Ok(SessionType::Qualifying),
            "PRACTICE" => Ok(SessionType::Practice),
            other => Err(F1BetError::invalid_argument(format!(
                "Unknown session type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Scheduled,
    Finished,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
}

impl BetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetStatus::Pending => "PENDING",
            BetStatus::Won => "WON",
            BetStatus::Lost => "LOST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub id: Uuid,
    pub driver_id: String,
    pub driver_name: String,
    pub odds: Odds,
}

impl Selection {
    pub fn new(
        id: Uuid,
        driver_id: impl Into<String>,
        driver_name: impl Into<String>,
        odds: Odds,
    ) -> Self {
        Self {
            id,
            driver_id: driver_id.into(),
            driver_name: driver_name.into(),
            odds,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    kind: String,
    selections: Vec<Selection>,
}

impl Market {
    pub fn new(kind: impl Into<String>, selections: Vec<Selection>) -> Self {
        Self {
            kind: kind.into(),
            selections,
        }
    }

    pub fn winner(selections: Vec<Selection>) -> Self {
        Self::new(WINNER_MARKET, selections)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn selection(&self, id: Uuid) -> Option<&Selection> {
        self.selections.iter().find(|s| s.id == id)
    }

    pub fn contains_selection(&self, id: Uuid) -> bool {
        self.selection(id).is_some()
    }

    pub fn contains_driver(&self, driver_id: &str) -> bool {
        self.selections.iter().any(|s| s.driver_id == driver_id)
    }
}

/// A provider session made bettable through a single WINNER market.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    id: Uuid,
    name: String,
    session_type: SessionType,
    country: String,
    year: i32,
    start_time: Option<DateTime<Utc>>,
    state: EventState,
    market: Market,
}

impl Event {
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        session_type: SessionType,
        country: impl Into<String>,
        year: i32,
        market: Market,
    ) -> Result<Self> {
        if market.kind() != WINNER_MARKET {
            return Err(F1BetError::invalid_argument(
                "Event must contain WINNER market only",
            ));
        }
        Ok(Self {
            id,
            name: name.into(),
            session_type,
            country: country.into(),
            year,
            start_time: None,
            state: EventState::Scheduled,
            market,
        })
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn mark_finished(&mut self) -> Result<()> {
        if self.state != EventState::Scheduled {
            return Err(F1BetError::illegal_event_state(
                "Event must be SCHEDULED to finish",
            ));
        }
        self.state = EventState::Finished;
        Ok(())
    }

    pub fn mark_settled(&mut self) -> Result<()> {
        if self.state != EventState::Finished {
            return Err(F1BetError::illegal_event_state(
                "Event must be FINISHED to settle",
            ));
        }
        self.state = EventState::Settled;
        Ok(())
    }

    pub fn has_selection(&self, selection_id: Uuid) -> bool {
        self.market.contains_selection(selection_id)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn state(&self) -> EventState {
        self.state
    }

    pub fn market(&self) -> &Market {
        &self.market
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bet {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    selection_id: Uuid,
    stake: Money,
    captured_odds: Odds,
    status: BetStatus,
}

impl Bet {
    /// Builds a pending bet; the event must still be open and must offer the selection.
    pub fn new(
        id: Uuid,
        user_id: Uuid,
        selection_id: Uuid,
        stake: Money,
        captured_odds: Odds,
        event: &Event,
    ) -> Result<Self> {
        if event.state() != EventState::Scheduled {
            return Err(F1BetError::invalid_bet(
                "Bet allowed only when event is SCHEDULED",
            ));
        }
        if !event.has_selection(selection_id) {
            return Err(F1BetError::invalid_bet("Selection does not belong to event"));
        }
        Ok(Self {
            id,
            user_id,
            event_id: event.id(),
            selection_id,
            stake,
            captured_odds,
            status: BetStatus::Pending,
        })
    }

    pub fn mark_won(&mut self) -> Result<()> {
        self.ensure_pending()?;
        self.status = BetStatus::Won;
        Ok(())
    }

    pub fn mark_lost(&mut self) -> Result<()> {
        self.ensure_pending()?;
        self.status = BetStatus::Lost;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<()> {
        if self.status != BetStatus::Pending {
            return Err(F1BetError::invalid_bet("Bet is not in PENDING state"));
        }
        Ok(())
    }

    pub fn payout(&self) -> Money {
        self.captured_odds.payout(&self.stake)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn selection_id(&self) -> Uuid {
        self.selection_id
    }

    pub fn stake(&self) -> &Money {
        &self.stake
    }

    pub fn captured_odds(&self) -> Odds {
        self.captured_odds
    }

    pub fn status(&self) -> BetStatus {
        self.status
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: Uuid,
    balance: Money,
}

impl User {
    /// New accounts start with 100.00 EUR.
    pub fn create(id: Uuid) -> Self {
        Self {
            id,
            balance: Money::of(DEFAULT_CURRENCY, rust_decimal::Decimal::new(10000, 2)),
        }
    }

    pub fn with_balance(&self, balance: Money) -> Self {
        Self {
            id: self.id,
            balance,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn balance(&self) -> &Money {
        &self.balance
    }
}
