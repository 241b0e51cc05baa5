use crate::app::{EventPage, PlaceBetCommand};
use crate::domain::model::{Bet, Event, SessionType, User, DEFAULT_CURRENCY};
use crate::domain::ports::ProviderSessionFilter;
use crate::utils::error::Result;
use crate::utils::validation::{
    parse_uuid, validate_not_blank, validate_required_field, Validate,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// QUERY / REQUEST
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub session_type: Option<String>,
    pub year: Option<i32>,
    pub country: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl EventsQuery {
    pub fn filter(&self) -> Result<ProviderSessionFilter> {
        let session_type = match self.session_type.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Some(s.parse::<SessionType>()?),
            _ => None,
        };
        let country = self
            .country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(ProviderSessionFilter {
            session_type,
            year: self.year,
            country,
        })
    }
}

fn default_currency() -> Option<String> {
    Some(DEFAULT_CURRENCY.to_string())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetRequest {
    pub user_id: Option<String>,
    pub event_id: Option<String>,
    pub selection_id: Option<String>,
    pub stake_amount: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: Option<String>,
}

impl Validate for PlaceBetRequest {
    fn validate(&self) -> Result<()> {
        validate_not_blank("userId", validate_required_field("userId", &self.user_id)?)?;
        validate_not_blank("eventId", validate_required_field("eventId", &self.event_id)?)?;
        validate_not_blank(
            "selectionId",
            validate_required_field("selectionId", &self.selection_id)?,
        )?;
        validate_required_field("stakeAmount", &self.stake_amount)?;
        validate_not_blank("currency", validate_required_field("currency", &self.currency)?)?;
        Ok(())
    }
}

impl PlaceBetRequest {
    /// Validates the body and converts it into a service command.
    pub fn into_command(self, idempotency_key: Option<String>) -> Result<PlaceBetCommand> {
        self.validate()?;
        let user_id = parse_uuid("userId", self.user_id.as_deref().unwrap_or_default())?;
        let event_id = parse_uuid("eventId", self.event_id.as_deref().unwrap_or_default())?;
        let selection_id =
            parse_uuid("selectionId", self.selection_id.as_deref().unwrap_or_default())?;

        Ok(PlaceBetCommand {
            user_id,
            event_id,
            selection_id,
            stake: self.stake_amount.unwrap_or_default(),
            currency: self
                .currency
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            idempotency_key,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcomeRequest {
    pub winning_driver_id: Option<String>,
}

impl Validate for RecordOutcomeRequest {
    fn validate(&self) -> Result<()> {
        validate_not_blank(
            "winningDriverId",
            validate_required_field("winningDriverId", &self.winning_driver_id)?,
        )
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub selection_id: Uuid,
    pub driver_id: String,
    pub driver_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub odds: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub name: String,
    pub session_type: SessionType,
    pub country: String,
    pub year: i32,
    pub start_time: Option<DateTime<Utc>>,
    pub driver_market: Vec<SelectionResponse>,
}

impl From<&Event> for EventResponse {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id(),
            name: event.name().to_string(),
            session_type: event.session_type(),
            country: event.country().to_string(),
            year: event.year(),
            start_time: event.start_time(),
            driver_market: event
                .market()
                .selections()
                .iter()
                .map(|s| SelectionResponse {
                    selection_id: s.id,
                    driver_id: s.driver_id.clone(),
                    driver_name: s.driver_name.clone(),
                    odds: s.odds.decimal(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListEventsResponse {
    pub items: Vec<EventResponse>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

impl From<EventPage> for ListEventsResponse {
    fn from(page: EventPage) -> Self {
        Self {
            items: page.items.iter().map(EventResponse::from).collect(),
            page: page.page,
            size: page.size,
            total: page.total,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetResponse {
    pub bet_id: Uuid,
    pub status: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    pub stake: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub captured_odds: Decimal,
    pub event_id: Uuid,
    pub selection_id: Uuid,
}

impl From<&Bet> for BetResponse {
    fn from(bet: &Bet) -> Self {
        Self {
            bet_id: bet.id(),
            status: bet.status().as_str(),
            stake: bet.stake().amount(),
            captured_odds: bet.captured_odds().decimal(),
            event_id: bet.event_id(),
            selection_id: bet.selection_id(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBalanceResponse {
    pub user_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

impl From<&User> for UserBalanceResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id(),
            balance: user.balance().amount(),
        }
    }
}
