use crate::utils::error::{F1BetError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

const SCALE: u32 = 2;

/// Amount of money in a currency, always held at two decimal places
/// with banker's rounding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

fn normalize(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(SCALE);
    rounded
}

impl Money {
    pub fn of(currency: impl Into<String>, amount: Decimal) -> Self {
        Self {
            amount: normalize(amount),
            currency: currency.into(),
        }
    }

    pub fn parse(currency: impl Into<String>, amount: &str) -> Result<Self> {
        let value = Decimal::from_str(amount)
            .map_err(|e| F1BetError::invalid_argument(format!("Invalid amount {}: {}", amount, e)))?;
        Ok(Self::of(currency, value))
    }

    /// A stake must be strictly positive.
    pub fn stake(currency: impl Into<String>, amount: Decimal) -> Result<Self> {
        let stake = Self::of(currency, amount);
        // 四捨五入後為 0 也視為無效
        if stake.amount <= Decimal::ZERO {
            return Err(F1BetError::invalid_argument("stake must be > 0"));
        }
        Ok(stake)
    }

    pub fn add(&self, other: &Money) -> Result<Money> {
        self.require_same_currency(other)?;
        Ok(Self::of(self.currency.clone(), self.amount + other.amount))
    }

    pub fn subtract(&self, other: &Money) -> Result<Money> {
        self.require_same_currency(other)?;
        Ok(Self::of(self.currency.clone(), self.amount - other.amount))
    }

    pub fn multiply(&self, factor: Decimal) -> Money {
        Self::of(self.currency.clone(), self.amount * factor)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    fn require_same_currency(&self, other: &Money) -> Result<()> {
        if self.currency != other.currency {
            return Err(F1BetError::invalid_argument(format!(
                "Currency mismatch: {} vs {}",
                self.currency, other.currency
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
