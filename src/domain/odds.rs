use crate::domain::money::Money;
use crate::domain::ports::RandomSource;
use crate::utils::error::{F1BetError, Result};
use rust_decimal::{Decimal, RoundingStrategy};

const SCALE: u32 = 2;

/// Decimal odds offered on a selection. Only 2.00, 3.00 and 4.00 exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Odds(Decimal);

impl Odds {
    pub const TWO: Odds = Odds(Decimal::from_parts(200, 0, 0, false, 2));
    pub const THREE: Odds = Odds(Decimal::from_parts(300, 0, 0, false, 2));
    pub const FOUR: Odds = Odds(Decimal::from_parts(400, 0, 0, false, 2));

    pub fn of(value: Decimal) -> Result<Self> {
        let mut normalized =
            value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointNearestEven);
        normalized.rescale(SCALE);

        [Self::TWO, Self::THREE, Self::FOUR]
            .into_iter()
            .find(|allowed| allowed.0 == normalized)
            .ok_or_else(|| {
                F1BetError::invalid_argument(format!(
                    "Unsupported odds: {} (allowed: 2.00, 3.00, 4.00)",
                    normalized
                ))
            })
    }

    pub fn payout(&self, stake: &Money) -> Money {
        stake.multiply(self.0)
    }

    pub fn decimal(&self) -> Decimal {
        self.0
    }
}

/// Fixed-odds pricing: every selection gets one of the three odds at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct OddsPolicy;

impl OddsPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn random_from(&self, random: &mut dyn RandomSource) -> Odds {
        match random.next_int(3) {
            0 => Odds::TWO,
            1 => Odds::THREE,
            _ => Odds::FOUR,
        }
    }
}
