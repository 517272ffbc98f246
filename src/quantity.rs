pub mod cost;
pub mod energy;
pub mod rate;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Fixed-point quantity tagged with its dimensions.
///
/// Deserialization accepts both JSON numbers and numeric strings, because the portal
/// is not consistent about which one it sends.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::Sum,
)]
pub struct Quantity<const ENERGY: isize, const COST: isize>(
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")] pub Decimal,
);

impl<const ENERGY: isize, const COST: isize> Quantity<ENERGY, COST> {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Round half away from zero, like a cashier would.
    #[must_use]
    pub fn round_dp(self, decimal_places: u32) -> Self {
        Self(round_half_up(self.0, decimal_places))
    }
}

pub fn round_half_up(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}
