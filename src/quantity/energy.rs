use std::fmt::{Display, Formatter};

use crate::quantity::Quantity;

pub type KilowattHours = Quantity<1, 0>;

impl KilowattHours {
    /// Meter readings are shown with watt-hour resolution.
    #[must_use]
    pub fn round_to_watt_hours(self) -> Self {
        self.round_dp(3)
    }
}

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}
