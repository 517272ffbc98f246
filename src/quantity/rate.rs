use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};

use crate::quantity::Quantity;

/// Pence per kilowatt-hour.
///
/// Serializes as a plain number; wrap it into [`RenderedRate`] to get the `12.3p` text.
pub type KilowattHourRate = Quantity<-1, 1>;

impl Display for KilowattHourRate {
    /// Shortest form with at least one fractional digit: `12.35p`, `12.3p`, `20.0p`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rate = self.round_dp(2).0.normalize();
        if rate.scale() == 0 { write!(f, "{rate}.0p") } else { write!(f, "{rate}p") }
    }
}

/// Wrapper to serialize a rate as its rendered text.
#[derive(Copy, Clone)]
pub struct RenderedRate(pub KilowattHourRate);

impl Serialize for RenderedRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(KilowattHourRate::from(Decimal::new(12_345, 3)).to_string(), "12.35p");
        assert_eq!(KilowattHourRate::from(Decimal::new(1230, 2)).to_string(), "12.3p");
        assert_eq!(KilowattHourRate::from(Decimal::from(20)).to_string(), "20.0p");
        assert_eq!(KilowattHourRate::from(Decimal::new(19_999, 3)).to_string(), "20.0p");
    }

    #[test]
    fn test_serialize_rendered() {
        let json = serde_json::to_value(RenderedRate(KilowattHourRate::from(Decimal::new(2_755, 2))));
        assert_eq!(json.unwrap(), serde_json::json!("27.55p"));
    }
}
