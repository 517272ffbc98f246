use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::quantity::{Quantity, round_half_up};

/// Money in minor units, which is how the portal reports every amount.
pub type Pence = Quantity<0, 1>;

impl Pence {
    #[must_use]
    pub fn to_pounds(self) -> Pounds {
        Pounds(round_half_up(self.0 / Decimal::ONE_HUNDRED, 2))
    }
}

/// Money in major units, always rounded to whole pence.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Pounds(Decimal);

impl Pounds {
    /// Plain amount without the currency sign, as used for sensor states.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl Display for Pounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0.is_sign_negative() && !self.0.is_zero() { "-" } else { "" };
        let digits = format!("{:.2}", self.0.abs());
        let (integer, fraction) = digits.split_once('.').unwrap_or((&digits, "00"));
        write!(f, "£{sign}{}.{fraction}", group_thousands(integer))
    }
}

impl Serialize for Pounds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index != 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pounds(pence: i64) -> String {
        Pence::from(Decimal::from(pence)).to_pounds().to_string()
    }

    #[test]
    fn test_format_pounds() {
        assert_eq!(pounds(123_456), "£1,234.56");
        assert_eq!(pounds(1), "£0.01");
        assert_eq!(pounds(0), "£0.00");
        assert_eq!(pounds(100), "£1.00");
        assert_eq!(pounds(12_345_678_900), "£123,456,789.00");
        assert_eq!(pounds(99_999), "£999.99");
        assert_eq!(pounds(100_000), "£1,000.00");
    }

    #[test]
    fn test_format_negative_pounds() {
        assert_eq!(pounds(-150), "£-1.50");
        assert_eq!(pounds(-123_456), "£-1,234.56");
    }

    #[test]
    fn test_to_pounds_rounds_half_up() {
        let pence = Pence::from(Decimal::new(1_005, 1)); // 100.5p
        assert_eq!(pence.to_pounds().amount(), Decimal::new(101, 2));
        let pence = Pence::from(Decimal::new(1_004, 1));
        assert_eq!(pence.to_pounds().amount(), Decimal::new(100, 2));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
