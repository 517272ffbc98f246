//! Narrow typed views over the portal JSON.
//!
//! The portal JSON is undocumented, so nothing here describes a whole response. Sensors
//! walk the raw tree with [`parse`] and friends and deserialize only the node they need,
//! so that one odd field cannot break its siblings. Values a sensor merely passes
//! through stay raw [`Value`]s.

use enumset::EnumSetType;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    prelude::*,
    quantity::{cost::Pence, energy::KilowattHours, rate::KilowattHourRate},
};

/// Metered utility, as tagged by the `type` field.
#[derive(Debug, EnumSetType)]
pub enum Supply {
    Gas,
    Electricity,
}

impl Supply {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Gas => "gas",
            Self::Electricity => "elec",
        }
    }
}

/// Borrow the node at the JSON pointer.
pub fn node<'a>(tree: &'a Value, pointer: &str) -> Result<&'a Value> {
    tree.pointer(pointer).with_context(|| format!("`{pointer}` is missing"))
}

/// Deserialize the node at the JSON pointer.
pub fn parse<'a, T: Deserialize<'a>>(tree: &'a Value, pointer: &str) -> Result<T> {
    T::deserialize(node(tree, pointer)?).with_context(|| format!("`{pointer}` is malformed"))
}

/// Deserialize the node at the JSON pointer, treating a missing node or `null` as [`None`].
pub fn parse_optional<'a, T: Deserialize<'a>>(tree: &'a Value, pointer: &str) -> Result<Option<T>> {
    match tree.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(node) => {
            T::deserialize(node).map(Some).with_context(|| format!("`{pointer}` is malformed"))
        }
    }
}

/// Borrow the array at the JSON pointer.
pub fn array<'a>(tree: &'a Value, pointer: &str) -> Result<&'a [Value]> {
    node(tree, pointer)?
        .as_array()
        .map(Vec::as_slice)
        .with_context(|| format!("`{pointer}` is not an array"))
}

/// Find the entry of the specified supply type in the array at the JSON pointer.
pub fn find_supply<'a>(tree: &'a Value, pointer: &str, supply: Supply) -> Result<Option<&'a Value>> {
    Ok(array(tree, pointer)?
        .iter()
        .find(|entry| entry.get("type").and_then(Value::as_str) == Some(supply.code())))
}

/// Find the entry whose `key` equals `value` in the array at the JSON pointer.
pub fn find_by<'a>(
    tree: &'a Value,
    pointer: &str,
    key: &str,
    value: &Value,
) -> Result<Option<&'a Value>> {
    Ok(array(tree, pointer)?.iter().find(|entry| entry.get(key) == Some(value)))
}

/// Render a scalar the way a human would write it: strings without quotes, `null` as nothing.
#[must_use]
pub fn plain_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn zero() -> Value {
    Value::from(0)
}

/// `balance.data.supplies[]`, as much as the balance attributes need.
#[derive(Deserialize)]
pub struct BalanceSupply {
    #[serde(default)]
    pub supply_id: Value,

    #[serde(default)]
    pub payment_mode: Value,

    pub balance: BalanceDetails,

    pub emergency_credit: EmergencyCredit,

    pub debt: Debt,
}

#[derive(Deserialize)]
pub struct BalanceDetails {
    #[serde(default)]
    pub zero_time: Value,

    /// Human-readable time left, with HTML markup.
    #[serde(default)]
    pub duration: Option<String>,

    #[serde(default)]
    pub updated: Value,

    #[serde(default)]
    pub messages: Vec<BalanceMessage>,
}

#[derive(Deserialize)]
pub struct BalanceMessage {
    pub text: Value,
}

#[derive(Deserialize)]
pub struct EmergencyCredit {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct Debt {
    #[serde(default = "zero")]
    pub money: Value,

    #[serde(default = "zero")]
    pub debt_recovery_rate: Value,
}

/// `usage.data.data[].usage[]`: one day of consumption.
#[derive(Deserialize)]
pub struct UsageEntry {
    #[serde(default)]
    pub date: Value,

    pub kwh: KilowattHours,

    /// Kept raw for the attributes, see [`UsageEntry::cost`].
    #[serde(default)]
    pub pence: Value,

    #[serde(default, rename = "avg_temperature_c")]
    pub average_temperature: Value,
}

impl UsageEntry {
    /// Cost of the day, a missing cost counts as nothing.
    pub fn cost(&self) -> Result<Pence> {
        if self.pence.is_null() {
            Ok(Pence::ZERO)
        } else {
            Pence::deserialize(&self.pence).with_context(|| format!("malformed cost `{}`", self.pence))
        }
    }
}

/// `user_data.premises[0].supplies[]`.
#[derive(Deserialize)]
pub struct TariffSupply {
    #[serde(default)]
    pub region_name: Value,

    /// Free text with HTML markup, which is where the tier threshold hides.
    #[serde(default)]
    pub tariff_description: Option<String>,

    #[serde(default)]
    pub rate1: Option<KilowattHourRate>,

    #[serde(default)]
    pub rate2: Option<KilowattHourRate>,

    #[serde(default)]
    pub span: Value,

    #[serde(default)]
    pub pan: Value,

    #[serde(default)]
    pub meter: Option<Meter>,

    #[serde(default)]
    pub supply_start_date: Value,

    #[serde(default)]
    pub mpan: Option<Mpan>,
}

#[derive(Deserialize)]
pub struct Meter {
    #[serde(default)]
    pub id: Value,

    #[serde(default)]
    pub units: Value,
}

/// Electricity meter point administration number, split the way it is printed on a bill.
#[derive(Deserialize)]
pub struct Mpan {
    #[serde(default)]
    pub top_line: Option<MpanTopLine>,

    #[serde(default)]
    pub core: Option<MpanCore>,
}

#[derive(Deserialize)]
pub struct MpanTopLine {
    #[serde(default, rename = "pc")]
    pub profile_class: Value,

    #[serde(default, rename = "mtc")]
    pub meter_time_switch_code: Value,

    #[serde(default, rename = "llfc")]
    pub line_loss_factor_class: Value,
}

#[derive(Deserialize)]
pub struct MpanCore {
    #[serde(default, rename = "did")]
    pub distributor_id: Value,

    #[serde(default, rename = "ui")]
    pub unique_identifier: Value,

    #[serde(default, rename = "cd")]
    pub check_digit: Value,
}

impl Mpan {
    /// Space-separated as on the bill: `pc mtc llfc did ui cd`.
    #[must_use]
    pub fn to_bill_format(&self) -> String {
        let top_line = self.top_line.as_ref();
        let core = self.core.as_ref();
        [
            top_line.map(|top_line| &top_line.profile_class),
            top_line.map(|top_line| &top_line.meter_time_switch_code),
            top_line.map(|top_line| &top_line.line_loss_factor_class),
            core.map(|core| &core.distributor_id),
            core.map(|core| &core.unique_identifier),
            core.map(|core| &core.check_digit),
        ]
        .map(|part| part.and_then(plain_text).unwrap_or_default())
        .join(" ")
        .trim()
        .to_owned()
    }
}

/// `payments.payments[]`.
#[derive(Deserialize)]
pub struct Payment {
    #[serde(rename = "issuetime")]
    pub issued_at: String,

    #[serde(rename = "type")]
    pub kind: Value,

    #[serde(rename = "metercreditamount")]
    pub meter_credit_amount: Pence,

    #[serde(default, rename = "debtdeducted")]
    pub debt_deducted: Pence,

    #[serde(default = "zero", rename = "debtrecoveryrate")]
    pub debt_recovery_rate: Value,

    #[serde(rename = "transactionamount")]
    pub transaction_amount: Pence,

    pub full_description: String,
}

impl Payment {
    /// Calendar date part of the issue timestamp, taken verbatim.
    #[must_use]
    pub fn issue_date(&self) -> &str {
        self.issued_at.split('T').next().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_missing_node() {
        let error = parse::<Value>(&json!({"data": {}}), "/data/supplies").unwrap_err();
        assert_eq!(error.to_string(), "`/data/supplies` is missing");
    }

    #[test]
    fn test_parse_optional_null() -> Result {
        let tree = json!({"monthly_kwh": null});
        assert!(parse_optional::<KilowattHours>(&tree, "/monthly_kwh")?.is_none());
        assert!(parse_optional::<KilowattHours>(&tree, "/yearly_kwh")?.is_none());
        Ok(())
    }

    #[test]
    fn test_find_supply_ok() -> Result {
        let tree = json!({"supplies": [{"type": "elec", "id": 1}, {"type": "gas", "id": 2}]});
        let gas = find_supply(&tree, "/supplies", Supply::Gas)?.unwrap();
        assert_eq!(gas["id"], 2);
        Ok(())
    }

    #[test]
    fn test_find_supply_absent() -> Result {
        let tree = json!({"supplies": [{"type": "elec"}]});
        assert!(find_supply(&tree, "/supplies", Supply::Gas)?.is_none());
        Ok(())
    }

    #[test]
    fn test_find_supply_not_an_array() {
        assert!(find_supply(&json!({"supplies": "nope"}), "/supplies", Supply::Gas).is_err());
    }

    #[test]
    fn test_mpan_bill_format() -> Result {
        let mpan: Mpan = serde_json::from_value(json!({
            "top_line": {"pc": "01", "mtc": 801, "llfc": "123"},
            "core": {"did": "14", "ui": "1234 5678", "cd": "901"},
        }))?;
        assert_eq!(mpan.to_bill_format(), "01 801 123 14 1234 5678 901");
        Ok(())
    }

    #[test]
    fn test_usage_entry_cost() -> Result {
        let entry: UsageEntry = serde_json::from_value(json!({"kwh": 1.5, "pence": "42"}))?;
        assert_eq!(entry.cost()?, Pence::from(rust_decimal::Decimal::from(42)));
        let entry: UsageEntry = serde_json::from_value(json!({"kwh": 1.5}))?;
        assert_eq!(entry.cost()?, Pence::ZERO);
        Ok(())
    }

    #[test]
    fn test_payment_issue_date() -> Result {
        let payment: Payment = serde_json::from_value(json!({
            "issuetime": "2025-03-14T09:26:53",
            "type": "Card",
            "metercreditamount": 2000,
            "transactionamount": "2000",
            "full_description": "Top-up ",
        }))?;
        assert_eq!(payment.issue_date(), "2025-03-14");
        assert_eq!(payment.debt_deducted, Pence::ZERO);
        assert_eq!(payment.debt_recovery_rate, json!(0));
        Ok(())
    }
}
