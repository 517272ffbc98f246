use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    api::utilita::models::{BalanceSupply, find_supply, parse},
    prelude::*,
    quantity::cost::Pence,
    sensor::{Attributes, State, Supply, markup::strip_html, to_attributes},
};

const SUPPLIES: &str = "/data/supplies";

#[derive(Serialize)]
struct BalanceAttributes<'a> {
    supply_id: &'a Value,
    payment_mode: &'a Value,
    zero_time: &'a Value,
    duration_remaining: String,
    updated: &'a Value,
    emergency_credit_status: &'a str,
    debt_money: &'a Value,
    debt_recovery_rate: &'a Value,
    messages: Vec<&'a Value>,
}

pub fn state(balance: &Value, supply: Supply) -> Result<Option<State>> {
    let Some(entry) = find_supply(balance, SUPPLIES, supply)? else {
        return Ok(None);
    };
    let money: Pence = parse(entry, "/balance/money")?;
    Ok(Some(State::Money(money.to_pounds())))
}

pub fn attributes(balance: &Value, supply: Supply) -> Result<Attributes> {
    let Some(entry) = find_supply(balance, SUPPLIES, supply)? else {
        return Ok(Attributes::new());
    };
    let entry = BalanceSupply::deserialize(entry).context("malformed balance supply")?;
    to_attributes(&BalanceAttributes {
        supply_id: &entry.supply_id,
        payment_mode: &entry.payment_mode,
        zero_time: &entry.balance.zero_time,
        duration_remaining: strip_html(entry.balance.duration.as_deref().unwrap_or_default()),
        updated: &entry.balance.updated,
        emergency_credit_status: entry.emergency_credit.status.as_deref().unwrap_or("Unknown"),
        debt_money: &entry.debt.money,
        debt_recovery_rate: &entry.debt.debt_recovery_rate,
        messages: entry.balance.messages.iter().map(|message| &message.text).collect(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::sensor::tests::snapshot;

    #[test]
    fn test_state_ok() -> Result {
        let balance = snapshot().balance;
        assert_eq!(state(&balance, Supply::Electricity)?.unwrap().to_string(), "23.45");
        assert_eq!(state(&balance, Supply::Gas)?.unwrap().to_string(), "12.35");
        Ok(())
    }

    #[test]
    fn test_absent_supply() -> Result {
        let balance = json!({"data": {"supplies": [{"type": "elec", "balance": {"money": 1}}]}});
        assert!(state(&balance, Supply::Gas)?.is_none());
        assert!(attributes(&balance, Supply::Gas)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_attributes_ok() -> Result {
        let attributes = attributes(&snapshot().balance, Supply::Electricity)?;
        assert_eq!(attributes["supply_id"], 1_200_034_567_890_u64);
        assert_eq!(attributes["payment_mode"], "Smart PAYG");
        assert_eq!(attributes["zero_time"], "2025-03-20T06:00:00");
        assert_eq!(attributes["duration_remaining"], "5 days left");
        assert_eq!(attributes["emergency_credit_status"], "Available");
        assert_eq!(attributes["debt_money"], 1_050);
        assert_eq!(attributes["debt_recovery_rate"], 35);
        assert_eq!(attributes["messages"], json!(["Top up soon"]));
        Ok(())
    }

    #[test]
    fn test_attributes_defaults() -> Result {
        let attributes = attributes(&snapshot().balance, Supply::Gas)?;
        assert_eq!(attributes["duration_remaining"], "");
        assert_eq!(attributes["emergency_credit_status"], "Unknown");
        assert_eq!(attributes["debt_money"], 0);
        assert_eq!(attributes["debt_recovery_rate"], 0);
        assert_eq!(attributes["messages"], json!([]));
        assert!(attributes["updated"].is_null());
        Ok(())
    }

    #[test]
    fn test_malformed_money_fails() {
        let balance = json!({"data": {"supplies": [{"type": "gas", "balance": {"money": "lots"}}]}});
        assert!(state(&balance, Supply::Gas).is_err());
    }
}
