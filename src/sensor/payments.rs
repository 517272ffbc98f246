use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    api::utilita::models::{Payment, array},
    prelude::*,
    quantity::cost::Pounds,
    sensor::{Attributes, State},
};

const PAYMENTS: &str = "/payments";

#[derive(Serialize)]
struct PaymentAttributes<'a> {
    #[serde(rename = "type")]
    kind: &'a Value,

    amount: Pounds,
    debt_deducted: Pounds,
    debt_recovery_rate: &'a Value,
    transaction_amount: Pounds,
    full_description: &'a str,
    issuetime: &'a str,
}

impl<'a> From<&'a Payment> for PaymentAttributes<'a> {
    fn from(payment: &'a Payment) -> Self {
        Self {
            kind: &payment.kind,
            amount: payment.meter_credit_amount.to_pounds(),
            debt_deducted: payment.debt_deducted.to_pounds(),
            debt_recovery_rate: &payment.debt_recovery_rate,
            transaction_amount: payment.transaction_amount.to_pounds(),
            full_description: payment.full_description.trim(),
            issuetime: &payment.issued_at,
        }
    }
}

pub fn state(payments: &Value) -> Result<Option<State>> {
    Ok(Some(State::Count(array(payments, PAYMENTS)?.len())))
}

/// Payments grouped by the issue date, in the order the portal lists them.
pub fn attributes(payments: &Value) -> Result<Attributes> {
    let payments = array(payments, PAYMENTS)?
        .iter()
        .map(Payment::deserialize)
        .collect::<Result<Vec<_>, _>>()
        .context("malformed payment")?;
    let mut attributes = Attributes::new();
    for payment in &payments {
        let group = attributes
            .entry(payment.issue_date())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(group) = group {
            group.push(serde_json::to_value(PaymentAttributes::from(payment))?);
        }
    }
    Ok(attributes)
}
