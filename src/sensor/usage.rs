use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    api::utilita::models::{UsageEntry, find_by, find_supply, parse, parse_optional, plain_text},
    prelude::*,
    quantity::{
        cost::{Pence, Pounds},
        energy::KilowattHours,
    },
    sensor::{Attributes, Period, State, Supply, to_attributes},
    snapshot::Snapshot,
};

const SUPPLIES: &str = "/data/data";

/// Weekly figures cover the trailing entries, not a calendar week.
const WEEK: usize = 7;

#[derive(Serialize)]
struct UsageAttributes<'a> {
    supply_id: &'a Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    meter_units: Option<&'a Value>,

    #[serde(flatten)]
    period: PeriodAttributes,
}

#[derive(Serialize)]
#[serde(untagged)]
enum PeriodAttributes {
    Daily {
        last_updated: Option<Value>,
        kwh: Option<KilowattHours>,
        pence: Option<Value>,
        avg_temp: Option<String>,
    },
    Weekly {
        weekly_usage: Vec<Day>,
        weekly_cost: Pounds,
    },
    Monthly {
        #[serde(skip_serializing_if = "Option::is_none")]
        monthly_cost: Option<Pounds>,
    },
    Yearly {
        #[serde(skip_serializing_if = "Option::is_none")]
        yearly_cost: Option<Pounds>,
    },
}

#[derive(Serialize)]
struct Day {
    date: Value,
    kwh: KilowattHours,
    pence: Value,
    avg_temp: Option<String>,
}

impl From<UsageEntry> for Day {
    fn from(entry: UsageEntry) -> Self {
        Self {
            avg_temp: temperature(&entry),
            kwh: entry.kwh.round_to_watt_hours(),
            date: entry.date,
            pence: entry.pence,
        }
    }
}

pub fn state(usage: &Value, supply: Supply, period: Period) -> Result<Option<State>> {
    let Some(entry) = find_supply(usage, SUPPLIES, supply)? else {
        return Ok(None);
    };
    let energy = match period {
        Period::Daily => last_day(entry)?.map(|day| day.kwh),
        Period::Weekly => Some(trailing_week(entry)?.iter().map(|day| day.kwh).sum()),
        Period::Monthly => Some(parse::<KilowattHours>(entry, "/monthly_kwh")?),
        Period::Yearly => Some(parse::<KilowattHours>(entry, "/yearly_kwh")?),
    };
    Ok(energy.map(|energy| State::Energy(energy.round_to_watt_hours())))
}

pub fn attributes(snapshot: &Snapshot, supply: Supply, period: Period) -> Result<Attributes> {
    let Some(entry) = find_supply(&snapshot.usage, SUPPLIES, supply)? else {
        return Ok(Attributes::new());
    };
    let supply_id = entry.get("supply_id").unwrap_or(&Value::Null);
    let period = match period {
        Period::Daily => match last_day(entry)? {
            Some(day) => PeriodAttributes::Daily {
                avg_temp: temperature(&day),
                kwh: Some(day.kwh.round_to_watt_hours()),
                last_updated: Some(day.date),
                pence: Some(day.pence),
            },
            None => PeriodAttributes::Daily {
                last_updated: None,
                kwh: None,
                pence: None,
                avg_temp: None,
            },
        },
        Period::Weekly => {
            let week = trailing_week(entry)?;
            let weekly_cost = week.iter().map(UsageEntry::cost).sum::<Result<Pence>>()?;
            PeriodAttributes::Weekly {
                weekly_usage: week.into_iter().map(Day::from).collect(),
                weekly_cost: weekly_cost.to_pounds(),
            }
        }
        Period::Monthly => PeriodAttributes::Monthly {
            monthly_cost: parse_optional::<Pence>(entry, "/monthly_cost")?.map(Pence::to_pounds),
        },
        Period::Yearly => PeriodAttributes::Yearly {
            yearly_cost: parse_optional::<Pence>(entry, "/yearly_cost")?.map(Pence::to_pounds),
        },
    };
    to_attributes(&UsageAttributes {
        supply_id,
        meter_units: meter_units(&snapshot.user_data, supply_id),
        period,
    })
}

/// Consumption of the latest day on record, zero if the supply has no records yet.
///
/// Returns [`None`] when the supply is not in the usage data at all.
pub fn latest(usage: &Value, supply: Supply) -> Result<Option<KilowattHours>> {
    let Some(entry) = find_supply(usage, SUPPLIES, supply)? else {
        return Ok(None);
    };
    Ok(Some(last_day(entry)?.map_or(KilowattHours::ZERO, |day| day.kwh)))
}

/// Raw daily records, oldest first. Only the ones a sensor looks at get parsed.
fn days(entry: &Value) -> Result<&[Value]> {
    match entry.get("usage") {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(days) => days.as_array().map(Vec::as_slice).context("`/usage` is not an array"),
    }
}

fn last_day(entry: &Value) -> Result<Option<UsageEntry>> {
    days(entry)?.last().map(parse_day).transpose()
}

fn trailing_week(entry: &Value) -> Result<Vec<UsageEntry>> {
    let days = days(entry)?;
    days[days.len().saturating_sub(WEEK)..].iter().map(parse_day).collect()
}

fn parse_day(day: &Value) -> Result<UsageEntry> {
    UsageEntry::deserialize(day).with_context(|| format!("malformed usage record `{day}`"))
}

fn temperature(entry: &UsageEntry) -> Option<String> {
    plain_text(&entry.average_temperature).map(|celsius| format!("{celsius}°C"))
}

/// The units live in the user data, linked through the supply number.
fn meter_units<'a>(user_data: &'a Value, supply_id: &Value) -> Option<&'a Value> {
    match find_by(user_data, "/premises/0/supplies", "span", supply_id) {
        Ok(user_supply) => {
            user_supply.map(|user_supply| user_supply.pointer("/meter/units").unwrap_or(&Value::Null))
        }
        Err(error) => {
            warn!("Failed to look up the meter units: {error:#}");
            None
        }
    }
}
