use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    api::utilita::models::{Mpan, TariffSupply, find_by, find_supply, node, plain_text},
    prelude::*,
    quantity::{energy::KilowattHours, rate::RenderedRate},
    sensor::{Attributes, State, Supply, markup::strip_html, to_attributes},
    snapshot::Snapshot,
};

const SUPPLIES: &str = "/premises/0/supplies";

static FIRST_RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)First (\d+\.?\d*) kWh").unwrap());

#[derive(Serialize)]
struct TariffAttributes<'a> {
    region_name: &'a Value,
    first_rate_kwh: Option<KilowattHours>,
    rate1: Option<RenderedRate>,
    rate2: Option<RenderedRate>,
    span: &'a Value,
    pan: &'a Value,
    meter_id: Option<&'a Value>,
    meter_units: Option<&'a Value>,
    supply_start_date: &'a Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    mpan: Option<String>,

    #[serde(flatten)]
    smart_meter: Option<SmartMeter<'a>>,

    tariff_description: String,
}

#[derive(Serialize)]
struct SmartMeter<'a> {
    is_smart_meter: &'a Value,
    smets: &'a Value,
}

pub fn state(user_data: &Value, supply: Supply) -> Result<Option<State>> {
    let Some(entry) = find_supply(user_data, SUPPLIES, supply)? else {
        return Ok(None);
    };
    Ok(entry.get("tariff_name").and_then(plain_text).map(State::Text))
}

pub fn attributes(snapshot: &Snapshot, supply: Supply) -> Result<Attributes> {
    let Some(tariff) = find(&snapshot.user_data, supply)? else {
        return Ok(Attributes::new());
    };
    let meter = tariff.meter.as_ref();
    to_attributes(&TariffAttributes {
        region_name: &tariff.region_name,
        first_rate_kwh: first_rate_kwh(&tariff),
        rate1: tariff.rate1.map(RenderedRate),
        rate2: tariff.rate2.map(RenderedRate),
        span: &tariff.span,
        pan: &tariff.pan,
        meter_id: meter.map(|meter| &meter.id),
        meter_units: meter.map(|meter| &meter.units),
        supply_start_date: &tariff.supply_start_date,
        mpan: (supply == Supply::Electricity)
            .then(|| tariff.mpan.as_ref().map(Mpan::to_bill_format).unwrap_or_default()),
        smart_meter: smart_meter(&snapshot.usage, &tariff.span),
        tariff_description: description(&tariff),
    })
}

/// Tariff details of the supply, if the account has it.
pub fn find(user_data: &Value, supply: Supply) -> Result<Option<TariffSupply>> {
    find_supply(user_data, SUPPLIES, supply)?
        .map(TariffSupply::deserialize)
        .transpose()
        .context("malformed tariff supply")
}

/// Daily allowance charged at the first rate, as stated in the tariff description.
pub fn first_rate_kwh(tariff: &TariffSupply) -> Option<KilowattHours> {
    let description = description(tariff);
    let threshold = FIRST_RATE.captures(&description)?.get(1)?.as_str();
    KilowattHours::from_str(threshold)
        .inspect_err(|error| warn!(threshold, "Unparseable first rate allowance: {error}"))
        .ok()
}

fn description(tariff: &TariffSupply) -> String {
    strip_html(tariff.tariff_description.as_deref().unwrap_or_default())
}

/// Smart meter details are only present in the usage data, linked through the supply number.
fn smart_meter<'a>(usage: &'a Value, span: &Value) -> Option<SmartMeter<'a>> {
    match find_by(usage, "/data/data", "supply_id", span) {
        Ok(Some(usage_supply)) => Some(SmartMeter {
            is_smart_meter: node(usage_supply, "/is_smart_meter").unwrap_or(&Value::Null),
            smets: node(usage_supply, "/smets").unwrap_or(&Value::Null),
        }),
        Ok(None) => {
            warn!(%span, "No matching usage data found for the supply");
            None
        }
        Err(error) => {
            warn!(%span, "Smart meter details are unavailable: {error:#}");
            None
        }
    }
}
