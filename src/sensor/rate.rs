//! Current unit rate on a two-tier tariff.
//!
//! Consumption up to the daily allowance is charged at the first rate, and the rest at the
//! second one. Whether the allowance is really daily is not documented, so this is a best guess.

use serde::Serialize;

use crate::{
    api::utilita::models::TariffSupply,
    prelude::*,
    quantity::{
        energy::KilowattHours,
        rate::{KilowattHourRate, RenderedRate},
    },
    sensor::{Attributes, State, Supply, tariff, to_attributes, usage},
    snapshot::Snapshot,
};

#[derive(Serialize)]
struct RateAttributes {
    daily_usage_kwh: KilowattHours,
    first_rate_kwh: KilowattHours,
    rate1: Option<RenderedRate>,
    rate2: Option<RenderedRate>,
}

struct Inputs {
    today: KilowattHours,
    threshold: KilowattHours,
    tariff: TariffSupply,
}

impl Inputs {
    fn read(snapshot: &Snapshot, supply: Supply) -> Result<Option<Self>> {
        let Some(today) = usage::latest(&snapshot.usage, supply)? else {
            return Ok(None);
        };
        let Some(tariff) = tariff::find(&snapshot.user_data, supply)? else {
            return Ok(None);
        };
        let threshold = tariff::first_rate_kwh(&tariff).unwrap_or(KilowattHours::ZERO);
        Ok(Some(Self { today, threshold, tariff }))
    }

    fn current_rate(&self) -> KilowattHourRate {
        let rate = if self.today <= self.threshold { self.tariff.rate1 } else { self.tariff.rate2 };
        rate.unwrap_or(KilowattHourRate::ZERO)
    }
}

pub fn state(snapshot: &Snapshot, supply: Supply) -> Result<Option<State>> {
    Ok(Inputs::read(snapshot, supply)?.map(|inputs| State::Rate(inputs.current_rate())))
}

pub fn attributes(snapshot: &Snapshot, supply: Supply) -> Result<Attributes> {
    let Some(inputs) = Inputs::read(snapshot, supply)? else {
        return Ok(Attributes::new());
    };
    to_attributes(&RateAttributes {
        daily_usage_kwh: inputs.today.round_to_watt_hours(),
        first_rate_kwh: inputs.threshold,
        rate1: inputs.tariff.rate1.map(RenderedRate),
        rate2: inputs.tariff.rate2.map(RenderedRate),
    })
}
