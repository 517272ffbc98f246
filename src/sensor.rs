//! Sensors derived from the latest [`Snapshot`].
//!
//! Every sensor is a pure projection of the snapshot: nothing is cached, and the state and
//! the attributes are extracted independently. Extraction errors are logged and degrade
//! only the affected sensor.

mod account;
mod balance;
mod markup;
mod payments;
mod rate;
mod tariff;
mod usage;

use std::fmt::{Display, Formatter};

use enumset::EnumSet;
use serde::Serialize;
use serde_json::{Map, Value};

pub use crate::api::utilita::models::Supply;
use crate::{
    prelude::*,
    quantity::{cost::Pounds, energy::KilowattHours, rate::KilowattHourRate},
    snapshot::Snapshot,
};

pub type Attributes = Map<String, Value>;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    pub const ALL: [Self; 4] = [Self::Daily, Self::Weekly, Self::Monthly, Self::Yearly];

    const fn code(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }
}

impl Supply {
    const fn title(self) -> &'static str {
        match self {
            Self::Gas => "Gas",
            Self::Electricity => "Electricity",
        }
    }

    const fn icon(self) -> &'static str {
        match self {
            Self::Gas => "mdi:fire",
            Self::Electricity => "mdi:lightning-bolt-outline",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Sensor {
    /// Customer number, with the address.
    Account,

    /// Prepayment meter balance in pounds.
    Balance(Supply),

    Usage(Supply, Period),

    /// Tariff name, with the rates and meter details.
    Tariff(Supply),

    /// Unit rate that applies to today's consumption on a tiered tariff.
    CurrentRate(Supply),

    /// Number of recent payments, grouped by date in the attributes.
    Payments,
}

impl Sensor {
    /// All the sensors of an account with the specified supplies.
    #[must_use]
    pub fn catalogue(supplies: EnumSet<Supply>) -> Vec<Self> {
        let mut sensors = vec![Self::Account];
        sensors.extend(supplies.iter().map(Self::Balance));
        for period in Period::ALL {
            sensors.extend(supplies.iter().map(|supply| Self::Usage(supply, period)));
        }
        sensors.extend(supplies.iter().map(Self::Tariff));
        sensors.extend(supplies.iter().map(Self::CurrentRate));
        sensors.push(Self::Payments);
        sensors
    }

    /// Stable identifier, unique within an account.
    #[must_use]
    pub fn object_id(self) -> String {
        match self {
            Self::Account => "account".to_owned(),
            Self::Balance(supply) => format!("{}_balance", supply.code()),
            Self::Usage(supply, period) => format!("{}_{}_usage", supply.code(), period.code()),
            Self::Tariff(supply) => format!("{}_tariff", supply.code()),
            Self::CurrentRate(supply) => format!("{}_current_rate", supply.code()),
            Self::Payments => "payments".to_owned(),
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Account => "mdi:account-details",
            Self::Balance(supply) | Self::Usage(supply, _) | Self::Tariff(supply) => supply.icon(),
            Self::CurrentRate(Supply::Gas) => "mdi:fire-circle",
            Self::CurrentRate(Supply::Electricity) => "mdi:lightning-bolt-circle",
            Self::Payments => "mdi:currency-gbp",
        }
    }

    #[must_use]
    pub const fn unit(self) -> Option<&'static str> {
        match self {
            Self::Balance(_) => Some("£"),
            Self::Usage(..) => Some("kWh"),
            _ => None,
        }
    }

    #[must_use]
    pub const fn device_class(self) -> Option<&'static str> {
        match self {
            Self::Balance(_) => Some("monetary"),
            Self::Usage(..) => Some("energy"),
            _ => None,
        }
    }

    #[must_use]
    pub const fn state_class(self) -> Option<&'static str> {
        match self {
            Self::Balance(_) | Self::Usage(..) => Some("measurement"),
            _ => None,
        }
    }

    /// Read the sensor from the snapshot. Never fails: broken fields are logged and skipped.
    pub fn read(self, snapshot: &Snapshot) -> Reading {
        let state = self.read_state(snapshot).unwrap_or_else(|error| {
            error!(sensor = %self, "Failed to read the state: {error:#}");
            None
        });
        let attributes = self.read_attributes(snapshot).unwrap_or_else(|error| {
            error!(sensor = %self, "Failed to read the attributes: {error:#}");
            Attributes::new()
        });
        Reading { state, attributes }
    }

    fn read_state(self, snapshot: &Snapshot) -> Result<Option<State>> {
        match self {
            Self::Account => account::state(&snapshot.user_data),
            Self::Balance(supply) => balance::state(&snapshot.balance, supply),
            Self::Usage(supply, period) => usage::state(&snapshot.usage, supply, period),
            Self::Tariff(supply) => tariff::state(&snapshot.user_data, supply),
            Self::CurrentRate(supply) => rate::state(snapshot, supply),
            Self::Payments => payments::state(&snapshot.payments),
        }
    }

    fn read_attributes(self, snapshot: &Snapshot) -> Result<Attributes> {
        match self {
            Self::Account => account::attributes(&snapshot.user_data),
            Self::Balance(supply) => balance::attributes(&snapshot.balance, supply),
            Self::Usage(supply, period) => usage::attributes(snapshot, supply, period),
            Self::Tariff(supply) => tariff::attributes(snapshot, supply),
            Self::CurrentRate(supply) => rate::attributes(snapshot, supply),
            Self::Payments => payments::attributes(&snapshot.payments),
        }
    }
}

impl Display for Sensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Account => write!(f, "Account"),
            Self::Balance(supply) => write!(f, "{} Balance", supply.title()),
            Self::Usage(supply, period) => {
                write!(f, "{} {} Usage", period.title(), supply.title())
            }
            Self::Tariff(supply) => write!(f, "{} Tariff", supply.title()),
            Self::CurrentRate(Supply::Gas) => write!(f, "Current Gas Rate"),
            Self::CurrentRate(Supply::Electricity) => write!(f, "Current Electric Rate"),
            Self::Payments => write!(f, "Payments"),
        }
    }
}

#[must_use]
#[derive(Debug)]
pub struct Reading {
    pub state: Option<State>,
    pub attributes: Attributes,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum State {
    Text(String),
    Money(Pounds),
    Energy(KilowattHours),
    Rate(KilowattHourRate),
    Count(usize),
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Money(pounds) => write!(f, "{:.2}", pounds.amount()),
            Self::Energy(energy) => write!(f, "{energy}"),
            Self::Rate(rate) => write!(f, "{rate}"),
            Self::Count(count) => write!(f, "{count}"),
        }
    }
}

/// Flatten a serializable struct into an attribute map.
fn to_attributes<T: Serialize>(attributes: &T) -> Result<Attributes> {
    match serde_json::to_value(attributes)? {
        Value::Object(attributes) => Ok(attributes),
        other => bail!("attributes must be an object, got `{other}`"),
    }
}
