//! Home Assistant REST API, used to publish the sensor states.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    ClientBuilder,
    Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::Serialize;

use crate::{
    prelude::*,
    publisher::Publisher,
    sensor::{Attributes, Reading, Sensor},
};

const UNAVAILABLE: &str = "unavailable";
const UNKNOWN: &str = "unknown";

pub struct Api {
    client: Client,

    /// API root, normally ending with `/api`.
    base_url: Url,

    /// Entity IDs are `sensor.<prefix>_<object ID>`.
    entity_prefix: String,
}

impl Api {
    pub fn try_new(access_token: &str, base_url: Url, entity_prefix: String) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .context("invalid Home Assistant access token")?;
        authorization.set_sensitive(true);
        let client = ClientBuilder::new()
            .default_headers(HeaderMap::from_iter([(AUTHORIZATION, authorization)]))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base_url, entity_prefix })
    }

    #[must_use]
    pub fn entity_id(&self, sensor: Sensor) -> String {
        format!("sensor.{}_{}", self.entity_prefix, sensor.object_id())
    }

    #[instrument(skip_all, fields(entity_id = entity_id))]
    pub async fn set_state(&self, entity_id: &str, body: &StateBody) -> Result {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid base URL"))?
            .pop_if_empty()
            .push("states")
            .push(entity_id);
        self.client.post(url).json(body).send().await?.error_for_status()?;
        debug!(state = %body.state, "Published");
        Ok(())
    }
}

#[async_trait]
impl Publisher for Api {
    async fn publish(&self, readings: &[(Sensor, Reading)], available: bool) {
        info!(n_sensors = readings.len(), available, "Publishing…");
        for (sensor, reading) in readings {
            let entity_id = self.entity_id(*sensor);
            let body = StateBody::new(*sensor, reading, available);
            if let Err(error) = self.set_state(&entity_id, &body).await {
                error!(entity_id, "Failed to publish the state: {error:#}");
            }
        }
    }
}

/// `POST /api/states/<entity_id>` payload.
#[derive(Serialize)]
pub struct StateBody {
    state: String,
    attributes: Attributes,
}

impl StateBody {
    #[must_use]
    pub fn new(sensor: Sensor, reading: &Reading, available: bool) -> Self {
        let state = if available {
            reading.state.as_ref().map_or_else(|| UNKNOWN.to_owned(), ToString::to_string)
        } else {
            UNAVAILABLE.to_owned()
        };
        let mut attributes = reading.attributes.clone();
        attributes.insert("friendly_name".into(), sensor.to_string().into());
        attributes.insert("icon".into(), sensor.icon().into());
        if let Some(unit) = sensor.unit() {
            attributes.insert("unit_of_measurement".into(), unit.into());
        }
        if let Some(device_class) = sensor.device_class() {
            attributes.insert("device_class".into(), device_class.into());
        }
        if let Some(state_class) = sensor.state_class() {
            attributes.insert("state_class".into(), state_class.into());
        }
        Self { state, attributes }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;
    use crate::{
        quantity::energy::KilowattHours,
        sensor::{Period, State, Supply},
    };

    fn reading(state: Option<State>) -> Reading {
        let mut attributes = Attributes::new();
        attributes.insert("supply_id".into(), json!(987_654));
        Reading { state, attributes }
    }

    #[test]
    fn test_state_body_ok() -> Result {
        let body = StateBody::new(
            Sensor::Usage(Supply::Gas, Period::Weekly),
            &reading(Some(State::Energy(KilowattHours::from_str("22.5")?))),
            true,
        );
        assert_eq!(
            serde_json::to_value(&body)?,
            json!({
                "state": "22.5",
                "attributes": {
                    "supply_id": 987_654,
                    "friendly_name": "Weekly Gas Usage",
                    "icon": "mdi:fire",
                    "unit_of_measurement": "kWh",
                    "device_class": "energy",
                    "state_class": "measurement",
                },
            }),
        );
        Ok(())
    }

    #[test]
    fn test_state_body_unknown_and_unavailable() {
        let body = StateBody::new(Sensor::Payments, &reading(None), true);
        assert_eq!(body.state, "unknown");
        assert!(!body.attributes.contains_key("unit_of_measurement"));

        let body = StateBody::new(Sensor::Payments, &reading(Some(State::Count(2))), false);
        assert_eq!(body.state, "unavailable");
    }

    #[tokio::test]
    async fn test_publish_ok() -> Result {
        let mut server = Server::new_async().await;
        let balance = server
            .mock("POST", "/api/states/sensor.utilita_gas_balance")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJson(json!({
                "state": "unavailable",
                "attributes": {"friendly_name": "Gas Balance", "unit_of_measurement": "£"},
            })))
            .with_status(200)
            .create_async()
            .await;
        let payments = server
            .mock("POST", "/api/states/sensor.utilita_payments")
            .with_status(500)
            .create_async()
            .await;
        let account = server
            .mock("POST", "/api/states/sensor.utilita_account")
            .with_status(201)
            .create_async()
            .await;
        let api = Api::try_new("secret", Url::parse(&server.url())?.join("api")?, "utilita".into())?;

        let readings = [
            (Sensor::Balance(Supply::Gas), reading(None)),
            (Sensor::Payments, reading(Some(State::Count(1)))),
            (Sensor::Account, reading(Some(State::Text("42".into())))),
        ];
        api.publish(&readings, false).await;

        for mock in [balance, payments, account] {
            mock.assert_async().await;
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_set_state_error() -> Result {
        let mut server = Server::new_async().await;
        let _state = server
            .mock("POST", "/api/states/sensor.test_account")
            .with_status(401)
            .create_async()
            .await;
        let api = Api::try_new("wrong", Url::parse(&server.url())?.join("api/")?, "test".into())?;

        let body = StateBody::new(Sensor::Account, &reading(None), true);
        let error = api.set_state("sensor.test_account", &body).await.unwrap_err();

        assert!(error.to_string().contains("401"), "{error:#}");
        Ok(())
    }
}
