use async_trait::async_trait;

use crate::{
    prelude::*,
    sensor::{Reading, Sensor},
};

/// Destination of the sensor readings.
#[async_trait]
pub trait Publisher: Sync {
    /// Publish the readings of one refresh cycle.
    ///
    /// `available` is `false` when the latest refresh failed and the readings come from
    /// an older snapshot. Implementations log their own failures.
    async fn publish(&self, readings: &[(Sensor, Reading)], available: bool);
}

/// Publisher that only logs the readings.
pub struct Tracing;

#[async_trait]
impl Publisher for Tracing {
    async fn publish(&self, readings: &[(Sensor, Reading)], available: bool) {
        for (sensor, reading) in readings {
            let state = reading.state.as_ref().map(ToString::to_string);
            info!(
                %sensor,
                available,
                state = state.as_deref().unwrap_or("unknown"),
                unit = sensor.unit(),
                n_attributes = reading.attributes.len(),
                "Reading",
            );
        }
    }
}
