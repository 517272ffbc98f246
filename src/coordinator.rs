//! Polling coordinator: schedules the refreshes and keeps the last good snapshot.

use std::time::Duration;

use async_trait::async_trait;
use bon::Builder;
use tokio::{select, sync::mpsc, time::sleep};

use crate::{
    api::heartbeat,
    options::{Options, RefreshInterval},
    prelude::*,
    publisher::Publisher,
    sensor::{Reading, Sensor},
    snapshot::Snapshot,
};

/// Anything that can produce a complete snapshot, all or nothing.
#[async_trait]
pub trait SnapshotSource: Sync {
    async fn fetch(&self) -> Result<Snapshot>;
}

#[must_use]
#[derive(Builder)]
pub struct Coordinator<S> {
    source: S,

    heartbeat: heartbeat::Client,

    /// Sensors to read on every publication.
    sensors: Vec<Sensor>,

    #[builder(default)]
    refresh_interval: RefreshInterval,

    /// Last good snapshot, replaced wholesale.
    #[builder(skip)]
    snapshot: Option<Snapshot>,

    #[builder(skip)]
    last_update_success: bool,
}

impl<S: SnapshotSource> Coordinator<S> {
    #[cfg(test)]
    pub const fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    #[cfg(test)]
    pub const fn last_update_success(&self) -> bool {
        self.last_update_success
    }

    #[cfg(test)]
    pub const fn refresh_interval(&self) -> RefreshInterval {
        self.refresh_interval
    }

    /// Run one fetch. On failure the previous snapshot stays in place.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self) -> Result {
        info!("Refreshing…");
        match self.source.fetch().await {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.last_update_success = true;
                info!("Refreshed");
                self.heartbeat.send().await;
                Ok(())
            }
            Err(error) => {
                self.last_update_success = false;
                Err(error)
            }
        }
    }

    /// The very first refresh must succeed, otherwise there is nothing to publish.
    pub async fn first_refresh(&mut self) -> Result {
        self.refresh().await.context("the first refresh failed")
    }

    /// Apply the new options. The caller is expected to refresh right away.
    pub fn update_options(&mut self, options: Options) {
        if let Some(refresh_interval) = options.refresh_interval_secs {
            info!(
                from = %self.refresh_interval,
                to = %refresh_interval,
                "Updating the refresh interval",
            );
            self.refresh_interval = refresh_interval;
        }
    }

    /// Read all the sensors from the last good snapshot.
    pub fn readings(&self) -> Vec<(Sensor, Reading)> {
        let Some(snapshot) = &self.snapshot else {
            return Vec::new();
        };
        self.sensors.iter().map(|sensor| (*sensor, sensor.read(snapshot))).collect()
    }

    /// Publish, then wait for the interval or an options update, and refresh. Repeat.
    ///
    /// Returns itself once the options channel is closed.
    pub async fn run(
        mut self,
        mut options: mpsc::Receiver<Options>,
        publisher: &impl Publisher,
    ) -> Result<Self> {
        loop {
            publisher.publish(&self.readings(), self.last_update_success).await;

            let interval = Duration::from(self.refresh_interval);
            debug!(?interval, "Sleeping…");
            select! {
                () = sleep(interval) => {}
                update = options.recv() => {
                    let Some(update) = update else {
                        info!("The options channel is closed, stopping");
                        return Ok(self);
                    };
                    self.update_options(update);
                }
            }

            if let Err(error) = self.refresh().await {
                error!("Failed to refresh, keeping the previous snapshot: {error:#}");
            }
        }
    }
}
