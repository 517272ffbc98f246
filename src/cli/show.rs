use std::path::PathBuf;

use clap::Parser;
use enumset::EnumSet;

use crate::{
    cli::PortalArgs,
    prelude::*,
    sensor::Sensor,
    snapshot::Snapshot,
    tables::build_readings_table,
};

#[derive(Parser)]
pub struct ShowArgs {
    #[clap(flatten)]
    portal: PortalArgs,

    /// Read the snapshot saved by `dump` instead of fetching a fresh one.
    #[clap(long)]
    snapshot: Option<PathBuf>,
}

impl ShowArgs {
    pub async fn run(self) -> Result {
        let snapshot = match self.snapshot {
            Some(path) => Snapshot::read_from(&path)?,
            None => self.portal.api()?.fetch_snapshot().await?,
        };
        let readings: Vec<_> = Sensor::catalogue(EnumSet::all())
            .into_iter()
            .map(|sensor| (sensor, sensor.read(&snapshot)))
            .collect();
        println!("{}", build_readings_table(&readings));
        Ok(())
    }
}
