mod api;
mod cli;
mod coordinator;
mod options;
mod prelude;
mod publisher;
mod quantity;
mod sensor;
mod snapshot;
mod tables;

use clap::{Parser, crate_version};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_env_filter(
            EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy(),
        )
        .init();
    info!(version = crate_version!(), "Starting…");

    match Args::parse().command {
        Command::Watch(args) => args.run().await?,
        Command::Check(args) => {
            args.api()?.login().await?;
            info!("The credentials are valid");
        }
        Command::Show(args) => args.run().await?,
        Command::Dump(args) => args.run().await?,
    }

    info!("Done!");
    Ok(())
}
