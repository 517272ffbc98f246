mod dump;
mod show;
mod watch;

use clap::{Parser, Subcommand};
use reqwest::Url;

pub use self::{dump::DumpArgs, show::ShowArgs, watch::WatchArgs};
use crate::{
    api::{
        client,
        heartbeat,
        utilita::{self, Credentials},
    },
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: refresh the portal data periodically and publish the sensors.
    #[clap(name = "watch")]
    Watch(Box<WatchArgs>),

    /// Log into the portal to check the credentials.
    #[clap(name = "check")]
    Check(Box<PortalArgs>),

    /// Fetch the portal data once and print the sensor readings.
    #[clap(name = "show")]
    Show(Box<ShowArgs>),

    /// Fetch the portal data once and save the raw snapshot.
    #[clap(name = "dump")]
    Dump(Box<DumpArgs>),
}

#[derive(Parser)]
pub struct PortalArgs {
    /// Customer portal login.
    #[clap(long, env = "UTILITA_EMAIL")]
    pub email: Option<String>,

    #[clap(long, env = "UTILITA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[clap(
        long = "base-url",
        env = "UTILITA_BASE_URL",
        default_value = "https://my.utilita.co.uk"
    )]
    pub base_url: Url,
}

impl PortalArgs {
    /// Build the portal client.
    ///
    /// The credentials are optional on the command line because `show` can do without them.
    pub fn api(self) -> Result<utilita::Api> {
        let email =
            self.email.context("the email is required, use `--email` or `UTILITA_EMAIL`")?;
        let password = self
            .password
            .context("the password is required, use `--password` or `UTILITA_PASSWORD`")?;
        ensure!(!email.is_empty() && !password.is_empty(), "the credentials must not be empty");
        Ok(utilita::Api::builder()
            .client(client::try_new()?)
            .base_url(self.base_url)
            .credentials(Credentials { email, password })
            .build())
    }
}

#[derive(Parser)]
pub struct HeartbeatArgs {
    /// URL to `POST` to after every successful refresh.
    #[clap(long = "heartbeat-url", env = "HEARTBEAT_URL")]
    pub url: Option<Url>,
}

impl HeartbeatArgs {
    pub fn client(self) -> Result<heartbeat::Client> {
        heartbeat::Client::try_new(self.url)
    }
}
