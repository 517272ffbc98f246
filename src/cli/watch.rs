use std::path::PathBuf;

use clap::Parser;
use enumset::EnumSet;
use reqwest::Url;
use tokio::{select, signal, sync::mpsc};

use crate::{
    api::{home_assistant, utilita},
    cli::{HeartbeatArgs, PortalArgs},
    coordinator::Coordinator,
    options::{Options, RefreshInterval},
    prelude::*,
    publisher::{self, Publisher},
    sensor::Sensor,
};

#[derive(Parser)]
pub struct WatchArgs {
    #[clap(flatten)]
    portal: PortalArgs,

    /// Refresh interval in seconds, at least 300.
    #[clap(long = "refresh-interval-secs", env = "REFRESH_INTERVAL_SECS", default_value = "3600")]
    refresh_interval: RefreshInterval,

    /// TOML file with the options to apply live, re-read on `SIGHUP`.
    #[clap(long = "options-file", env = "OPTIONS_FILE")]
    options_file: Option<PathBuf>,

    #[clap(flatten)]
    heartbeat: HeartbeatArgs,

    #[clap(flatten)]
    home_assistant: HomeAssistantArgs,
}

impl WatchArgs {
    pub async fn run(self) -> Result {
        let mut coordinator = Coordinator::builder()
            .source(self.portal.api()?)
            .heartbeat(self.heartbeat.client()?)
            .sensors(Sensor::catalogue(EnumSet::all()))
            .refresh_interval(self.refresh_interval)
            .build();
        if let Some(path) = &self.options_file {
            coordinator.update_options(Options::read_from(path)?);
        }
        coordinator.first_refresh().await?;

        let (options_tx, options_rx) = mpsc::channel(1);
        #[cfg(unix)]
        if let Some(path) = self.options_file {
            reload_on_hangup(path, options_tx.clone())?;
        }

        let result = match self.home_assistant.api()? {
            Some(api) => run_until_interrupted(coordinator, options_rx, &api).await,
            None => run_until_interrupted(coordinator, options_rx, &publisher::Tracing).await,
        };
        drop(options_tx);
        result
    }
}

#[derive(Parser)]
pub struct HomeAssistantArgs {
    /// Home Assistant REST API root, for example `http://homeassistant.local:8123/api`.
    ///
    /// The readings are only logged when not set.
    #[clap(
        id = "home_assistant_base_url",
        long = "home-assistant-api-base-url",
        env = "HOME_ASSISTANT_API_BASE_URL",
        requires = "home_assistant_access_token"
    )]
    base_url: Option<Url>,

    /// Long-lived access token.
    #[clap(
        id = "home_assistant_access_token",
        long = "home-assistant-access-token",
        env = "HOME_ASSISTANT_ACCESS_TOKEN",
        hide_env_values = true
    )]
    access_token: Option<String>,

    #[clap(long = "entity-prefix", env = "ENTITY_PREFIX", default_value = "utilita")]
    entity_prefix: String,
}

impl HomeAssistantArgs {
    fn api(self) -> Result<Option<home_assistant::Api>> {
        let (Some(base_url), Some(access_token)) = (self.base_url, self.access_token) else {
            info!("Home Assistant is not configured, the readings will only be logged");
            return Ok(None);
        };
        home_assistant::Api::try_new(&access_token, base_url, self.entity_prefix).map(Some)
    }
}

async fn run_until_interrupted(
    coordinator: Coordinator<utilita::Api>,
    options: mpsc::Receiver<Options>,
    publisher: &impl Publisher,
) -> Result {
    select! {
        result = coordinator.run(options, publisher) => result.map(|_| ()),
        result = signal::ctrl_c() => {
            result.context("failed to listen for Ctrl+C")?;
            info!("Interrupted");
            Ok(())
        }
    }
}

/// Re-read the options file on every `SIGHUP` and pass the result on.
#[cfg(unix)]
fn reload_on_hangup(path: PathBuf, options_tx: mpsc::Sender<Options>) -> Result {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangups = signal(SignalKind::hangup()).context("failed to listen for SIGHUP")?;
    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            info!(path = %path.display(), "Reloading the options…");
            match Options::read_from(&path) {
                Ok(options) => {
                    if options_tx.send(options).await.is_err() {
                        break;
                    }
                }
                Err(error) => error!("Failed to reload the options: {error:#}"),
            }
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Command};

    fn parse_watch(args: &[&str]) -> Result<WatchArgs> {
        let args = ["utilita-sensors", "watch"].into_iter().chain(args.iter().copied());
        let Command::Watch(args) = Args::try_parse_from(args)?.command else {
            bail!("expected `watch`");
        };
        Ok(*args)
    }

    #[test]
    fn test_portal_and_home_assistant_urls_are_separate() -> Result {
        let args = parse_watch(&[
            "--email=jane@example.com",
            "--password=hunter2",
            "--base-url=https://portal.example.com/",
            "--home-assistant-api-base-url=http://homeassistant.local:8123/api",
            "--home-assistant-access-token=secret",
        ])?;
        assert_eq!(args.portal.base_url.as_str(), "https://portal.example.com/");
        assert_eq!(
            args.home_assistant.base_url.as_ref().map(Url::as_str),
            Some("http://homeassistant.local:8123/api"),
        );
        assert_eq!(args.home_assistant.access_token.as_deref(), Some("secret"));
        Ok(())
    }

    #[test]
    fn test_portal_url_defaults_without_home_assistant() -> Result {
        let args = parse_watch(&["--email=jane@example.com", "--password=hunter2"])?;
        assert_eq!(args.portal.base_url.as_str(), "https://my.utilita.co.uk/");
        assert!(args.home_assistant.base_url.is_none());
        Ok(())
    }

    #[test]
    fn test_home_assistant_url_requires_token() {
        let result = parse_watch(&[
            "--email=jane@example.com",
            "--password=hunter2",
            "--home-assistant-api-base-url=http://homeassistant.local:8123/api",
        ]);
        assert!(result.is_err());
    }
}
