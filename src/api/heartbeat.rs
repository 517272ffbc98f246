use std::time::Duration;

use reqwest::Url;

use crate::prelude::*;

/// Dead man's switch, pinged after every successful refresh.
#[must_use]
pub struct Client {
    inner: reqwest::Client,
    url: Option<Url>,
}

impl Client {
    pub fn try_new(url: Option<Url>) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .context("failed to build the heartbeat client")?;
        Ok(Self { inner, url })
    }

    /// Send the heartbeat, if configured. Failures are only logged.
    pub async fn send(&self) {
        if let Some(url) = &self.url
            && let Err(error) = self.send_fallible(url.clone()).await
        {
            warn!("Failed to send the heartbeat: {error:#}");
        }
    }

    #[instrument(skip_all)]
    async fn send_fallible(&self, url: Url) -> Result {
        info!("Sending a heartbeat…");
        self.inner.post(url).send().await?.error_for_status()?;
        Ok(())
    }
}
