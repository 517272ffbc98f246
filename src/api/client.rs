use std::time::Duration;

use reqwest::Client;

use crate::prelude::*;

/// The portal refuses obviously non-browser clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Build the shared session client.
///
/// Authentication state lives in the cookie store, so every API object must be handed
/// a clone of the same client rather than building its own.
pub fn try_new() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .timeout(Duration::from_secs(10))
        .build()
        .context("failed to build the HTTP client")
}
