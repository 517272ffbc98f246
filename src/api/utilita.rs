//! [Utilita](https://my.utilita.co.uk) customer portal client.
//!
//! There is no public API: the client logs in through the web form like a browser would,
//! and then reads the same JSON endpoints the portal dashboard uses.

pub mod models;
mod token;

use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use chrono::Local;
use http::{
    StatusCode,
    header::{ACCEPT, ACCEPT_LANGUAGE, REFERER},
};
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde_json::Value;

pub use self::token::extract_token;
use crate::{coordinator::SnapshotSource, prelude::*, snapshot::Snapshot};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_JSON: &str = "application/json";
const LANGUAGE: &str = "en-US,en;q=0.5";

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("email", &self.email).finish_non_exhaustive()
    }
}

#[derive(bon::Builder)]
pub struct Api {
    /// Shared session: the login cookies must survive into the data requests.
    client: Client,

    base_url: Url,

    credentials: Credentials,
}

impl Api {
    /// Log into the portal, leaving the session cookies in the client.
    ///
    /// A login that ends up back on the login page is a failure, whatever the status code.
    #[instrument(skip_all, fields(email = %self.credentials.email))]
    pub async fn login(&self) -> Result {
        let login_url = self.endpoint("login")?;

        info!("Loading the login page…");
        let response = self
            .html_request(self.client.get(login_url.clone()))
            .send()
            .await
            .context("failed to load the login page")?;
        ensure!(
            response.status() == StatusCode::OK,
            "failed to load the login page: HTTP {}, URL: {}",
            response.status(),
            response.url(),
        );
        debug!(url = %response.url(), "Loaded the login page");
        let page = response.text().await.context("failed to read the login page")?;
        let token = extract_token(&page)?;

        info!("Logging in…");
        let response = self
            .html_request(self.client.post(login_url.clone()))
            .header(REFERER, login_url.as_str())
            .form(&LoginForm {
                token: &token,
                email: &self.credentials.email,
                password: &self.credentials.password,
                remember: "on",
            })
            .send()
            .await
            .context("failed to submit the login form")?;
        let status = response.status();
        let url = response.url();
        ensure!(
            status == StatusCode::OK && !url.as_str().contains("login"),
            "login failed: HTTP {status}, URL: {url}",
        );
        info!(%url, "Logged in");
        Ok(())
    }

    /// Log in and fetch all the portal data, all or nothing.
    #[instrument(skip_all, fields(email = %self.credentials.email))]
    pub async fn fetch_snapshot(&self) -> Result<Snapshot> {
        self.login().await?;
        let today = Local::now().date_naive();
        let snapshot = Snapshot {
            balance: self.get_json("balance", "json/balance", &()).await?,
            usage: self.get_json("usage", "json/usage", &[("end_date", today)]).await?,
            user_data: self.get_json("user data", "user-data", &()).await?,
            payments: self
                .get_json("payments", "json/payments", &[("page", 1), ("per_page", 50)])
                .await?,
        };
        info!("Fetched the snapshot");
        Ok(snapshot)
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(what = what))]
    async fn get_json<Q: Serialize + ?Sized>(&self, what: &str, path: &str, query: &Q) -> Result<Value> {
        let response = self
            .client
            .get(self.endpoint(path)?)
            .header(ACCEPT, ACCEPT_JSON)
            .header(ACCEPT_LANGUAGE, LANGUAGE)
            .header(REFERER, self.endpoint("energy")?.as_str())
            .query(query)
            .send()
            .await
            .with_context(|| format!("failed to fetch {what}"))?;
        ensure!(
            response.status() == StatusCode::OK,
            "failed to fetch {what}: HTTP {}",
            response.status(),
        );
        let value = response
            .json::<Value>()
            .await
            .with_context(|| format!("failed to deserialize {what}"))?;
        debug!("Fetched");
        Ok(value)
    }

    fn html_request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, LANGUAGE)
            .header("Upgrade-Insecure-Requests", "1")
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).with_context(|| format!("invalid endpoint `{path}`"))
    }
}

#[async_trait]
impl SnapshotSource for Api {
    async fn fetch(&self) -> Result<Snapshot> {
        self.fetch_snapshot().await
    }
}

#[derive(Serialize)]
struct LoginForm<'a> {
    #[serde(rename = "_token")]
    token: &'a str,

    email: &'a str,

    password: &'a str,

    remember: &'static str,
}
