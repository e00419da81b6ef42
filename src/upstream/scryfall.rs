//! Scryfall Client
//!
//! HTTP implementation of [`CardLookup`] against the `cards/named` endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::FetcherConfig;
use crate::error::UpstreamError;
use crate::models::CardRecord;
use crate::upstream::{Attempt, CardLookup, Connector};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Card fields we keep from the upstream payload; anything missing is empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScryfallCard {
    name: String,
    oracle_text: String,
    mana_cost: String,
    type_line: String,
    set_name: String,
}

impl From<ScryfallCard> for CardRecord {
    fn from(card: ScryfallCard) -> Self {
        CardRecord::found(
            card.name,
            card.oracle_text,
            card.mana_cost,
            card.type_line,
            card.set_name,
        )
    }
}

// == Scryfall Client ==
/// One HTTP session with the lookup service.
///
/// The connection pool lives as long as the client; dropping the last
/// handle closes it.
#[derive(Debug, Clone)]
pub struct ScryfallClient {
    http: reqwest::Client,
    base_url: String,
}

impl ScryfallClient {
    pub fn new(config: &FetcherConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
        })
    }

    /// A connector that builds a new client for every worker run.
    pub fn connector(config: FetcherConfig) -> Connector {
        Arc::new(move || -> Result<Arc<dyn CardLookup>, UpstreamError> {
            let client = ScryfallClient::new(&config)?;
            Ok(Arc::new(client))
        })
    }
}

#[async_trait]
impl CardLookup for ScryfallClient {
    async fn lookup(&self, name: &str) -> Attempt {
        debug!(card = %name, url = %self.base_url, "Querying upstream");

        let response = match self
            .http
            .get(&self.base_url)
            .query(&[("fuzzy", name)])
            .header(header::ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return classify_transport_error(e),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Attempt::NotFound;
        }
        if !status.is_success() {
            return Attempt::Transient(format!(
                "upstream returned HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ));
        }

        match response.json::<ScryfallCard>().await {
            Ok(card) => Attempt::Found(card.into()),
            Err(e) if e.is_timeout() => Attempt::Transient(format!("timed out reading body: {e}")),
            Err(e) => Attempt::Fatal(format!("unreadable response body: {e}")),
        }
    }
}

/// Timeouts, connection failures, disconnects and redirect loops are retryable.
fn classify_transport_error(error: reqwest::Error) -> Attempt {
    if error.is_timeout() {
        Attempt::Transient(format!("request timed out: {error}"))
    } else if error.is_redirect() {
        Attempt::Transient(format!("too many redirects: {error}"))
    } else if error.is_connect() || error.is_request() || error.is_body() {
        Attempt::Transient(format!("connection failed: {error}"))
    } else {
        Attempt::Fatal(format!("request failed: {error}"))
    }
}
