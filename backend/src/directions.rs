use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{truncate_body, ProviderError};
use crate::models::Route;

pub const GOOGLE_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
const DIRECTIONS_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of driving routes between two free-text places.
///
/// Implementations return the first candidate route. Every failure mode
/// (unknown place, no path, provider unreachable) is an error; callers do not
/// distinguish between them.
#[async_trait]
pub trait DirectionsProvider: Send + Sync + Debug {
    async fn fetch_route(&self, origin: &str, destination: &str) -> Result<Route, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct GoogleDirections {
    http: Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl GoogleDirections {
    pub fn new(
        api_key: String,
        base_url: String,
        language: String,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(DIRECTIONS_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key,
            base_url,
            language,
        })
    }
}

#[async_trait]
impl DirectionsProvider for GoogleDirections {
    async fn fetch_route(&self, origin: &str, destination: &str) -> Result<Route, ProviderError> {
        tracing::debug!("requesting directions {origin:?} -> {destination:?}");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("origin", origin),
                ("destination", destination),
                ("language", self.language.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        parse_directions(&body)
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

/// Accept a body only when `status` is exactly `"OK"` and a route is present.
pub fn parse_directions(body: &str) -> Result<Route, ProviderError> {
    let parsed: DirectionsResponse = serde_json::from_str(body)?;

    if parsed.status != "OK" {
        let reason = match parsed.error_message {
            Some(message) => format!("{}: {message}", parsed.status),
            None => parsed.status,
        };
        return Err(ProviderError::Rejected(reason));
    }

    parsed
        .routes
        .into_iter()
        .next()
        .ok_or(ProviderError::MissingField("routes"))
}
