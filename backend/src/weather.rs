use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{truncate_body, ProviderError};
use crate::models::{Coordinate, WeatherCoverage, WeatherReport};

pub const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const WEATHER_TIMEOUT: Duration = Duration::from_secs(5);
const UNKNOWN_PLACE: &str = "Local desconhecido";

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherReport, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(WEATHER_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key,
            base_url,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherReport, ProviderError> {
        let lat = at.lat.to_string();
        let lon = at.lon.to_string();

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", "pt_br"),
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

        parse_current_weather(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    cod: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

pub fn parse_current_weather(body: &str) -> Result<WeatherReport, ProviderError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)?;

    // `cod` is a number on success but a string on most errors.
    let ok = match &parsed.cod {
        Some(Value::Number(n)) => n.as_i64() == Some(200),
        Some(Value::String(s)) => s == "200",
        _ => false,
    };
    if !ok {
        let cod = parsed.cod.map(|c| c.to_string()).unwrap_or_default();
        return Err(ProviderError::Rejected(format!("cod={cod}")));
    }

    let description = parsed
        .weather
        .first()
        .map(|w| capitalize(&w.description))
        .ok_or(ProviderError::MissingField("weather"))?;
    let main = parsed.main.ok_or(ProviderError::MissingField("main.temp"))?;
    let city = parsed
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_PLACE.to_string());

    Ok(WeatherReport {
        city,
        description,
        temperature: main.temp,
    })
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Query each waypoint in order, one call at a time.
///
/// Failed lookups are left out of the report list; the returned coverage
/// tells how many waypoints were asked versus answered.
pub async fn collect_route_weather(
    provider: &dyn WeatherProvider,
    waypoints: &[Coordinate],
) -> (Vec<WeatherReport>, WeatherCoverage) {
    let mut reports = Vec::with_capacity(waypoints.len());

    for waypoint in waypoints {
        match provider.current_weather(*waypoint).await {
            Ok(report) => reports.push(report),
            Err(err) => tracing::debug!(
                "no weather for ({:.5}, {:.5}): {err}",
                waypoint.lat,
                waypoint.lon
            ),
        }
    }

    let coverage = WeatherCoverage {
        requested: waypoints.len(),
        answered: reports.len(),
    };
    if coverage.missing() > 0 {
        tracing::info!(
            "weather lookups answered {}/{}",
            coverage.answered,
            coverage.requested
        );
    }
    (reports, coverage)
}
