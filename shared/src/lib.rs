use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Body of `POST /plan_viagem`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanTripRequest {
    #[serde(default)]
    pub origem: Option<String>,
    #[serde(default)]
    pub destino: Option<String>,
    #[serde(default)]
    pub veiculo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub description: String,
    pub temperature: f64,
}

/// How many sampled waypoints answered the weather lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherCoverage {
    pub requested: usize,
    pub answered: usize,
}

impl WeatherCoverage {
    pub fn missing(&self) -> usize {
        self.requested.saturating_sub(self.answered)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub fuel: f64,
    pub water: f64,
    pub food: f64,
    pub total: f64,
    pub stops: u32,
    pub heat_surcharge_applied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTripResponse {
    pub polyline: String,
    pub summary: String,
    pub origin: String,
    pub destination: String,
    pub veiculo: String,
    pub costs: CostEstimate,
    #[serde(default)]
    pub weather: Vec<WeatherReport>,
    #[serde(default)]
    pub weather_coverage: WeatherCoverage,
}

/// One row of `GET /historico`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i32,
    pub origem: String,
    pub destino: String,
    pub veiculo: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}
