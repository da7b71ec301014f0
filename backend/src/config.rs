use std::{net::SocketAddr, sync::Arc};

use clap::{Args, Parser};

use crate::cost::CostConfig;
use crate::directions::{GoogleDirections, GOOGLE_DIRECTIONS_URL};
use crate::error::ProviderError;
use crate::narrative::{ChatCompletionsClient, DEFAULT_MODEL, GROQ_COMPLETIONS_URL};
use crate::planner::{PlannerSettings, TripPlanner};
use crate::routing::DEFAULT_MAX_WAYPOINTS;
use crate::weather::{OpenWeatherProvider, OPENWEATHER_URL};

/// Upstream services and planning knobs shared by every binary.
#[derive(Debug, Clone, Args)]
pub struct PlannerArgs {
    /// Google Directions API key
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", default_value = "", hide_env_values = true)]
    pub google_maps_api_key: String,

    /// OpenWeather API key
    #[arg(long, env = "OPENWEATHER_API_KEY", default_value = "", hide_env_values = true)]
    pub openweather_api_key: String,

    /// Bearer token for the chat completions service
    #[arg(long, env = "GROQ_API_KEY", default_value = "", hide_env_values = true)]
    pub groq_api_key: String,

    #[arg(long, env = "DIRECTIONS_URL", default_value = GOOGLE_DIRECTIONS_URL)]
    pub directions_url: String,

    #[arg(long, env = "WEATHER_URL", default_value = OPENWEATHER_URL)]
    pub weather_url: String,

    #[arg(long, env = "COMPLETIONS_URL", default_value = GROQ_COMPLETIONS_URL)]
    pub completions_url: String,

    #[arg(long, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    pub llm_model: String,

    /// Language for addresses and distance text returned by the directions provider
    #[arg(long, env = "ROUTE_LANGUAGE", default_value = "pt-BR")]
    pub language: String,

    /// Upper bound on weather lookups per trip
    #[arg(long, env = "MAX_WAYPOINTS", default_value_t = DEFAULT_MAX_WAYPOINTS)]
    pub max_waypoints: usize,

    /// Fuel price per liter
    #[arg(long, env = "FUEL_PRICE", default_value_t = 6.00)]
    pub fuel_price: f64,

    #[arg(long, env = "WATER_PER_STOP", default_value_t = 5.00)]
    pub water_per_stop: f64,

    #[arg(long, env = "FOOD_PER_STOP", default_value_t = 35.00)]
    pub food_per_stop: f64,
}

impl PlannerArgs {
    pub fn settings(&self) -> PlannerSettings {
        PlannerSettings {
            max_waypoints: self.max_waypoints.max(1),
            costs: CostConfig {
                fuel_price_per_liter: self.fuel_price,
                water_per_stop: self.water_per_stop,
                food_per_stop: self.food_per_stop,
            },
        }
    }

    pub fn warn_missing_keys(&self) {
        for (name, key) in [
            ("GOOGLE_MAPS_API_KEY", &self.google_maps_api_key),
            ("OPENWEATHER_API_KEY", &self.openweather_api_key),
            ("GROQ_API_KEY", &self.groq_api_key),
        ] {
            if key.trim().is_empty() {
                tracing::warn!("{name} is not set; calls to that service will fail");
            }
        }
    }

    pub fn build_planner(&self) -> Result<TripPlanner, ProviderError> {
        let directions = GoogleDirections::new(
            self.google_maps_api_key.clone(),
            self.directions_url.clone(),
            self.language.clone(),
        )?;
        let weather =
            OpenWeatherProvider::new(self.openweather_api_key.clone(), self.weather_url.clone())?;
        let narrator = ChatCompletionsClient::new(
            self.groq_api_key.clone(),
            self.completions_url.clone(),
            self.llm_model.clone(),
        )?;

        Ok(TripPlanner::new(
            Arc::new(directions),
            Arc::new(weather),
            Arc::new(narrator),
            self.settings(),
        ))
    }
}

#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Trip planning backend: route, weather, costs and a travel guide"
)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// PostgreSQL URL for the trip history; without it the server runs stateless
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum number of rows returned by the history listing
    #[arg(long, env = "HISTORY_LIMIT", default_value_t = 100)]
    pub history_limit: i64,

    #[command(flatten)]
    pub planner: PlannerArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};

    /// Parse flags alone, ignoring whatever the test process has exported.
    fn parse_flags(args: &[&str]) -> ServerConfig {
        let cmd = ServerConfig::command().mut_args(|arg| arg.env(None::<&'static str>));
        let matches = cmd
            .try_get_matches_from(std::iter::once("trip_backend").chain(args.iter().copied()))
            .unwrap();
        ServerConfig::from_arg_matches(&matches).unwrap()
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = parse_flags(&[]);
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.history_limit, 100);
        assert_eq!(cfg.planner.max_waypoints, 15);
        assert_eq!(cfg.planner.llm_model, DEFAULT_MODEL);

        let settings = cfg.planner.settings();
        assert_eq!(settings.costs, CostConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = parse_flags(&[
            "--bind",
            "127.0.0.1:3000",
            "--max-waypoints",
            "0",
            "--fuel-price",
            "5.5",
            "--database-url",
            "postgres://localhost/trips",
        ]);
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/trips"));
        let settings = cfg.planner.settings();
        assert_eq!(settings.max_waypoints, 1);
        assert_eq!(settings.costs.fuel_price_per_liter, 5.5);
    }

    #[test]
    fn planner_builds_without_keys() {
        let cfg = parse_flags(&[]);
        assert!(cfg.planner.build_planner().is_ok());
    }

    #[test]
    fn env_is_ignored_by_flag_parser() {
        assert!(ServerConfig::command()
            .get_arguments()
            .any(|arg| arg.get_env().is_some()));
        let cmd = ServerConfig::command().mut_args(|arg| arg.env(None::<&'static str>));
        assert!(cmd.get_arguments().all(|arg| arg.get_env().is_none()));
    }
}
