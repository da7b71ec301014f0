//! The "plan a trip" pipeline.
//!
//! One request runs strictly in sequence: directions, polyline decoding,
//! waypoint sampling, one weather call per waypoint, cost estimate, text
//! generation and finally the optional history insert.

use std::sync::Arc;

use crate::cost::{estimate_costs, leg_distance_km, CostConfig};
use crate::database::{HistoryStore, NewHistoryRecord};
use crate::directions::DirectionsProvider;
use crate::error::PlanError;
use crate::models::{
    CostEstimate, PlanTripRequest, PlanTripResponse, VehicleType, WeatherCoverage, WeatherReport,
};
use crate::narrative::{build_summary, narrate, TextGenerator};
use crate::routing::{
    extract_leg_coordinates, extract_route_coordinates, select_waypoints, DEFAULT_MAX_WAYPOINTS,
};
use crate::weather::{collect_route_weather, WeatherProvider};

#[derive(Debug, Clone, Copy)]
pub struct PlannerSettings {
    pub max_waypoints: usize,
    pub costs: CostConfig,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_waypoints: DEFAULT_MAX_WAYPOINTS,
            costs: CostConfig::default(),
        }
    }
}

/// Validated trip request.
#[derive(Debug, Clone)]
pub struct TripQuery {
    pub origin: String,
    pub destination: String,
    pub vehicle: VehicleType,
}

impl TryFrom<&PlanTripRequest> for TripQuery {
    type Error = PlanError;

    fn try_from(req: &PlanTripRequest) -> Result<Self, Self::Error> {
        let non_blank = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        match (non_blank(&req.origem), non_blank(&req.destino)) {
            (Some(origin), Some(destination)) => Ok(Self {
                origin,
                destination,
                vehicle: VehicleType::from_name(req.veiculo.as_deref()),
            }),
            _ => Err(PlanError::MissingLocations),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TripPlan {
    pub query: TripQuery,
    pub overview_polyline: String,
    pub distance_km: f64,
    pub narrative: String,
    pub costs: CostEstimate,
    pub weather: Vec<WeatherReport>,
    pub coverage: WeatherCoverage,
}

impl From<TripPlan> for PlanTripResponse {
    fn from(plan: TripPlan) -> Self {
        PlanTripResponse {
            polyline: plan.overview_polyline,
            summary: plan.narrative,
            origin: plan.query.origin,
            destination: plan.query.destination,
            veiculo: plan.query.vehicle.to_string(),
            costs: plan.costs,
            weather: plan.weather,
            weather_coverage: plan.coverage,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TripPlanner {
    directions: Arc<dyn DirectionsProvider>,
    weather: Arc<dyn WeatherProvider>,
    narrator: Arc<dyn TextGenerator>,
    settings: PlannerSettings,
}

impl TripPlanner {
    pub fn new(
        directions: Arc<dyn DirectionsProvider>,
        weather: Arc<dyn WeatherProvider>,
        narrator: Arc<dyn TextGenerator>,
        settings: PlannerSettings,
    ) -> Self {
        Self {
            directions,
            weather,
            narrator,
            settings,
        }
    }

    pub async fn plan(&self, query: TripQuery) -> Result<TripPlan, PlanError> {
        tracing::info!(
            "Planning trip {:?} -> {:?} ({})",
            query.origin,
            query.destination,
            query.vehicle
        );

        let route = self
            .directions
            .fetch_route(&query.origin, &query.destination)
            .await
            .map_err(|err| {
                tracing::warn!("No route for {:?} -> {:?}: {err}", query.origin, query.destination);
                PlanError::RouteUnavailable
            })?;
        let leg = route.first_leg().ok_or_else(|| {
            tracing::warn!("Route for {:?} has no legs", query.origin);
            PlanError::RouteUnavailable
        })?;

        let coordinates = extract_route_coordinates(&route);
        let waypoints = select_waypoints(&coordinates, self.settings.max_waypoints);
        tracing::debug!(
            "Decoded {} points, sampled {} waypoints",
            coordinates.len(),
            waypoints.len()
        );

        let (weather, coverage) = collect_route_weather(self.weather.as_ref(), &waypoints).await;

        // text and meters describe the first leg only, so the path fallback does too
        let distance_km = leg_distance_km(leg, &extract_leg_coordinates(leg));
        let costs = estimate_costs(distance_km, query.vehicle, &weather, &self.settings.costs);

        let summary = build_summary(leg, &weather, coverage, Some(&costs));
        let narrative = narrate(self.narrator.as_ref(), &summary).await;

        tracing::info!(
            "Trip planned: {distance_km:.1} km, {} weather reports, total R$ {:.2}",
            weather.len(),
            costs.total
        );

        Ok(TripPlan {
            query,
            overview_polyline: route.overview_polyline.points.clone(),
            distance_km,
            narrative,
            costs,
            weather,
            coverage,
        })
    }

    /// Plan, then append the request to `history` when a store is available.
    pub async fn plan_and_record(
        &self,
        query: TripQuery,
        history: Option<&dyn HistoryStore>,
    ) -> Result<TripPlan, PlanError> {
        let plan = self.plan(query).await?;

        if let Some(store) = history {
            store
                .record(NewHistoryRecord {
                    origin: plan.query.origin.clone(),
                    destination: plan.query.destination.clone(),
                    vehicle: plan.query.vehicle.to_string(),
                })
                .await
                .map_err(|err| {
                    tracing::error!("Failed to record trip history: {err}");
                    PlanError::History(err)
                })?;
        }

        Ok(plan)
    }
}
