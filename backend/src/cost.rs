use crate::models::{Coordinate, CostEstimate, Leg, VehicleType, WeatherReport};
use crate::routing::approximate_distance_km;

pub const HOT_THRESHOLD_C: f64 = 30.0;
const HEAT_SURCHARGE: f64 = 0.10;
const KM_PER_STOP: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostConfig {
    pub fuel_price_per_liter: f64,
    pub water_per_stop: f64,
    pub food_per_stop: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            fuel_price_per_liter: 6.00,
            water_per_stop: 5.00,
            food_per_stop: 35.00,
        }
    }
}

/// Fuel, water and food estimate for one trip.
///
/// Fuel is `distance × liters/km × price`, raised by 10% when any sampled
/// report is at or above [`HOT_THRESHOLD_C`]. Stops are one per full 100 km,
/// with a minimum of one, and do not depend on how many weather reports came
/// back.
pub fn estimate_costs(
    distance_km: f64,
    vehicle: VehicleType,
    reports: &[WeatherReport],
    config: &CostConfig,
) -> CostEstimate {
    let distance_km = if distance_km.is_finite() {
        distance_km.max(0.0)
    } else {
        0.0
    };

    let hot = is_hot(reports);
    let mut fuel = distance_km * vehicle.liters_per_km() * config.fuel_price_per_liter;
    if hot {
        fuel *= 1.0 + HEAT_SURCHARGE;
    }

    let stops = stop_count(distance_km);
    let water = f64::from(stops) * config.water_per_stop;
    let food = f64::from(stops) * config.food_per_stop;

    let fuel = round2(fuel);
    let water = round2(water);
    let food = round2(food);

    CostEstimate {
        fuel,
        water,
        food,
        total: round2(fuel + water + food),
        stops,
        heat_surcharge_applied: hot,
    }
}

pub fn is_hot(reports: &[WeatherReport]) -> bool {
    reports.iter().any(|r| r.temperature >= HOT_THRESHOLD_C)
}

pub fn stop_count(distance_km: f64) -> u32 {
    ((distance_km / KM_PER_STOP).floor() as u32).max(1)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse a localized distance such as `"1.234,5 km"` or `"850 m"` into km.
///
/// `.` is a thousands separator and `,` the decimal separator.
pub fn parse_distance_km(text: &str) -> Option<f64> {
    let normalized = text.trim().to_lowercase();
    let (number, divisor) = if let Some(n) = normalized.strip_suffix("km") {
        (n, 1.0)
    } else if let Some(n) = normalized.strip_suffix('m') {
        (n, 1000.0)
    } else {
        return None;
    };

    let number: String = number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let value: f64 = number.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value / divisor)
}

/// Distance of a leg in km: localized text first, then the numeric meters
/// field, then the length of the decoded path.
pub fn leg_distance_km(leg: &Leg, path: &[Coordinate]) -> f64 {
    if let Some(km) = parse_distance_km(&leg.distance.text) {
        return km;
    }
    if let Some(meters) = leg.distance.value.filter(|m| m.is_finite() && *m >= 0.0) {
        tracing::debug!(
            "distance text {:?} not parseable, using {meters} m",
            leg.distance.text
        );
        return meters / 1000.0;
    }
    tracing::warn!(
        "leg has no usable distance, measuring {} decoded points",
        path.len()
    );
    approximate_distance_km(path)
}
