use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub use shared::{
    ApiError, Coordinate, CostEstimate, HistoryEntry, PlanTripRequest, PlanTripResponse,
    WeatherCoverage, WeatherReport,
};

/// A route as returned by the directions provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub legs: Vec<Leg>,
    #[serde(default)]
    pub overview_polyline: EncodedPolyline,
}

impl Route {
    pub fn first_leg(&self) -> Option<&Leg> {
        self.legs.first()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
    #[serde(default)]
    pub distance: TextValue,
    #[serde(default)]
    pub duration: TextValue,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub polyline: EncodedPolyline,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncodedPolyline {
    #[serde(default)]
    pub points: String,
}

/// Localized text plus the raw number behind it (meters or seconds).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextValue {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Car,
    Motorcycle,
    Truck,
}

impl VehicleType {
    /// Lenient parse: unknown or missing names fall back to [`VehicleType::Car`].
    pub fn from_name(name: Option<&str>) -> Self {
        name.and_then(|n| n.parse().ok()).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "carro",
            VehicleType::Motorcycle => "moto",
            VehicleType::Truck => "caminhao",
        }
    }

    /// Liters of fuel burned per kilometer.
    pub fn liters_per_km(&self) -> f64 {
        match self {
            VehicleType::Car => 0.083,
            VehicleType::Motorcycle => 0.033,
            VehicleType::Truck => 0.25,
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown vehicle type '{0}'")]
pub struct UnknownVehicle(pub String);

impl FromStr for VehicleType {
    type Err = UnknownVehicle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "carro" | "car" | "automovel" | "automóvel" => Ok(VehicleType::Car),
            "moto" | "motocicleta" | "motorcycle" | "motorbike" => Ok(VehicleType::Motorcycle),
            "caminhao" | "caminhão" | "truck" => Ok(VehicleType::Truck),
            _ => Err(UnknownVehicle(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_portuguese_and_english_names() {
        assert_eq!("Moto".parse::<VehicleType>().unwrap(), VehicleType::Motorcycle);
        assert_eq!("truck".parse::<VehicleType>().unwrap(), VehicleType::Truck);
        assert_eq!(" Caminhão ".parse::<VehicleType>().unwrap(), VehicleType::Truck);
        assert_eq!("CARRO".parse::<VehicleType>().unwrap(), VehicleType::Car);
    }

    #[test]
    fn unknown_vehicle_falls_back_to_car() {
        assert!("bicicleta".parse::<VehicleType>().is_err());
        assert_eq!(VehicleType::from_name(Some("bicicleta")), VehicleType::Car);
        assert_eq!(VehicleType::from_name(None), VehicleType::Car);
        assert_eq!(
            VehicleType::from_name(Some("bicicleta")).liters_per_km(),
            VehicleType::Car.liters_per_km()
        );
    }

    #[test]
    fn route_deserializes_with_missing_fields() {
        let route: Route = serde_json::from_str(r#"{"legs":[{"steps":[{}]}]}"#).unwrap();
        let leg = route.first_leg().unwrap();
        assert_eq!(leg.steps.len(), 1);
        assert!(leg.steps[0].polyline.points.is_empty());
        assert_eq!(leg.distance.value, None);
        assert!(route.overview_polyline.points.is_empty());
    }
}
