use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const GEOFENCE_KEY: &str = "geofence";
pub const CHECKIN_HOURS_KEY: &str = "checkin_hours";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Circular area workers must be inside to check in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFence {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
}

impl GeoFence {
    pub fn new(latitude: f64, longitude: f64, radius_m: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("Coordinates out of range: {}, {}", latitude, longitude));
        }
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err("Radius must be a positive number of metres".to_string());
        }
        Ok(Self {
            latitude,
            longitude,
            radius_m,
        })
    }
}

impl fmt::Display for GeoFence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.latitude, self.longitude, self.radius_m)
    }
}

impl FromStr for GeoFence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| format!("Invalid geofence: {}", s))?;

        match parts.as_slice() {
            [lat, lon, radius] => GeoFence::new(*lat, *lon, *radius),
            _ => Err(format!("Invalid geofence: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geofence_text_form_round_trips() {
        let fence: GeoFence = "41.3111, 69.2797, 150".parse().unwrap();
        assert_eq!(fence.radius_m, 150.0);
        assert_eq!(fence.to_string().parse::<GeoFence>().unwrap(), fence);
    }

    #[test]
    fn geofence_rejects_bad_input() {
        assert!("41.3,69.2".parse::<GeoFence>().is_err());
        assert!("95,69.2,100".parse::<GeoFence>().is_err());
        assert!("41.3,69.2,0".parse::<GeoFence>().is_err());
    }
}
