use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinate {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Rejects NaN/infinite values as well as out-of-range degrees.
    pub fn check(&self) -> Result<()> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(PipelineError::GeocodeLookup(format!(
                "Non-finite coordinate ({}, {})",
                self.latitude, self.longitude
            )));
        }

        self.validate().map_err(|e| {
            PipelineError::GeocodeLookup(format!(
                "Coordinate ({}, {}) out of range: {}",
                self.latitude, self.longitude, e
            ))
        })
    }

    /// Position on the unit sphere (x, y, z).
    pub fn to_unit_vector(&self) -> [f64; 3] {
        let lat = self.latitude.to_radians();
        let lon = self.longitude.to_radians();
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    }
}

/// Human-readable place resolved for a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    /// ISO country code
    pub country: String,
    /// First-level administrative division
    pub region: String,
    pub city: String,
}

impl LocationInfo {
    pub fn new(country: impl Into<String>, region: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            region: region.into(),
            city: city.into(),
        }
    }
}

/// Populated place known to the geocoding index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    pub name: String,
    pub admin1: String,
    #[serde(default)]
    pub admin2: String,
    #[serde(rename = "cc")]
    pub country_code: String,
}

impl Place {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn location_info(&self) -> LocationInfo {
        LocationInfo::new(&self.country_code, &self.admin1, &self.name)
    }
}
