use crate::error::{PipelineError, Result};
use crate::geocoding::place_index::GeocodeIndex;
use crate::models::{Coordinate, LocationInfo};

/// Resolves coordinates to places with a single bulk index lookup.
pub struct LocationResolver<G> {
    index: G,
}

impl<G: GeocodeIndex> LocationResolver<G> {
    pub fn new(index: G) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &G {
        &self.index
    }

    /// Same length and order as `coordinates`. Any malformed coordinate
    /// fails the whole batch before the index is queried.
    pub fn resolve(&self, coordinates: &[Coordinate]) -> Result<Vec<LocationInfo>> {
        if coordinates.is_empty() {
            return Ok(Vec::new());
        }

        for coordinate in coordinates {
            coordinate.check()?;
        }

        let locations = self.index.search(coordinates)?;
        if locations.len() != coordinates.len() {
            return Err(PipelineError::GeocodeLookup(format!(
                "index returned {} locations for {} coordinates",
                locations.len(),
                coordinates.len()
            )));
        }

        Ok(locations)
    }
}
