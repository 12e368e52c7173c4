use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::models::Place;

/// Reads the populated-places table backing the geocoder.
///
/// Expected header: `lat,lon,name,admin1,admin2,cc`.
pub struct PlaceReader;

impl PlaceReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_file(&self, path: &Path) -> Result<Vec<Place>> {
        let file = File::open(path).map_err(|e| {
            PipelineError::GeocodeLookup(format!(
                "Cannot open place index '{}': {}",
                path.display(),
                e
            ))
        })?;
        self.read_from(BufReader::new(file))
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<Place>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut places = Vec::new();
        for result in csv_reader.deserialize::<Place>() {
            let place = result?;
            place.coordinate().check()?;
            places.push(place);
        }

        Ok(places)
    }
}

impl Default for PlaceReader {
    fn default() -> Self {
        Self::new()
    }
}
