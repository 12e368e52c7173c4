use rstar::primitives::GeomWithData;
use rstar::RTree;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::models::{Coordinate, LocationInfo, Place};
use crate::readers::PlaceReader;

/// Bulk nearest-place lookup.
pub trait GeocodeIndex {
    /// One result per coordinate, in input order.
    fn search(&self, coordinates: &[Coordinate]) -> Result<Vec<LocationInfo>>;
}

/// Point on the unit sphere tagged with its position in `places`.
type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// Nearest-neighbour index over populated places.
///
/// Places are embedded on the unit sphere, so the closest point in 3D is
/// also the closest place along the earth's surface. No distance limit is
/// applied: every query gets the nearest place however far away it is.
pub struct PlaceIndex {
    tree: RTree<IndexedPoint>,
    places: Vec<Place>,
}

impl PlaceIndex {
    pub fn new(places: Vec<Place>) -> Self {
        let points: Vec<IndexedPoint> = places
            .iter()
            .enumerate()
            .map(|(i, place)| GeomWithData::new(place.coordinate().to_unit_vector(), i))
            .collect();

        Self {
            tree: RTree::bulk_load(points),
            places,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let places = PlaceReader::new().read_file(path)?;
        tracing::info!("Loaded {} places from {}", places.len(), path.display());
        Ok(Self::new(places))
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn nearest(&self, coordinate: &Coordinate) -> Option<&Place> {
        self.tree
            .nearest_neighbor(&coordinate.to_unit_vector())
            .map(|point| &self.places[point.data])
    }
}

impl GeocodeIndex for PlaceIndex {
    fn search(&self, coordinates: &[Coordinate]) -> Result<Vec<LocationInfo>> {
        if self.is_empty() {
            return Err(PipelineError::GeocodeLookup(
                "place index is empty".to_string(),
            ));
        }

        coordinates
            .iter()
            .map(|c| {
                self.nearest(c).map(Place::location_info).ok_or_else(|| {
                    PipelineError::GeocodeLookup(format!(
                        "no place found for ({}, {})",
                        c.latitude, c.longitude
                    ))
                })
            })
            .collect()
    }
}

/// Place index read from disk on the first lookup.
///
/// A run with no parameter rows never performs a lookup, so it never
/// requires the places file.
pub struct LazyPlaceIndex {
    path: PathBuf,
    index: OnceCell<PlaceIndex>,
}

impl LazyPlaceIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            index: OnceCell::new(),
        }
    }

    fn index(&self) -> Result<&PlaceIndex> {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let loaded = PlaceIndex::load(&self.path)?;
        Ok(self.index.get_or_init(|| loaded))
    }
}

impl GeocodeIndex for LazyPlaceIndex {
    fn search(&self, coordinates: &[Coordinate]) -> Result<Vec<LocationInfo>> {
        self.index()?.search(coordinates)
    }
}
