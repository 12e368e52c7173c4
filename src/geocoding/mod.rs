pub mod place_index;
pub mod resolver;

pub use place_index::{GeocodeIndex, LazyPlaceIndex, PlaceIndex};
pub use resolver::LocationResolver;
