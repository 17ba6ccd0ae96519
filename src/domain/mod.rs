pub mod amenity;
pub mod property;
pub mod search_area;

pub use amenity::{AmenityCategory, AmenityFilterState};
pub use property::{Coordinates, InvestmentMetrics, Property, PropertyType};
pub use search_area::{Bounds, DrawingTool, SearchArea, SearchQuery};
