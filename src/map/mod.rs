pub mod amenities;
pub mod provider;
pub mod search_tool;
pub mod viewport;

pub use amenities::{AmenityCoordinator, GooglePlaces, PlacesLookup};
pub use provider::{MapEvent, MapEventBus, MapProvider, RawGeometry, Subscription, UnavailableMap};
pub use search_tool::{DrawingModeState, SearchAreaTool};
pub use viewport::{ViewportController, ViewportState};
