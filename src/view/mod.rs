pub mod filters;
pub mod state;

pub use filters::{filter_properties, ActiveFilters};
pub use state::{DetailTab, PropertyViewState};
