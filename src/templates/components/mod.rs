pub mod card;
pub mod detail;
pub mod error;
pub mod map;

pub use card::property_card;
pub use detail::property_detail;
pub use error::html_error_response;
pub use map::{amenity_controls, filter_form, map_panel};
