pub mod models;
mod normalize;

pub use models::{GeneratedRecord, IntelligenceReport, RawProperty, SearchResultRecord};
pub use normalize::{is_absolute_http_url, usable_images, Normalizer};
