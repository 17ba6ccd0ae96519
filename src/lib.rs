pub mod config;
pub mod demo;
pub mod domain;
pub mod errors;
pub mod explorer;
pub mod geocoding;
pub mod map;
pub mod normalizer;
pub mod research;
pub mod responses;
pub mod router;
pub mod templates;
pub mod view;

#[cfg(test)]
mod tests;
