// src/map/amenities.rs

use crate::config::AppConfig;
use crate::domain::search_area::METERS_PER_MILE;
use crate::domain::{AmenityCategory, AmenityFilterState, Coordinates, Property};
use crate::errors::{MapError, MapResult};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Nearby-amenity lookups always cover one mile around the property.
pub const AMENITY_RADIUS_METERS: f64 = METERS_PER_MILE;

const GOOGLE_NEARBY_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

/// Counts points of interest of one category around a point.
///
/// Lookups for different categories run concurrently, hence `Sync`.
pub trait PlacesLookup: Send + Sync {
    fn count_nearby(
        &self,
        center: Coordinates,
        category: AmenityCategory,
        radius_meters: f64,
    ) -> MapResult<u32>;
}

/// A batch of lookups issued for one property selection.
#[derive(Debug, Clone, PartialEq)]
pub struct AmenityRequest {
    pub generation: u64,
    pub property_id: String,
    pub center: Coordinates,
    pub categories: Vec<AmenityCategory>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmenityResult {
    pub generation: u64,
    pub property_id: String,
    pub counts: BTreeMap<AmenityCategory, u32>,
}

/// Owns the amenity toggles and counts for the selected property.
///
/// Each selection bumps a generation number; results carrying an older
/// generation are dropped so a slow lookup for a previous selection can
/// never overwrite the current counts.
#[derive(Debug, Clone, Default)]
pub struct AmenityCoordinator {
    state: AmenityFilterState,
    loading: bool,
    generation: u64,
}

impl AmenityCoordinator {
    pub fn new(state: AmenityFilterState) -> Self {
        Self {
            state,
            loading: false,
            generation: 0,
        }
    }

    pub fn state(&self) -> &AmenityFilterState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn toggle_type(&mut self, category: AmenityCategory) -> bool {
        self.state.toggle(category)
    }

    pub fn toggle_all(&mut self, enabled: bool) {
        self.state.set_all(enabled);
    }

    /// Starts a new selection: counts reset, loading raised.
    ///
    /// Returns `None` when there is nothing to look up (no coordinates or no
    /// enabled category); loading is left lowered in that case.
    pub fn begin(&mut self, property: &Property) -> Option<AmenityRequest> {
        self.generation += 1;
        self.state.reset_counts();

        let Some(center) = property.coordinates else {
            tracing::debug!("Property {} has no coordinates; skipping amenities", property.id);
            self.loading = false;
            return None;
        };

        let categories = self.state.enabled();
        if categories.is_empty() {
            self.loading = false;
            return None;
        }

        self.loading = true;
        Some(AmenityRequest {
            generation: self.generation,
            property_id: property.id.clone(),
            center,
            categories,
        })
    }

    /// Runs every category lookup on its own thread and merges the
    /// per-category results. A failed lookup counts as zero.
    pub fn run(request: &AmenityRequest, places: &dyn PlacesLookup) -> AmenityResult {
        let counts = std::thread::scope(|scope| {
            let handles: Vec<_> = request
                .categories
                .iter()
                .map(|&category| {
                    let center = request.center;
                    let handle = scope.spawn(move || {
                        places.count_nearby(center, category, AMENITY_RADIUS_METERS)
                    });
                    (category, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(category, handle)| {
                    let count = match handle.join() {
                        Ok(Ok(count)) => count,
                        Ok(Err(e)) => {
                            tracing::warn!("Amenity lookup for {category} failed: {e}");
                            0
                        }
                        Err(_) => {
                            tracing::warn!("Amenity lookup for {category} panicked");
                            0
                        }
                    };
                    (category, count)
                })
                .collect::<BTreeMap<_, _>>()
        });

        AmenityResult {
            generation: request.generation,
            property_id: request.property_id.clone(),
            counts,
        }
    }

    /// Installs a finished batch. Returns false (and changes nothing) when
    /// the batch belongs to a superseded selection.
    pub fn apply(&mut self, result: AmenityResult) -> bool {
        if result.generation != self.generation {
            tracing::debug!(
                "Discarding stale amenity counts for {} (generation {} != {})",
                result.property_id,
                result.generation,
                self.generation
            );
            return false;
        }
        self.state.replace_counts(result.counts);
        self.loading = false;
        true
    }

    /// Selection cleared: counts reset and any batch in flight becomes stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state.reset_counts();
        self.loading = false;
    }

    /// begin + run + apply for callers that do not need to interleave.
    pub fn refresh(&mut self, property: &Property, places: &dyn PlacesLookup) {
        if let Some(request) = self.begin(property) {
            let result = Self::run(&request, places);
            self.apply(result);
        }
    }
}

/// Places Nearby Search; one request per place type in the category.
pub struct GooglePlaces {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<serde_json::Value>,
    error_message: Option<String>,
}

impl GooglePlaces {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: GOOGLE_NEARBY_URL.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> MapResult<Self> {
        let key = config.map_key()?.to_string();
        Ok(Self::new(config.http_client()?, key))
    }

    fn count_type(&self, center: Coordinates, place_type: &str, radius_meters: f64) -> MapResult<u32> {
        let location = format!("{},{}", center.lat(), center.lng());
        let radius = format!("{}", radius_meters.round() as u64);

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", place_type),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .map_err(|e| MapError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MapError::Network(format!("Places HTTP {status}")));
        }

        let body: NearbyResponse = resp.json().map_err(|e| MapError::Decode(e.to_string()))?;
        nearby_count(body)
    }
}

fn nearby_count(body: NearbyResponse) -> MapResult<u32> {
    match body.status.as_str() {
        "OK" => Ok(body.results.len() as u32),
        "ZERO_RESULTS" => Ok(0),
        other => Err(MapError::Provider(format!(
            "{other} {}",
            body.error_message.unwrap_or_default()
        ))),
    }
}

impl PlacesLookup for GooglePlaces {
    fn count_nearby(
        &self,
        center: Coordinates,
        category: AmenityCategory,
        radius_meters: f64,
    ) -> MapResult<u32> {
        category
            .place_types()
            .iter()
            .map(|place_type| self.count_type(center, place_type, radius_meters))
            .sum()
    }
}
