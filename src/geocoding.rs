// geocoding.rs
use crate::config::AppConfig;
use crate::domain::Coordinates;
use crate::errors::{MapError, MapResult};
use reqwest::blocking::Client;
use serde::Deserialize;

const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Turns a free-text address into coordinates.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> MapResult<Coordinates>;
}

/// Used when no maps key is configured: every lookup fails, so
/// unlocated listings simply stay off the map.
pub struct DisabledGeocoder;

impl Geocoder for DisabledGeocoder {
    fn geocode(&self, _address: &str) -> MapResult<Coordinates> {
        Err(MapError::Config("geocoding disabled: no maps key".into()))
    }
}

pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GoogleGeocoder {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: GOOGLE_GEOCODE_URL.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> MapResult<Self> {
        let key = config.map_key()?.to_string();
        Ok(Self::new(config.http_client()?, key))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Geocoder for GoogleGeocoder {
    fn geocode(&self, address: &str) -> MapResult<Coordinates> {
        let address = address.trim();
        if address.is_empty() {
            return Err(MapError::InvalidInput("empty address".into()));
        }

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .map_err(|e| MapError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_else(|_| "(no body)".to_string());
            return Err(MapError::Network(format!("Geocode HTTP {status}: {text}")));
        }

        let body: GeocodeResponse = resp.json().map_err(|e| MapError::Decode(e.to_string()))?;
        first_location(body)
    }
}

fn first_location(body: GeocodeResponse) -> MapResult<Coordinates> {
    if body.status != "OK" {
        let detail = body.error_message.unwrap_or_default();
        return Err(MapError::Provider(format!("{} {detail}", body.status).trim().to_string()));
    }

    let location = body
        .results
        .into_iter()
        .next()
        .map(|r| r.geometry.location)
        .ok_or_else(|| MapError::Provider("geocoder returned no results".into()))?;

    Coordinates::new(location.lat, location.lng).ok_or_else(|| {
        MapError::Decode(format!(
            "geocoder returned invalid coordinates {},{}",
            location.lat, location.lng
        ))
    })
}
