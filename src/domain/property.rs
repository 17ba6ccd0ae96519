// src/domain/property.rs

use serde::Serialize;
use std::fmt;

/// Shown wherever a listing has no usable photo. Never stored in `Property::images`.
pub const PLACEHOLDER_IMAGE: &str = "/static/img/listing-placeholder.svg";

const MILES_PER_DEGREE_LAT: f64 = 69.0;

/// A validated latitude/longitude pair.
///
/// Fields are private so a pair can only exist when both halves are in
/// range; a property therefore has either full coordinates or none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }

    /// For constants already known to be in range.
    pub(crate) const fn new_unchecked(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates a pair of optional halves; a partial pair is rejected.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Self::new(lat, lng),
            _ => None,
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Moves the point by the given distances in miles, clamped to valid ranges.
    pub fn offset_miles(&self, north_miles: f64, east_miles: f64) -> Self {
        let lat = (self.lat + north_miles / MILES_PER_DEGREE_LAT).clamp(-90.0, 90.0);
        let miles_per_degree_lng = MILES_PER_DEGREE_LAT * self.lat.to_radians().cos().max(0.01);
        let mut lng = self.lng + east_miles / miles_per_degree_lng;
        if lng > 180.0 {
            lng -= 360.0;
        } else if lng < -180.0 {
            lng += 360.0;
        }
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    SingleFamily,
    Condo,
    Townhouse,
    MultiFamily,
    Land,
    Commercial,
    Other(String),
}

impl PropertyType {
    /// Maps the many spellings sources use ("single_family", "Single-Family Home", "SFR").
    pub fn from_raw(raw: &str) -> Self {
        let key = normalize_label(raw);
        match key.as_str() {
            "" => PropertyType::Other(String::new()),
            "sfr" | "single family" | "single family home" | "single family residence" | "house" => {
                PropertyType::SingleFamily
            }
            "condo" | "condos" | "condominium" | "apartment" => PropertyType::Condo,
            "townhouse" | "townhome" | "townhomes" => PropertyType::Townhouse,
            "multi family" | "multifamily" | "duplex" | "triplex" | "fourplex" => {
                PropertyType::MultiFamily
            }
            "land" | "lot" | "lots land" | "vacant land" => PropertyType::Land,
            "commercial" | "retail" | "office" => PropertyType::Commercial,
            _ => PropertyType::Other(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PropertyType::SingleFamily => "Single Family",
            PropertyType::Condo => "Condo",
            PropertyType::Townhouse => "Townhouse",
            PropertyType::MultiFamily => "Multi Family",
            PropertyType::Land => "Land",
            PropertyType::Commercial => "Commercial",
            PropertyType::Other(raw) => raw,
        }
    }

    /// Case-insensitive substring match against the display label.
    pub fn matches(&self, needle: &str) -> bool {
        normalize_label(self.label()).contains(&normalize_label(needle))
    }
}

impl Serialize for PropertyType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl Default for PropertyType {
    fn default() -> Self {
        PropertyType::Other(String::new())
    }
}

/// Lowercases and folds `_`/`-` separators so "single_family" matches "Single Family".
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derived financial figures shown on the detail page's financial tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentMetrics {
    pub cap_rate: Option<f64>,
    #[serde(rename = "expectedROI")]
    pub expected_roi: Option<f64>,
    pub monthly_rent: Option<f64>,
    pub cash_flow: Option<f64>,
}

impl InvestmentMetrics {
    pub fn is_empty(&self) -> bool {
        self.cap_rate.is_none()
            && self.expected_roi.is_none()
            && self.monthly_rent.is_none()
            && self.cash_flow.is_none()
    }
}

/// The canonical listing shape every source is normalised into.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub price: Option<i64>,
    pub beds: Option<u32>,
    pub baths: Option<f32>,
    pub sqft: Option<u32>,
    pub images: Vec<String>,
    pub property_type: PropertyType,
    pub metrics: InvestmentMetrics,
    /// Generated by the demo data provider rather than a real source.
    pub is_demo: bool,
}

impl Property {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: None,
            coordinates: None,
            price: None,
            beds: None,
            baths: None,
            sqft: None,
            images: Vec::new(),
            property_type: PropertyType::default(),
            metrics: InvestmentMetrics::default(),
            is_demo: false,
        }
    }

    /// Only located properties get a map marker; the rest stay list-only.
    pub fn is_mappable(&self) -> bool {
        self.coordinates.is_some()
    }

    pub fn price_label(&self) -> String {
        match self.price {
            Some(price) => format!("${}", group_thousands(price)),
            None => "N/A".to_string(),
        }
    }

    pub fn address_label(&self) -> &str {
        self.address.as_deref().unwrap_or("Address unavailable")
    }

    pub fn primary_image(&self) -> &str {
        self.images
            .first()
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER_IMAGE)
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}
