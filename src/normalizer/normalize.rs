// src/normalizer/normalize.rs

use crate::domain::{Coordinates, InvestmentMetrics, Property, PropertyType};
use crate::geocoding::Geocoder;
use crate::normalizer::models::{
    num, CoordinatePair, GeneratedRecord, IntelligenceReport, RawProperty,
    SearchResultRecord,
};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use url::Url;

/// What an adapter extracts from one source shape before the shared
/// coordinate/image/geocoding rules are applied.
struct Draft {
    property: Property,
    /// Tried in order; the first fully valid pair wins.
    coordinate_candidates: Vec<(Option<f64>, Option<f64>)>,
    /// Tried in order; the first list with a usable URL wins.
    image_candidates: Vec<Vec<String>>,
}

/// Maps raw records to canonical properties, geocoding the ones that
/// arrive without coordinates.
pub struct Normalizer<'a> {
    geocoder: &'a dyn Geocoder,
}

impl<'a> Normalizer<'a> {
    pub fn new(geocoder: &'a dyn Geocoder) -> Self {
        Self { geocoder }
    }

    /// Never fails; missing or malformed fields become `None`.
    pub fn normalize(&self, raw: &RawProperty) -> Property {
        let draft = match raw {
            RawProperty::SearchResult(record) => adapt_search_result(record),
            RawProperty::IntelligenceReport(report) => adapt_report(report),
            RawProperty::Generated(record) => adapt_generated(record),
        };

        let Draft {
            mut property,
            coordinate_candidates,
            image_candidates,
        } = draft;

        property.coordinates = coordinate_candidates
            .into_iter()
            .find_map(|(lat, lng)| Coordinates::from_parts(lat, lng));

        property.images = image_candidates
            .iter()
            .map(|candidate| usable_images(candidate))
            .find(|images| !images.is_empty())
            .unwrap_or_default();

        if property.coordinates.is_none() {
            property.coordinates = self.geocode_fallback(&property);
        }

        property
    }

    /// Normalises a batch, keeping the first record for any repeated id.
    pub fn normalize_all(&self, raws: &[RawProperty]) -> Vec<Property> {
        let mut seen = HashSet::new();
        raws.iter()
            .map(|raw| self.normalize(raw))
            .filter(|property| {
                let fresh = seen.insert(property.id.clone());
                if !fresh {
                    tracing::debug!("Dropping duplicate property id {}", property.id);
                }
                fresh
            })
            .collect()
    }

    fn geocode_fallback(&self, property: &Property) -> Option<Coordinates> {
        let address = property.address.as_deref()?.trim();
        if address.is_empty() {
            return None;
        }

        match self.geocoder.geocode(address) {
            Ok(coords) => {
                tracing::debug!("Geocoded '{address}' to {coords}");
                Some(coords)
            }
            Err(e) => {
                tracing::warn!("Geocoding failed for '{address}', listing stays off the map: {e}");
                None
            }
        }
    }
}

fn adapt_search_result(record: &SearchResultRecord) -> Draft {
    let address = record.address.as_ref().and_then(|a| a.to_line());
    let id = [&record.id, &record.property_id, &record.listing_id]
        .into_iter()
        .find_map(|v| v.as_ref().and_then(id_from_value))
        .unwrap_or_else(|| fallback_id(address.as_deref(), fingerprint(record)));

    let mut property = Property::new(id);
    property.address = address;
    property.price = num(&record.price)
        .or(num(&record.list_price))
        .map(|p| p.round() as i64);
    property.beds = num(&record.beds).or(num(&record.bedrooms)).and_then(to_count);
    property.baths = num(&record.baths).or(num(&record.bathrooms)).and_then(to_baths);
    property.sqft = num(&record.sqft).or(num(&record.square_feet)).and_then(to_count);
    property.property_type = type_from(record.property_type.as_deref().or(record.kind.as_deref()));
    property.metrics = InvestmentMetrics {
        cap_rate: num(&record.cap_rate),
        expected_roi: num(&record.expected_roi).or(num(&record.expected_roi_alt)),
        monthly_rent: num(&record.monthly_rent).or(num(&record.estimated_rent)),
        cash_flow: num(&record.cash_flow),
    };

    Draft {
        property,
        coordinate_candidates: vec![
            pair(&record.coordinates),
            (num(&record.lat), num(&record.lng)),
            (num(&record.latitude), num(&record.longitude)),
            pair(&record.location),
        ],
        image_candidates: vec![
            image_strings(record.images.as_deref()),
            image_strings(record.photos.as_deref()),
            record.image.iter().cloned().collect(),
            record.image_url.iter().cloned().collect(),
        ],
    }
}

fn adapt_report(report: &IntelligenceReport) -> Draft {
    let intel = report.property_intelligence.clone().unwrap_or_default();
    let location = intel.location.unwrap_or_default();
    let details = intel.details.unwrap_or_default();
    let valuation = intel.valuation.unwrap_or_default();
    let media = intel.media.unwrap_or_default();
    let investment = intel.investment.unwrap_or_default();

    let address = report
        .parsed_address
        .clone()
        .or(location.formatted_address.clone())
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());

    let id = report
        .clip_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| fallback_id(address.as_deref(), fingerprint(report)));

    let mut property = Property::new(id);
    property.address = address;
    property.price = num(&valuation.list_price)
        .or(num(&valuation.estimated_value))
        .map(|p| p.round() as i64);
    property.beds = num(&details.bedrooms).and_then(to_count);
    property.baths = num(&details.bathrooms).and_then(to_baths);
    property.sqft = num(&details.square_feet).and_then(to_count);
    property.property_type = type_from(details.property_type.as_deref());
    property.metrics = InvestmentMetrics {
        cap_rate: num(&investment.cap_rate),
        expected_roi: num(&investment.expected_roi).or(num(&investment.expected_roi_alt)),
        monthly_rent: num(&investment.monthly_rent).or(num(&investment.estimated_rent)),
        cash_flow: num(&investment.cash_flow),
    };

    Draft {
        property,
        coordinate_candidates: vec![
            pair(&location.coordinates),
            (num(&location.latitude), num(&location.longitude)),
            (num(&details.latitude), num(&details.longitude)),
            pair(&report.coordinates),
        ],
        image_candidates: vec![
            image_strings(media.photos.as_deref()),
            image_strings(media.images.as_deref()),
            image_strings(details.images.as_deref()),
            image_strings(report.images.as_deref()),
        ],
    }
}

fn adapt_generated(record: &GeneratedRecord) -> Draft {
    let mut property = Property::new(record.id.clone());
    property.address = Some(record.address.clone());
    property.price = Some(record.price);
    property.beds = Some(record.beds);
    property.baths = Some(record.baths);
    property.sqft = Some(record.sqft);
    property.property_type = PropertyType::from_raw(&record.property_type);
    property.metrics = InvestmentMetrics {
        cap_rate: Some(record.cap_rate),
        expected_roi: Some(record.expected_roi),
        monthly_rent: Some(record.monthly_rent),
        cash_flow: Some(record.cash_flow),
    };
    property.is_demo = true;

    Draft {
        property,
        coordinate_candidates: vec![(Some(record.lat), Some(record.lng))],
        image_candidates: vec![record.images.clone()],
    }
}

/// Keeps absolute http(s) URLs only, in order, without repeats.
pub fn usable_images(candidates: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .map(|s| s.trim())
        .filter(|s| is_absolute_http_url(s))
        .filter(|s| seen.insert(s.to_string()))
        .map(str::to_string)
        .collect()
}

pub fn is_absolute_http_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        // Relative paths like "/api/placeholder/1.jpg" land here.
        Err(_) => false,
    }
}

// Photo arrays hold either bare strings or objects with a url-ish key.
fn image_strings(values: Option<&[Value]>) -> Vec<String> {
    values
        .unwrap_or_default()
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => ["url", "href", "src"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        })
        .collect()
}

fn pair(field: &Option<CoordinatePair>) -> (Option<f64>, Option<f64>) {
    field.as_ref().map(CoordinatePair::parts).unwrap_or((None, None))
}

fn type_from(raw: Option<&str>) -> PropertyType {
    raw.map(PropertyType::from_raw).unwrap_or_default()
}

fn to_count(v: f64) -> Option<u32> {
    (v >= 0.0 && v <= u32::MAX as f64).then(|| v.round() as u32)
}

fn to_baths(v: f64) -> Option<f32> {
    (v >= 0.0).then_some(v as f32)
}

fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The whole record as JSON, fields in declaration order.
fn fingerprint<T: Serialize>(record: &T) -> String {
    serde_json::to_string(record).unwrap_or_default()
}

/// Stable id for records that arrive without one: a hash of the address,
/// or of whatever else identifies the record.
fn fallback_id(address: Option<&str>, fingerprint: String) -> String {
    let seed = address.map(str::to_lowercase).unwrap_or(fingerprint);
    let digest = Sha256::digest(seed.as_bytes());
    let hex: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
    format!("prop-{hex}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{MapError, MapResult};
    use serde_json::json;
    use std::cell::RefCell;

    /// Records every address it is asked about.
    struct RecordingGeocoder {
        answer: Option<Coordinates>,
        calls: RefCell<Vec<String>>,
    }

    impl RecordingGeocoder {
        fn new(answer: Option<Coordinates>) -> Self {
            Self {
                answer,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Geocoder for RecordingGeocoder {
        fn geocode(&self, address: &str) -> MapResult<Coordinates> {
            self.calls.borrow_mut().push(address.to_string());
            self.answer
                .ok_or_else(|| MapError::Provider("ZERO_RESULTS".into()))
        }
    }

    fn normalize(value: Value, geocoder: &RecordingGeocoder) -> Property {
        Normalizer::new(geocoder).normalize(&RawProperty::from_value(value))
    }

    #[test]
    fn placeholder_images_and_missing_coordinates_trigger_geocoding() {
        let geocoder = RecordingGeocoder::new(Coordinates::new(29.76, -95.37));
        let property = normalize(
            json!({
                "images": ["/api/placeholder/1.jpg"],
                "lat": null,
                "lng": null,
                "address": "123 Main St, Houston, TX"
            }),
            &geocoder,
        );

        assert!(property.images.is_empty());
        assert_eq!(*geocoder.calls.borrow(), vec!["123 Main St, Houston, TX"]);
        let coords = property.coordinates.expect("geocoded coordinates");
        assert_eq!(coords.lat(), 29.76);
        assert_eq!(coords.lng(), -95.37);
    }

    #[test]
    fn failed_geocoding_leaves_property_unlocated_but_listed() {
        let geocoder = RecordingGeocoder::new(None);
        let property = normalize(
            json!({"id": "x1", "address": "Nowhere", "price": 100000}),
            &geocoder,
        );
        assert_eq!(property.id, "x1");
        assert!(property.coordinates.is_none());
        assert!(!property.is_mappable());
        assert_eq!(property.price, Some(100000));
    }

    #[test]
    fn coordinate_candidates_follow_priority() {
        let geocoder = RecordingGeocoder::new(None);
        let property = normalize(
            json!({
                "id": 7,
                "coordinates": {"lat": 95.0, "lng": -95.0},
                "lat": 29.1,
                "lng": null,
                "latitude": 29.5,
                "longitude": -95.5
            }),
            &geocoder,
        );
        // First pair is out of range, second is partial; third wins.
        let coords = property.coordinates.unwrap();
        assert_eq!((coords.lat(), coords.lng()), (29.5, -95.5));
        assert_eq!(property.id, "7");
        assert!(geocoder.calls.borrow().is_empty());
    }

    #[test]
    fn image_candidates_skip_lists_without_usable_urls() {
        let geocoder = RecordingGeocoder::new(None);
        let property = normalize(
            json!({
                "id": "p",
                "images": ["/api/placeholder/400/300", "data:image/png;base64,AAA"],
                "photos": [
                    {"url": "https://cdn.example.com/a.jpg"},
                    "ftp://example.com/b.jpg",
                    "https://cdn.example.com/a.jpg",
                    "http://cdn.example.com/c.jpg"
                ],
                "image": "https://cdn.example.com/ignored.jpg"
            }),
            &geocoder,
        );
        assert_eq!(
            property.images,
            vec![
                "https://cdn.example.com/a.jpg".to_string(),
                "http://cdn.example.com/c.jpg".to_string()
            ]
        );
    }

    #[test]
    fn every_kept_image_is_absolute_http() {
        let inputs = [
            "https://a.example/x.jpg",
            "/relative.jpg",
            "relative.jpg",
            "javascript:alert(1)",
            "http://b.example/y.png",
            "",
        ];
        let kept = usable_images(&inputs.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        assert_eq!(kept.len(), 2);
        assert!(kept
            .iter()
            .all(|u| u.starts_with("http://") || u.starts_with("https://")));
    }

    #[test]
    fn intelligence_report_shape() {
        let geocoder = RecordingGeocoder::new(None);
        let property = normalize(
            json!({
                "clipId": "clip-42",
                "parsedAddress": "500 Elm St, Austin, TX 78701",
                "totalCost": 0.35,
                "propertyIntelligence": {
                    "location": {"coordinates": {"latitude": 30.27, "longitude": -97.74}},
                    "details": {"bedrooms": 3, "bathrooms": 2.5, "squareFeet": "1,850", "propertyType": "single_family"},
                    "valuation": {"estimatedValue": 425000},
                    "media": {"photos": ["https://img.example.com/1.jpg"]},
                    "investment": {"capRate": 6.1, "expectedROI": 9.4}
                }
            }),
            &geocoder,
        );

        assert_eq!(property.id, "clip-42");
        assert_eq!(property.address.as_deref(), Some("500 Elm St, Austin, TX 78701"));
        assert_eq!(property.price, Some(425000));
        assert_eq!(property.beds, Some(3));
        assert_eq!(property.baths, Some(2.5));
        assert_eq!(property.sqft, Some(1850));
        assert_eq!(property.property_type, PropertyType::SingleFamily);
        assert_eq!(property.metrics.cap_rate, Some(6.1));
        assert_eq!(property.images.len(), 1);
        assert!(property.coordinates.is_some());
    }

    #[test]
    fn malformed_input_yields_empty_optional_fields() {
        let geocoder = RecordingGeocoder::new(None);
        let property = normalize(json!("garbage"), &geocoder);
        assert!(property.id.starts_with("prop-"));
        assert!(property.address.is_none());
        assert!(property.price.is_none());
        assert!(property.images.is_empty());
        assert!(property.metrics.is_empty());
    }

    #[test]
    fn missing_ids_are_stable_per_address() {
        let geocoder = RecordingGeocoder::new(None);
        let a = normalize(json!({"address": "1 Oak Ave"}), &geocoder);
        let b = normalize(json!({"address": "1 OAK AVE"}), &geocoder);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn normalize_all_keeps_first_of_duplicate_ids() {
        let geocoder = RecordingGeocoder::new(None);
        let raws: Vec<RawProperty> = vec![
            json!({"id": "dup", "price": 1}),
            json!({"id": "dup", "price": 2}),
            json!({"id": "other", "price": 3}),
        ]
        .into_iter()
        .map(RawProperty::from_value)
        .collect();

        let properties = Normalizer::new(&geocoder).normalize_all(&raws);
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].price, Some(1));
    }

    #[test]
    fn records_spelling_a_field_twice_keep_every_field() {
        let geocoder = RecordingGeocoder::new(None);
        let property = normalize(
            json!({
                "id": "both-1",
                "address": "9 Elm St, Austin, TX",
                "price": 410000,
                "listPrice": 399000,
                "beds": 3,
                "bedrooms": 4,
                "bathrooms": 2.5,
                "lat": 30.27,
                "latitude": 30.5,
                "lng": -97.74,
                "images": ["https://cdn.example.com/elm.jpg"],
                "expectedRoi": 7.5
            }),
            &geocoder,
        );

        assert_eq!(property.id, "both-1");
        assert_eq!(property.address.as_deref(), Some("9 Elm St, Austin, TX"));
        assert_eq!(property.price, Some(410000));
        assert_eq!(property.beds, Some(3));
        assert_eq!(property.baths, Some(2.5));
        assert_eq!(property.metrics.expected_roi, Some(7.5));
        assert_eq!(property.images, vec!["https://cdn.example.com/elm.jpg".to_string()]);
        let coords = property.coordinates.expect("coordinates from lat/lng");
        assert_eq!((coords.lat(), coords.lng()), (30.27, -97.74));
    }

    #[test]
    fn alternate_id_keys_are_used_when_id_is_missing() {
        let geocoder = RecordingGeocoder::new(None);
        let property = normalize(json!({"propertyId": 88, "listingId": "L-1"}), &geocoder);
        assert_eq!(property.id, "88");
        let property = normalize(json!({"listingId": "L-1"}), &geocoder);
        assert_eq!(property.id, "L-1");
    }

    #[test]
    fn anonymous_records_with_different_contents_are_both_kept() {
        let geocoder = RecordingGeocoder::new(None);
        let raws: Vec<RawProperty> = vec![
            json!({"price": 250000, "lat": 29.7, "lng": -95.4, "beds": 2,
                   "images": ["https://cdn.example.com/one.jpg"]}),
            json!({"price": 250000, "lat": 29.7, "lng": -95.4, "beds": 4,
                   "images": ["https://cdn.example.com/two.jpg"]}),
        ]
        .into_iter()
        .map(RawProperty::from_value)
        .collect();

        let properties = Normalizer::new(&geocoder).normalize_all(&raws);
        assert_eq!(properties.len(), 2);
        assert_ne!(properties[0].id, properties[1].id);
        assert!(properties.iter().all(|p| p.id.starts_with("prop-")));

        let again = Normalizer::new(&geocoder).normalize_all(&raws);
        assert_eq!(again[0].id, properties[0].id);
    }

    #[test]
    fn anonymous_reports_get_distinct_ids() {
        let geocoder = RecordingGeocoder::new(None);
        let report = |beds: u32| {
            normalize(
                json!({"propertyIntelligence": {"details": {"bedrooms": beds}}}),
                &geocoder,
            )
        };
        let (a, b) = (report(2), report(5));
        assert_ne!(a.id, b.id);
        assert_eq!(a.id, report(2).id);
    }
}
