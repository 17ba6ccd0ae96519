use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Known record shapes, one adapter each (see normalize.rs):
//
// SearchResult            flat listing from the search backend
//  ├── id
//  ├── coordinates {lat, lng} | lat/lng | latitude/longitude | location {lat, lng}
//  ├── images[] | photos[] | image | imageUrl
//  ├── address  "line" | {street, city, state, zip}
//  └── price, beds, baths, sqft, propertyType, capRate, expectedROI, ...
//
// IntelligenceReport      research API response
//  ├── clipId
//  ├── parsedAddress
//  ├── totalCost
//  └── propertyIntelligence
//       ├── location   {coordinates, latitude, longitude, formattedAddress}
//       ├── details    {bedrooms, bathrooms, squareFeet, propertyType, images}
//       ├── valuation  {estimatedValue, listPrice}
//       ├── media      {photos, images}
//       └── investment {capRate, expectedROI, monthlyRent, cashFlow}
//
// Generated               demo provider output, already close to canonical

/// Field-level tolerance: a field of the wrong JSON type reads as absent
/// instead of failing the whole record.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A number that may arrive as JSON number or as text like "$300,000".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    pub fn value(&self) -> Option<f64> {
        let n = match self {
            LooseNumber::Number(n) => *n,
            LooseNumber::Text(s) => s
                .trim()
                .trim_start_matches('$')
                .replace(',', "")
                .parse::<f64>()
                .ok()?,
        };
        n.is_finite().then_some(n)
    }
}

pub fn num(field: &Option<LooseNumber>) -> Option<f64> {
    field.as_ref().and_then(LooseNumber::value)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoordinatePair {
    #[serde(default, deserialize_with = "lenient")]
    pub lat: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub lng: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub lon: Option<LooseNumber>,
}

impl CoordinatePair {
    pub fn parts(&self) -> (Option<f64>, Option<f64>) {
        (
            num(&self.lat).or(num(&self.latitude)),
            num(&self.lng).or(num(&self.longitude)).or(num(&self.lon)),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressParts {
    #[serde(default, deserialize_with = "lenient")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub line: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub street_address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub state_code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub zip: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressField {
    Line(String),
    Parts(AddressParts),
}

impl AddressField {
    /// "street, city, state zip" with empty pieces skipped.
    pub fn to_line(&self) -> Option<String> {
        let line = match self {
            AddressField::Line(line) => line.trim().to_string(),
            AddressField::Parts(parts) => {
                let clean = |s: &Option<String>| {
                    s.as_deref()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                };
                let street = clean(&parts.street)
                    .or(clean(&parts.line))
                    .or(clean(&parts.street_address));
                let state = clean(&parts.state).or(clean(&parts.state_code));
                let zip = clean(&parts.zip)
                    .or(clean(&parts.postal_code))
                    .or(clean(&parts.zip_code));
                let state_zip = [state, zip]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                [street, clean(&parts.city), Some(state_zip)]
                    .into_iter()
                    .flatten()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };
        (!line.is_empty()).then_some(line)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultRecord {
    // One field per spelling: a record may carry several of them at once.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub property_id: Option<Value>,
    #[serde(default)]
    pub listing_id: Option<Value>,

    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<CoordinatePair>,
    #[serde(default, deserialize_with = "lenient")]
    pub lat: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub lng: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<CoordinatePair>,

    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub photos: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<AddressField>,

    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub list_price: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub beds: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub bedrooms: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub baths: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub bathrooms: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub sqft: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub square_feet: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub property_type: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub cap_rate: Option<LooseNumber>,
    #[serde(default, rename = "expectedROI", deserialize_with = "lenient")]
    pub expected_roi: Option<LooseNumber>,
    #[serde(default, rename = "expectedRoi", deserialize_with = "lenient")]
    pub expected_roi_alt: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub monthly_rent: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub estimated_rent: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub cash_flow: Option<LooseNumber>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligenceReport {
    #[serde(default, deserialize_with = "lenient")]
    pub clip_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub parsed_address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub property_intelligence: Option<PropertyIntelligence>,

    // Some responses also carry these at the top level.
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<CoordinatePair>,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyIntelligence {
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<IntelLocation>,
    #[serde(default, deserialize_with = "lenient")]
    pub details: Option<IntelDetails>,
    #[serde(default, deserialize_with = "lenient")]
    pub valuation: Option<Valuation>,
    #[serde(default, deserialize_with = "lenient")]
    pub media: Option<Media>,
    #[serde(default, deserialize_with = "lenient")]
    pub investment: Option<Investment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelLocation {
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<CoordinatePair>,
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelDetails {
    #[serde(default, deserialize_with = "lenient")]
    pub bedrooms: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub bathrooms: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub square_feet: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    #[serde(default, deserialize_with = "lenient")]
    pub estimated_value: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub list_price: Option<LooseNumber>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Media {
    #[serde(default, deserialize_with = "lenient")]
    pub photos: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    #[serde(default, deserialize_with = "lenient")]
    pub cap_rate: Option<LooseNumber>,
    #[serde(default, rename = "expectedROI", deserialize_with = "lenient")]
    pub expected_roi: Option<LooseNumber>,
    #[serde(default, rename = "expectedRoi", deserialize_with = "lenient")]
    pub expected_roi_alt: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub monthly_rent: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub estimated_rent: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient")]
    pub cash_flow: Option<LooseNumber>,
}

/// A listing produced by the demo data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecord {
    pub id: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub price: i64,
    pub beds: u32,
    pub baths: f32,
    pub sqft: u32,
    pub images: Vec<String>,
    pub property_type: String,
    pub cap_rate: f64,
    #[serde(rename = "expectedROI")]
    pub expected_roi: f64,
    pub monthly_rent: f64,
    pub cash_flow: f64,
    /// Always true; lets untyped JSON be routed back to this shape.
    pub demo: bool,
}

/// Every record shape the normaliser understands.
#[derive(Debug, Clone)]
pub enum RawProperty {
    SearchResult(SearchResultRecord),
    IntelligenceReport(IntelligenceReport),
    Generated(GeneratedRecord),
}

impl RawProperty {
    /// Classifies an untyped record. Never fails: anything unrecognisable
    /// becomes an empty search result.
    pub fn from_value(value: Value) -> Self {
        if value.get("propertyIntelligence").is_some() || value.get("clipId").is_some() {
            if let Ok(report) = serde_json::from_value::<IntelligenceReport>(value.clone()) {
                return RawProperty::IntelligenceReport(report);
            }
        }

        if value.get("demo").and_then(Value::as_bool) == Some(true) {
            if let Ok(generated) = serde_json::from_value::<GeneratedRecord>(value.clone()) {
                return RawProperty::Generated(generated);
            }
        }

        match serde_json::from_value::<SearchResultRecord>(value) {
            Ok(record) => RawProperty::SearchResult(record),
            Err(e) => {
                tracing::debug!("Unrecognised property record shape: {e}");
                RawProperty::SearchResult(SearchResultRecord::default())
            }
        }
    }
}
