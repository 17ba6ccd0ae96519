// src/view/filters.rs

use crate::domain::Property;
use std::collections::HashMap;

/// Filter form values, kept as the strings the controls produce
/// ("any", "all", "", "3+", "$200,000").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilters {
    pub price_min: String,
    pub price_max: String,
    pub property_type: String,
    pub bedrooms: String,
    pub bathrooms: String,
}

impl Default for ActiveFilters {
    fn default() -> Self {
        Self {
            price_min: String::new(),
            price_max: String::new(),
            property_type: "all".to_string(),
            bedrooms: "any".to_string(),
            bathrooms: "any".to_string(),
        }
    }
}

/// Parsed, validated form of [`ActiveFilters`].
#[derive(Debug, Clone, PartialEq)]
struct Criteria {
    price_min: Option<f64>,
    price_max: Option<f64>,
    property_type: Option<String>,
    min_beds: Option<f64>,
    min_baths: Option<f64>,
}

impl ActiveFilters {
    /// Reads filters from decoded query pairs; unknown keys are ignored.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let mut filters = Self::default();
        let pick = |key: &str, fallback: &String| {
            params.get(key).cloned().unwrap_or_else(|| fallback.clone())
        };
        filters.price_min = pick("priceMin", &filters.price_min);
        filters.price_max = pick("priceMax", &filters.price_max);
        filters.property_type = pick("propertyType", &filters.property_type);
        filters.bedrooms = pick("bedrooms", &filters.bedrooms);
        filters.bathrooms = pick("bathrooms", &filters.bathrooms);
        filters
    }

    fn criteria(&self) -> Criteria {
        let property_type = {
            let t = self.property_type.trim();
            (!t.is_empty() && !t.eq_ignore_ascii_case("all")).then(|| t.to_string())
        };
        Criteria {
            price_min: parse_bound(&self.price_min),
            price_max: parse_bound(&self.price_max),
            property_type,
            min_beds: parse_minimum(&self.bedrooms),
            min_baths: parse_minimum(&self.bathrooms),
        }
    }

    /// True when the price bounds cannot both hold.
    pub fn is_contradictory(&self) -> bool {
        let c = self.criteria();
        matches!((c.price_min, c.price_max), (Some(min), Some(max)) if min > max)
    }

    pub fn matches(&self, property: &Property) -> bool {
        self.criteria().matches(property)
    }
}

impl Criteria {
    fn matches(&self, property: &Property) -> bool {
        let price = property.price.map(|p| p as f64);
        if let Some(min) = self.price_min {
            if !price.is_some_and(|p| p >= min) {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if !price.is_some_and(|p| p <= max) {
                return false;
            }
        }
        if let Some(needle) = &self.property_type {
            if !property.property_type.matches(needle) {
                return false;
            }
        }
        if let Some(min) = self.min_beds {
            if !property.beds.is_some_and(|b| b as f64 >= min) {
                return false;
            }
        }
        if let Some(min) = self.min_baths {
            if !property.baths.is_some_and(|b| b as f64 >= min) {
                return false;
            }
        }
        true
    }
}

/// Pure filter over the canonical list; the input is never touched.
/// Contradictory price bounds (min > max) match nothing.
pub fn filter_properties<'a>(properties: &'a [Property], filters: &ActiveFilters) -> Vec<&'a Property> {
    let criteria = filters.criteria();
    if let (Some(min), Some(max)) = (criteria.price_min, criteria.price_max) {
        if min > max {
            return Vec::new();
        }
    }
    properties.iter().filter(|p| criteria.matches(p)).collect()
}

// Blank or unparsable means "no bound"; negatives clamp to zero.
fn parse_bound(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("any") {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.max(0.0))
}

fn parse_minimum(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_end_matches('+');
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("any") {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}
