// src/domain/amenity.rs

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::MapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AmenityCategory {
    Schools,
    Parks,
    Healthcare,
    Transit,
    Shopping,
    Dining,
    Safety,
    Fitness,
}

impl AmenityCategory {
    pub const ALL: [AmenityCategory; 8] = [
        AmenityCategory::Schools,
        AmenityCategory::Parks,
        AmenityCategory::Healthcare,
        AmenityCategory::Transit,
        AmenityCategory::Shopping,
        AmenityCategory::Dining,
        AmenityCategory::Safety,
        AmenityCategory::Fitness,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AmenityCategory::Schools => "schools",
            AmenityCategory::Parks => "parks",
            AmenityCategory::Healthcare => "healthcare",
            AmenityCategory::Transit => "transit",
            AmenityCategory::Shopping => "shopping",
            AmenityCategory::Dining => "dining",
            AmenityCategory::Safety => "safety",
            AmenityCategory::Fitness => "fitness",
        }
    }

    /// Places API types that count towards this category.
    pub fn place_types(self) -> &'static [&'static str] {
        match self {
            AmenityCategory::Schools => &["school"],
            AmenityCategory::Parks => &["park"],
            AmenityCategory::Healthcare => &["hospital", "pharmacy", "doctor"],
            AmenityCategory::Transit => &["transit_station", "bus_station", "subway_station"],
            AmenityCategory::Shopping => &["shopping_mall", "supermarket"],
            AmenityCategory::Dining => &["restaurant", "cafe"],
            AmenityCategory::Safety => &["police", "fire_station"],
            AmenityCategory::Fitness => &["gym"],
        }
    }
}

impl fmt::Display for AmenityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmenityCategory {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        AmenityCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| MapError::InvalidInput(format!("unknown amenity category '{s}'")))
    }
}

/// Per-category visibility flags and the counts found around the
/// currently selected property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmenityFilterState {
    visible: BTreeMap<AmenityCategory, bool>,
    counts: BTreeMap<AmenityCategory, u32>,
}

impl Default for AmenityFilterState {
    fn default() -> Self {
        Self::with_all(true)
    }
}

impl AmenityFilterState {
    pub fn with_all(enabled: bool) -> Self {
        Self {
            visible: AmenityCategory::ALL.iter().map(|&c| (c, enabled)).collect(),
            counts: zero_counts(),
        }
    }

    pub fn is_visible(&self, category: AmenityCategory) -> bool {
        self.visible.get(&category).copied().unwrap_or(false)
    }

    pub fn toggle(&mut self, category: AmenityCategory) -> bool {
        let flag = self.visible.entry(category).or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// Replaces the whole flag map in one assignment.
    pub fn set_all(&mut self, enabled: bool) {
        self.visible = AmenityCategory::ALL.iter().map(|&c| (c, enabled)).collect();
    }

    pub fn enabled(&self) -> Vec<AmenityCategory> {
        self.visible
            .iter()
            .filter(|&(_, &on)| on)
            .map(|(&c, _)| c)
            .collect()
    }

    pub fn visibility(&self) -> &BTreeMap<AmenityCategory, bool> {
        &self.visible
    }

    pub fn count(&self, category: AmenityCategory) -> u32 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<AmenityCategory, u32> {
        &self.counts
    }

    pub fn total_count(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn reset_counts(&mut self) {
        self.counts = zero_counts();
    }

    /// Installs a fresh set of counts; categories missing from `found` read as zero.
    pub fn replace_counts(&mut self, found: BTreeMap<AmenityCategory, u32>) {
        let mut counts = zero_counts();
        counts.extend(found);
        self.counts = counts;
    }
}

fn zero_counts() -> BTreeMap<AmenityCategory, u32> {
    AmenityCategory::ALL.iter().map(|&c| (c, 0)).collect()
}
