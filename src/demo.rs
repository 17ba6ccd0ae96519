// demo.rs
//
// Deterministic sample data for demos and for running without a search
// backend. Everything here is fake and is flagged `demo: true`.

use crate::domain::{Coordinates, InvestmentMetrics, SearchQuery};
use crate::errors::MapResult;
use crate::explorer::SearchBackend;
use crate::normalizer::{GeneratedRecord, RawProperty};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

const STREETS: &[&str] = &[
    "Main St", "Westheimer Rd", "Montrose Blvd", "Heights Blvd", "Bellaire Blvd",
    "Memorial Dr", "Kirby Dr", "Shepherd Dr", "Washington Ave", "Richmond Ave",
];
const PROPERTY_TYPES: &[&str] = &["single_family", "condo", "townhouse", "multi_family"];
const DEFAULT_BATCH: usize = 12;

/// Source of generated listings and metrics.
pub trait DemoDataProvider: Send + Sync {
    fn listings_near(&self, center: Coordinates, radius_miles: f64, count: usize) -> Vec<GeneratedRecord>;

    fn investment_metrics(&self, property_id: &str, price: Option<i64>) -> InvestmentMetrics;
}

/// Seeds an RNG from a SHA-256 of an identifier, so the same id or
/// location always yields the same fake data.
#[derive(Debug, Clone, Default)]
pub struct HashedDemoProvider;

pub fn seed_for(key: &str) -> u64 {
    let digest = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

fn rng_for(key: &str) -> StdRng {
    StdRng::seed_from_u64(seed_for(key))
}

fn metrics_from(rng: &mut StdRng, price: f64) -> InvestmentMetrics {
    let monthly_rent = (price * rng.gen_range(0.006..0.011)).round();
    let expenses = monthly_rent * rng.gen_range(0.35..0.5);
    let noi = (monthly_rent - expenses) * 12.0;
    let cap_rate = round2(noi / price * 100.0);
    let mortgage = price * 0.8 * 0.0065;
    let cash_flow = (monthly_rent - expenses - mortgage).round();
    let expected_roi = round2(cap_rate + rng.gen_range(1.0..4.0));
    InvestmentMetrics {
        cap_rate: Some(cap_rate),
        expected_roi: Some(expected_roi),
        monthly_rent: Some(monthly_rent),
        cash_flow: Some(cash_flow),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl DemoDataProvider for HashedDemoProvider {
    fn listings_near(&self, center: Coordinates, radius_miles: f64, count: usize) -> Vec<GeneratedRecord> {
        let key = format!("{:.4},{:.4}", center.lat(), center.lng());
        let mut rng = rng_for(&key);
        let tag = format!("{:08x}", seed_for(&key) as u32);
        let radius = radius_miles.max(0.1);

        (0..count)
            .map(|i| {
                // sqrt keeps points evenly spread over the disc
                let distance = radius * rng.gen_range(0.0f64..1.0).sqrt();
                let bearing = rng.gen_range(0.0..std::f64::consts::TAU);
                let point = center.offset_miles(distance * bearing.cos(), distance * bearing.sin());

                let price = (rng.gen_range(150_000..900_000) / 1000) * 1000;
                let id = format!("demo-{tag}-{i}");
                let metrics = self.investment_metrics(&id, Some(price));
                let street = STREETS.choose(&mut rng).copied().unwrap_or("Main St");
                let property_type = PROPERTY_TYPES
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or("single_family");

                GeneratedRecord {
                    address: format!("{} {street}, Houston, TX", rng.gen_range(100..9999)),
                    lat: point.lat(),
                    lng: point.lng(),
                    price,
                    beds: rng.gen_range(1..=5),
                    baths: rng.gen_range(2..=8) as f32 / 2.0,
                    sqft: rng.gen_range(800..4000),
                    images: (1..=3)
                        .map(|n| format!("https://picsum.photos/seed/{id}-{n}/800/600"))
                        .collect(),
                    property_type: property_type.to_string(),
                    cap_rate: metrics.cap_rate.unwrap_or_default(),
                    expected_roi: metrics.expected_roi.unwrap_or_default(),
                    monthly_rent: metrics.monthly_rent.unwrap_or_default(),
                    cash_flow: metrics.cash_flow.unwrap_or_default(),
                    demo: true,
                    id,
                }
            })
            .collect()
    }

    fn investment_metrics(&self, property_id: &str, price: Option<i64>) -> InvestmentMetrics {
        let mut rng = rng_for(property_id);
        let price = price
            .filter(|p| *p > 0)
            .map(|p| p as f64)
            .unwrap_or_else(|| rng.gen_range(200_000.0..600_000.0));
        metrics_from(&mut rng, price)
    }
}

/// Answers area searches with generated listings inside the area.
pub struct DemoSearchBackend<P: DemoDataProvider> {
    provider: P,
    batch: usize,
}

impl<P: DemoDataProvider> DemoSearchBackend<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            batch: DEFAULT_BATCH,
        }
    }

    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = batch;
        self
    }
}

impl<P: DemoDataProvider> SearchBackend for DemoSearchBackend<P> {
    fn search(&self, query: &SearchQuery) -> MapResult<Vec<RawProperty>> {
        let area = query.area();
        let (Some(center), Some(bounds)) = (area.center(), area.bounding_box()) else {
            return Ok(Vec::new());
        };
        // Wide enough to reach every corner of the bounding box.
        let radius = (bounds.north - bounds.south).abs().max((bounds.east - bounds.west).abs()) * 69.0 * 0.75;

        let records = self
            .provider
            .listings_near(center, radius, self.batch * 3)
            .into_iter()
            .filter(|r| {
                Coordinates::new(r.lat, r.lng).is_some_and(|c| area.contains(&c))
            })
            .take(self.batch)
            .map(RawProperty::Generated)
            .collect();
        Ok(records)
    }
}
