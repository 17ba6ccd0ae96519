// research.rs
use crate::config::AppConfig;
use crate::errors::{MapError, MapResult};
use crate::normalizer::IntelligenceReport;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

pub const RESEARCH_PATH: &str = "/api/ai/property-research";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntelligenceLevel {
    #[default]
    Basic,
    Essential,
    Comprehensive,
}

/// Body of `POST /api/ai/property-research`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    pub prompt: String,
    pub intelligence_level: IntelligenceLevel,
    pub include_comparables: bool,
    pub include_climate_risk: bool,
    pub include_propensity_scores: bool,
    pub include_mortgage_analysis: bool,
    pub include_zillow_enrichment: bool,
    pub confirmed: bool,
}

impl ResearchRequest {
    /// Request with the add-ons each level normally bundles. Not yet confirmed.
    pub fn new(prompt: impl Into<String>, level: IntelligenceLevel) -> Self {
        let essential = level != IntelligenceLevel::Basic;
        let comprehensive = level == IntelligenceLevel::Comprehensive;
        Self {
            prompt: prompt.into(),
            intelligence_level: level,
            include_comparables: essential,
            include_climate_risk: comprehensive,
            include_propensity_scores: comprehensive,
            include_mortgage_analysis: essential,
            include_zillow_enrichment: comprehensive,
            confirmed: false,
        }
    }

    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }
}

/// The property-research backend.
pub trait ResearchBackend {
    fn research(&self, request: &ResearchRequest) -> MapResult<IntelligenceReport>;
}

pub struct ResearchClient {
    client: Client,
    base_url: String,
}

impl ResearchClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> MapResult<Self> {
        Ok(Self::new(
            config.http_client()?,
            config.research_api_url.clone(),
        ))
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, RESEARCH_PATH)
    }
}

impl ResearchBackend for ResearchClient {
    fn research(&self, request: &ResearchRequest) -> MapResult<IntelligenceReport> {
        if request.prompt.trim().is_empty() {
            return Err(MapError::InvalidInput("research prompt is empty".into()));
        }

        let resp = self
            .client
            .post(self.endpoint())
            .json(request)
            .send()
            .map_err(|e| MapError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| MapError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(MapError::Network(format!(
                "Property research HTTP {status}: {text}"
            )));
        }

        let report: IntelligenceReport =
            serde_json::from_str(&text).map_err(|e| MapError::Decode(e.to_string()))?;

        tracing::info!(
            "Research complete (clip {:?}, cost {:?})",
            report.clip_id,
            report.total_cost
        );
        Ok(report)
    }
}
