use crate::config::AppConfig;
use crate::errors::{MapError, MapResult};
use crate::normalizer::IntelligenceReport;
use crate::research::{ResearchBackend, ResearchRequest};
use crate::router::AppState;
use astra::{Body, Request, Response};
use http::Method;
use std::io::Read;

/// Answers every research prompt with the same located report.
pub struct CannedResearch;

impl ResearchBackend for CannedResearch {
    fn research(&self, request: &ResearchRequest) -> MapResult<IntelligenceReport> {
        if request.prompt.trim().is_empty() {
            return Err(MapError::InvalidInput("research prompt is empty".into()));
        }
        let value = serde_json::json!({
            "clipId": "clip-7",
            "parsedAddress": request.prompt,
            "propertyIntelligence": {
                "location": {"latitude": 29.74, "longitude": -95.39},
                "valuation": {"estimatedValue": "$410,000"}
            }
        });
        serde_json::from_value(value).map_err(|e| MapError::Decode(e.to_string()))
    }
}

/// A research service that is down.
pub struct FailingResearch;

impl ResearchBackend for FailingResearch {
    fn research(&self, _request: &ResearchRequest) -> MapResult<IntelligenceReport> {
        Err(MapError::Network("connection refused".into()))
    }
}

/// App state with no maps key and no outbound network.
pub fn test_state() -> AppState {
    AppState::new(AppConfig::default(), Box::new(CannedResearch), None)
}

pub fn keyed_state() -> AppState {
    let config = AppConfig {
        maps_api_key: Some("test-key".into()),
        ..AppConfig::default()
    };
    AppState::new(config, Box::new(CannedResearch), None)
}

pub fn request(method: Method, uri: &str, body: Body) -> Request {
    let mut req = Request::new(body);
    *req.method_mut() = method;
    *req.uri_mut() = uri.parse().unwrap();
    req
}

pub fn body_string(resp: &mut Response) -> String {
    let mut buf = String::new();
    resp.body_mut().reader().read_to_string(&mut buf).unwrap();
    buf
}

pub fn body_json(resp: &mut Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp)).unwrap()
}
