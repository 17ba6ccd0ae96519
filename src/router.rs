use crate::config::AppConfig;
use crate::demo::{DemoDataProvider, DemoSearchBackend, HashedDemoProvider};
use crate::domain::{Coordinates, Property};
use crate::errors::{MapResult, ServerError};
use crate::explorer::SearchBackend;
use crate::geocoding::DisabledGeocoder;
use crate::map::amenities::AmenityCoordinator;
use crate::map::provider::UnavailableMap;
use crate::map::search_tool::parse_radius;
use crate::map::viewport::{DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::map::{GooglePlaces, PlacesLookup, SearchAreaTool, ViewportController};
use crate::normalizer::{Normalizer, RawProperty};
use crate::research::{IntelligenceLevel, ResearchBackend, ResearchClient, ResearchRequest};
use crate::responses::{html_response, json_response, ResultResp};
use crate::templates::pages::{map_page, MapPageVm};
use crate::view::state::SIDEBAR_BREAKPOINT_PX;
use crate::view::{ActiveFilters, DetailTab, PropertyViewState};
use astra::Request;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::io::Read;

const CATALOG_RADIUS_MILES: f64 = 8.0;
const CATALOG_SIZE: usize = 24;

/// Everything a request handler needs. Shared across astra's workers.
pub struct AppState {
    pub config: AppConfig,
    demo: HashedDemoProvider,
    search: DemoSearchBackend<HashedDemoProvider>,
    research: Box<dyn ResearchBackend + Send + Sync>,
    places: Option<Box<dyn PlacesLookup>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        research: Box<dyn ResearchBackend + Send + Sync>,
        places: Option<Box<dyn PlacesLookup>>,
    ) -> Self {
        Self {
            config,
            demo: HashedDemoProvider,
            search: DemoSearchBackend::new(HashedDemoProvider),
            research,
            places,
        }
    }

    /// Amenity lookups are only wired up when a maps key is present.
    pub fn from_config(config: AppConfig) -> MapResult<Self> {
        let research = Box::new(ResearchClient::from_config(&config)?);
        let places = match GooglePlaces::from_config(&config) {
            Ok(places) => Some(Box::new(places) as Box<dyn PlacesLookup>),
            Err(e) => {
                tracing::warn!("Amenity counts disabled: {e}");
                None
            }
        };
        Ok(Self::new(config, research, places))
    }

    /// The demo listings served by the API, identical on every call.
    fn catalog(&self) -> Vec<Property> {
        let raws: Vec<RawProperty> = self
            .demo
            .listings_near(DEFAULT_CENTER, CATALOG_RADIUS_MILES, CATALOG_SIZE)
            .into_iter()
            .map(RawProperty::Generated)
            .collect();
        normalize(&raws)
    }
}

fn normalize(raws: &[RawProperty]) -> Vec<Property> {
    Normalizer::new(&DisabledGeocoder).normalize_all(raws)
}

pub fn handle(mut req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let params = parse_query(&req);
    tracing::debug!("{method} {path}");

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => map_view(state, &params),

        ("GET", "/api/properties") => {
            let filters = ActiveFilters::from_query(&params);
            let catalog = state.catalog();
            let shown: Vec<&Property> = crate::view::filter_properties(&catalog, &filters);
            json_response(200, &shown)
        }

        ("GET", p) if p.starts_with("/api/properties/") => {
            let id = &p["/api/properties/".len()..];
            let catalog = state.catalog();
            let property = catalog
                .iter()
                .find(|prop| prop.id == id)
                .ok_or(ServerError::NotFound)?;
            json_response(200, property)
        }

        ("POST", "/api/search/radius") => {
            let center = parse_center(&params)?;
            let miles = parse_radius(params.get("radius").map(String::as_str).unwrap_or(""));
            let query = SearchAreaTool::new().radius_search(DEFAULT_CENTER, center, miles);
            let results = normalize(&state.search.search(&query)?);
            json_response(200, &json!({ "query": query, "results": results }))
        }

        ("POST", "/api/research") => {
            let form: ResearchForm = read_json(&mut req)?;
            let mut request = ResearchRequest::new(form.prompt, form.level);
            if form.confirmed {
                request = request.confirmed();
            }
            let report = state.research.research(&request)?;
            let property = normalize(&[RawProperty::IntelligenceReport(report)]);
            let property = property.first().ok_or(ServerError::InternalError)?;
            json_response(200, property)
        }

        _ => Err(ServerError::NotFound),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResearchForm {
    prompt: String,
    #[serde(default, rename = "intelligenceLevel")]
    level: IntelligenceLevel,
    #[serde(default)]
    confirmed: bool,
}

fn map_view(state: &AppState, params: &HashMap<String, String>) -> ResultResp {
    let mut view = PropertyViewState::new(SIDEBAR_BREAKPOINT_PX);
    view.replace_properties(state.catalog());
    view.set_filters(ActiveFilters::from_query(params));

    let shown: Vec<Property> = view.filtered_properties().into_iter().cloned().collect();
    let mut viewport = ViewportController::new(DEFAULT_CENTER, DEFAULT_ZOOM, (1, 21));
    viewport.on_search_results(&shown, &mut UnavailableMap);

    let mut amenities = AmenityCoordinator::default();
    if let Some(id) = params.get("selected") {
        if let Some(property) = view.select(id).cloned() {
            if let Some(tab) = params.get("tab").and_then(|t| DetailTab::from_slug(t)) {
                view.set_tab(tab);
            }
            viewport.on_property_selected(&property);
            if let Some(places) = &state.places {
                amenities.refresh(&property, places.as_ref());
            }
        }
    }

    html_response(map_page(MapPageVm {
        map_key: state.config.map_key(),
        viewport: viewport.state(),
        filters: view.filters(),
        properties: view.filtered_properties(),
        selected: view.selected(),
        tab: view.tab(),
        amenities: amenities.state(),
        sidebar_open: view.sidebar_open(),
    }))
}

/// `lat` and `lng` must come together; neither means "use the default center".
fn parse_center(params: &HashMap<String, String>) -> Result<Option<Coordinates>, ServerError> {
    match (params.get("lat"), params.get("lng")) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => {
            let lat = lat.trim().parse::<f64>().ok();
            let lng = lng.trim().parse::<f64>().ok();
            Coordinates::from_parts(lat, lng)
                .map(Some)
                .ok_or_else(|| ServerError::BadRequest("invalid lat/lng".into()))
        }
        _ => Err(ServerError::BadRequest("lat and lng must be given together".into())),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(req: &mut Request) -> Result<T, ServerError> {
    let mut body = Vec::new();
    req.body_mut()
        .reader()
        .read_to_end(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("Unreadable body: {e}")))?;
    serde_json::from_slice(&body).map_err(|e| ServerError::BadRequest(format!("Invalid JSON: {e}")))
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
