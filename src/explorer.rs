// explorer.rs
//
// One map/search session: drawn or clicked areas become queries, results are
// normalised into the list, the viewport follows, and selecting a listing
// refreshes amenity counts.

use crate::domain::{AmenityCategory, Coordinates, DrawingTool, Property, SearchQuery};
use crate::errors::{MapError, MapResult};
use crate::geocoding::Geocoder;
use crate::map::viewport::{ViewportChange, DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::map::{
    AmenityCoordinator, MapEvent, MapEventBus, MapProvider, PlacesLookup, SearchAreaTool,
    Subscription, ViewportController,
};
use crate::normalizer::{Normalizer, RawProperty};
use crate::research::{ResearchBackend, ResearchRequest};
use crate::view::PropertyViewState;
use std::cell::RefCell;
use std::rc::Rc;

/// Receives the queries the search tool emits.
pub trait SearchBackend {
    fn search(&self, query: &SearchQuery) -> MapResult<Vec<RawProperty>>;
}

pub struct Explorer {
    map: Box<dyn MapProvider>,
    geocoder: Box<dyn Geocoder>,
    places: Box<dyn PlacesLookup>,
    backend: Box<dyn SearchBackend>,
    research: Option<Box<dyn ResearchBackend>>,
    viewport: ViewportController,
    tool: SearchAreaTool,
    amenities: AmenityCoordinator,
    view: PropertyViewState,
    last_query: Option<SearchQuery>,
}

impl Explorer {
    pub fn new(
        map: Box<dyn MapProvider>,
        geocoder: Box<dyn Geocoder>,
        places: Box<dyn PlacesLookup>,
        backend: Box<dyn SearchBackend>,
        viewport_width: u32,
    ) -> Self {
        let viewport = ViewportController::new(DEFAULT_CENTER, DEFAULT_ZOOM, map.zoom_range());
        Self {
            map,
            geocoder,
            places,
            backend,
            research: None,
            viewport,
            tool: SearchAreaTool::new(),
            amenities: AmenityCoordinator::default(),
            view: PropertyViewState::new(viewport_width),
            last_query: None,
        }
    }

    pub fn with_research(mut self, research: Box<dyn ResearchBackend>) -> Self {
        self.research = Some(research);
        self
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn tool(&self) -> &SearchAreaTool {
        &self.tool
    }

    pub fn amenities(&self) -> &AmenityCoordinator {
        &self.amenities
    }

    pub fn view(&self) -> &PropertyViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut PropertyViewState {
        &mut self.view
    }

    pub fn last_query(&self) -> Option<&SearchQuery> {
        self.last_query.as_ref()
    }

    /// Routes a provider event. Returns the query it triggered, if any.
    pub fn handle_event(&mut self, event: &MapEvent) -> Option<SearchQuery> {
        let query = match event {
            MapEvent::Click(point) => self.tool.on_map_click(*point),
            MapEvent::ShapeComplete(raw) => self.tool.on_shape_complete(raw.clone()),
            MapEvent::ViewChanged { center, zoom } => {
                self.viewport.on_view_changed(*center, *zoom);
                None
            }
        }?;
        self.run_query(query.clone());
        Some(query)
    }

    pub fn activate_tool(&mut self, tool: DrawingTool) -> bool {
        self.tool.activate(tool, self.map.as_ref())
    }

    pub fn cancel_drawing(&mut self) {
        self.tool.cancel();
    }

    pub fn clear_areas(&mut self) {
        self.tool.clear_all(self.map.as_mut());
    }

    /// Quick search around the viewport center unless a center is given.
    pub fn radius_search(&mut self, center: Option<Coordinates>, miles: f64) -> SearchQuery {
        let query = self.tool.radius_search(self.viewport.center(), center, miles);
        self.run_query(query.clone());
        query
    }

    /// Sends a query to the backend and installs the results. A backend
    /// failure leaves an empty list and the last-known viewport.
    pub fn run_query(&mut self, query: SearchQuery) -> usize {
        let raws = match self.backend.search(&query) {
            Ok(raws) => raws,
            Err(e) => {
                tracing::warn!("Search failed: {e}");
                Vec::new()
            }
        };
        self.last_query = Some(query);
        self.install(raws)
    }

    fn install(&mut self, raws: Vec<RawProperty>) -> usize {
        let properties = Normalizer::new(self.geocoder.as_ref()).normalize_all(&raws);
        let count = properties.len();
        self.view.replace_properties(properties);
        if self.view.selected().is_none() {
            self.viewport.clear_selection();
            self.amenities.clear();
        }
        match self
            .viewport
            .on_search_results(self.view.properties(), self.map.as_mut())
        {
            ViewportChange::Unchanged => {}
            change => tracing::debug!("Viewport updated: {change:?}"),
        }
        tracing::info!("Installed {count} properties");
        count
    }

    /// Runs a property-research request and shows the resulting listing.
    pub fn research(&mut self, request: &ResearchRequest) -> MapResult<Property> {
        let backend = self
            .research
            .as_ref()
            .ok_or_else(|| MapError::Config("no research backend configured".into()))?;
        let report = backend.research(request)?;
        self.install(vec![RawProperty::IntelligenceReport(report)]);

        let id = self
            .view
            .properties()
            .first()
            .map(|p| p.id.clone())
            .ok_or_else(|| MapError::Decode("research returned no property".into()))?;
        self.select_property(&id);
        self.view
            .selected()
            .cloned()
            .ok_or_else(|| MapError::Decode("research property vanished".into()))
    }

    /// Selects a listing, pans to it and refreshes its amenity counts.
    /// Unknown ids change nothing.
    pub fn select_property(&mut self, id: &str) -> bool {
        let Some(property) = self.view.select(id).cloned() else {
            return false;
        };
        self.viewport.on_property_selected(&property);
        self.amenities.refresh(&property, self.places.as_ref());
        true
    }

    pub fn clear_selection(&mut self) {
        self.view.clear_selection();
        self.viewport.clear_selection();
        self.amenities.clear();
    }

    pub fn toggle_amenity(&mut self, category: AmenityCategory) -> bool {
        let visible = self.amenities.toggle_type(category);
        self.refresh_amenities();
        visible
    }

    pub fn toggle_all_amenities(&mut self, enabled: bool) {
        self.amenities.toggle_all(enabled);
        self.refresh_amenities();
    }

    fn refresh_amenities(&mut self) {
        if let Some(property) = self.view.selected().cloned() {
            self.amenities.refresh(&property, self.places.as_ref());
        }
    }

    /// Subscribes a shared session to provider events. Dropping the
    /// returned guard detaches it.
    pub fn attach(explorer: &Rc<RefCell<Explorer>>, bus: &MapEventBus) -> Subscription {
        let weak = Rc::downgrade(explorer);
        bus.subscribe(move |event| {
            let Some(explorer) = weak.upgrade() else {
                return;
            };
            match explorer.try_borrow_mut() {
                Ok(mut explorer) => {
                    explorer.handle_event(event);
                }
                Err(_) => tracing::warn!("Dropping {event:?}: session busy"),
            };
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bounds, SearchArea};
    use crate::map::RawGeometry;
    use crate::normalizer::GeneratedRecord;
    use crate::normalizer::IntelligenceReport;
    use std::cell::Cell;
    use std::sync::Mutex;

    struct ReadyMap;

    impl MapProvider for ReadyMap {
        fn is_ready(&self) -> bool {
            true
        }

        fn fit_bounds(&mut self, _bounds: Bounds) -> bool {
            true
        }

        fn clear_overlays(&mut self) {}
    }

    struct NoGeocoder;

    impl Geocoder for NoGeocoder {
        fn geocode(&self, address: &str) -> MapResult<Coordinates> {
            Err(MapError::Provider(format!("no geocoder for {address}")))
        }
    }

    #[derive(Default)]
    struct CountingPlaces {
        calls: Mutex<usize>,
    }

    impl PlacesLookup for CountingPlaces {
        fn count_nearby(&self, _c: Coordinates, _cat: AmenityCategory, _r: f64) -> MapResult<u32> {
            *self.calls.lock().unwrap() += 1;
            Ok(2)
        }
    }

    /// Records each query it receives and answers with fixed listings.
    struct RecordingBackend {
        queries: Rc<RefCell<Vec<SearchQuery>>>,
        listings: Vec<GeneratedRecord>,
        fail: Rc<Cell<bool>>,
    }

    impl SearchBackend for RecordingBackend {
        fn search(&self, query: &SearchQuery) -> MapResult<Vec<RawProperty>> {
            self.queries.borrow_mut().push(query.clone());
            if self.fail.get() {
                return Err(MapError::Network("backend down".into()));
            }
            Ok(self.listings.iter().cloned().map(RawProperty::Generated).collect())
        }
    }

    struct FixedResearch;

    impl ResearchBackend for FixedResearch {
        fn research(&self, _request: &ResearchRequest) -> MapResult<IntelligenceReport> {
            let value = serde_json::json!({
                "clipId": "clip-42",
                "parsedAddress": "1 Main St, Houston, TX",
                "coordinates": {"lat": 29.75, "lng": -95.36}
            });
            serde_json::from_value(value).map_err(|e| MapError::Decode(e.to_string()))
        }
    }

    fn record(id: &str, lat: f64, lng: f64, price: i64) -> GeneratedRecord {
        GeneratedRecord {
            id: id.into(),
            address: format!("{id} Main St"),
            lat,
            lng,
            price,
            beds: 3,
            baths: 2.0,
            sqft: 1500,
            images: vec![],
            property_type: "single_family".into(),
            cap_rate: 5.0,
            expected_roi: 7.0,
            monthly_rent: 2000.0,
            cash_flow: 300.0,
            demo: true,
        }
    }

    struct Harness {
        explorer: Explorer,
        queries: Rc<RefCell<Vec<SearchQuery>>>,
        fail: Rc<Cell<bool>>,
    }

    fn harness(listings: Vec<GeneratedRecord>) -> Harness {
        let queries = Rc::new(RefCell::new(Vec::new()));
        let fail = Rc::new(Cell::new(false));
        let backend = RecordingBackend {
            queries: Rc::clone(&queries),
            listings,
            fail: Rc::clone(&fail),
        };
        let explorer = Explorer::new(
            Box::new(ReadyMap),
            Box::new(NoGeocoder),
            Box::new(CountingPlaces::default()),
            Box::new(backend),
            1280,
        );
        Harness {
            explorer,
            queries,
            fail,
        }
    }

    #[test]
    fn drawn_rectangle_emits_exactly_one_query() {
        let mut h = harness(vec![record("a", 29.75, -95.36, 250_000)]);
        assert!(h.explorer.activate_tool(DrawingTool::Rectangle));

        let bounds = Bounds {
            north: 29.8,
            south: 29.7,
            east: -95.3,
            west: -95.4,
        };
        let emitted = h
            .explorer
            .handle_event(&MapEvent::ShapeComplete(RawGeometry::Rectangle { bounds }));

        assert_eq!(emitted, Some(SearchArea::Rectangle(bounds).to_query()));
        assert_eq!(h.queries.borrow().len(), 1);
        assert_eq!(h.explorer.view().properties().len(), 1);
        // single located result -> close zoom on it
        assert_eq!(h.explorer.viewport().zoom(), crate::map::viewport::CLOSE_ZOOM);
    }

    #[test]
    fn backend_failure_keeps_viewport_and_empties_list() {
        let mut h = harness(vec![record("a", 29.75, -95.36, 250_000)]);
        let before = h.explorer.viewport().center();
        h.fail.set(true);

        h.explorer.radius_search(None, 2.0);

        assert!(h.explorer.view().properties().is_empty());
        assert_eq!(h.explorer.viewport().center(), before);
        assert!(h.explorer.last_query().is_some());
    }

    #[test]
    fn selecting_a_listing_loads_amenities() {
        let mut h = harness(vec![
            record("a", 29.75, -95.36, 250_000),
            record("b", 29.78, -95.40, 400_000),
        ]);
        h.explorer.radius_search(None, 5.0);

        assert!(!h.explorer.select_property("ghost"));
        assert!(h.explorer.select_property("b"));

        let state = h.explorer.amenities().state();
        assert_eq!(state.count(AmenityCategory::ALL[0]), 2);
        assert!(!h.explorer.amenities().is_loading());
        assert_eq!(
            h.explorer.viewport().state().selected_property_id.as_deref(),
            Some("b")
        );

        h.explorer.toggle_all_amenities(false);
        assert_eq!(h.explorer.amenities().state().total_count(), 0);
    }

    #[test]
    fn new_results_without_the_selection_clear_it_everywhere() {
        let mut h = harness(vec![
            record("a", 29.75, -95.36, 250_000),
            record("b", 29.78, -95.40, 400_000),
        ]);
        h.explorer.radius_search(None, 5.0);
        assert!(h.explorer.select_property("b"));
        assert!(h.explorer.amenities().state().total_count() > 0);

        // A repeat search that still contains "b" keeps it selected.
        h.explorer.radius_search(None, 5.0);
        assert_eq!(h.explorer.view().selected().map(|p| p.id.as_str()), Some("b"));
        assert!(h.explorer.amenities().state().total_count() > 0);

        h.fail.set(true);
        h.explorer.radius_search(None, 5.0);

        assert!(h.explorer.view().selected().is_none());
        assert!(h.explorer.viewport().state().selected_property_id.is_none());
        assert_eq!(h.explorer.amenities().state().total_count(), 0);
        assert!(!h.explorer.amenities().is_loading());
    }

    #[test]
    fn research_installs_and_selects_the_report() {
        let mut h = harness(vec![]);
        let request = ResearchRequest::new("1 Main St", crate::research::IntelligenceLevel::Basic);
        assert!(matches!(
            h.explorer.research(&request),
            Err(MapError::Config(_))
        ));

        h.explorer = h.explorer.with_research(Box::new(FixedResearch));
        let property = h.explorer.research(&request).unwrap();
        assert_eq!(property.id, "clip-42");
        assert_eq!(h.explorer.view().selected().map(|p| p.id.as_str()), Some("clip-42"));
    }

    #[test]
    fn attached_session_follows_bus_until_dropped() {
        let h = harness(vec![record("a", 29.75, -95.36, 250_000)]);
        let queries = Rc::clone(&h.queries);
        let explorer = Rc::new(RefCell::new(h.explorer));
        let bus = MapEventBus::new();

        let guard = Explorer::attach(&explorer, &bus);
        let here = Coordinates::new(29.76, -95.37).unwrap();
        bus.emit(&MapEvent::Click(here));
        assert_eq!(queries.borrow().len(), 1);

        drop(guard);
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit(&MapEvent::Click(here));
        assert_eq!(queries.borrow().len(), 1);
    }
}
