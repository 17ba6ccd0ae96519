// src/map/search_tool.rs

use crate::domain::search_area::miles_to_meters;
use crate::domain::{Coordinates, DrawingTool, SearchArea, SearchQuery};
use crate::map::provider::{MapProvider, RawGeometry};

pub const MIN_RADIUS_MILES: f64 = 0.5;
pub const MAX_RADIUS_MILES: f64 = 50.0;
/// Used for unparsable, zero or negative radius input.
pub const DEFAULT_RADIUS_MILES: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingModeState {
    Idle,
    AwaitingShape(DrawingTool),
    ShapeComplete,
}

/// Radius input from the quick-search box, defaulted then clamped.
pub fn normalize_radius(miles: f64) -> f64 {
    if miles.is_nan() || miles <= 0.0 {
        return DEFAULT_RADIUS_MILES;
    }
    miles.clamp(MIN_RADIUS_MILES, MAX_RADIUS_MILES)
}

pub fn parse_radius(text: &str) -> f64 {
    normalize_radius(text.trim().parse::<f64>().unwrap_or(f64::NAN))
}

/// Drawing-mode state machine plus the quick radius search.
///
/// Every operation that produces a search returns the query it emitted;
/// the caller forwards it to the search backend.
#[derive(Debug, Clone)]
pub struct SearchAreaTool {
    mode: DrawingModeState,
    retained: Option<SearchArea>,
    quick_radius_miles: f64,
}

impl Default for SearchAreaTool {
    fn default() -> Self {
        Self {
            mode: DrawingModeState::Idle,
            retained: None,
            quick_radius_miles: DEFAULT_RADIUS_MILES,
        }
    }
}

impl SearchAreaTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DrawingModeState {
        self.mode
    }

    /// The last completed area, kept for redraw until cleared or replaced.
    pub fn retained_area(&self) -> Option<&SearchArea> {
        self.retained.as_ref()
    }

    pub fn quick_radius_miles(&self) -> f64 {
        self.quick_radius_miles
    }

    pub fn set_quick_radius(&mut self, miles: f64) {
        self.quick_radius_miles = normalize_radius(miles);
    }

    pub fn activate(&mut self, tool: DrawingTool, provider: &dyn MapProvider) -> bool {
        if !provider.is_ready() {
            tracing::warn!("Ignoring {tool:?} tool activation: map not ready");
            return false;
        }
        if self.mode != DrawingModeState::Idle {
            tracing::debug!("Ignoring {tool:?} tool activation while {:?}", self.mode);
            return false;
        }
        self.mode = DrawingModeState::AwaitingShape(tool);
        true
    }

    pub fn cancel(&mut self) {
        if let DrawingModeState::AwaitingShape(tool) = self.mode {
            tracing::debug!("Cancelled {tool:?} drawing");
            self.mode = DrawingModeState::Idle;
        }
    }

    /// Converts the finished shape and emits exactly one query.
    ///
    /// Ignored unless a tool is active and the geometry matches it.
    pub fn on_shape_complete(&mut self, raw: RawGeometry) -> Option<SearchQuery> {
        let DrawingModeState::AwaitingShape(tool) = self.mode else {
            tracing::debug!("Shape completed with no active tool; ignoring");
            return None;
        };

        let area = match (tool, raw) {
            (
                DrawingTool::Circle,
                RawGeometry::Circle {
                    center,
                    radius_meters,
                },
            ) => SearchArea::Circle {
                center,
                radius_meters: radius_meters.max(0.0),
            },
            (DrawingTool::Rectangle, RawGeometry::Rectangle { bounds }) => {
                SearchArea::Rectangle(bounds)
            }
            (DrawingTool::Polygon, RawGeometry::Polygon { path }) if path.len() >= 3 => {
                SearchArea::Polygon { points: path }
            }
            (tool, raw) => {
                tracing::warn!("Discarding {raw:?}: does not fit active {tool:?} tool");
                return None;
            }
        };

        self.mode = DrawingModeState::ShapeComplete;
        let query = area.to_query();
        self.retained = Some(area);
        tracing::info!("Area search emitted from {tool:?} draw");
        self.mode = DrawingModeState::Idle;
        Some(query)
    }

    /// Removes drawn areas from the map. Drawing mode is untouched.
    pub fn clear_all(&mut self, provider: &mut dyn MapProvider) {
        self.retained = None;
        provider.clear_overlays();
    }

    /// Circle search around the viewport center (or `center_override`).
    /// Independent of the drawing state machine.
    pub fn radius_search(
        &mut self,
        viewport_center: Coordinates,
        center_override: Option<Coordinates>,
        radius_miles: f64,
    ) -> SearchQuery {
        let miles = normalize_radius(radius_miles);
        self.quick_radius_miles = miles;
        let area = SearchArea::Circle {
            center: center_override.unwrap_or(viewport_center),
            radius_meters: miles_to_meters(miles),
        };
        let query = area.to_query();
        self.retained = Some(area);
        query
    }

    /// A click while idle means "search here"; during a draw it belongs
    /// to the drawing gesture and is ignored.
    pub fn on_map_click(&mut self, point: Coordinates) -> Option<SearchQuery> {
        if self.mode != DrawingModeState::Idle {
            return None;
        }
        let radius = self.quick_radius_miles;
        Some(self.radius_search(point, None, radius))
    }
}
