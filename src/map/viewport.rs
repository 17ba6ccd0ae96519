// src/map/viewport.rs

use crate::domain::{Bounds, Coordinates, Property};
use crate::map::provider::MapProvider;
use serde::Serialize;

/// Zoom used when a search yields exactly one located listing.
pub const CLOSE_ZOOM: u8 = 16;
/// Zoom used for multi-result searches when the provider cannot fit bounds.
pub const WIDE_ZOOM: u8 = 10;
pub const DEFAULT_ZOOM: u8 = 11;

/// Downtown Houston.
pub const DEFAULT_CENTER: Coordinates = Coordinates::new_unchecked(29.7604, -95.3698);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub center: Coordinates,
    pub zoom: u8,
    /// Held by id only; the result list can be replaced at any time.
    pub selected_property_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportChange {
    Unchanged,
    Recentered,
    /// The provider is framing the results itself.
    FittedBounds(Bounds),
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    state: ViewportState,
    min_zoom: u8,
    max_zoom: u8,
}

impl ViewportController {
    pub fn new(center: Coordinates, zoom: u8, zoom_range: (u8, u8)) -> Self {
        let (min_zoom, max_zoom) = if zoom_range.0 <= zoom_range.1 {
            zoom_range
        } else {
            (zoom_range.1, zoom_range.0)
        };
        Self {
            state: ViewportState {
                center,
                zoom: zoom.clamp(min_zoom, max_zoom),
                selected_property_id: None,
            },
            min_zoom,
            max_zoom,
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn center(&self) -> Coordinates {
        self.state.center
    }

    pub fn zoom(&self) -> u8 {
        self.state.zoom
    }

    pub fn recenter_on(&mut self, coordinates: Coordinates, zoom: u8) {
        self.state.center = coordinates;
        self.state.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Camera moved by the provider (user pan/zoom, finished bounds fit).
    pub fn on_view_changed(&mut self, center: Coordinates, zoom: u8) {
        self.recenter_on(center, zoom);
    }

    /// Reacts to a fresh result set. With no located results the
    /// last-known viewport is kept.
    pub fn on_search_results(
        &mut self,
        results: &[Property],
        provider: &mut dyn MapProvider,
    ) -> ViewportChange {
        let located: Vec<Coordinates> = results.iter().filter_map(|p| p.coordinates).collect();

        match located.as_slice() {
            [] => {
                tracing::debug!("No located results; keeping viewport");
                ViewportChange::Unchanged
            }
            [only] => {
                self.recenter_on(*only, CLOSE_ZOOM);
                ViewportChange::Recentered
            }
            many => {
                let Some(bounds) = Bounds::enclosing(many) else {
                    return ViewportChange::Unchanged;
                };
                if provider.is_ready() && provider.fit_bounds(bounds) {
                    if let Some(center) = bounds.center() {
                        self.state.center = center;
                    }
                    ViewportChange::FittedBounds(bounds)
                } else {
                    let center = centroid(many).unwrap_or(self.state.center);
                    self.recenter_on(center, WIDE_ZOOM);
                    ViewportChange::Recentered
                }
            }
        }
    }

    /// Selecting from the list pans but keeps the zoom level.
    pub fn on_property_selected(&mut self, property: &Property) {
        self.state.selected_property_id = Some(property.id.clone());
        if let Some(coords) = property.coordinates {
            self.state.center = coords;
        }
    }

    pub fn clear_selection(&mut self) {
        self.state.selected_property_id = None;
    }
}

fn centroid(points: &[Coordinates]) -> Option<Coordinates> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat, lng) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), c| (lat + c.lat(), lng + c.lng()));
    Coordinates::new(lat / n, lng / n)
}
