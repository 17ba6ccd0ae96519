// src/map/provider.rs

use crate::domain::{Bounds, Coordinates};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub const DEFAULT_MIN_ZOOM: u8 = 1;
pub const DEFAULT_MAX_ZOOM: u8 = 21;

/// Geometry as the drawing manager reports it on draw-complete.
#[derive(Debug, Clone, PartialEq)]
pub enum RawGeometry {
    Circle {
        center: Coordinates,
        radius_meters: f64,
    },
    Rectangle {
        bounds: Bounds,
    },
    Polygon {
        path: Vec<Coordinates>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Click(Coordinates),
    ShapeComplete(RawGeometry),
    /// The provider moved the camera itself (user pan/zoom or a bounds fit).
    ViewChanged { center: Coordinates, zoom: u8 },
}

/// The maps SDK, seen from the coordination layer.
pub trait MapProvider {
    /// False until the SDK script has loaded (or forever without a key).
    fn is_ready(&self) -> bool;

    fn zoom_range(&self) -> (u8, u8) {
        (DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
    }

    /// Asks the SDK to frame `bounds`. Returns false when it could not.
    fn fit_bounds(&mut self, bounds: Bounds) -> bool;

    /// Removes every drawn search overlay.
    fn clear_overlays(&mut self);
}

/// Stand-in for a provider that never loads, e.g. when the maps key is missing.
#[derive(Debug, Default)]
pub struct UnavailableMap;

impl MapProvider for UnavailableMap {
    fn is_ready(&self) -> bool {
        false
    }

    fn fit_bounds(&mut self, _bounds: Bounds) -> bool {
        false
    }

    fn clear_overlays(&mut self) {}
}

type Handler = Rc<RefCell<dyn FnMut(&MapEvent)>>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

/// Fan-out of provider callbacks to subscribers.
///
/// Single-threaded like the UI loop it models. Handlers may subscribe or
/// drop subscriptions while an event is being delivered; such changes take
/// effect from the next event. A handler may also emit; the nested event
/// reaches every other subscriber but not the handler already running.
#[derive(Clone, Default)]
pub struct MapEventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl MapEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&MapEvent) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let handler: Handler = Rc::new(RefCell::new(handler));
        inner.handlers.push((id, handler));
        Subscription {
            bus: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn emit(&self, event: &MapEvent) {
        let handlers: Vec<Handler> = self
            .inner
            .borrow()
            .handlers
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();

        for handler in handlers {
            // A handler that emits on this bus does not hear its own event.
            match handler.try_borrow_mut() {
                Ok(mut handler) => (*handler)(event),
                Err(_) => tracing::debug!("Skipping re-entrant delivery of {event:?}"),
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }
}

/// Keeps a handler registered; dropping it unregisters.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    bus: Weak<RefCell<BusInner>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.borrow_mut().handlers.retain(|(id, _)| *id != self.id);
        }
    }
}
