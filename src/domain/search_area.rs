// src/domain/search_area.rs

use crate::domain::property::Coordinates;
use serde::Serialize;

pub const METERS_PER_MILE: f64 = 1609.34;

pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingTool {
    Circle,
    Rectangle,
    Polygon,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    /// Smallest box containing every point; `None` for an empty set.
    pub fn enclosing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinates>,
    {
        points.into_iter().fold(None, |acc, c| {
            Some(match acc {
                None => Bounds {
                    north: c.lat(),
                    south: c.lat(),
                    east: c.lng(),
                    west: c.lng(),
                },
                Some(b) => Bounds {
                    north: b.north.max(c.lat()),
                    south: b.south.min(c.lat()),
                    east: b.east.max(c.lng()),
                    west: b.west.min(c.lng()),
                },
            })
        })
    }

    pub fn center(&self) -> Option<Coordinates> {
        Coordinates::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.south..=self.north).contains(&point.lat())
            && (self.west..=self.east).contains(&point.lng())
    }
}

/// A user-drawn or quick-selected region. Circle radius is kept in meters;
/// the conversion to miles only happens in the emitted query.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchArea {
    Circle {
        center: Coordinates,
        radius_meters: f64,
    },
    Rectangle(Bounds),
    Polygon {
        points: Vec<Coordinates>,
    },
}

impl SearchArea {
    pub fn tool(&self) -> DrawingTool {
        match self {
            SearchArea::Circle { .. } => DrawingTool::Circle,
            SearchArea::Rectangle(_) => DrawingTool::Rectangle,
            SearchArea::Polygon { .. } => DrawingTool::Polygon,
        }
    }

    pub fn to_query(&self) -> SearchQuery {
        match self {
            SearchArea::Circle {
                center,
                radius_meters,
            } => SearchQuery::Circle {
                center: *center,
                radius_miles: meters_to_miles(*radius_meters),
            },
            SearchArea::Rectangle(bounds) => SearchQuery::Rectangle { bounds: *bounds },
            SearchArea::Polygon { points } => SearchQuery::Polygon {
                points: points.clone(),
            },
        }
    }

    pub fn center(&self) -> Option<Coordinates> {
        match self {
            SearchArea::Circle { center, .. } => Some(*center),
            SearchArea::Rectangle(bounds) => bounds.center(),
            SearchArea::Polygon { points } => Bounds::enclosing(points).and_then(|b| b.center()),
        }
    }

    pub fn bounding_box(&self) -> Option<Bounds> {
        match self {
            SearchArea::Circle {
                center,
                radius_meters,
            } => {
                let miles = meters_to_miles(*radius_meters);
                let ne = center.offset_miles(miles, miles);
                let sw = center.offset_miles(-miles, -miles);
                Bounds::enclosing([&ne, &sw])
            }
            SearchArea::Rectangle(bounds) => Some(*bounds),
            SearchArea::Polygon { points } => Bounds::enclosing(points),
        }
    }

    pub fn contains(&self, point: &Coordinates) -> bool {
        match self {
            SearchArea::Circle {
                center,
                radius_meters,
            } => haversine_miles(center, point) <= meters_to_miles(*radius_meters),
            SearchArea::Rectangle(bounds) => bounds.contains(point),
            SearchArea::Polygon { points } => polygon_contains(points, point),
        }
    }
}

/// Great-circle distance in miles.
pub fn haversine_miles(a: &Coordinates, b: &Coordinates) -> f64 {
    const EARTH_RADIUS_MILES: f64 = 3958.8;
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lng = (b.lng() - a.lng()).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat().to_radians().cos() * b.lat().to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

// Ray casting; treats lng as x and lat as y.
fn polygon_contains(points: &[Coordinates], point: &Coordinates) -> bool {
    if points.len() < 3 {
        return false;
    }
    let (x, y) = (point.lng(), point.lat());
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = (points[i].lng(), points[i].lat());
        let (xj, yj) = (points[j].lng(), points[j].lat());
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// The payload handed to the search collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchQuery {
    Circle {
        center: Coordinates,
        #[serde(rename = "radiusMiles")]
        radius_miles: f64,
    },
    Rectangle {
        bounds: Bounds,
    },
    Polygon {
        points: Vec<Coordinates>,
    },
}

impl SearchQuery {
    /// Rebuilds the area this query describes (miles back to meters for circles).
    pub fn area(&self) -> SearchArea {
        match self {
            SearchQuery::Circle {
                center,
                radius_miles,
            } => SearchArea::Circle {
                center: *center,
                radius_meters: miles_to_meters(*radius_miles),
            },
            SearchQuery::Rectangle { bounds } => SearchArea::Rectangle(*bounds),
            SearchQuery::Polygon { points } => SearchArea::Polygon {
                points: points.clone(),
            },
        }
    }
}
