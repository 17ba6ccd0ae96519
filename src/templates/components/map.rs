use crate::domain::{AmenityCategory, AmenityFilterState, Property};
use crate::errors::MapResult;
use crate::map::ViewportState;
use crate::view::ActiveFilters;
use maud::{html, Markup, PreEscaped};
use serde_json::json;

const MAPS_SCRIPT: &str = "https://maps.googleapis.com/maps/api/js";

/// The map canvas, or an inline placeholder when the map cannot load.
pub fn map_panel(key: MapResult<&str>, viewport: &ViewportState, markers: &[&Property]) -> Markup {
    let key = match key {
        Ok(key) => key,
        Err(e) => {
            return html! {
                div id="map" class="map-placeholder" role="alert" {
                    p { strong { "Map unavailable" } }
                    p { (e.to_string()) }
                    p class="microcopy" { "Listings and filters still work below." }
                }
            }
        }
    };

    let pins: Vec<_> = markers
        .iter()
        .filter_map(|p| {
            let c = p.coordinates?;
            Some(json!({ "id": p.id, "lat": c.lat(), "lng": c.lng(), "label": p.price_label() }))
        })
        .collect();
    // Keep "</script>" in data from closing the tag early.
    let pins = serde_json::to_string(&pins)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/");

    html! {
        div id="map"
            data-lat=(viewport.center.lat())
            data-lng=(viewport.center.lng())
            data-zoom=(viewport.zoom)
            data-selected=[viewport.selected_property_id.as_deref()]
        {}
        script type="application/json" id="map-markers" { (PreEscaped(pins)) }
        script src={ (MAPS_SCRIPT) "?key=" (key) "&libraries=drawing,places" } defer {}
    }
}

pub fn filter_form(filters: &ActiveFilters) -> Markup {
    const TYPES: [(&str, &str); 5] = [
        ("all", "All types"),
        ("single_family", "Single family"),
        ("condo", "Condo"),
        ("townhouse", "Townhouse"),
        ("multi_family", "Multi-family"),
    ];
    const MINIMUMS: [&str; 5] = ["any", "1+", "2+", "3+", "4+"];

    html! {
        form method="get" action="/" class="filters" {
            input type="text" name="priceMin" placeholder="Min price" value=(filters.price_min);
            input type="text" name="priceMax" placeholder="Max price" value=(filters.price_max);
            select name="propertyType" {
                @for (value, label) in TYPES {
                    option value=(value) selected[filters.property_type == value] { (label) }
                }
            }
            select name="bedrooms" {
                @for value in MINIMUMS {
                    option value=(value) selected[filters.bedrooms == value] { "Beds " (value) }
                }
            }
            select name="bathrooms" {
                @for value in MINIMUMS {
                    option value=(value) selected[filters.bathrooms == value] { "Baths " (value) }
                }
            }
            @if filters.is_contradictory() {
                p class="warning" { "Minimum price is above maximum price." }
            }
            button type="submit" class="primary" { "Apply" }
        }
    }
}

pub fn amenity_controls(state: &AmenityFilterState) -> Markup {
    html! {
        fieldset class="amenities" {
            legend { "Nearby (" (state.total_count()) ")" }
            @for category in AmenityCategory::ALL {
                label {
                    input type="checkbox" name="amenity" value=(category.as_str())
                        checked[state.is_visible(category)];
                    " " (category) " "
                    span class="count" { (state.count(category)) }
                }
            }
        }
    }
}
