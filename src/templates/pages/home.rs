// templates/pages/home.rs

use crate::domain::{AmenityFilterState, Property};
use crate::errors::MapResult;
use crate::map::ViewportState;
use crate::templates::{
    components::{amenity_controls, filter_form, map_panel, property_detail},
    desktop_layout, property_card,
};
use crate::view::{ActiveFilters, DetailTab};
use maud::{html, Markup};

pub struct MapPageVm<'a> {
    pub map_key: MapResult<&'a str>,
    pub viewport: &'a ViewportState,
    pub filters: &'a ActiveFilters,
    pub properties: Vec<&'a Property>,
    pub selected: Option<&'a Property>,
    pub tab: DetailTab,
    pub amenities: &'a AmenityFilterState,
    pub sidebar_open: bool,
}

pub fn map_page(vm: MapPageVm<'_>) -> Markup {
    let selected = vm.viewport.selected_property_id.as_deref();
    let markers: Vec<&Property> = vm.properties.iter().copied().filter(|p| p.is_mappable()).collect();

    desktop_layout(
        "Property Map",
        html! {
            main class="container map-layout" {
                section class="map-column" {
                    (map_panel(vm.map_key, vm.viewport, &markers))
                    (amenity_controls(vm.amenities))
                }
                aside class=(if vm.sidebar_open { "sidebar open" } else { "sidebar" }) {
                    @if let Some(property) = vm.selected {
                        (property_detail(property, vm.tab, vm.amenities, &vm.properties))
                    }
                    (filter_form(vm.filters))
                    p class="result-count" { (vm.properties.len()) " properties" }
                    @if vm.properties.is_empty() {
                        p class="empty" { "No properties match these filters." }
                    }
                    @for property in &vm.properties {
                        (property_card(property, Some(property.id.as_str()) == selected))
                    }
                }
            }
        },
    )
}
