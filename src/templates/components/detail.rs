use crate::domain::{AmenityCategory, AmenityFilterState, Property};
use crate::view::DetailTab;
use maud::{html, Markup};

const MAX_COMPARABLES: usize = 3;

/// Detail panel for the selected listing: a tab strip of links and the
/// active tab's content.
pub fn property_detail(
    property: &Property,
    tab: DetailTab,
    amenities: &AmenityFilterState,
    listings: &[&Property],
) -> Markup {
    html! {
        section class="card detail" data-property-id=(property.id) {
            header {
                h2 { (property.address_label()) }
                p class="price" { (property.price_label()) }
            }
            nav class="tabs" {
                @for t in DetailTab::ALL {
                    a class=(if t == tab { "tab active" } else { "tab" })
                        href={ "/?selected=" (property.id) "&tab=" (t.slug()) }
                    { (t.label()) }
                }
            }
            div class="tab-body" data-tab=(tab.slug()) {
                @match tab {
                    DetailTab::Overview => { (overview(property)) }
                    DetailTab::Financials => { (financials(property)) }
                    DetailTab::Intelligence => { (intelligence(property)) }
                    DetailTab::Neighborhood => { (neighborhood(amenities)) }
                    DetailTab::Comparables => { (comparables(property, listings)) }
                }
            }
        }
    }
}

fn overview(property: &Property) -> Markup {
    html! {
        dl class="facts" {
            dt { "Type" } dd { (property.property_type.label()) }
            @if let Some(beds) = property.beds {
                dt { "Bedrooms" } dd { (beds) }
            }
            @if let Some(baths) = property.baths {
                dt { "Bathrooms" } dd { (baths) }
            }
            @if let Some(sqft) = property.sqft {
                dt { "Square feet" } dd { (sqft) }
            }
            @if let Some(c) = property.coordinates {
                dt { "Location" } dd { (c) }
            }
        }
    }
}

fn financials(property: &Property) -> Markup {
    let m = &property.metrics;
    html! {
        @if m.is_empty() {
            p class="empty" { "No investment figures for this listing." }
        } @else {
            dl class="metrics" {
                @if let Some(v) = m.cap_rate {
                    dt { "Cap rate" } dd { (format!("{v:.2}%")) }
                }
                @if let Some(v) = m.expected_roi {
                    dt { "Expected ROI" } dd { (format!("{v:.2}%")) }
                }
                @if let Some(v) = m.monthly_rent {
                    dt { "Monthly rent" } dd { (format!("${v:.0}")) }
                }
                @if let Some(v) = m.cash_flow {
                    dt { "Cash flow" } dd { (format!("${v:.0}/mo")) }
                }
            }
        }
    }
}

fn intelligence(property: &Property) -> Markup {
    html! {
        @if property.is_demo {
            p class="microcopy" { "Demo data. Figures are generated, not researched." }
        } @else {
            p class="microcopy" { "Imported listing " (property.id) "." }
        }
        p { "Request a research report with POST /api/research." }
    }
}

fn neighborhood(amenities: &AmenityFilterState) -> Markup {
    html! {
        ul class="amenity-counts" {
            @for category in AmenityCategory::ALL {
                @if amenities.is_visible(category) {
                    li { (category) ": " (amenities.count(category)) }
                }
            }
        }
        p class="microcopy" { "Within one mile." }
    }
}

/// Other listings of the same type, closest in price first.
fn comparables(property: &Property, listings: &[&Property]) -> Markup {
    let mut similar: Vec<&Property> = listings
        .iter()
        .copied()
        .filter(|p| p.id != property.id && p.property_type == property.property_type)
        .collect();
    let target = property.price.unwrap_or_default();
    similar.sort_by_key(|p| p.price.map_or(i64::MAX, |price| (price - target).abs()));
    similar.truncate(MAX_COMPARABLES);

    html! {
        @if similar.is_empty() {
            p class="empty" { "No comparable listings in view." }
        } @else {
            ul class="comparables" {
                @for p in &similar {
                    li {
                        a href={ "/?selected=" (p.id) "&tab=comparables" } { (p.address_label()) }
                        " " (p.price_label())
                    }
                }
            }
        }
    }
}
