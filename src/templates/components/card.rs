use crate::domain::Property;
use maud::{html, Markup};

pub fn property_card(property: &Property, selected: bool) -> Markup {
    html! {
        article class=(if selected { "card property-card selected" } else { "card property-card" })
            data-property-id=(property.id)
        {
            img src=(property.primary_image()) alt=(property.address_label()) loading="lazy";
            div class="card-body" {
                h2 { (property.price_label()) }
                p class="address" { (property.address_label()) }
                ul class="facts" {
                    @if let Some(beds) = property.beds {
                        li { (beds) " bd" }
                    }
                    @if let Some(baths) = property.baths {
                        li { (baths) " ba" }
                    }
                    @if let Some(sqft) = property.sqft {
                        li { (sqft) " sqft" }
                    }
                    li { (property.property_type.label()) }
                }
                @if let Some(cap_rate) = property.metrics.cap_rate {
                    p class="metric" { "Cap rate " (format!("{cap_rate:.2}")) "%" }
                }
                @if property.is_demo {
                    span class="badge" { "Demo data" }
                }
                a href={ "/api/properties/" (property.id) } { "Details" }
            }
        }
    }
}
