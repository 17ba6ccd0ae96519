// src/tests/router_tests/page_tests.rs
use crate::router::handle;
use crate::tests::utils::{body_json, body_string, keyed_state, request, test_state};
use astra::Body;
use http::Method;

#[test]
fn map_page_without_key_shows_placeholder() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state();
    let mut resp = handle(request(Method::GET, "/", Body::empty()), &state)?;

    assert_eq!(resp.status(), 200);
    let html = body_string(&mut resp);
    assert!(html.contains("map-placeholder"));
    assert!(html.contains("MAPS_API_KEY"));
    assert!(!html.contains("maps.googleapis.com"));
    // listings still render below the placeholder
    assert!(html.contains("property-card"));
    Ok(())
}

#[test]
fn map_page_with_key_loads_the_sdk() -> Result<(), Box<dyn std::error::Error>> {
    let state = keyed_state();
    let mut resp = handle(request(Method::GET, "/", Body::empty()), &state)?;

    let html = body_string(&mut resp);
    assert!(html.contains("maps.googleapis.com/maps/api/js?key=test-key"));
    assert!(html.contains(r#"id="map-markers""#));
    assert!(!html.contains("map-placeholder"));
    Ok(())
}

#[test]
fn map_page_keeps_filter_values_and_warns_on_inverted_range() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state();
    let uri = "/?priceMin=900000&priceMax=100000&propertyType=condo";
    let mut resp = handle(request(Method::GET, uri, Body::empty()), &state)?;

    let html = body_string(&mut resp);
    assert!(html.contains(r#"value="900000""#));
    assert!(html.contains("Minimum price is above maximum price."));
    assert!(html.contains("No properties match these filters."));
    Ok(())
}

#[test]
fn map_page_marks_selected_listing() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state();
    let mut list = handle(request(Method::GET, "/api/properties", Body::empty()), &state)?;
    let id = body_json(&mut list)[1]["id"].as_str().unwrap().to_string();

    let uri = format!("/?selected={id}");
    let mut resp = handle(request(Method::GET, &uri, Body::empty()), &state)?;
    let html = body_string(&mut resp);
    assert!(html.contains(&format!(r#"class="card property-card selected" data-property-id="{id}""#)));
    Ok(())
}

#[test]
fn selected_listing_shows_detail_tabs() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state();
    let mut list = handle(request(Method::GET, "/api/properties", Body::empty()), &state)?;
    let id = body_json(&mut list)[0]["id"].as_str().unwrap().to_string();

    let uri = format!("/?selected={id}&tab=financials");
    let html = body_string(&mut handle(request(Method::GET, &uri, Body::empty()), &state)?);
    assert!(html.contains(r#"class="card detail""#));
    for slug in ["overview", "financials", "intelligence", "neighborhood", "comparables"] {
        assert!(html.contains(&format!("/?selected={id}&amp;tab={slug}")), "missing {slug} tab");
    }
    assert!(html.contains(&format!(
        r#"class="tab active" href="/?selected={id}&amp;tab=financials">Financials</a>"#
    )));
    assert!(html.contains("<dt>Cap rate</dt>"));

    // Unknown tabs fall back to the overview.
    let uri = format!("/?selected={id}&tab=photos");
    let html = body_string(&mut handle(request(Method::GET, &uri, Body::empty()), &state)?);
    assert!(html.contains(r#"data-tab="overview""#));

    // No selection, no detail panel.
    let html = body_string(&mut handle(request(Method::GET, "/?tab=financials", Body::empty()), &state)?);
    assert!(!html.contains(r#"class="card detail""#));
    Ok(())
}

#[test]
fn error_pages_carry_matching_status() {
    use crate::errors::ServerError;
    use crate::templates::html_error_response;

    assert_eq!(html_error_response(ServerError::NotFound).status(), 404);
    assert_eq!(html_error_response(ServerError::BadRequest("x".into())).status(), 400);
    assert_eq!(html_error_response(ServerError::Upstream("down".into())).status(), 502);

    let mut resp = html_error_response(ServerError::BadRequest("<b>bad</b>".into()));
    let html = body_string(&mut resp);
    assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
}
