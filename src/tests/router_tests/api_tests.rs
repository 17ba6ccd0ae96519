// src/tests/router_tests/api_tests.rs
use crate::errors::ServerError;
use crate::router::handle;
use crate::config::AppConfig;
use crate::router::AppState;
use crate::tests::utils::{body_json, request, test_state, FailingResearch};
use astra::Body;
use http::Method;

#[test]
fn properties_endpoint_returns_demo_listings() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state();
    let mut resp = handle(request(Method::GET, "/api/properties", Body::empty()), &state)?;

    assert_eq!(resp.status(), 200);
    let content_type = resp
        .headers()
        .get("Content-Type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert_eq!(content_type, "application/json");

    let listings = body_json(&mut resp);
    let listings = listings.as_array().unwrap();
    assert!(!listings.is_empty());
    assert!(listings.iter().all(|p| p["isDemo"] == true));
    assert!(listings.iter().all(|p| p["coordinates"]["lat"].is_f64()));
    Ok(())
}

#[test]
fn properties_endpoint_applies_price_filter() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state();
    let mut all = handle(request(Method::GET, "/api/properties", Body::empty()), &state)?;
    let all = body_json(&mut all).as_array().unwrap().len();

    let uri = "/api/properties?priceMin=%24400%2C000&bedrooms=any";
    let mut resp = handle(request(Method::GET, uri, Body::empty()), &state)?;
    let filtered = body_json(&mut resp);
    let filtered = filtered.as_array().unwrap();

    assert!(filtered.len() <= all);
    assert!(filtered.iter().all(|p| p["price"].as_i64().unwrap() >= 400_000));
    Ok(())
}

#[test]
fn inverted_price_range_returns_empty_list() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state();
    let uri = "/api/properties?priceMin=900000&priceMax=100000";
    let mut resp = handle(request(Method::GET, uri, Body::empty()), &state)?;
    assert_eq!(body_json(&mut resp), serde_json::json!([]));
    Ok(())
}

#[test]
fn single_property_by_id_and_unknown_id() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state();
    let mut list = handle(request(Method::GET, "/api/properties", Body::empty()), &state)?;
    let first_id = body_json(&mut list)[0]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/properties/{first_id}");
    let mut resp = handle(request(Method::GET, &uri, Body::empty()), &state)?;
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(&mut resp)["id"], first_id.as_str());

    let missing = handle(
        request(Method::GET, "/api/properties/nope", Body::empty()),
        &state,
    );
    assert!(matches!(missing, Err(ServerError::NotFound)));
    Ok(())
}

#[test]
fn radius_search_clamps_radius_and_centers_on_request() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state();
    let uri = "/api/search/radius?lat=29.77&lng=-95.38&radius=500";
    let mut resp = handle(request(Method::POST, uri, Body::empty()), &state)?;

    let payload = body_json(&mut resp);
    assert_eq!(payload["query"]["type"], "circle");
    assert!((payload["query"]["radiusMiles"].as_f64().unwrap() - 50.0).abs() < 1e-9);
    assert_eq!(payload["query"]["center"]["lat"], 29.77);
    assert!(payload["results"].is_array());
    Ok(())
}

#[test]
fn radius_search_defaults_center_and_radius() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state();
    let uri = "/api/search/radius?radius=abc";
    let mut resp = handle(request(Method::POST, uri, Body::empty()), &state)?;

    let payload = body_json(&mut resp);
    assert!((payload["query"]["radiusMiles"].as_f64().unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(payload["query"]["center"]["lat"], 29.7604);
    Ok(())
}

#[test]
fn radius_search_rejects_half_a_center() {
    let state = test_state();
    let resp = handle(
        request(Method::POST, "/api/search/radius?lat=29.7", Body::empty()),
        &state,
    );
    assert!(matches!(resp, Err(ServerError::BadRequest(_))));

    let resp = handle(
        request(Method::POST, "/api/search/radius?lat=95&lng=10", Body::empty()),
        &state,
    );
    assert!(matches!(resp, Err(ServerError::BadRequest(_))));
}

#[test]
fn research_returns_normalized_property() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state();
    let body = Body::from(r#"{"prompt":"12 Oak St, Houston, TX","intelligenceLevel":"essential"}"#);
    let mut resp = handle(request(Method::POST, "/api/research", body), &state)?;

    let property = body_json(&mut resp);
    assert_eq!(property["id"], "clip-7");
    assert_eq!(property["price"], 410_000);
    assert_eq!(property["coordinates"]["lng"], -95.39);
    assert_eq!(property["isDemo"], false);
    Ok(())
}

#[test]
fn research_rejects_bad_input() {
    let state = test_state();
    let resp = handle(
        request(Method::POST, "/api/research", Body::from(r#"{"prompt":"  "}"#)),
        &state,
    );
    assert!(matches!(resp, Err(ServerError::BadRequest(_))));

    let resp = handle(
        request(Method::POST, "/api/research", Body::from("not json")),
        &state,
    );
    assert!(matches!(resp, Err(ServerError::BadRequest(_))));
}

#[test]
fn research_outage_is_a_bad_gateway() {
    use crate::templates::html_error_response;

    let state = AppState::new(AppConfig::default(), Box::new(FailingResearch), None);
    let body = Body::from(r#"{"prompt":"12 Oak St, Houston, TX"}"#);
    let err = match handle(request(Method::POST, "/api/research", body), &state) {
        Err(err) => err,
        Ok(resp) => panic!("expected an upstream error, got {}", resp.status()),
    };

    assert!(matches!(err, ServerError::Upstream(ref msg) if msg.contains("connection refused")));
    assert_eq!(html_error_response(err).status(), 502);
}

#[test]
fn unknown_route_is_not_found() {
    let state = test_state();
    let resp = handle(request(Method::DELETE, "/", Body::empty()), &state);
    assert!(matches!(resp, Err(ServerError::NotFound)));
}
