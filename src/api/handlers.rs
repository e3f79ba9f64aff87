// Endpoint handlers module
// Each handler runs one fixed aggregation through the shared engine

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;

use super::response::{bad_request, error_response, json_response};
use crate::config::AppState;
use crate::engine::EngineError;
use crate::logger;

fn ok_json<T: Serialize + ?Sized>(state: &AppState, body: &T) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, body, &state.config.http)
}

fn engine_failure(state: &AppState, context: &str, err: &EngineError) -> Response<Full<Bytes>> {
    logger::log_error(&format!("{context}: {err}"));
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &format!("{context} failed"),
        &state.config.http,
    )
}

/// Fixed status payload, independent of dataset state
pub fn root(state: &AppState) -> Response<Full<Bytes>> {
    ok_json(
        state,
        &json!({"status": "ok", "message": "NYC Taxi Analytics API"}),
    )
}

/// Fixed health payload, independent of dataset state
pub fn health(state: &AppState) -> Response<Full<Bytes>> {
    ok_json(state, &json!({"status": "healthy"}))
}

pub fn data_info(state: &AppState) -> Response<Full<Bytes>> {
    match state.engine.data_info() {
        Ok(info) => ok_json(state, &info),
        Err(e) => engine_failure(state, "dataset info query", &e),
    }
}

pub fn stats(state: &AppState) -> Response<Full<Bytes>> {
    match state.engine.stats() {
        Ok(stats) => ok_json(state, &stats),
        Err(e) => engine_failure(state, "summary stats query", &e),
    }
}

pub fn top_pickup_zones(state: &AppState, query: Option<&str>) -> Response<Full<Bytes>> {
    let limit = match super::parse_limit(query) {
        Ok(limit) => limit,
        Err(message) => return bad_request(&message, &state.config.http),
    };
    match state.engine.top_pickup_zones(limit) {
        Ok(zones) => ok_json(state, &zones),
        Err(e) => engine_failure(state, "top pickup zones query", &e),
    }
}

pub fn top_dropoff_zones(state: &AppState, query: Option<&str>) -> Response<Full<Bytes>> {
    let limit = match super::parse_limit(query) {
        Ok(limit) => limit,
        Err(message) => return bad_request(&message, &state.config.http),
    };
    match state.engine.top_dropoff_zones(limit) {
        Ok(zones) => ok_json(state, &zones),
        Err(e) => engine_failure(state, "top dropoff zones query", &e),
    }
}

pub fn hourly_trips(state: &AppState) -> Response<Full<Bytes>> {
    match state.engine.hourly_trips() {
        Ok(hours) => ok_json(state, &hours),
        Err(e) => engine_failure(state, "hourly trips query", &e),
    }
}

pub fn daily_trips(state: &AppState) -> Response<Full<Bytes>> {
    match state.engine.daily_trips() {
        Ok(days) => ok_json(state, &days),
        Err(e) => engine_failure(state, "daily trips query", &e),
    }
}

pub fn payment_breakdown(state: &AppState) -> Response<Full<Bytes>> {
    match state.engine.payment_breakdown() {
        Ok(breakdown) => ok_json(state, &breakdown),
        Err(e) => engine_failure(state, "payment breakdown query", &e),
    }
}

pub fn heatmap(state: &AppState) -> Response<Full<Bytes>> {
    match state.engine.heatmap() {
        Ok(cells) => ok_json(state, &cells),
        Err(e) => engine_failure(state, "heatmap query", &e),
    }
}

pub fn tip_stats(state: &AppState) -> Response<Full<Bytes>> {
    match state.engine.tip_stats() {
        Ok(tips) => ok_json(state, &tips),
        Err(e) => engine_failure(state, "tip stats query", &e),
    }
}

pub fn tip_by_borough(state: &AppState) -> Response<Full<Bytes>> {
    match state.engine.tip_by_borough() {
        Ok(boroughs) => ok_json(state, &boroughs),
        Err(e) => engine_failure(state, "tip by borough query", &e),
    }
}

pub fn zone_pickups(state: &AppState) -> Response<Full<Bytes>> {
    match state.engine.zone_pickups() {
        Ok(pickups) => ok_json(state, &pickups),
        Err(e) => engine_failure(state, "zone pickups query", &e),
    }
}
