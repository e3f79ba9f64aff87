// API module entry
// Read-only analytics endpoints over the taxi trip dataset

mod handlers;
mod response;

use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};

use crate::config::AppState;
use crate::logger;

/// Default record count for the top-zone endpoints
const DEFAULT_LIMIT: u32 = 10;

/// Analytics route handler
///
/// Dispatches to handler functions based on request path and method. All
/// endpoints are GET; OPTIONS is answered for CORS preflight.
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query();

    let response = match (&method, path.as_str()) {
        (&Method::OPTIONS, _) => response::options_response(&state.config.http),
        (&Method::GET, "/") => handlers::root(&state),
        (&Method::GET, "/health") => handlers::health(&state),
        (&Method::GET, "/data/info") => handlers::data_info(&state),
        (&Method::GET, "/stats") => handlers::stats(&state),
        (&Method::GET, "/top-pickup-zones") => handlers::top_pickup_zones(&state, query),
        (&Method::GET, "/top-dropoff-zones") => handlers::top_dropoff_zones(&state, query),
        (&Method::GET, "/hourly-trips") => handlers::hourly_trips(&state),
        (&Method::GET, "/daily-trips") => handlers::daily_trips(&state),
        (&Method::GET, "/payment-breakdown") => handlers::payment_breakdown(&state),
        (&Method::GET, "/heatmap") => handlers::heatmap(&state),
        (&Method::GET, "/tip-stats") => handlers::tip_stats(&state),
        (&Method::GET, "/tip-by-borough") => handlers::tip_by_borough(&state),
        (&Method::GET, "/zone-pickups") => handlers::zone_pickups(&state),
        (&Method::GET, _) => response::not_found(&state.config.http),
        _ => response::method_not_allowed(&state.config.http),
    };

    if state.cached_access_log.load(Ordering::Relaxed) {
        logger::log_api_request(method.as_str(), &path, response.status().as_u16());
    }

    Ok(response)
}

/// Parse the optional `limit` query parameter (`?limit=N`)
fn parse_limit(query: Option<&str>) -> Result<u32, String> {
    let Some(query) = query else {
        return Ok(DEFAULT_LIMIT);
    };
    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("limit=") {
            return value
                .parse::<u32>()
                .map_err(|_| format!("Invalid limit value: '{value}'"));
        }
    }
    Ok(DEFAULT_LIMIT)
}
