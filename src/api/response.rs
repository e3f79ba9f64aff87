// API response utility functions module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::config::HttpConfig;
use crate::logger;

/// Build JSON response
pub fn json_response<T: Serialize + ?Sized>(
    status: StatusCode,
    body: &T,
    http: &HttpConfig,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string_pretty(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return plain_error_response();
        }
    };

    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Server", &http.server_name);
    if http.enable_cors {
        builder = builder.header("Access-Control-Allow-Origin", "*");
    }

    builder
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            plain_error_response()
        })
}

/// JSON error body with the given status
pub fn error_response(status: StatusCode, message: &str, http: &HttpConfig) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message });
    json_response(status, &body, http)
}

/// 400 Bad Request response
pub fn bad_request(message: &str, http: &HttpConfig) -> Response<Full<Bytes>> {
    error_response(StatusCode::BAD_REQUEST, message, http)
}

/// 404 Not Found response listing the available endpoints
pub fn not_found(http: &HttpConfig) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "available_endpoints": [
            "/", "/health", "/data/info", "/stats",
            "/top-pickup-zones", "/top-dropoff-zones",
            "/hourly-trips", "/daily-trips", "/payment-breakdown",
            "/heatmap", "/tip-stats", "/tip-by-borough", "/zone-pickups"
        ]
    });
    json_response(StatusCode::NOT_FOUND, &body, http)
}

/// 405 Method Not Allowed response (all endpoints are read-only)
pub fn method_not_allowed(http: &HttpConfig) -> Response<Full<Bytes>> {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed", http)
}

/// Preflight response for CORS-enabled deployments
pub fn options_response(http: &HttpConfig) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "GET, OPTIONS")
        .header("Server", &http.server_name);
    if http.enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, OPTIONS")
            .header("Access-Control-Allow-Headers", "*");
    }
    builder
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| plain_error_response())
}

fn plain_error_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(r#"{"error":"Internal server error"}"#)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))))
}
