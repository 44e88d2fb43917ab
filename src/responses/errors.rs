use crate::errors::ServerError;
use crate::responses::json::json_response_with_status;
use crate::templates::components::error_page;
use astra::{Body, Response, ResponseBuilder};
use serde_json::json;
use tracing::{error, warn};

pub use crate::errors::ResultResp;

/// Convert a ServerError into a proper HTML response
pub fn error_to_response(err: ServerError) -> Response {
    log_error(&err);
    let status = err.status();
    let body = error_page(status, &public_message(&err)).into_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}

/// Same as `error_to_response`, for the JSON API.
pub fn json_error_response(err: ServerError) -> Response {
    log_error(&err);
    let status = err.status();

    json_response_with_status(status, &json!({ "error": public_message(&err) }))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}

// Server-side failures are logged in full but not shown to visitors.
fn public_message(err: &ServerError) -> String {
    match err {
        ServerError::NotFound | ServerError::BadRequest(_) => err.to_string(),
        _ => "Internal Server Error".to_string(),
    }
}

fn log_error(err: &ServerError) {
    if err.status() >= 500 {
        error!("request failed: {err}");
    } else {
        warn!("request rejected: {err}");
    }
}
