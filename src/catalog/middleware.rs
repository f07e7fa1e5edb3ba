use std::time::Instant;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;
use crate::core::controller::server_error;
use crate::core::library::CONTENT_TYPE_MUST_BE_JSON;

// log_request tags each request with an id that is echoed back as x-request-id
pub(crate) async fn log_request<B>(req: Request<B>, next: Next<B>) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();
    let span = info_span!("request", request_id = request_id.as_str());
    let mut res = next.run(req).instrument(span).await;
    info!(request_id = request_id.as_str(), method = %method, path = path.as_str(),
        status = res.status().as_u16(), latency_ms = started.elapsed().as_millis() as u64, "handled request");
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        res.headers_mut().insert("x-request-id", value);
    }
    res
}

// content_type_check rejects POST and PUT bodies that are not declared as JSON
pub(crate) async fn content_type_check<B>(req: Request<B>, next: Next<B>) -> Response {
    if (req.method() == Method::POST || req.method() == Method::PUT) && !is_json(&req) {
        return server_error(StatusCode::BAD_REQUEST, CONTENT_TYPE_MUST_BE_JSON).into_response();
    }
    next.run(req).await
}

// media type parameters such as charset are ignored
fn is_json<B>(req: &Request<B>) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
