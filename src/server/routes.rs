//! Request routing
//!
//! Pure mapping from `(method, path)` to a response, independent of the
//! connection handling in [`super::HealthServer`].

use std::collections::BTreeMap;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Method, Response, StatusCode};
use tracing::{debug, error};

use crate::domain::context::ProbeContext;
use crate::domain::ports::MetricsSink;
use crate::domain::probe::ProbeCategory;
use crate::service::HealthService;

pub const METRICS_ENDPOINT: &str = "/metrics";
pub const INDEX_ENDPOINT: &str = "/";

const JSON: &str = "application/json";

/// Endpoint name to path, as served on `/`.
pub fn endpoints() -> BTreeMap<&'static str, &'static str> {
    let mut endpoints: BTreeMap<_, _> = ProbeCategory::ALL
        .iter()
        .map(|c| (c.endpoint_name(), c.endpoint()))
        .collect();
    endpoints.insert("metrics", METRICS_ENDPOINT);
    endpoints
}

/// Answer one request. Probe rounds run under `ctx`.
pub async fn route(
    service: &HealthService,
    ctx: &ProbeContext,
    method: &Method,
    path: &str,
) -> Response<Full<Bytes>> {
    if *method != Method::GET && *method != Method::HEAD {
        let mut response = empty(StatusCode::METHOD_NOT_ALLOWED);
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
        return response;
    }

    match ProbeCategory::from_endpoint(path) {
        Some(ProbeCategory::OnDemand) => health(service, ctx).await,
        Some(category) => {
            let report = service.execute_category(ctx, category).await;
            debug!(kind = %category, outcome = %report.outcome, "Probe endpoint served");
            if report.is_healthy() {
                empty(StatusCode::NO_CONTENT)
            } else {
                empty(StatusCode::SERVICE_UNAVAILABLE)
            }
        }
        None => match path {
            METRICS_ENDPOINT => metrics(service),
            INDEX_ENDPOINT => json(StatusCode::OK, serde_json::to_vec(&endpoints())),
            _ => empty(StatusCode::NOT_FOUND),
        },
    }
}

/// Every registered probe with its result; always 200.
async fn health(service: &HealthService, ctx: &ProbeContext) -> Response<Full<Bytes>> {
    let report = service
        .execute_category(ctx, ProbeCategory::OnDemand)
        .await;
    json(StatusCode::OK, serde_json::to_vec(&report.results))
}

fn metrics(service: &HealthService) -> Response<Full<Bytes>> {
    match service.metrics().exposition() {
        Ok(exposition) => {
            let content_type = HeaderValue::from_str(&exposition.content_type)
                .unwrap_or_else(|_| HeaderValue::from_static("text/plain"));
            let mut response = Response::new(Full::new(exposition.body));
            response.headers_mut().insert(CONTENT_TYPE, content_type);
            response
        }
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            empty(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn json(status: StatusCode, body: serde_json::Result<Vec<u8>>) -> Response<Full<Bytes>> {
    match body {
        Ok(body) => {
            let mut response = Response::new(Full::new(Bytes::from(body)));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
            response
        }
        Err(e) => {
            error!(error = %e, "Failed to serialize response");
            empty(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn empty(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
