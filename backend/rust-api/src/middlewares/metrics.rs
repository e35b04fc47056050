use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

/// Records request count and latency for every HTTP request.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Normalize URL path to avoid cardinality explosion: numeric ids and
/// difficulty names in path position become placeholders. The difficulty
/// segment is client-chosen free text, so anything after `random` is
/// collapsed whether or not it parses as a known tier.
fn normalize_path(path: &str) -> String {
    let mut normalized = Vec::new();
    let mut prev = "";

    for segment in path.split('/') {
        let mapped = if is_numeric_id(segment) {
            "{id}"
        } else if prev == "random" {
            "{difficulty}"
        } else {
            segment
        };
        normalized.push(mapped);
        prev = segment;
    }

    normalized.join("/")
}

fn is_numeric_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
