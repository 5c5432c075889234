//! Random slowdown middleware for testing clients against a sluggish server

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::IntoResponse;
use rand::Rng;
use std::time::Duration;

/// Delays every request by a uniformly random time of up to 3 seconds.
pub async fn slowdown_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let delay_ms = rand::rng().random_range(0..3000u64);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    next.run(request).await
}
