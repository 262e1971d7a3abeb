//! The provider's HTTP admin surface: `/healthz` (liveness,
//! always 200), `/readyz` (200 only when the hypervisor session is valid or
//! recoverable), `/health` (JSON detail), and a Prometheus metrics endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Serialize;

/// Implemented by whatever holds the hypervisor session (the vSphere
/// backend), so the admin surface never needs to know about vSphere
/// specifically.
#[async_trait]
pub trait SessionHealth: Send + Sync {
    /// Whether the upstream hypervisor session can be established or
    /// recovered right now. Never panics; a failed probe returns `false`.
    async fn is_ready(&self) -> bool;

    /// A short human-readable status line for `/health`.
    async fn detail(&self) -> String;
}

#[derive(Clone)]
pub struct AdminState {
    health: Arc<dyn SessionHealth>,
    registry: Registry,
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    detail: String,
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

async fn readyz(State(state): State<AdminState>) -> impl IntoResponse {
    if state.health.is_ready().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn health(State(state): State<AdminState>) -> impl IntoResponse {
    let ready = state.health.is_ready().await;
    let detail = state.health.detail().await;
    let body = HealthBody {
        status: if ready { "ready" } else { "not-ready" },
        detail,
    };
    (StatusCode::OK, Json(body))
}

async fn metrics(State(state): State<AdminState>) -> impl IntoResponse {
    let metric_families = state.registry.gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, String::new());
    }
    (
        StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

pub fn router(health: Arc<dyn SessionHealth>, registry: Registry) -> Router {
    let state = AdminState { health, registry };
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct AlwaysReady;

    #[async_trait]
    impl SessionHealth for AlwaysReady {
        async fn is_ready(&self) -> bool {
            true
        }

        async fn detail(&self) -> String {
            "session ok".to_string()
        }
    }

    struct NeverReady;

    #[async_trait]
    impl SessionHealth for NeverReady {
        async fn is_ready(&self) -> bool {
            false
        }

        async fn detail(&self) -> String {
            "no session established".to_string()
        }
    }

    #[tokio::test]
    async fn healthz_is_always_200() {
        let app = router(Arc::new(NeverReady), Registry::new());
        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readyz_reflects_session_health() {
        let app = router(Arc::new(AlwaysReady), Registry::new());
        let response = app
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let app = router(Arc::new(NeverReady), Registry::new());
        let response = app
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
