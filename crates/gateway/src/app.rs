use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::{Gateway, middleware};

/// Wrap `portal` (the protected application) with the gateway.
///
/// The gateway layer covers every route, `/health` included; the route
/// classifier is what lets health probes through without a credential.
pub fn build_app(gateway: Arc<Gateway>, portal: Router) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(portal)
        .layer(axum::middleware::from_fn_with_state(
            gateway,
            middleware::gateway_middleware,
        ))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
