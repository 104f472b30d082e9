use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{Extension, Json, Router, http::Uri};
use serde_json::{Value, json};

use portalguard_core::{Clock, SystemClock};
use portalguard_gateway::{Gateway, GatewayConfig, GatewayContext, InMemoryVerificationCache, app};
use portalguard_identity::IdentityClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    portalguard_observability::init();

    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    let identity = IdentityClient::new(config.identity.clone()).context("failed to build identity client")?;

    let cache = Arc::new(InMemoryVerificationCache::new(config.cache.eviction));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    if let Some(secs) = config.cache.sweep_interval_secs.filter(|s| *s > 0) {
        spawn_sweeper(cache.clone(), clock.clone(), Duration::from_secs(secs));
    }

    let bind_addr = config.bind_addr.clone();
    let gateway = Arc::new(Gateway::new(config, cache, Arc::new(identity), clock));
    let app = app::build_app(gateway, portal());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_sweeper(cache: Arc<InMemoryVerificationCache>, clock: Arc<dyn Clock>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = cache.sweep_expired(clock.now().timestamp_millis());
            if removed > 0 {
                tracing::debug!(removed, "swept stale verification entries");
            }
        }
    });
}

/// Stand-in for the portal's own content: echoes what the gateway decided.
fn portal() -> Router {
    Router::new().fallback(portal_fallback)
}

async fn portal_fallback(uri: Uri, context: Option<Extension<GatewayContext>>) -> Json<Value> {
    let authenticated = context
        .as_ref()
        .and_then(|Extension(ctx)| ctx.credential())
        .is_some();
    Json(json!({
        "path": uri.path(),
        "authenticated": authenticated,
    }))
}
