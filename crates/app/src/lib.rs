//! Habitrack application composition root
//!
//! Wires configuration, the database pool and the identity provider into the
//! habits router and the shared infrastructure routes.

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use habitrack_auth::{AuthBackend, AuthConfig};
use habitrack_common::Config;
use habitrack_habits::{HabitsRepositories, HabitsState};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Largest accepted request body; every payload here is a small JSON document
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the main application router from configuration and a pool
pub fn create_app(config: &Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let auth = AuthBackend::connect(pool.clone(), AuthConfig::from(config))
        .map_err(|e| anyhow::anyhow!("Identity provider client setup failed: {}", e))?;

    let state = HabitsState {
        repos: HabitsRepositories::new(pool),
        auth,
    };

    Ok(build_router(state))
}

/// Compose domain routers with shared infrastructure routes
pub fn build_router(state: HabitsState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .merge(habitrack_habits::routes().with_state(state))
}

/// Wrap the router in the HTTP middleware stack shared by both binaries.
///
/// The body limit must stay outermost: `Cors` needs a `Default` response
/// body, which the limit's `ResponseBody` does not provide.
pub fn with_http_layers(app: Router, cors_origins: &str) -> Router {
    app.layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
        .layer(body_limit_layer())
}

/// CORS layer from a comma separated origin list, or `*` for any origin
pub fn build_cors_layer(origins: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

pub fn body_limit_layer() -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(MAX_BODY_BYTES)
}

/// GET /api/health
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
