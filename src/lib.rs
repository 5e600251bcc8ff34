pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;
pub mod store;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::state::AppState;

/// Assemble the full router. The credential verifier is applied per method
/// router: `/api/games/:id` carries gated PUT/DELETE next to the ungated
/// PATCH, so the gate cannot be a whole-group layer.
pub fn app(state: AppState) -> Router {
    let verify = from_fn_with_state(state.clone(), middleware::auth::auth_middleware);

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/games",
            get(handlers::games::list)
                .post(handlers::games::create)
                .route_layer(verify.clone()),
        )
        .route(
            "/api/games/recommendations",
            get(handlers::games::recommendations),
        )
        .route("/api/games/trending", get(handlers::games::trending))
        .route(
            "/api/games/:id",
            put(handlers::games::update)
                .delete(handlers::games::remove)
                .route_layer(verify.clone())
                .patch(handlers::games::patch),
        )
        .route(
            "/api/studies",
            get(handlers::studies::list)
                .post(handlers::studies::create)
                .route_layer(verify.clone()),
        )
        .route(
            "/api/studies/:id",
            put(handlers::studies::update)
                .delete(handlers::studies::remove)
                .route_layer(verify),
        );

    let router = if state.config.security.enable_cors {
        router.layer(cors_layer(&state.config.security))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Planbook API",
        "version": version,
        "description": "Personal planning API for game and study schedules",
        "endpoints": {
            "auth": "/api/auth/register, /api/auth/login (public)",
            "games": "/api/games[/:id] (bearer token)",
            "studies": "/api/studies[/:id] (bearer token)",
            "recommendations": "/api/games/recommendations",
            "trending": "/api/games/trending (public)",
            "health": "/health (public)"
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.users.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": "unavailable"
                })),
            )
        }
    }
}
