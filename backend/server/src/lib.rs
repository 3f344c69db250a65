//! Single-profile management backend.
//!
//! A small HTTP JSON API over one stored profile record: create-or-update
//! keyed by email, fetch, partial update, delete, and a diagnostic count.
//! Responses share one envelope shape (`success`/`message`/`data`/`errors`).
//!
//! # Layers
//!
//! - [`validation`] - request-level rules, all fields checked independently
//! - [`model`] - the persisted record and its storage-layer constraints
//! - [`service`] - the upsert/get/update/delete/count operations
//! - [`store`] / [`database`] - document store seam and its Redis backend
//! - [`routes`] - HTTP controllers shaping the JSON envelope
//!
//! The application is deliberately single-profile: reads, updates, and
//! deletes address "the first stored record" rather than an id, and the
//! upsert is the only email-addressed operation.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::get,
};
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod model;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod validation;

use config::Config;
use routes::{
    api_index, create_profile, delete_profile, get_profile, health_check, profile_stats,
    route_not_found, update_profile,
};
use state::State;

/// Builds the full router for a given state; the test suite drives this
/// directly without binding a socket.
pub fn app(state: Arc<State>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_check))
        .route("/api", get(api_index))
        .route(
            "/api/profile",
            get(get_profile)
                .post(create_profile)
                .put(update_profile)
                .delete(delete_profile),
        )
        .route("/api/profile/stats", get(profile_stats))
        .fallback(route_not_found)
        .layer(cors)
        .with_state(state)
}

/// Allows origins on the explicit allow-list plus anything on the hosting
/// platform's domain suffix. Requests without an `Origin` header are not
/// subject to CORS at all.
fn cors_layer(config: &Config) -> CorsLayer {
    let allowed = config.allowed_origins.clone();
    let suffix = config.origin_suffix.clone();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            let Ok(origin) = origin.to_str() else {
                return false;
            };
            allowed.iter().any(|allow| allow == origin) || origin.ends_with(suffix.as_str())
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new().await;

    info!("Starting server...");
    let app = app(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
