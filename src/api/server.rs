//! HTTP API server

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{Access, OwnerParam, TokenKeys};
use crate::config::Config;
use crate::error::Result;
use crate::mail::Notifier;
use crate::store::{self, DocumentStore};

use super::routes;

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<TokenKeys>,
    pub notifier: Notifier,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, tokens: TokenKeys, notifier: Notifier) -> SharedState {
        Arc::new(Self {
            store,
            tokens: Arc::new(tokens),
            notifier,
        })
    }

    /// Build state from configuration, connecting to the configured store
    pub async fn from_config(config: &Config) -> Result<SharedState> {
        config.validate()?;
        let store = store::connect(&config.database).await?;
        tracing::info!("Using {} document store", store.backend());

        Ok(Self::new(
            store,
            TokenKeys::from_config(&config.auth),
            Notifier::from_config(&config.mail),
        ))
    }
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let state = AppState::from_config(&config).await?;
    serve(state, host, port).await
}

/// Serve an already built state
pub async fn serve(state: SharedState, host: &str, port: u16) -> Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let keys = &Arc::clone(&state.tokens);
    let own_email = Access::Owner(OwnerParam::Path("email"));

    Router::new()
        .route("/", get(routes::liveness))
        // Users
        .route("/user/{email}", Access::Public.apply(put(routes::upsert_user), keys))
        .route("/user/{email}", own_email.apply(get(routes::get_user), keys))
        .route("/users", Access::Bearer.apply(get(routes::list_users), keys))
        // Homes
        .route("/homes", Access::Public.apply(get(routes::list_homes), keys))
        .route("/homes", Access::Bearer.apply(post(routes::create_home), keys))
        .route("/homes", Access::Bearer.apply(put(routes::replace_home), keys))
        .route("/homes/{email}", own_email.apply(get(routes::list_host_homes), keys))
        .route("/home/{id}", Access::Public.apply(get(routes::get_home), keys))
        .route("/home/{id}", Access::Bearer.apply(delete(routes::delete_home), keys))
        // Bookings
        .route("/bookings", Access::Bearer.apply(post(routes::create_booking), keys))
        .route(
            "/bookings",
            Access::Owner(OwnerParam::Query("email")).apply(get(routes::list_bookings), keys),
        )
        .route("/booking/{id}", Access::Bearer.apply(get(routes::get_booking), keys))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
