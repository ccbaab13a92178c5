use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::clock::SystemClock;
use crate::derive::{GeocodeError, Geocoder, LocationResolver, NoGeocoder, NominatimGeocoder};
use crate::query::QueryEngine;
use crate::refresh::{HttpFeedSource, RefreshError, Refresher};
use crate::series::{FileStore, KeyValueStore, MemoryStore, SeriesStore};

use super::api::epochs as epoch_handlers;
use super::api::now as now_handlers;
use super::api::refresh as refresh_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;
use super::state::AppState;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("feed client: {0}")]
    Feed(#[from] RefreshError),
    #[error("geocoder client: {0}")]
    Geocoder(#[from] GeocodeError),
}

/// Wire the store, query engine and refresher from configuration, and load
/// whatever series was persisted by a previous run.
pub async fn build_state(config: &Config) -> Result<AppState, ServerError> {
    let persistence: Arc<dyn KeyValueStore> = match &config.persistence.folder {
        Some(folder) => {
            log::info!("Persisting series under {}", folder.display());
            Arc::new(FileStore::new(folder.clone()))
        }
        None => {
            log::info!("No persistence folder configured, keeping series in memory");
            Arc::new(MemoryStore::new())
        }
    };
    let store = Arc::new(SeriesStore::new(persistence));
    if let Err(e) = store.rehydrate().await {
        log::warn!("Ignoring persisted series: {}", e);
    }

    let geocoder: Arc<dyn Geocoder> = if config.geocoder.enabled {
        Arc::new(NominatimGeocoder::new(
            config.geocoder.url.clone(),
            &config.geocoder.user_agent,
        )?)
    } else {
        Arc::new(NoGeocoder)
    };
    let locator = LocationResolver::new(geocoder, config.geocoder.timeout);

    let clock = Arc::new(SystemClock);
    let engine = QueryEngine::new(store.clone(), locator, clock.clone());

    let source = Arc::new(HttpFeedSource::new(config.feed.timeout)?);
    let refresher = Refresher::new(source, config.feed.url.clone(), store, clock);

    Ok(AppState {
        engine: Arc::new(engine),
        refresher: Arc::new(refresher),
    })
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/epochs", get(epoch_handlers::list_epochs))
        .route("/epochs/{epoch}", get(epoch_handlers::get_state_vector))
        .route("/epochs/{epoch}/speed", get(epoch_handlers::get_speed))
        .route("/epochs/{epoch}/location", get(epoch_handlers::get_location))
        .route("/now", get(now_handlers::get_now))
        .route("/refresh", post(refresh_handlers::trigger))
        .route("/refresh/status", get(refresh_handlers::status))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> Result<(), ServerError> {
    let bind_addr = config.web.bind.clone();
    let state = build_state(&config).await?;

    state.refresher.clone().start(config.refresh.interval);

    let app = build_router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
