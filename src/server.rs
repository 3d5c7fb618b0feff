//! JSON HTTP API over the sync pipelines.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::detail::NeoDetail;
use crate::error::SyncError;
use crate::output::FeedResponse;
use crate::services::neo_api::{DateRange, NeoApi};
use crate::services::sync::{sync_detail, sync_feed};

pub type SharedApi = Arc<dyn NeoApi>;

#[derive(Debug, Deserialize)]
pub struct FeedRequest {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    pub asteroid_id: String,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub asteroid: NeoDetail,
}

pub fn router(api: SharedApi) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/asteroid-data", post(asteroid_data_handler))
        .route("/api/asteroid", post(asteroid_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(api)
}

/// POST /api/asteroid-data - scored feed for a date range
async fn asteroid_data_handler(
    State(api): State<SharedApi>,
    request: Result<Json<FeedRequest>, JsonRejection>,
) -> Result<Json<FeedResponse>, SyncError> {
    let Json(request) = request?;
    let range = DateRange::parse(&request.start_date, &request.end_date)?;
    let asteroids = sync_feed(api.as_ref(), range).await.inspect_err(|e| {
        error!(status = e.status(), error = %e, "Asteroid data sync failed");
    })?;

    Ok(Json(FeedResponse::new(asteroids)))
}

/// POST /api/asteroid - detail view for one object
async fn asteroid_handler(
    State(api): State<SharedApi>,
    request: Result<Json<LookupRequest>, JsonRejection>,
) -> Result<Json<DetailResponse>, SyncError> {
    let Json(request) = request?;
    let asteroid = sync_detail(api.as_ref(), &request.asteroid_id)
        .await
        .inspect_err(|e| {
            error!(id = %request.asteroid_id, status = e.status(), error = %e, "Asteroid lookup failed");
        })?;

    Ok(Json(DetailResponse { asteroid }))
}

pub async fn serve(port: u16, api: SharedApi) -> anyhow::Result<()> {
    let address = format!("0.0.0.0:{port}");
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, router(api))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
