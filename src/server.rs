use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::Method,
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tracing::{error, info, warn};

use crate::{
    aladhan::AladhanClient,
    config::Config,
    error::ProxyError,
    query::{PrayerRequest, PrayerResult},
    service::PrayerService,
};

pub struct AppState {
    pub service: PrayerService,
}

impl AppState {
    pub fn from_config(config: &Config) -> Arc<Self> {
        let provider = AladhanClient::new(&config.upstream.base_url, config.upstream.method);
        Arc::new(Self {
            service: PrayerService::new(Arc::new(provider)),
        })
    }
}

/// Routes of the proxy, without a listener attached
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(health_handler))
        .route("/api/getPrayerTimes", post(prayer_times_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config);

    let address = format!("0.0.0.0:{}", config.server.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "message": "Islamic Prayer Times API is running!" }))
}

pub async fn prayer_times_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PrayerResult>, ProxyError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!("Rejected prayer times body: {}", rejection.body_text());
        ProxyError::Validation("City and country are required fields".to_string())
    })?;

    let query = PrayerRequest::validate_json(&body)?;

    match state.service.get_prayer_times(query).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            error!("Error in /getPrayerTimes endpoint: {}", e);
            Err(e)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
