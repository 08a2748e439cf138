use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use server_api::{
    submit_contact, ApiContext, AppendLogSink, FanoutSink, RecordingSink, TracingSink,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{
        contact_route, healthz_route, ContactRequest, ContactResponse, MALFORMED_BODY_MESSAGE,
    },
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let sink = build_sink(&settings).await?;
    let state = AppState {
        api: ApiContext::new(sink),
    };
    let app = build_router(Arc::new(state), &settings)?;

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn build_sink(settings: &Settings) -> anyhow::Result<Arc<dyn RecordingSink>> {
    let Some(path) = settings.record_path.as_deref() else {
        return Ok(Arc::new(TracingSink));
    };

    let log = AppendLogSink::open(path).await.map_err(|error| {
        error!(
            %path,
            %error,
            "failed to open record log; verify the directory is writable"
        );
        error
    })?;
    info!(path = %log.path().display(), "recording submissions to append log");

    let sinks: Vec<Arc<dyn RecordingSink>> = vec![Arc::new(TracingSink), Arc::new(log)];
    Ok(Arc::new(FanoutSink::new(sinks)))
}

fn build_router(state: Arc<AppState>, settings: &Settings) -> anyhow::Result<Router> {
    Ok(Router::new()
        .route(healthz_route(), get(healthz))
        .route(contact_route(), post(http_submit_contact))
        .layer(RequestBodyLimitLayer::new(settings.max_body_bytes))
        .layer(cors_layer(&settings.allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid allowed origin '{origin}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_submit_contact(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>, (StatusCode, Json<ContactResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(
            status = %rejection.status(),
            reason = %rejection.body_text(),
            "undecodable contact request body"
        );
        (
            rejection.status(),
            Json(ContactResponse::from(ApiError::new(
                ErrorCode::MalformedBody,
                MALFORMED_BODY_MESSAGE,
            ))),
        )
    })?;

    let response = submit_contact(&state.api, request)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ContactResponse::from(e))))?;
    Ok(Json(response))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/submission_flow_tests.rs"]
mod submission_flow_tests;
