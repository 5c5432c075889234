use anyhow::Result;
use std::time::Duration;

use tracing::{error, info};

use crate::frame_store::{StoreError, StoreResult};
use crate::photoframes::FrameManager;
use tower_http::services::ServeDir;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

#[cfg(feature = "slowdown")]
use super::slowdown_request;
use super::{
    album_routes::make_album_routes, frame_routes::make_frame_routes, log_requests, state::*,
    ServerConfig,
};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub(super) fn store_error_response(err: StoreError) -> Response {
    let status = match &err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::DuplicateMembership { .. }
        | StoreError::AlbumAlreadySplit { .. }
        | StoreError::IntegrityConflict(_) => StatusCode::CONFLICT,
        StoreError::SubAlbumNotSplittable(_) | StoreError::FrameManagedByFrameset { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        StoreError::Database(_) => {
            error!("Store failure: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string()).into_response()
}

pub(super) fn json_response<T: Serialize>(result: StoreResult<T>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) fn created_response<T: Serialize>(result: StoreResult<T>) -> Response {
    match result {
        Ok(value) => (StatusCode::CREATED, Json(value)).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) fn empty_response(result: StoreResult<()>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => store_error_response(err),
    }
}

pub fn make_app(config: ServerConfig, manager: Arc<FrameManager>) -> Result<Router> {
    let state = ServerState::new(config.clone(), manager);

    let mut app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest(
            "/v1",
            make_album_routes(state.clone()).merge(make_frame_routes(state.clone())),
        );

    if let Some(image_dir) = &config.image_dir {
        app = app.nest_service("/images", ServeDir::new(image_dir));
    }

    #[cfg(feature = "slowdown")]
    {
        app = app.layer(middleware::from_fn(slowdown_request));
    }
    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(config: ServerConfig, manager: Arc<FrameManager>) -> Result<()> {
    let port = config.port;
    let app = make_app(config, manager)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    info!("Ready to serve at port {}!", port);

    Ok(axum::serve(listener, app).await?)
}
