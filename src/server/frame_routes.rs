//! Frame, frameset and device registration endpoints.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::server::{created_response, empty_response, json_response, store_error_response};
use super::state::{GuardedFrameManager, ServerState};
use crate::frame_store::Orientation;
use crate::photoframes::frame::FrameSettingsUpdate;
use crate::photoframes::frameset::FramesetUpdate;

#[derive(Deserialize)]
struct RegisterBody {
    pub frame_id: String,
    pub ip: Option<String>,
    pub freespace: Option<i64>,
}

#[derive(Deserialize)]
struct CreateFrameBody {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Deserialize)]
struct AlbumBindingBody {
    pub album_id: Option<String>,
}

#[derive(Deserialize)]
struct NavigateQuery {
    pub direction: String,
}

#[derive(Deserialize)]
struct CreateFramesetBody {
    pub name: String,
    #[serde(default)]
    pub orientation: Orientation,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FramesetListQuery {
    pub orientation: Option<Orientation>,
}

#[derive(Deserialize)]
struct FramesetFramesBody {
    pub frame_ids: Vec<String>,
}

/// POST /v1/register - Called by a frame on boot and on every check-in.
/// Responds with `[frame_id, [image names]]`.
async fn register(
    State(manager): State<GuardedFrameManager>,
    Json(body): Json<RegisterBody>,
) -> Response {
    match manager.register_frame(&body.frame_id, body.ip.as_deref(), body.freespace) {
        Ok(registration) => Json(json!([registration.frame_id, registration.images])).into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn list_frames(State(manager): State<GuardedFrameManager>) -> Response {
    json_response(manager.list_frames())
}

async fn post_frame(
    State(manager): State<GuardedFrameManager>,
    Json(body): Json<CreateFrameBody>,
) -> Response {
    created_response(manager.create_frame(body.id.as_deref(), &body.name))
}

async fn get_frame(State(manager): State<GuardedFrameManager>, Path(id): Path<String>) -> Response {
    json_response(manager.get_frame(&id))
}

async fn put_frame(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
    Json(body): Json<FrameSettingsUpdate>,
) -> Response {
    json_response(manager.update_frame_settings(&id, body))
}

async fn delete_frame(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
) -> Response {
    empty_response(manager.delete_frame(&id))
}

async fn get_frame_status(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
) -> Response {
    json_response(manager.frame_status(&id))
}

async fn put_frame_album(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
    Json(body): Json<AlbumBindingBody>,
) -> Response {
    json_response(manager.set_frame_album(&id, body.album_id.as_deref()))
}

/// POST /v1/frames/{id}/navigate?direction=next
async fn navigate(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
    Query(query): Query<NavigateQuery>,
) -> Response {
    empty_response(manager.navigate(&id, &query.direction))
}

async fn reboot(State(manager): State<GuardedFrameManager>, Path(id): Path<String>) -> Response {
    empty_response(manager.reboot(&id))
}

async fn restart_screen(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
) -> Response {
    empty_response(manager.restart_screen(&id))
}

async fn list_framesets(
    State(manager): State<GuardedFrameManager>,
    Query(query): Query<FramesetListQuery>,
) -> Response {
    json_response(manager.list_framesets(query.orientation))
}

async fn post_frameset(
    State(manager): State<GuardedFrameManager>,
    Json(body): Json<CreateFramesetBody>,
) -> Response {
    created_response(manager.create_frameset(&body.name, body.orientation))
}

async fn get_frameset(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
) -> Response {
    json_response(manager.get_frameset(&id))
}

async fn put_frameset(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
    Json(body): Json<FramesetUpdate>,
) -> Response {
    json_response(manager.update_frameset(&id, body))
}

async fn delete_frameset(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
) -> Response {
    empty_response(manager.delete_frameset(&id))
}

async fn get_frameset_frames(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
) -> Response {
    json_response(manager.frameset_members(&id))
}

/// PUT /v1/framesets/{id}/frames - Replace the frameset's members
async fn put_frameset_frames(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
    Json(body): Json<FramesetFramesBody>,
) -> Response {
    json_response(manager.assign_frames(&id, &body.frame_ids))
}

/// PUT /v1/framesets/{id}/album - Split an album across the members, or clear it
async fn put_frameset_album(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
    Json(body): Json<AlbumBindingBody>,
) -> Response {
    json_response(manager.assign_album(&id, body.album_id.as_deref()))
}

pub fn make_frame_routes(state: ServerState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/frames", get(list_frames).post(post_frame))
        .route(
            "/frames/{id}",
            get(get_frame).put(put_frame).delete(delete_frame),
        )
        .route("/frames/{id}/status", get(get_frame_status))
        .route("/frames/{id}/album", put(put_frame_album))
        .route("/frames/{id}/navigate", post(navigate))
        .route("/frames/{id}/reboot", post(reboot))
        .route("/frames/{id}/restart-screen", post(restart_screen))
        .route("/framesets", get(list_framesets).post(post_frameset))
        .route(
            "/framesets/{id}",
            get(get_frameset).put(put_frameset).delete(delete_frameset),
        )
        .route(
            "/framesets/{id}/frames",
            get(get_frameset_frames).put(put_frameset_frames),
        )
        .route("/framesets/{id}/album", put(put_frameset_album))
        .with_state(state)
}
