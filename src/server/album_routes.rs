//! Image and album endpoints.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::server::{created_response, empty_response, json_response};
use super::state::{GuardedFrameManager, ServerState};
use crate::frame_store::Orientation;
use crate::photoframes::album::AlbumUpdate;
use crate::photoframes::image::{ImageQuery, ImageUpdate, NewImage};

#[derive(Deserialize)]
struct CreateAlbumBody {
    pub name: String,
    #[serde(default)]
    pub orientation: Orientation,
}

#[derive(Deserialize)]
struct ImageAlbumBody {
    pub album_name: String,
    pub image_name: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct AlbumListQuery {
    pub top_level: bool,
}

#[derive(Deserialize)]
struct AlbumImagesBody {
    pub image_ids: Vec<String>,
}

/// GET /v1/images?orientation=H&keywords=beach+sunset
async fn list_images(
    State(manager): State<GuardedFrameManager>,
    Query(query): Query<ImageQuery>,
) -> Response {
    json_response(manager.list_images(&query))
}

async fn post_image(
    State(manager): State<GuardedFrameManager>,
    Json(body): Json<NewImage>,
) -> Response {
    created_response(manager.create_image(body))
}

/// POST /v1/images/album - Add an image to an album by names, creating the album if needed
async fn post_image_album(
    State(manager): State<GuardedFrameManager>,
    Json(body): Json<ImageAlbumBody>,
) -> Response {
    json_response(manager.add_image_by_name(&body.album_name, &body.image_name))
}

async fn get_image(State(manager): State<GuardedFrameManager>, Path(id): Path<String>) -> Response {
    json_response(manager.get_image(&id))
}

async fn put_image(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
    Json(body): Json<ImageUpdate>,
) -> Response {
    json_response(manager.update_image(&id, body))
}

async fn delete_image(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
) -> Response {
    empty_response(manager.delete_image(&id))
}

async fn list_albums(
    State(manager): State<GuardedFrameManager>,
    Query(query): Query<AlbumListQuery>,
) -> Response {
    json_response(manager.list_albums(query.top_level))
}

async fn post_album(
    State(manager): State<GuardedFrameManager>,
    Json(body): Json<CreateAlbumBody>,
) -> Response {
    created_response(manager.create_album(&body.name, body.orientation))
}

async fn get_album(State(manager): State<GuardedFrameManager>, Path(id): Path<String>) -> Response {
    json_response(manager.get_album(&id))
}

async fn put_album(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
    Json(body): Json<AlbumUpdate>,
) -> Response {
    json_response(manager.update_album(&id, body))
}

async fn delete_album(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
) -> Response {
    empty_response(manager.delete_album(&id))
}

/// DELETE /v1/albums/by-name/{name} - Delete every top-level album with that name
async fn delete_albums_by_name(
    State(manager): State<GuardedFrameManager>,
    Path(name): Path<String>,
) -> Response {
    json_response(manager.delete_albums_by_name(&name))
}

async fn get_album_images(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
) -> Response {
    json_response(manager.album_images(&id))
}

/// PUT /v1/albums/{id}/images - Replace the album's membership
async fn put_album_images(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
    Json(body): Json<AlbumImagesBody>,
) -> Response {
    json_response(manager.update_album_images(&id, &body.image_ids))
}

async fn add_album_image(
    State(manager): State<GuardedFrameManager>,
    Path((id, image_id)): Path<(String, String)>,
) -> Response {
    json_response(manager.add_image_to_album(&id, &image_id))
}

async fn remove_album_image(
    State(manager): State<GuardedFrameManager>,
    Path((id, image_id)): Path<(String, String)>,
) -> Response {
    json_response(manager.remove_image_from_album(&id, &image_id))
}

async fn get_sub_albums(
    State(manager): State<GuardedFrameManager>,
    Path(id): Path<String>,
) -> Response {
    json_response(manager.sub_albums(&id))
}

pub fn make_album_routes(state: ServerState) -> Router {
    Router::new()
        .route("/images", get(list_images).post(post_image))
        .route("/images/album", post(post_image_album))
        .route(
            "/images/{id}",
            get(get_image).put(put_image).delete(delete_image),
        )
        .route("/albums", get(list_albums).post(post_album))
        .route(
            "/albums/{id}",
            get(get_album).put(put_album).delete(delete_album),
        )
        .route(
            "/albums/by-name/{name}",
            axum::routing::delete(delete_albums_by_name),
        )
        .route(
            "/albums/{id}/images",
            get(get_album_images).put(put_album_images),
        )
        .route(
            "/albums/{id}/images/{image_id}",
            post(add_album_image).delete(remove_album_image),
        )
        .route("/albums/{id}/sub-albums", get(get_sub_albums))
        .with_state(state)
}
