//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per endpoint. When routes or request
//! bodies change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    async fn post(&self, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn put(&self, path: &str, body: Value) -> Response {
        self.client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn delete(&self, path: &str) -> Response {
        self.client.delete(self.url(path)).send().await.unwrap()
    }

    /// Reads a JSON body, panicking with the status and text otherwise.
    pub async fn json(response: Response) -> Value {
        let status = response.status();
        let text = response.text().await.unwrap();
        serde_json::from_str(&text)
            .unwrap_or_else(|_| panic!("Expected JSON, got {}: {}", status, text))
    }

    // ========================================================================
    // Images
    // ========================================================================

    pub async fn create_image(&self, name: &str, keywords: &str, width: u32, height: u32) -> Response {
        self.post(
            "/images",
            json!({ "name": name, "keywords": keywords, "width": width, "height": height }),
        )
        .await
    }

    pub async fn list_images(&self, query: &str) -> Response {
        self.get(&format!("/images?{}", query)).await
    }

    pub async fn delete_image(&self, image_id: &str) -> Response {
        self.delete(&format!("/images/{}", image_id)).await
    }

    /// Creates `count` landscape images and returns their ids.
    pub async fn seed_images(&self, count: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let response = self
                .create_image(&format!("img-{:02}.jpg", i), "", 4000, 3000)
                .await;
            assert_eq!(response.status(), reqwest::StatusCode::CREATED);
            let image = Self::json(response).await;
            ids.push(image["id"].as_str().unwrap().to_string());
        }
        ids
    }

    pub async fn add_image_to_album_by_name(&self, album_name: &str, image_name: &str) -> Response {
        self.post(
            "/images/album",
            json!({ "album_name": album_name, "image_name": image_name }),
        )
        .await
    }

    // ========================================================================
    // Albums
    // ========================================================================

    pub async fn create_album(&self, name: &str) -> Response {
        self.post("/albums", json!({ "name": name })).await
    }

    pub async fn get_album(&self, album_id: &str) -> Response {
        self.get(&format!("/albums/{}", album_id)).await
    }

    pub async fn list_albums(&self, top_level: bool) -> Response {
        self.get(&format!("/albums?top_level={}", top_level)).await
    }

    pub async fn delete_album(&self, album_id: &str) -> Response {
        self.delete(&format!("/albums/{}", album_id)).await
    }

    pub async fn delete_albums_by_name(&self, name: &str) -> Response {
        self.delete(&format!("/albums/by-name/{}", name)).await
    }

    pub async fn set_album_images(&self, album_id: &str, image_ids: &[String]) -> Response {
        self.put(
            &format!("/albums/{}/images", album_id),
            json!({ "image_ids": image_ids }),
        )
        .await
    }

    pub async fn album_images(&self, album_id: &str) -> Response {
        self.get(&format!("/albums/{}/images", album_id)).await
    }

    pub async fn add_album_image(&self, album_id: &str, image_id: &str) -> Response {
        self.post(&format!("/albums/{}/images/{}", album_id, image_id), json!({}))
            .await
    }

    pub async fn remove_album_image(&self, album_id: &str, image_id: &str) -> Response {
        self.delete(&format!("/albums/{}/images/{}", album_id, image_id))
            .await
    }

    pub async fn sub_albums(&self, album_id: &str) -> Response {
        self.get(&format!("/albums/{}/sub-albums", album_id)).await
    }

    /// Creates an album holding `image_ids` and returns its id.
    pub async fn seed_album(&self, name: &str, image_ids: &[String]) -> String {
        let album = Self::json(self.create_album(name).await).await;
        let album_id = album["id"].as_str().unwrap().to_string();
        let response = self.set_album_images(&album_id, image_ids).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        album_id
    }

    // ========================================================================
    // Frames
    // ========================================================================

    pub async fn register(&self, frame_id: &str) -> Response {
        self.post(
            "/register",
            json!({ "frame_id": frame_id, "ip": "192.168.1.20", "freespace": 1_500_000 }),
        )
        .await
    }

    pub async fn create_frame(&self, frame_id: &str, name: &str) -> Response {
        self.post("/frames", json!({ "id": frame_id, "name": name }))
            .await
    }

    pub async fn get_frame(&self, frame_id: &str) -> Response {
        self.get(&format!("/frames/{}", frame_id)).await
    }

    pub async fn update_frame(&self, frame_id: &str, settings: Value) -> Response {
        self.put(&format!("/frames/{}", frame_id), settings).await
    }

    pub async fn delete_frame(&self, frame_id: &str) -> Response {
        self.delete(&format!("/frames/{}", frame_id)).await
    }

    pub async fn frame_status(&self, frame_id: &str) -> Response {
        self.get(&format!("/frames/{}/status", frame_id)).await
    }

    pub async fn set_frame_album(&self, frame_id: &str, album_id: Option<&str>) -> Response {
        self.put(
            &format!("/frames/{}/album", frame_id),
            json!({ "album_id": album_id }),
        )
        .await
    }

    pub async fn navigate(&self, frame_id: &str, direction: &str) -> Response {
        self.client
            .post(self.url(&format!("/frames/{}/navigate", frame_id)))
            .query(&[("direction", direction)])
            .send()
            .await
            .unwrap()
    }

    pub async fn reboot(&self, frame_id: &str) -> Response {
        self.post(&format!("/frames/{}/reboot", frame_id), json!({}))
            .await
    }

    pub async fn restart_screen(&self, frame_id: &str) -> Response {
        self.post(&format!("/frames/{}/restart-screen", frame_id), json!({}))
            .await
    }

    /// Creates frames with the given ids.
    pub async fn seed_frames(&self, frame_ids: &[&str]) {
        for id in frame_ids {
            let response = self.create_frame(id, &format!("Frame {}", id)).await;
            assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        }
    }

    // ========================================================================
    // Framesets
    // ========================================================================

    pub async fn create_frameset(&self, name: &str) -> Response {
        self.post("/framesets", json!({ "name": name })).await
    }

    pub async fn get_frameset(&self, frameset_id: &str) -> Response {
        self.get(&format!("/framesets/{}", frameset_id)).await
    }

    pub async fn delete_frameset(&self, frameset_id: &str) -> Response {
        self.delete(&format!("/framesets/{}", frameset_id)).await
    }

    pub async fn frameset_frames(&self, frameset_id: &str) -> Response {
        self.get(&format!("/framesets/{}/frames", frameset_id)).await
    }

    pub async fn assign_frames(&self, frameset_id: &str, frame_ids: &[&str]) -> Response {
        self.put(
            &format!("/framesets/{}/frames", frameset_id),
            json!({ "frame_ids": frame_ids }),
        )
        .await
    }

    pub async fn assign_album(&self, frameset_id: &str, album_id: Option<&str>) -> Response {
        self.put(
            &format!("/framesets/{}/album", frameset_id),
            json!({ "album_id": album_id }),
        )
        .await
    }

    pub async fn seed_frameset(&self, name: &str) -> String {
        let frameset = Self::json(self.create_frameset(name).await).await;
        frameset["id"].as_str().unwrap().to_string()
    }
}
