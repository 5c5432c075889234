//! End-to-end tests for images and albums

mod common;

use common::{TestClient, TestServer, ALBUM_NAME, FRAMESET_NAME};
use photoframe_server::notifications::Topic;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn sub_album_sizes(client: &TestClient, album_id: &str) -> Vec<u64> {
    let subs = TestClient::json(client.sub_albums(album_id).await).await;
    let mut sizes: Vec<u64> = subs
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["image_count"].as_u64().unwrap())
        .collect();
    sizes.sort();
    sizes
}

/// An album of `images` split across two frames.
async fn split_album(client: &TestClient, images: &[String]) -> String {
    let album_id = client.seed_album(ALBUM_NAME, images).await;
    client.seed_frames(&["f1", "f2"]).await;
    let frameset_id = client.seed_frameset(FRAMESET_NAME).await;
    client.assign_frames(&frameset_id, &["f1", "f2"]).await;
    client.assign_album(&frameset_id, Some(&album_id)).await;
    album_id
}

#[tokio::test]
async fn test_image_orientation_is_derived_from_dimensions() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let landscape = TestClient::json(client.create_image("a.jpg", "", 4000, 3000).await).await;
    let portrait = TestClient::json(client.create_image("b.jpg", "", 3000, 4000).await).await;
    assert_eq!(landscape["orientation"], "H");
    assert_eq!(portrait["orientation"], "V");

    let vertical = TestClient::json(client.list_images("orientation=V").await).await;
    assert_eq!(vertical.as_array().unwrap().len(), 1);
    assert_eq!(vertical[0]["name"], "b.jpg");
}

#[tokio::test]
async fn test_keyword_search_matches_whole_words() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    client.create_image("a.jpg", "beach sunset", 10, 5).await;
    client.create_image("b.jpg", "beaches", 10, 5).await;
    client.create_image("c.jpg", "Sunset mountains", 10, 5).await;

    let hits = TestClient::json(client.list_images("keywords=sunset").await).await;
    let mut names: Vec<&str> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.jpg", "c.jpg"]);

    let hits = TestClient::json(client.list_images("keywords=beach").await).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_adding_an_image_twice_is_a_no_op() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let images = client.seed_images(4).await;
    let album_id = split_album(&client, &images[..3]).await;
    assert_eq!(sub_album_sizes(&client, &album_id).await, vec![1, 2]);

    let response = client.add_album_image(&album_id, &images[3]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(TestClient::json(response).await, json!(true));
    assert_eq!(sub_album_sizes(&client, &album_id).await, vec![2, 2]);

    let response = client.add_album_image(&album_id, &images[3]).await;
    assert_eq!(TestClient::json(response).await, json!(false));
    assert_eq!(sub_album_sizes(&client, &album_id).await, vec![2, 2]);
}

#[tokio::test]
async fn test_removing_images_rebalances_sub_albums() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let images = client.seed_images(6).await;
    let album_id = split_album(&client, &images).await;
    assert_eq!(sub_album_sizes(&client, &album_id).await, vec![3, 3]);

    client.remove_album_image(&album_id, &images[0]).await;
    client.remove_album_image(&album_id, &images[1]).await;
    let response = client.remove_album_image(&album_id, &images[2]).await;
    assert_eq!(TestClient::json(response).await, json!(true));

    // However the removals fell, the groups differ by at most one.
    assert_eq!(sub_album_sizes(&client, &album_id).await, vec![1, 2]);

    let response = client.remove_album_image(&album_id, &images[0]).await;
    assert_eq!(TestClient::json(response).await, json!(false));
}

#[tokio::test]
async fn test_replacing_membership_reports_the_diff() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let images = client.seed_images(4).await;
    let album_id = client.seed_album(ALBUM_NAME, &images[..2]).await;

    let response = client
        .set_album_images(&album_id, &[images[1].clone(), images[2].clone(), images[3].clone()])
        .await;
    let change = TestClient::json(response).await;
    assert_eq!(change["added"].as_array().unwrap().len(), 2);
    assert_eq!(change["removed"], json!([images[0]]));

    let members = TestClient::json(client.album_images(&album_id).await).await;
    assert_eq!(members.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_sub_album_membership_cannot_be_edited() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let images = client.seed_images(2).await;
    let album_id = split_album(&client, &images).await;
    let subs = TestClient::json(client.sub_albums(&album_id).await).await;
    let sub_id = subs[0]["id"].as_str().unwrap();

    let response = client.add_album_image(sub_id, &images[0]).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_deleting_an_image_updates_frame_playlists() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let images = client.seed_images(4).await;
    let album_id = split_album(&client, &images).await;

    let response = client.delete_image(&images[0]).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(sub_album_sizes(&client, &album_id).await, vec![1, 2]);
    let mut shown = 0;
    for frame_id in ["f1", "f2"] {
        let payload = server.sink.last(frame_id, Topic::Images).unwrap();
        assert!(!payload.as_array().unwrap().contains(&json!("img-00.jpg")));
        shown += payload.as_array().unwrap().len();
    }
    assert_eq!(shown, 3);
}

#[tokio::test]
async fn test_deleting_an_album_blanks_its_frames() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let images = client.seed_images(4).await;
    let album_id = split_album(&client, &images).await;

    let response = client.delete_album(&album_id).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.get_album(&album_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let albums = TestClient::json(client.list_albums(false).await).await;
    assert_eq!(albums, json!([]));
    for frame_id in ["f1", "f2"] {
        let frame = TestClient::json(client.get_frame(frame_id).await).await;
        assert_eq!(frame["album_id"], Value::Null);
        assert_eq!(server.sink.last(frame_id, Topic::Images), Some(json!([])));
    }
}

#[tokio::test]
async fn test_delete_by_name_counts_albums() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    client.create_album("Trip").await;
    client.create_album("Trip").await;
    client.create_album("Home").await;

    let response = client.delete_albums_by_name("Trip").await;
    assert_eq!(TestClient::json(response).await, json!(2));

    let albums = TestClient::json(client.list_albums(true).await).await;
    assert_eq!(albums.as_array().unwrap().len(), 1);
    assert_eq!(albums[0]["name"], "Home");
}

#[tokio::test]
async fn test_add_by_name_creates_album_then_reuses_it() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    client.seed_images(2).await;

    let response = client.add_image_to_album_by_name("Trip", "img-00.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);
    let album = TestClient::json(response).await;
    assert_eq!(album["name"], "Trip");
    assert_eq!(album["orientation"], "H");
    assert_eq!(album["image_count"], 1);

    let response = client.add_image_to_album_by_name("Trip", "img-01.jpg").await;
    let again = TestClient::json(response).await;
    assert_eq!(again["id"], album["id"]);
    assert_eq!(again["image_count"], 2);

    let albums = TestClient::json(client.list_albums(true).await).await;
    assert_eq!(albums.as_array().unwrap().len(), 1);

    let response = client.add_image_to_album_by_name("Trip", "ghost.jpg").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_by_name_reaches_split_frames() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let images = client.seed_images(5).await;
    let album_id = split_album(&client, &images[..4]).await;

    let response = client.add_image_to_album_by_name(ALBUM_NAME, "img-04.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sub_album_sizes(&client, &album_id).await, vec![2, 3]);

    let shown: usize = ["f1", "f2"]
        .iter()
        .map(|id| server.sink.last(id, Topic::Images).unwrap().as_array().unwrap().len())
        .sum();
    assert_eq!(shown, 5);
}
