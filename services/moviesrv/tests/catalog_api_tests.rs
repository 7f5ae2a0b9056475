//! Genre and movie API integration tests
#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use axum::{http::StatusCode, Router};
use serde_json::{json, Value};

mod support;
use support::{create_test_app, json_request, multipart_request, register_user, Part};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

async fn create_genre(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = json_request(
        app,
        "POST",
        "/api/genres",
        Some(json!({ "name": name })),
        Some(token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create genre failed: {}", body);
    body["data"]["id"].as_i64().unwrap()
}

async fn create_movie(
    app: &Router,
    token: &str,
    title: &str,
    rate: &str,
    genre_id: i64,
) -> (StatusCode, Value) {
    let genre = genre_id.to_string();
    multipart_request(
        app,
        "POST",
        "/api/movies",
        &[
            Part::Text("title", title),
            Part::Text("storyLine", "Something happens."),
            Part::Text("year", "1999"),
            Part::Text("rate", rate),
            Part::Text("genreId", &genre),
            Part::File("poster", "poster.png", PNG_BYTES),
        ],
        Some(token),
    )
    .await
}

#[tokio::test]
async fn test_genre_crud() {
    let (app, _) = create_test_app().await;
    let token = register_user(&app, "alice", "alice@example.com").await;

    let thriller = create_genre(&app, &token, "Thriller").await;
    create_genre(&app, &token, "Comedy").await;

    let (status, body) = json_request(&app, "GET", "/api/genres", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Comedy", "Thriller"]);

    let uri = format!("/api/genres/{}", thriller);
    let (status, body) = json_request(
        &app,
        "PUT",
        &uri,
        Some(json!({ "name": "Suspense" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Suspense");

    let (status, body) = json_request(&app, "DELETE", &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "id": thriller, "name": "Suspense" }));

    let (status, _) = json_request(&app, "DELETE", &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_genre_writes_require_token() {
    let (app, _) = create_test_app().await;
    let (status, body) = json_request(
        &app,
        "POST",
        "/api/genres",
        Some(json!({ "name": "Drama" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Missing bearer token");

    let (status, _) = json_request(
        &app,
        "PUT",
        "/api/genres/1",
        Some(json!({ "name": "Drama" })),
        Some("not-a-token"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_genre_validation_and_missing() {
    let (app, _) = create_test_app().await;
    let token = register_user(&app, "alice", "alice@example.com").await;

    let (status, body) = json_request(
        &app,
        "POST",
        "/api/genres",
        Some(json!({ "name": "x".repeat(51) })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["field_errors"]["name"].is_array());

    let (status, _) = json_request(
        &app,
        "PUT",
        "/api/genres/999",
        Some(json!({ "name": "Noir" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_movie_create_and_list() {
    let (app, _) = create_test_app().await;
    let token = register_user(&app, "alice", "alice@example.com").await;
    let drama = create_genre(&app, &token, "Drama").await;
    let scifi = create_genre(&app, &token, "Sci-Fi").await;

    let (status, body) = create_movie(&app, &token, "Solaris", "7.9", scifi).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["genreName"], "Sci-Fi");
    assert_eq!(body["data"]["storyLine"], "Something happens.");
    assert_eq!(body["data"]["poster"], "iVBORw0KGgo=");

    create_movie(&app, &token, "Magnolia", "8.0", drama).await;
    create_movie(&app, &token, "Stalker", "8.1", scifi).await;

    let (status, body) = json_request(&app, "GET", "/api/movies", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Stalker", "Magnolia", "Solaris"]);

    let uri = format!("/api/movies/genre?id={}", scifi);
    let (_, body) = json_request(&app, "GET", &uri, None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = json_request(&app, "GET", "/api/movies/genre?id=0", None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_movie_create_rules() {
    let (app, _) = create_test_app().await;
    let token = register_user(&app, "alice", "alice@example.com").await;
    let drama = create_genre(&app, &token, "Drama").await;
    let genre = drama.to_string();

    let (status, body) = multipart_request(
        &app,
        "POST",
        "/api/movies",
        &[
            Part::Text("title", "Heat"),
            Part::Text("storyLine", "Cops and robbers."),
            Part::Text("year", "1995"),
            Part::Text("rate", "8.3"),
            Part::Text("genreId", &genre),
            Part::File("poster", "poster.gif", PNG_BYTES),
        ],
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid file type");

    let oversized = vec![0u8; 2 * 1024 * 1024 + 1];
    let (status, body) = multipart_request(
        &app,
        "POST",
        "/api/movies",
        &[
            Part::Text("title", "Heat"),
            Part::Text("storyLine", "Cops and robbers."),
            Part::Text("year", "1995"),
            Part::Text("rate", "8.3"),
            Part::Text("genreId", &genre),
            Part::File("poster", "poster.JPG", &oversized),
        ],
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "File size exceeds the limit");

    let (status, body) = create_movie(&app, &token, "Heat", "8.3", 404).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid Genre");

    let (status, body) = multipart_request(
        &app,
        "POST",
        "/api/movies",
        &[
            Part::Text("title", "Heat"),
            Part::Text("storyLine", "Cops and robbers."),
            Part::Text("year", "1995"),
            Part::Text("rate", "8.3"),
            Part::Text("genreId", &genre),
        ],
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["field_errors"]["poster"].is_array());
}

#[tokio::test]
async fn test_movie_update_and_delete() {
    let (app, _) = create_test_app().await;
    let token = register_user(&app, "alice", "alice@example.com").await;
    let drama = create_genre(&app, &token, "Drama").await;
    let genre = drama.to_string();

    let (_, body) = create_movie(&app, &token, "Heat", "8.3", drama).await;
    let id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/movies/{}", id);

    // No poster part: stored poster is kept
    let (status, body) = multipart_request(
        &app,
        "PUT",
        &uri,
        &[
            Part::Text("title", "Heat (1995)"),
            Part::Text("storyLine", "Cops and robbers in LA."),
            Part::Text("year", "1995"),
            Part::Text("rate", "8.4"),
            Part::Text("genreId", &genre),
        ],
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["title"], "Heat (1995)");
    assert_eq!(body["data"]["year"], 1995);
    assert_eq!(body["data"]["poster"], "iVBORw0KGgo=");

    let (status, body) = multipart_request(
        &app,
        "PUT",
        "/api/movies/9999",
        &[
            Part::Text("title", "Ghost"),
            Part::Text("storyLine", "Nothing."),
            Part::Text("year", "2000"),
            Part::Text("rate", "1.0"),
            Part::Text("genreId", &genre),
        ],
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"]["message"],
        "No Movie was found with the id 9999 "
    );

    let (status, body) = json_request(&app, "DELETE", &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Heat (1995)");

    let (status, _) = json_request(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = json_request(&app, "DELETE", &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_genre_removes_its_movies() {
    let (app, _) = create_test_app().await;
    let token = register_user(&app, "alice", "alice@example.com").await;
    let drama = create_genre(&app, &token, "Drama").await;
    create_movie(&app, &token, "Heat", "8.3", drama).await;

    let uri = format!("/api/genres/{}", drama);
    let (status, _) = json_request(&app, "DELETE", &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = json_request(&app, "GET", "/api/movies", None, None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}
