use reqwest::Method;
use serde_json::{Value, json};

use crate::helpers::{id_of, spawn_app};

#[tokio::test]
async fn series_summaries_count_member_books() {
    let app = spawn_app().await;
    let series = app
        .post_json(
            "/series",
            &json!({ "name": "  The Expanse ", "total_books": 9 }),
        )
        .await;
    assert_eq!(series["name"], "The Expanse");
    let series_id = id_of(&series);

    app.post_json(
        "/books",
        &json!({ "title": "Leviathan Wakes", "format": "paper", "status": "read", "series_id": series_id, "series_order": 1 }),
    )
    .await;
    app.post_json(
        "/books",
        &json!({ "title": "Caliban's War", "format": "paper", "series_id": series_id, "series_order": 2 }),
    )
    .await;
    app.post_json("/series", &json!({ "name": "Empty" })).await;

    let list = app.get_json("/series").await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    let expanse = list
        .iter()
        .find(|s| s["id"] == series["id"])
        .expect("series should be listed");
    assert_eq!(expanse["book_count"], 2);
    assert_eq!(expanse["books_read"], 1);
    assert_eq!(expanse["total_books"], 9);
}

#[tokio::test]
async fn deleting_a_series_keeps_its_books() {
    let app = spawn_app().await;
    let series = app.post_json("/series", &json!({ "name": "Short Lived" })).await;
    let book = app
        .post_json(
            "/books",
            &json!({ "title": "Survivor", "format": "paper", "series_id": id_of(&series) }),
        )
        .await;
    assert_eq!(book["series_id"], series["id"]);

    let response = app
        .request(Method::DELETE, &format!("/series/{}", id_of(&series)))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 204);

    let book = app.get_json(&format!("/books/{}", id_of(&book))).await;
    assert!(book["series_id"].is_null());
}

#[tokio::test]
async fn series_name_is_required() {
    let app = spawn_app().await;

    let response = app
        .request(Method::POST, "/series")
        .json(&json!({ "name": "  " }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let app = spawn_app().await;

    let response = app
        .request(Method::POST, "/series")
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn other_users_series_are_off_limits() {
    let app = spawn_app().await;
    let series = app.post_json("/series", &json!({ "name": "Mine" })).await;
    let other = app.add_user("other").await;

    let response = app
        .request_as(&other, Method::DELETE, &format!("/series/{}", id_of(&series)))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 404);

    let response = app
        .request_as(&other, Method::POST, "/books")
        .json(&json!({ "title": "Borrowed", "format": "paper", "series_id": id_of(&series) }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 400);
}
