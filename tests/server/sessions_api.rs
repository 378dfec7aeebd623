use reqwest::{Client, Method};
use serde_json::{Value, json};
use tokio::task::JoinSet;

use crate::helpers::{
    create_audiobook, create_ebook, create_paper_book, id_of, log_session, spawn_app,
    spawn_app_on_file, today,
};

#[tokio::test]
async fn paper_sessions_store_page_deltas() {
    let app = spawn_app().await;
    let book = create_paper_book(&app, "The Name of the Wind", Some(660)).await;
    let book_id = id_of(&book);

    let first = log_session(&app, json!({ "book_id": book_id, "pages_read": 50 })).await;
    assert_eq!(first["session"]["pages_read"], 50);
    assert_eq!(first["book"]["current_page"], 50);

    let second = log_session(&app, json!({ "book_id": book_id, "pages_read": 120 })).await;
    assert_eq!(second["session"]["pages_read"], 70);
    assert_eq!(second["book"]["current_page"], 120);
    assert_eq!(second["just_completed"], false);
}

#[tokio::test]
async fn paper_position_never_moves_backwards() {
    let app = spawn_app().await;
    let book = create_paper_book(&app, "Gideon the Ninth", Some(300)).await;
    let book_id = id_of(&book);

    log_session(&app, json!({ "book_id": book_id, "pages_read": 120 })).await;
    let result = log_session(&app, json!({ "book_id": book_id, "pages_read": 80 })).await;

    assert_eq!(result["book"]["current_page"], 120);
    assert_eq!(result["session"]["pages_read"], 0);
}

#[tokio::test]
async fn audiobook_position_past_current_is_absolute() {
    let app = spawn_app().await;
    let book = create_audiobook(&app, "Dungeon Crawler Carl", Some(200)).await;
    let book_id = id_of(&book);
    app.put_json(
        &format!("/books/{book_id}"),
        &json!({ "current_duration_minutes": 100 }),
    )
    .await;

    let result = log_session(&app, json!({ "book_id": book_id, "duration_minutes": 130 })).await;

    assert_eq!(result["book"]["current_duration_minutes"], 130);
    assert_eq!(result["session"]["duration_minutes"], 30);
    assert_eq!(result["session"]["pages_read"], 0);
}

#[tokio::test]
async fn audiobook_value_below_current_is_added() {
    let app = spawn_app().await;
    let book = create_audiobook(&app, "Red Rising", Some(200)).await;
    let book_id = id_of(&book);
    app.put_json(
        &format!("/books/{book_id}"),
        &json!({ "current_duration_minutes": 100 }),
    )
    .await;

    let result = log_session(&app, json!({ "book_id": book_id, "duration_minutes": 15 })).await;

    assert_eq!(result["book"]["current_duration_minutes"], 115);
    assert_eq!(result["session"]["duration_minutes"], 15);
}

#[tokio::test]
async fn audiobook_position_is_clamped_to_its_length() {
    let app = spawn_app().await;
    let book = create_audiobook(&app, "Short Listen", Some(200)).await;
    let book_id = id_of(&book);
    app.put_json(
        &format!("/books/{book_id}"),
        &json!({ "current_duration_minutes": 190 }),
    )
    .await;

    let result = log_session(&app, json!({ "book_id": book_id, "duration_minutes": 500 })).await;

    assert_eq!(result["book"]["current_duration_minutes"], 200);
    assert_eq!(result["session"]["duration_minutes"], 10);
    assert_eq!(result["just_completed"], true);
    assert_eq!(result["book"]["status"], "read");
}

#[tokio::test]
async fn ebook_percentage_is_clamped_and_completes() {
    let app = spawn_app().await;
    let book = create_ebook(&app, "Children of Time").await;
    let book_id = id_of(&book);

    let partial = log_session(&app, json!({ "book_id": book_id, "percentage": 40.0 })).await;
    assert_eq!(partial["book"]["progress_percent"], 40);
    assert_eq!(partial["just_completed"], false);

    let done = log_session(&app, json!({ "book_id": book_id, "percentage": 150.0 })).await;
    assert_eq!(done["book"]["current_percentage"], 100.0);
    assert_eq!(done["book"]["status"], "read");
    assert_eq!(done["just_completed"], true);
}

#[tokio::test]
async fn ebook_sessions_estimate_pages_from_the_page_total() {
    let app = spawn_app().await;
    let book = app
        .post_json(
            "/books",
            &json!({ "title": "Blindsight", "format": "ebook", "total_pages": 200 }),
        )
        .await;

    let result = log_session(
        &app,
        json!({ "book_id": id_of(&book), "percentage": 50.0, "duration_minutes": 45 }),
    )
    .await;

    assert_eq!(result["session"]["pages_read"], 100);
    assert_eq!(result["session"]["duration_minutes"], 45);
}

#[tokio::test]
async fn finishing_a_book_reports_completion_once() {
    let app = spawn_app().await;
    let book = create_paper_book(&app, "The Hobbit", Some(300)).await;
    let book_id = id_of(&book);

    let finished = log_session(&app, json!({ "book_id": book_id, "pages_read": 300 })).await;
    assert_eq!(finished["just_completed"], true);
    assert_eq!(finished["book"]["status"], "read");
    assert_eq!(finished["book"]["finish_date"], today().to_string());

    let again = log_session(&app, json!({ "book_id": book_id, "pages_read": 300 })).await;
    assert_eq!(again["just_completed"], false);
}

#[tokio::test]
async fn session_date_defaults_to_today() {
    let app = spawn_app().await;
    let book = create_paper_book(&app, "Dated", None).await;
    let book_id = id_of(&book);

    let implicit = log_session(&app, json!({ "book_id": book_id, "pages_read": 5 })).await;
    assert_eq!(implicit["session"]["session_date"], today().to_string());

    let explicit = log_session(
        &app,
        json!({ "book_id": book_id, "pages_read": 10, "session_date": "2024-02-29", "notes": "  leap  " }),
    )
    .await;
    assert_eq!(explicit["session"]["session_date"], "2024-02-29");
    assert_eq!(explicit["session"]["notes"], "leap");
}

#[tokio::test]
async fn session_rejects_fields_of_another_format() {
    let app = spawn_app().await;
    let book = create_paper_book(&app, "Paper Only", Some(100)).await;

    let response = app
        .request(Method::POST, "/sessions")
        .json(&json!({ "book_id": id_of(&book), "percentage": 20.0 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 400);

    let response = app
        .request(Method::POST, "/sessions")
        .json(&json!({ "book_id": id_of(&book), "pages_read": -3 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 400);

    let sessions = app.get_json("/sessions").await;
    assert!(sessions.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sessions_on_another_users_book_are_not_found() {
    let app = spawn_app().await;
    let book = create_paper_book(&app, "Private", Some(100)).await;
    let intruder = app.add_user("intruder").await;

    let response = app
        .request_as(&intruder, Method::POST, "/sessions")
        .json(&json!({ "book_id": id_of(&book), "pages_read": 40 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 404);

    let untouched = app.get_json(&format!("/books/{}", id_of(&book))).await;
    assert_eq!(untouched["current_page"], 0);

    let result = log_session(&app, json!({ "book_id": id_of(&book), "pages_read": 10 })).await;
    let session_path = format!("/sessions/{}", id_of(&result["session"]));
    let response = app
        .request_as(&intruder, Method::DELETE, &session_path)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn deleting_a_session_keeps_book_progress() {
    let app = spawn_app().await;
    let paper = create_paper_book(&app, "Kept Paper", Some(300)).await;
    let audio = create_audiobook(&app, "Kept Audio", Some(600)).await;
    let ebook = create_ebook(&app, "Kept Ebook").await;

    let sessions = [
        log_session(&app, json!({ "book_id": id_of(&paper), "pages_read": 90 })).await,
        log_session(&app, json!({ "book_id": id_of(&audio), "duration_minutes": 45 })).await,
        log_session(&app, json!({ "book_id": id_of(&ebook), "percentage": 33.0 })).await,
    ];

    for result in &sessions {
        let response = app
            .request(
                Method::DELETE,
                &format!("/sessions/{}", id_of(&result["session"])),
            )
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 204);
    }

    let paper = app.get_json(&format!("/books/{}", id_of(&paper))).await;
    let audio = app.get_json(&format!("/books/{}", id_of(&audio))).await;
    let ebook = app.get_json(&format!("/books/{}", id_of(&ebook))).await;
    assert_eq!(paper["current_page"], 90);
    assert_eq!(audio["current_duration_minutes"], 45);
    assert_eq!(ebook["current_percentage"], 33.0);
}

#[tokio::test]
async fn sessions_can_be_listed_per_book() {
    let app = spawn_app().await;
    let first = create_paper_book(&app, "First", Some(100)).await;
    let second = create_paper_book(&app, "Second", Some(100)).await;

    log_session(&app, json!({ "book_id": id_of(&first), "pages_read": 10, "session_date": "2024-01-01" })).await;
    log_session(&app, json!({ "book_id": id_of(&first), "pages_read": 20, "session_date": "2024-01-02" })).await;
    log_session(&app, json!({ "book_id": id_of(&second), "pages_read": 5 })).await;

    let for_book = app
        .get_json(&format!("/books/{}/sessions", id_of(&first)))
        .await;
    let for_book = for_book.as_array().unwrap();
    assert_eq!(for_book.len(), 2);
    assert_eq!(for_book[0]["session_date"], "2024-01-02");

    let filtered = app
        .get_json(&format!("/sessions?book_id={}", id_of(&second)))
        .await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);

    let all = app.get_json("/sessions").await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let response = app
        .request(Method::GET, "/books/9999/sessions")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn concurrent_sessions_on_one_book_do_not_lose_updates() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let app = spawn_app_on_file(&dir.path().join("bokbad.db")).await;
    let book = create_paper_book(&app, "Contended", Some(100)).await;
    let book_id = id_of(&book);

    let client = Client::new();
    let mut tasks = JoinSet::new();
    for page in (10..=100).step_by(10) {
        let request = client
            .post(app.api_url("/sessions"))
            .bearer_auth(&app.auth_token)
            .json(&json!({ "book_id": book_id, "pages_read": page }));
        tasks.spawn(async move {
            let response = request.send().await.expect("Failed to execute request");
            assert_eq!(response.status(), 201);
            response.json::<Value>().await.expect("Failed to parse JSON")
        });
    }

    let mut completions = 0;
    while let Some(result) = tasks.join_next().await {
        let result = result.expect("session task panicked");
        if result["just_completed"] == true {
            completions += 1;
        }
    }
    assert_eq!(completions, 1);

    let book = app.get_json(&format!("/books/{book_id}")).await;
    assert_eq!(book["current_page"], 100);
    assert_eq!(book["status"], "read");

    let sessions = app
        .get_json(&format!("/books/{book_id}/sessions"))
        .await;
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 10);
    let total: i64 = sessions
        .iter()
        .map(|s| s["pages_read"].as_i64().unwrap())
        .sum();
    assert_eq!(total, 100);
}

#[tokio::test]
async fn failed_book_write_rolls_back_the_session() {
    let app = spawn_app().await;
    let book = create_paper_book(&app, "Piranesi", Some(272)).await;
    let book_id = id_of(&book);
    let first = log_session(&app, json!({ "book_id": book_id, "pages_read": 40 })).await;
    let version = first["book"]["version"].clone();

    sqlx::query(
        r"CREATE TRIGGER reject_page_77 BEFORE UPDATE OF current_page ON books
          WHEN NEW.current_page = 77
          BEGIN SELECT RAISE(ABORT, 'page 77 rejected'); END",
    )
    .execute(&app.pool)
    .await
    .unwrap();

    let response = app
        .request(Method::POST, "/sessions")
        .json(&json!({ "book_id": book_id, "pages_read": 77 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "internal server error");

    let sessions = app.get_json(&format!("/books/{book_id}/sessions")).await;
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["pages_read"], 40);

    let stored: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reading_sessions WHERE book_id = ?")
            .bind(book_id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(stored, 1);

    let book = app.get_json(&format!("/books/{book_id}")).await;
    assert_eq!(book["current_page"], 40);
    assert_eq!(book["version"], version);

    let next = log_session(&app, json!({ "book_id": book_id, "pages_read": 90 })).await;
    assert_eq!(next["session"]["pages_read"], 50);
}
