use bokbad::domain::book_items::{BookFilter, BookStatus};
use bokbad::domain::goals::GoalTargets;
use bokbad::domain::ids::{BookId, SessionId};
use bokbad::domain::sessions::NewSession;
use bokbad::infrastructure::client::BokbadClient;
use chrono::NaiveDate;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn book_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "title": "The Left Hand of Darkness",
        "authors": ["Ursula K. Le Guin"],
        "isbn": null,
        "genres": ["science fiction"],
        "topics": ["Gender"],
        "thoughts": null,
        "status": status,
        "format": "paper",
        "total_pages": 300,
        "current_page": 150,
        "start_date": "2024-01-02",
        "finish_date": null,
        "series_id": null,
        "series_order": null,
        "version": 3,
        "created_at": "2024-01-02T10:00:00Z",
        "updated_at": "2024-01-05T10:00:00Z",
        "progress_percent": 50
    })
}

fn client_for(server: &MockServer, token: Option<&str>) -> BokbadClient {
    BokbadClient::from_base_url(&server.uri(), token.map(ToString::to_string))
        .expect("valid base url")
}

#[tokio::test]
async fn list_books_sends_bearer_token_and_status_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/books"))
        .and(query_param("status", "reading"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([book_json(7, "reading")])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("secret"));
    let books = client
        .books()
        .list(&BookFilter::with_status(BookStatus::Reading))
        .await
        .expect("list should succeed");

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].book.id, BookId::new(7));
    assert_eq!(books[0].book.status, BookStatus::Reading);
    assert_eq!(books[0].progress_percent, 50);
    assert_eq!(books[0].book.progress.total_pages(), Some(300));
    assert_eq!(books[0].book.genres, vec!["science fiction"]);
}

#[tokio::test]
async fn list_books_sends_search_and_tag_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/books"))
        .and(query_param("search", "le guin"))
        .and(query_param("genre", "science fiction"))
        .and(query_param("topic", "Gender"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([book_json(7, "read")])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("secret"));
    let filter = BookFilter {
        search: Some("le guin".to_string()),
        genre: Some("science fiction".to_string()),
        topic: Some("Gender".to_string()),
        ..BookFilter::default()
    };
    let books = client.books().list(&filter).await.expect("list should succeed");

    assert_eq!(books.len(), 1);
    let requests = server.received_requests().await.expect("recording enabled");
    assert!(!requests[0].url.query().unwrap_or_default().contains("status"));
}

#[tokio::test]
async fn tags_and_genre_breakdown_are_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/books/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "genres": ["fantasy"],
            "topics": ["Magic"],
            "authors": ["Ursula K. Le Guin"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stats/genres"))
        .and(query_param("from", "2024-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "genres": [{ "name": "fantasy", "count": 3 }],
            "topics": []
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("secret"));
    let tags = client.books().tags().await.expect("tags should load");
    assert_eq!(tags.authors, vec!["Ursula K. Le Guin"]);

    let breakdown = client
        .stats()
        .genres(NaiveDate::from_ymd_opt(2024, 1, 1), None)
        .await
        .expect("breakdown should load");
    assert_eq!(breakdown.genres[0].count, 3);
    assert!(breakdown.topics.is_empty());
}

#[tokio::test]
async fn requests_without_a_token_carry_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let sessions = client.sessions().list(None).await.expect("list should succeed");
    assert!(sessions.is_empty());

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn logging_a_session_posts_the_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/sessions"))
        .and(body_json(json!({ "book_id": 7, "pages_read": 300 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "session": {
                "id": 11,
                "user_id": 1,
                "book_id": 7,
                "session_date": "2024-01-06",
                "pages_read": 150,
                "duration_minutes": null,
                "notes": null,
                "created_at": "2024-01-06T20:00:00Z"
            },
            "book": book_json(7, "read"),
            "just_completed": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("secret"));
    let result = client
        .sessions()
        .log(&NewSession {
            book_id: BookId::new(7),
            session_date: None,
            pages_read: Some(300),
            percentage: None,
            duration_minutes: None,
            notes: None,
        })
        .await
        .expect("log should succeed");

    assert!(result.just_completed);
    assert_eq!(result.session.id, SessionId::new(11));
    assert_eq!(result.session.pages_read, 150);
    assert_eq!(result.book.book.status, BookStatus::Read);
}

#[tokio::test]
async fn api_errors_surface_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stats"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "from must not be after to" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Some("secret"));
    let err = client
        .stats()
        .period(
            NaiveDate::from_ymd_opt(2024, 2, 1),
            NaiveDate::from_ymd_opt(2024, 1, 1),
        )
        .await
        .expect_err("request should fail");

    let message = err.to_string();
    assert!(message.contains("400"), "unexpected error: {message}");
    assert!(message.contains("from must not be after to"), "unexpected error: {message}");
}

#[tokio::test]
async fn period_stats_pass_the_range_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stats"))
        .and(query_param("from", "2024-01-01"))
        .and(query_param("to", "2024-01-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "from": "2024-01-01",
            "to": "2024-01-31",
            "want_to_read": 4,
            "up_next": 1,
            "reading": 2,
            "read": 1,
            "total_pages": 250,
            "read_minutes": 90,
            "listen_minutes": 0,
            "avg_days_to_finish": 12.5,
            "books_per_month": 1.0,
            "streak": 3,
            "daily": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("secret"));
    let stats = client
        .stats()
        .period(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
        )
        .await
        .expect("stats should load");

    assert_eq!(stats.read, 1);
    assert_eq!(stats.total_pages, 250);
    assert_eq!(stats.avg_days_to_finish, Some(12.5));
    assert_eq!(stats.daily, Some(Vec::new()));
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/bokbad/api/v1/goals/2024"))
        .and(body_json(json!({ "target_books": 24 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "user_id": 1,
            "year": 2024,
            "target_books": 24,
            "target_pages": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = BokbadClient::from_base_url(&format!("{}/bokbad", server.uri()), None)
        .expect("valid base url");
    let goal = client
        .goals()
        .set(
            2024,
            &GoalTargets {
                target_books: Some(24),
                target_pages: None,
            },
        )
        .await
        .expect("goal should save");

    assert_eq!(goal.target_books, Some(24));
    assert_eq!(goal.year, 2024);
}

#[tokio::test]
async fn delete_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/books/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/books/8"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "not found" })))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("secret"));
    client
        .books()
        .delete(BookId::new(7))
        .await
        .expect("delete should succeed");

    let err = client
        .books()
        .delete(BookId::new(8))
        .await
        .expect_err("missing book should fail");
    assert!(err.to_string().contains("not found"));
}

#[test]
fn invalid_base_url_is_rejected() {
    assert!(BokbadClient::from_base_url("not a url", None).is_err());
}
