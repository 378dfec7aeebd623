use chrono::Days;
use reqwest::{Client, Method};
use serde_json::{Value, json};

use crate::helpers::{
    TestApp, create_audiobook, create_paper_book, id_of, log_session, spawn_app, today,
};

async fn finished_book(app: &TestApp, title: &str, finish: &str, pages: Option<i32>) -> Value {
    app.post_json(
        "/books",
        &json!({
            "title": title,
            "format": "paper",
            "status": "read",
            "total_pages": pages,
            "finish_date": finish
        }),
    )
    .await
}

#[tokio::test]
async fn stats_require_authentication() {
    let app = spawn_app().await;

    for path in ["/stats", "/stats/streak", "/stats/yearly", "/goals/2024"] {
        let response = Client::new()
            .get(app.api_url(path))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 401, "{path} should require a token");
    }
}

#[tokio::test]
async fn empty_library_reports_zeros() {
    let app = spawn_app().await;

    let stats = app.get_json("/stats").await;

    assert_eq!(stats["read"], 0);
    assert_eq!(stats["total_pages"], 0);
    assert_eq!(stats["streak"], 0);
    assert_eq!(stats["books_per_month"], 0.0);
    assert!(stats["avg_days_to_finish"].is_null());
    assert!(stats["daily"].is_null());
}

#[tokio::test]
async fn range_counts_only_books_finished_inside_it() {
    let app = spawn_app().await;
    finished_book(&app, "January", "2024-01-15", Some(250)).await;
    finished_book(&app, "Last Summer", "2023-06-01", Some(100)).await;

    let stats = app.get_json("/stats?from=2024-01-01&to=2024-01-31").await;

    assert_eq!(stats["read"], 1);
    assert_eq!(stats["total_pages"], 250);
    assert_eq!(stats["books_per_month"], 1.0);
    assert_eq!(stats["from"], "2024-01-01");
    assert_eq!(stats["to"], "2024-01-31");
    assert_eq!(stats["daily"].as_array().unwrap().len(), 31);

    let all_time = app.get_json("/stats").await;
    assert_eq!(all_time["read"], 2);
    assert_eq!(all_time["total_pages"], 350);
    assert!(all_time["from"].is_null());
}

#[tokio::test]
async fn status_counts_ignore_the_range() {
    let app = spawn_app().await;
    app.post_json(
        "/books",
        &json!({ "title": "Current", "format": "paper", "status": "reading" }),
    )
    .await;
    app.post_json(
        "/books",
        &json!({ "title": "Queued", "format": "paper", "status": "up-next" }),
    )
    .await;
    create_paper_book(&app, "Someday", None).await;

    let stats = app.get_json("/stats?from=2020-01-01&to=2020-01-31").await;

    assert_eq!(stats["reading"], 1);
    assert_eq!(stats["up_next"], 1);
    assert_eq!(stats["want_to_read"], 1);
    assert_eq!(stats["read"], 0);
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .request(Method::GET, "/stats?from=2024-02-01&to=2024-01-01")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert!(body.get("error").is_some());
    assert!(body.get("read").is_none());

    let response = app
        .request(Method::GET, "/stats?to=2024-01-01")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn average_days_skips_inconsistent_dates() {
    let app = spawn_app().await;
    app.post_json(
        "/books",
        &json!({
            "title": "Ten Days",
            "format": "paper",
            "status": "read",
            "start_date": "2024-01-01",
            "finish_date": "2024-01-11"
        }),
    )
    .await;
    app.post_json(
        "/books",
        &json!({
            "title": "Backwards",
            "format": "paper",
            "status": "read",
            "start_date": "2024-03-01",
            "finish_date": "2024-02-01"
        }),
    )
    .await;

    let stats = app.get_json("/stats").await;
    assert_eq!(stats["avg_days_to_finish"], 10.0);
}

#[tokio::test]
async fn minutes_follow_each_sessions_book_format() {
    let app = spawn_app().await;
    let paper = create_paper_book(&app, "Paper", None).await;
    let audio = create_audiobook(&app, "Audio", Some(600)).await;

    log_session(
        &app,
        json!({ "book_id": id_of(&paper), "pages_read": 20, "duration_minutes": 30, "session_date": "2024-03-05" }),
    )
    .await;
    log_session(
        &app,
        json!({ "book_id": id_of(&audio), "duration_minutes": 45, "session_date": "2024-03-05" }),
    )
    .await;

    let daily = app.get_json("/stats/daily?from=2024-03-05&to=2024-03-06").await;
    assert_eq!(
        daily,
        json!([
            { "date": "2024-03-05", "read_minutes": 30, "listen_minutes": 45, "pages": 20 },
            { "date": "2024-03-06", "read_minutes": 0, "listen_minutes": 0, "pages": 0 }
        ])
    );

    let stats = app.get_json("/stats?from=2024-03-01&to=2024-03-31").await;
    assert_eq!(stats["read_minutes"], 30);
    assert_eq!(stats["listen_minutes"], 45);
}

#[tokio::test]
async fn finished_audiobooks_count_their_full_length_once() {
    let app = spawn_app().await;
    let listening = create_audiobook(&app, "In Progress", Some(600)).await;
    app.post_json(
        "/books",
        &json!({ "title": "Done", "format": "audiobook", "status": "read", "total_duration_minutes": 300 }),
    )
    .await;
    log_session(
        &app,
        json!({ "book_id": id_of(&listening), "duration_minutes": 100 }),
    )
    .await;

    let stats = app.get_json("/stats").await;
    assert_eq!(stats["listen_minutes"], 400);

    app.put_json(
        &format!("/books/{}", id_of(&listening)),
        &json!({ "status": "read" }),
    )
    .await;

    let stats = app.get_json("/stats").await;
    assert_eq!(stats["listen_minutes"], 900);
}

#[tokio::test]
async fn daily_breakdown_requires_a_start() {
    let app = spawn_app().await;

    let response = app
        .request(Method::GET, "/stats/daily")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn streak_counts_consecutive_days_ending_today() {
    let app = spawn_app().await;
    let book = create_paper_book(&app, "Habit", None).await;
    let today = today();
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap();
    let three_days_ago = today.checked_sub_days(Days::new(3)).unwrap();

    for (page, date) in [(10, three_days_ago), (20, yesterday), (30, today)] {
        log_session(
            &app,
            json!({ "book_id": id_of(&book), "pages_read": page, "session_date": date }),
        )
        .await;
    }

    let overview = app.get_json("/stats/streak?days=4").await;
    assert_eq!(overview["streak"], 2);
    assert_eq!(overview["today_read"], true);
    let days = overview["days"].as_array().unwrap();
    assert_eq!(days.len(), 4);
    assert_eq!(days[3]["date"], today.to_string());
    assert_eq!(
        days.iter().map(|d| d["read"] == true).collect::<Vec<_>>(),
        vec![true, false, true, true]
    );

    let stats = app.get_json("/stats").await;
    assert_eq!(stats["streak"], 2);
}

#[tokio::test]
async fn streak_survives_until_a_full_day_is_missed() {
    let app = spawn_app().await;
    let book = create_paper_book(&app, "Yesterday", None).await;
    let yesterday = today().checked_sub_days(Days::new(1)).unwrap();

    log_session(
        &app,
        json!({ "book_id": id_of(&book), "pages_read": 5, "session_date": yesterday }),
    )
    .await;

    let overview = app.get_json("/stats/streak").await;
    assert_eq!(overview["streak"], 1);
    assert_eq!(overview["today_read"], false);
    assert_eq!(overview["days"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn yearly_breakdown_compares_with_previous_year() {
    let app = spawn_app().await;
    finished_book(&app, "Spring One", "2023-03-10", None).await;
    finished_book(&app, "Spring Two", "2023-03-20", None).await;
    finished_book(&app, "Summer", "2024-07-01", None).await;

    let yearly = app.get_json("/stats/yearly?year=2024&compare=true").await;

    assert_eq!(yearly["year"], 2024);
    assert_eq!(yearly["total_read"], 1);
    let months = yearly["months"].as_array().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months[6]["count"], 1);
    assert_eq!(yearly["previous"]["year"], 2023);
    assert_eq!(yearly["previous"]["total_read"], 2);
    assert_eq!(yearly["previous"]["months"][2]["count"], 2);

    let plain = app.get_json("/stats/yearly?year=2024").await;
    assert!(plain.get("previous").is_none());
}

#[tokio::test]
async fn calendar_lists_days_with_sessions() {
    let app = spawn_app().await;
    let book = create_paper_book(&app, "February", None).await;
    for (page, date) in [(10, "2024-02-10"), (25, "2024-02-10"), (40, "2024-02-12"), (50, "2024-03-01")] {
        log_session(
            &app,
            json!({ "book_id": id_of(&book), "pages_read": page, "session_date": date }),
        )
        .await;
    }

    let calendar = app.get_json("/stats/calendar?year=2024&month=2").await;

    assert_eq!(calendar["year"], 2024);
    assert_eq!(calendar["month"], 2);
    assert_eq!(calendar["total_sessions"], 3);
    assert_eq!(calendar["days_read"], 2);
    let days = calendar["days"].as_array().unwrap();
    assert_eq!(days[0]["date"], "2024-02-10");
    assert_eq!(days[0]["sessions"], 2);
    assert_eq!(days[0]["pages"], 25);

    let response = app
        .request(Method::GET, "/stats/calendar?year=2024&month=13")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn stats_are_scoped_to_the_caller() {
    let app = spawn_app().await;
    finished_book(&app, "Mine", "2024-01-15", Some(250)).await;
    let other = app.add_user("other").await;

    let response = app
        .request_as(&other, Method::GET, "/stats")
        .send()
        .await
        .expect("Failed to execute request");
    let stats: Value = response.json().await.expect("Failed to parse JSON");

    assert_eq!(stats["read"], 0);
    assert_eq!(stats["total_pages"], 0);
}

#[tokio::test]
async fn estimated_pages_cover_every_format() {
    let app = spawn_app().await;
    for payload in [
        json!({ "title": "Counted", "format": "paper", "status": "read", "total_pages": 250, "finish_date": "2024-02-01" }),
        json!({ "title": "Listened", "format": "audiobook", "status": "read", "total_duration_minutes": 450, "finish_date": "2024-05-01" }),
        json!({ "title": "Unknown Length", "format": "ebook", "status": "read", "finish_date": "2024-03-01" }),
        json!({ "title": "Last Year", "format": "paper", "status": "read", "total_pages": 900, "finish_date": "2023-12-31" }),
    ] {
        app.post_json("/books", &payload).await;
    }

    let ranged = app.get_json("/stats?from=2024-01-01&to=2024-12-31").await;
    assert_eq!(ranged["estimated_pages"], 850);
    assert_eq!(ranged["total_pages"], 250);

    let all_time = app.get_json("/stats").await;
    assert_eq!(all_time["estimated_pages"], 1750);
}

#[tokio::test]
async fn malformed_query_values_return_json_errors() {
    let app = spawn_app().await;

    for path in [
        "/stats?from=2024-13-01",
        "/stats/daily?from=yesterday",
        "/stats/streak?days=lots",
        "/stats/yearly?year=twenty",
    ] {
        let response = app
            .request(Method::GET, path)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 400, "{path}");
        let body: Value = response.json().await.expect("Failed to parse JSON");
        assert!(body["error"].is_string(), "{path}");
    }
}

#[tokio::test]
async fn years_outside_the_calendar_are_rejected() {
    let app = spawn_app().await;

    for path in [
        "/stats/yearly?year=-2147483648&compare=true",
        "/stats/yearly?year=10000",
        "/stats/calendar?year=2147483647&month=12",
        "/goals/0",
    ] {
        let response = app
            .request(Method::GET, path)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 400, "{path}");
        let body: Value = response.json().await.expect("Failed to parse JSON");
        assert!(
            body["error"].as_str().unwrap().contains("out of range"),
            "{path}"
        );
    }
}

#[tokio::test]
async fn daily_breakdown_is_limited_to_a_year() {
    let app = spawn_app().await;

    let response = app
        .request(Method::GET, "/stats/daily?from=0001-01-01&to=9999-12-31")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 400);

    let leap_year = app.get_json("/stats/daily?from=2024-01-01&to=2024-12-31").await;
    assert_eq!(leap_year.as_array().unwrap().len(), 366);

    let long = app.get_json("/stats?from=2020-01-01&to=2024-12-31").await;
    assert_eq!(long["from"], "2020-01-01");
    assert!(long["daily"].is_null());
}

#[tokio::test]
async fn genre_breakdown_counts_finished_books_only() {
    let app = spawn_app().await;
    for payload in [
        json!({ "title": "Dune", "format": "paper", "status": "read", "finish_date": "2024-02-01", "genres": ["Sci-Fi"], "topics": ["Ecology"] }),
        json!({ "title": "Tehanu", "format": "paper", "status": "read", "finish_date": "2024-06-01", "genres": ["fantasy", "sci-fi"], "topics": ["ecology", "Magic"] }),
        json!({ "title": "Hyperion", "format": "ebook", "status": "read", "finish_date": "2023-03-01", "genres": ["sci-fi"] }),
        json!({ "title": "Unread", "format": "paper", "genres": ["horror", "horror"], "topics": ["Ghosts"] }),
    ] {
        app.post_json("/books", &payload).await;
    }
    let other = app.add_user("neighbour").await;
    app.request_as(&other, Method::POST, "/books")
        .json(&json!({ "title": "Elsewhere", "format": "paper", "status": "read", "finish_date": "2024-01-01", "genres": ["fantasy"] }))
        .send()
        .await
        .expect("Failed to execute request");

    let all_time = app.get_json("/stats/genres").await;
    assert_eq!(
        all_time["genres"],
        json!([{ "name": "sci-fi", "count": 3 }, { "name": "fantasy", "count": 1 }])
    );
    assert_eq!(
        all_time["topics"],
        json!([{ "name": "Ecology", "count": 2 }, { "name": "Magic", "count": 1 }])
    );

    let ranged = app.get_json("/stats/genres?from=2024-01-01&to=2024-03-31").await;
    assert_eq!(ranged["genres"], json!([{ "name": "sci-fi", "count": 1 }]));
    assert_eq!(ranged["topics"], json!([{ "name": "Ecology", "count": 1 }]));

    let response = app
        .request(Method::GET, "/stats/genres?from=2024-05-01&to=2024-01-01")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 400);
}
