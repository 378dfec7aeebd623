use std::path::Path;

use bokbad::application::provision_user;
use bokbad::application::routes::app_router;
use bokbad::application::state::AppState;
pub use bokbad::domain::today;
use bokbad::infrastructure::database::{Database, DatabasePool};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::AbortHandle;

pub struct TestApp {
    pub address: String,
    pub database: Database,
    #[allow(dead_code)]
    pub pool: DatabasePool,
    pub auth_token: String,
    client: Client,
    server_handle: AbortHandle,
}

impl TestApp {
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    /// Request against the API, authenticated as the default test user.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.api_url(path))
            .bearer_auth(&self.auth_token)
    }

    /// Request authenticated with an arbitrary token.
    pub fn request_as(&self, token: &str, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.api_url(path))
            .bearer_auth(token)
    }

    pub async fn get_json(&self, path: &str) -> Value {
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 200, "GET {path} failed");
        response.json().await.expect("Failed to parse JSON")
    }

    pub async fn post_json<P: Serialize>(&self, path: &str, payload: &P) -> Value {
        let response = self
            .request(Method::POST, path)
            .json(payload)
            .send()
            .await
            .unwrap_or_else(|e| panic!("failed to POST {path}: {e}"));
        assert_eq!(response.status(), 201, "POST {path} failed");
        response.json().await.expect("Failed to parse JSON")
    }

    pub async fn put_json<P: Serialize>(&self, path: &str, payload: &P) -> Value {
        let response = self
            .request(Method::PUT, path)
            .json(payload)
            .send()
            .await
            .unwrap_or_else(|e| panic!("failed to PUT {path}: {e}"));
        assert_eq!(response.status(), 200, "PUT {path} failed");
        response.json().await.expect("Failed to parse JSON")
    }

    /// Provisions another user and returns their token.
    pub async fn add_user(&self, username: &str) -> String {
        let (_, token) = provision_user(&self.database, username)
            .await
            .expect("Failed to provision user");
        token
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

pub async fn spawn_app() -> TestApp {
    let database = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    spawn_app_inner(database).await
}

/// App backed by a database file, for tests that need concurrent connections.
pub async fn spawn_app_on_file(path: &Path) -> TestApp {
    let url = format!("sqlite://{}", path.display());
    let database = Database::connect(&url)
        .await
        .expect("Failed to open database file");
    spawn_app_inner(database).await
}

async fn spawn_app_inner(database: Database) -> TestApp {
    let pool = database.clone_pool();
    let (_, auth_token) = provision_user(&database, "reader")
        .await
        .expect("Failed to provision test user");

    let app = app_router(AppState::from_database(&database));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let local_addr = listener.local_addr().expect("Failed to get local address");
    let address = format!("http://{local_addr}");

    let server_handle = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .expect("Server failed to start");
    })
    .abort_handle();

    TestApp {
        address,
        database,
        pool,
        auth_token,
        client: Client::new(),
        server_handle,
    }
}

pub async fn create_paper_book(app: &TestApp, title: &str, total_pages: Option<i32>) -> Value {
    app.post_json(
        "/books",
        &json!({ "title": title, "format": "paper", "total_pages": total_pages }),
    )
    .await
}

pub async fn create_audiobook(app: &TestApp, title: &str, total_minutes: Option<i32>) -> Value {
    app.post_json(
        "/books",
        &json!({ "title": title, "format": "audiobook", "total_duration_minutes": total_minutes }),
    )
    .await
}

pub async fn create_ebook(app: &TestApp, title: &str) -> Value {
    app.post_json("/books", &json!({ "title": title, "format": "ebook" }))
        .await
}

pub async fn log_session(app: &TestApp, payload: Value) -> Value {
    app.post_json("/sessions", &payload).await
}

pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("entity should carry an id")
}
