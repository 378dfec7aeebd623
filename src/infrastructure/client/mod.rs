pub mod books;
pub mod goals;
pub mod series;
pub mod sessions;
pub mod stats;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::application::errors::ErrorResponse;

/// HTTP client for the bokbad REST API.
pub struct BokbadClient {
    base_url: Url,
    http: Client,
    token: Option<String>,
}

impl BokbadClient {
    pub fn new(base_url: Url, token: Option<String>) -> Result<Self> {
        let mut normalized = base_url;
        if !normalized.path().ends_with('/') {
            normalized.set_path(&format!("{}/", normalized.path().trim_end_matches('/')));
        }

        let http = Client::builder()
            .user_agent(concat!("bokbad-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to configure HTTP client")?;

        Ok(Self {
            base_url: normalized,
            http,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_base_url(base_url: &str, token: Option<String>) -> Result<Self> {
        let url = Url::parse(base_url).with_context(|| format!("invalid API url: {base_url}"))?;
        Self::new(url, token)
    }

    pub fn books(&self) -> books::BooksClient<'_> {
        books::BooksClient::new(self)
    }

    pub fn sessions(&self) -> sessions::SessionsClient<'_> {
        sessions::SessionsClient::new(self)
    }

    pub fn stats(&self) -> stats::StatsClient<'_> {
        stats::StatsClient::new(self)
    }

    pub fn goals(&self) -> goals::GoalsClient<'_> {
        goals::GoalsClient::new(self)
    }

    pub fn series(&self) -> series::SeriesClient<'_> {
        series::SeriesClient::new(self)
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid API path: {path}"))
    }

    /// Build a request with authentication if token is available
    pub(crate) fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let mut request = self.http.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    pub(crate) async fn get_json<T>(&self, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.request(Method::GET, url).send().await?;
        self.handle_response(response).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(method, url).json(body).send().await?;
        self.handle_response(response).await
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<()> {
        let response = self.request(Method::DELETE, url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.response_error(response).await)
        }
    }

    pub(crate) async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if response.status().is_success() {
            response
                .json::<T>()
                .await
                .context("failed to deserialize response body")
        } else {
            Err(self.response_error(response).await)
        }
    }

    pub(crate) async fn response_error(&self, response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        let bytes = response.bytes().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_slice::<ErrorResponse>(&bytes) {
            return anyhow!("request failed ({status}): {}", err.error);
        }

        let message = String::from_utf8_lossy(&bytes);
        anyhow!("request failed ({status}): {message}")
    }
}
