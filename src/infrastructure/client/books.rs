use anyhow::Result;
use reqwest::Method;

use super::BokbadClient;
use crate::domain::book_items::{BookFilter, BookWithProgress, NewBook, UpdateBook};
use crate::domain::ids::BookId;
use crate::domain::sessions::ReadingSession;
use crate::domain::tags::BookTags;

pub struct BooksClient<'a> {
    client: &'a BokbadClient,
}

impl<'a> BooksClient<'a> {
    pub fn new(client: &'a BokbadClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, payload: &NewBook) -> Result<BookWithProgress> {
        let url = self.client.endpoint("api/v1/books")?;
        self.client.send_json(Method::POST, url, payload).await
    }

    pub async fn list(&self, filter: &BookFilter) -> Result<Vec<BookWithProgress>> {
        let mut url = self.client.endpoint("api/v1/books")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(status) = filter.status {
                pairs.append_pair("status", status.as_str());
            }
            for (key, value) in [
                ("search", &filter.search),
                ("genre", &filter.genre),
                ("topic", &filter.topic),
            ] {
                if let Some(value) = value {
                    pairs.append_pair(key, value);
                }
            }
        }
        self.client.get_json(url).await
    }

    pub async fn tags(&self) -> Result<BookTags> {
        let url = self.client.endpoint("api/v1/books/tags")?;
        self.client.get_json(url).await
    }

    pub async fn get(&self, id: BookId) -> Result<BookWithProgress> {
        let url = self.client.endpoint(&format!("api/v1/books/{id}"))?;
        self.client.get_json(url).await
    }

    pub async fn update(&self, id: BookId, payload: &UpdateBook) -> Result<BookWithProgress> {
        let url = self.client.endpoint(&format!("api/v1/books/{id}"))?;
        self.client.send_json(Method::PUT, url, payload).await
    }

    pub async fn delete(&self, id: BookId) -> Result<()> {
        let url = self.client.endpoint(&format!("api/v1/books/{id}"))?;
        self.client.delete(url).await
    }

    pub async fn sessions(&self, id: BookId) -> Result<Vec<ReadingSession>> {
        let url = self.client.endpoint(&format!("api/v1/books/{id}/sessions"))?;
        self.client.get_json(url).await
    }
}
