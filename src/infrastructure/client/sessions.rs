use anyhow::Result;
use reqwest::Method;

use super::BokbadClient;
use crate::domain::ids::{BookId, SessionId};
use crate::domain::sessions::{NewSession, ReadingSession, SessionResult};

pub struct SessionsClient<'a> {
    client: &'a BokbadClient,
}

impl<'a> SessionsClient<'a> {
    pub fn new(client: &'a BokbadClient) -> Self {
        Self { client }
    }

    pub async fn log(&self, payload: &NewSession) -> Result<SessionResult> {
        let url = self.client.endpoint("api/v1/sessions")?;
        self.client.send_json(Method::POST, url, payload).await
    }

    pub async fn list(&self, book_id: Option<BookId>) -> Result<Vec<ReadingSession>> {
        let mut url = self.client.endpoint("api/v1/sessions")?;
        if let Some(id) = book_id {
            url.query_pairs_mut()
                .append_pair("book_id", &id.to_string());
        }
        self.client.get_json(url).await
    }

    pub async fn get(&self, id: SessionId) -> Result<ReadingSession> {
        let url = self.client.endpoint(&format!("api/v1/sessions/{id}"))?;
        self.client.get_json(url).await
    }

    pub async fn delete(&self, id: SessionId) -> Result<()> {
        let url = self.client.endpoint(&format!("api/v1/sessions/{id}"))?;
        self.client.delete(url).await
    }
}
