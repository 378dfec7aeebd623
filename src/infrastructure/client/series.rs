use anyhow::Result;
use reqwest::Method;

use super::BokbadClient;
use crate::domain::ids::SeriesId;
use crate::domain::series::{NewSeries, Series, SeriesSummary};

pub struct SeriesClient<'a> {
    client: &'a BokbadClient,
}

impl<'a> SeriesClient<'a> {
    pub fn new(client: &'a BokbadClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<SeriesSummary>> {
        let url = self.client.endpoint("api/v1/series")?;
        self.client.get_json(url).await
    }

    pub async fn create(&self, payload: &NewSeries) -> Result<Series> {
        let url = self.client.endpoint("api/v1/series")?;
        self.client.send_json(Method::POST, url, payload).await
    }

    pub async fn delete(&self, id: SeriesId) -> Result<()> {
        let url = self.client.endpoint(&format!("api/v1/series/{id}"))?;
        self.client.delete(url).await
    }
}
