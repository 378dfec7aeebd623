use std::sync::Arc;

use tracing::info;

use crate::application::errors::AppError;
use crate::domain::ids::{SeriesId, UserId};
use crate::domain::repositories::SeriesRepository;
use crate::domain::series::{NewSeries, Series, SeriesSummary};

#[derive(Clone)]
pub struct SeriesService {
    series: Arc<dyn SeriesRepository>,
}

impl SeriesService {
    pub fn new(series: Arc<dyn SeriesRepository>) -> Self {
        Self { series }
    }

    pub async fn create(&self, user_id: UserId, new: NewSeries) -> Result<Series, AppError> {
        let series = self.series.insert(user_id, new.normalize()?).await?;
        info!(%user_id, series_id = %series.id, "series created");
        Ok(series)
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<SeriesSummary>, AppError> {
        Ok(self.series.list(user_id).await?)
    }

    pub async fn delete(&self, user_id: UserId, id: SeriesId) -> Result<(), AppError> {
        self.series.delete(user_id, id).await?;
        info!(%user_id, series_id = %id, "series deleted");
        Ok(())
    }
}
