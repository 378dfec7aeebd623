use std::sync::Arc;

use tracing::info;

use crate::application::errors::AppError;
use crate::domain::RepositoryError;
use crate::domain::activity::validate_year;
use crate::domain::goals::{GoalProgress, GoalTargets, ReadingGoal};
use crate::domain::ids::UserId;
use crate::domain::repositories::{GoalRepository, StatsRepository};

#[derive(Clone)]
pub struct GoalService {
    goals: Arc<dyn GoalRepository>,
    stats: Arc<dyn StatsRepository>,
}

impl GoalService {
    pub fn new(goals: Arc<dyn GoalRepository>, stats: Arc<dyn StatsRepository>) -> Self {
        Self { goals, stats }
    }

    pub async fn upsert(
        &self,
        user_id: UserId,
        year: i32,
        targets: GoalTargets,
    ) -> Result<ReadingGoal, AppError> {
        let year = validate_year(year)?;
        let targets = targets.normalize()?;
        let goal = self.goals.upsert(user_id, year, targets).await?;
        info!(%user_id, year, target_books = ?goal.target_books, target_pages = ?goal.target_pages, "reading goal saved");
        Ok(goal)
    }

    /// Progress for `year`, with or without a goal set.
    pub async fn progress(&self, user_id: UserId, year: i32) -> Result<GoalProgress, AppError> {
        let year = validate_year(year)?;
        let goal = match self.goals.get(user_id, year).await {
            Ok(goal) => Some(goal),
            Err(RepositoryError::NotFound) => None,
            Err(err) => return Err(err.into()),
        };
        let books = self.stats.finished_books(user_id, year).await?;
        Ok(GoalProgress::build(year, goal, books))
    }

    pub async fn delete(&self, user_id: UserId, year: i32) -> Result<(), AppError> {
        self.goals.delete(user_id, year).await?;
        info!(%user_id, year, "reading goal deleted");
        Ok(())
    }
}
