use async_trait::async_trait;
use sqlx::query_as;

use crate::domain::RepositoryError;
use crate::domain::goals::{GoalTargets, ReadingGoal};
use crate::domain::ids::{GoalId, UserId};
use crate::domain::repositories::GoalRepository;
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlGoalRepository {
    pool: DatabasePool,
}

impl SqlGoalRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn db_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::unexpected(err.to_string())
}

#[async_trait]
impl GoalRepository for SqlGoalRepository {
    async fn upsert(
        &self,
        user_id: UserId,
        year: i32,
        targets: GoalTargets,
    ) -> Result<ReadingGoal, RepositoryError> {
        let record = query_as::<_, GoalRecord>(
            r"INSERT INTO reading_goals (user_id, year, target_books, target_pages)
              VALUES (?, ?, ?, ?)
              ON CONFLICT (user_id, year) DO UPDATE SET
                  target_books = excluded.target_books,
                  target_pages = excluded.target_pages
              RETURNING id, user_id, year, target_books, target_pages",
        )
        .bind(user_id.into_inner())
        .bind(year)
        .bind(targets.target_books)
        .bind(targets.target_pages)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record.into_goal())
    }

    async fn get(&self, user_id: UserId, year: i32) -> Result<ReadingGoal, RepositoryError> {
        let record = query_as::<_, GoalRecord>(
            r"SELECT id, user_id, year, target_books, target_pages
              FROM reading_goals WHERE user_id = ? AND year = ?",
        )
        .bind(user_id.into_inner())
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into_goal())
    }

    async fn delete(&self, user_id: UserId, year: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM reading_goals WHERE user_id = ? AND year = ?")
            .bind(user_id.into_inner())
            .bind(year)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct GoalRecord {
    id: i64,
    user_id: i64,
    year: i32,
    target_books: Option<i32>,
    target_pages: Option<i32>,
}

impl GoalRecord {
    fn into_goal(self) -> ReadingGoal {
        ReadingGoal {
            id: GoalId::new(self.id),
            user_id: UserId::new(self.user_id),
            year: self.year,
            target_books: self.target_books,
            target_pages: self.target_pages,
        }
    }
}
