use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_as;

use crate::domain::RepositoryError;
use crate::domain::ids::UserId;
use crate::domain::repositories::UserRepository;
use crate::domain::users::{NewUser, User};
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlUserRepository {
    pool: DatabasePool,
}

impl SqlUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn db_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::unexpected(err.to_string())
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let record = query_as::<_, UserRecord>(
            r"INSERT INTO users (username, uuid, created_at)
              VALUES (?, ?, ?)
              RETURNING id, username, uuid, created_at",
        )
        .bind(&user.username)
        .bind(&user.uuid)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if err
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                RepositoryError::conflict(format!("user {} already exists", user.username))
            } else {
                db_err(err)
            }
        })?;

        Ok(record.into_user())
    }

    async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        let record = query_as::<_, UserRecord>(
            "SELECT id, username, uuid, created_at FROM users WHERE id = ?",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into_user())
    }

    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        let record = query_as::<_, UserRecord>(
            "SELECT id, username, uuid, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into_user())
    }
}

#[derive(sqlx::FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    uuid: String,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn into_user(self) -> User {
        User {
            id: UserId::new(self.id),
            username: self.username,
            uuid: self.uuid,
            created_at: self.created_at,
        }
    }
}
