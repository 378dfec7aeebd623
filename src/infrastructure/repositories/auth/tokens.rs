use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_as;

use crate::domain::RepositoryError;
use crate::domain::ids::{TokenId, UserId};
use crate::domain::repositories::TokenRepository;
use crate::domain::tokens::{NewToken, Token};
use crate::infrastructure::database::DatabasePool;

const TOKEN_COLUMNS: &str = "id, user_id, name, token_hash, created_at, last_used_at, revoked_at";

#[derive(Clone)]
pub struct SqlTokenRepository {
    pool: DatabasePool,
}

impl SqlTokenRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn db_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::unexpected(err.to_string())
}

#[async_trait]
impl TokenRepository for SqlTokenRepository {
    async fn insert(&self, token: NewToken) -> Result<Token, RepositoryError> {
        let query = format!(
            "INSERT INTO api_tokens (user_id, name, token_hash, created_at) VALUES (?, ?, ?, ?) RETURNING {TOKEN_COLUMNS}"
        );

        let record = query_as::<_, TokenRecord>(&query)
            .bind(token.user_id.into_inner())
            .bind(&token.name)
            .bind(&token.token_hash)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(record.into_token())
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Token, RepositoryError> {
        let query = format!("SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE token_hash = ?");

        let record = query_as::<_, TokenRecord>(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        Ok(record.into_token())
    }

    async fn update_last_used(&self, id: TokenId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE api_tokens SET last_used_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Token>, RepositoryError> {
        let query =
            format!("SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE user_id = ? ORDER BY id");

        let records = query_as::<_, TokenRecord>(&query)
            .bind(user_id.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(records.into_iter().map(TokenRecord::into_token).collect())
    }

    async fn revoke(&self, id: TokenId) -> Result<Token, RepositoryError> {
        let query = format!(
            "UPDATE api_tokens SET revoked_at = COALESCE(revoked_at, ?) WHERE id = ? RETURNING {TOKEN_COLUMNS}"
        );

        let record = query_as::<_, TokenRecord>(&query)
            .bind(Utc::now())
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        Ok(record.into_token())
    }
}

#[derive(sqlx::FromRow)]
struct TokenRecord {
    id: i64,
    user_id: i64,
    name: String,
    token_hash: String,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    fn into_token(self) -> Token {
        Token {
            id: TokenId::new(self.id),
            user_id: UserId::new(self.user_id),
            name: self.name,
            token_hash: self.token_hash,
            created_at: self.created_at,
            last_used_at: self.last_used_at,
            revoked_at: self.revoked_at,
        }
    }
}
