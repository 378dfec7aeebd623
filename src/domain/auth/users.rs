use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;
use crate::domain::ids::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub uuid: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub uuid: String,
}

impl NewUser {
    pub fn new(username: &str) -> Result<Self, ValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::new("username is required"));
        }
        Ok(Self {
            username: username.to_string(),
            uuid: uuid::Uuid::new_v4().to_string(),
        })
    }
}
