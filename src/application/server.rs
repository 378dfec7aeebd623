use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::application::routes::app_router;
use crate::application::state::AppState;
use crate::domain::RepositoryError;
use crate::domain::ids::TokenId;
use crate::domain::tokens::{NewToken, Token};
use crate::domain::users::{NewUser, User};
use crate::infrastructure::auth::{generate_token, hash_token};
use crate::infrastructure::database::Database;

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub database_url: String,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let database = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let state = AppState::from_database(&database);

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        database = %config.database_url,
        "starting HTTP server"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server terminated unexpectedly")?;

    info!("server shutdown complete");

    Ok(())
}

/// Creates a user directly in the database and issues its first API token.
///
/// Returns the user and the plaintext token, which is never stored.
pub async fn provision_user(database: &Database, username: &str) -> anyhow::Result<(User, String)> {
    let state = AppState::from_database(database);
    let new_user = NewUser::new(username).map_err(|err| anyhow::anyhow!(err))?;

    let user = state
        .user_repo
        .insert(new_user)
        .await
        .with_context(|| format!("failed to create user {username}"))?;

    let (_, token) = insert_token(&state, &user, "cli").await?;

    info!(user_id = %user.id, username = %user.username, "user provisioned");
    Ok((user, token))
}

/// Issues an additional API token for an existing user.
pub async fn issue_token(
    database: &Database,
    username: &str,
    name: &str,
) -> anyhow::Result<(Token, String)> {
    let state = AppState::from_database(database);
    let user = find_user(&state, username).await?;
    insert_token(&state, &user, name).await
}

pub async fn list_tokens(database: &Database, username: &str) -> anyhow::Result<Vec<Token>> {
    let state = AppState::from_database(database);
    let user = find_user(&state, username).await?;
    state
        .token_repo
        .list_for_user(user.id)
        .await
        .context("failed to list API tokens")
}

/// Revokes a token; requests bearing it are rejected from then on.
pub async fn revoke_token(database: &Database, id: TokenId) -> anyhow::Result<Token> {
    let state = AppState::from_database(database);
    let token = state.token_repo.revoke(id).await.map_err(|err| match err {
        RepositoryError::NotFound => anyhow::anyhow!("token {id} does not exist"),
        other => anyhow::Error::new(other).context("failed to revoke API token"),
    })?;

    info!(token_id = %token.id, user_id = %token.user_id, "API token revoked");
    Ok(token)
}

async fn find_user(state: &AppState, username: &str) -> anyhow::Result<User> {
    state
        .user_repo
        .get_by_username(username.trim())
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound => anyhow::anyhow!("user {username} does not exist"),
            other => anyhow::Error::new(other).context("failed to look up user"),
        })
}

async fn insert_token(
    state: &AppState,
    user: &User,
    name: &str,
) -> anyhow::Result<(Token, String)> {
    let token = generate_token();
    let record = state
        .token_repo
        .insert(NewToken {
            user_id: user.id,
            name: name.to_string(),
            token_hash: hash_token(&token),
        })
        .await
        .context("failed to issue API token")?;

    info!(user_id = %user.id, token_id = %record.id, name, "API token issued");
    Ok((record, token))
}

#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
