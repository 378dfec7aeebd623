use anyhow::Result;
use clap::{Args, Subcommand};

use super::print_json;
use crate::application::{issue_token, list_tokens, provision_user, revoke_token};
use crate::domain::ids::TokenId;
use crate::infrastructure::database::Database;

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    /// Create a user and print its API token
    Create(CreateUserCommand),
    /// Issue another API token for a user
    Token(IssueTokenCommand),
    /// List a user's API tokens
    Tokens(ListTokensCommand),
    /// Revoke an API token by ID
    Revoke(RevokeTokenCommand),
}

pub async fn run(cmd: UserCommands) -> Result<()> {
    match cmd {
        UserCommands::Create(c) => create_user(c).await,
        UserCommands::Token(c) => issue(c).await,
        UserCommands::Tokens(c) => list(c).await,
        UserCommands::Revoke(c) => revoke(c).await,
    }
}

#[derive(Debug, Args)]
pub struct DatabaseArgs {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://bokbad.db")]
    pub database_url: String,
}

#[derive(Debug, Args)]
pub struct CreateUserCommand {
    pub username: String,
    #[command(flatten)]
    pub database: DatabaseArgs,
}

pub async fn create_user(command: CreateUserCommand) -> Result<()> {
    let database = Database::connect(&command.database.database_url).await?;
    let (user, token) = provision_user(&database, &command.username).await?;
    eprintln!("Created user {} (id {}).", user.username, user.id);
    eprintln!("Store this token now; it cannot be shown again:");
    println!("{token}");
    Ok(())
}

#[derive(Debug, Args)]
pub struct IssueTokenCommand {
    pub username: String,
    /// Label shown when listing tokens
    #[arg(long, default_value = "cli")]
    pub name: String,
    #[command(flatten)]
    pub database: DatabaseArgs,
}

pub async fn issue(command: IssueTokenCommand) -> Result<()> {
    let database = Database::connect(&command.database.database_url).await?;
    let (record, token) = issue_token(&database, &command.username, &command.name).await?;
    eprintln!("Issued token {} for {}.", record.id, command.username);
    eprintln!("Store this token now; it cannot be shown again:");
    println!("{token}");
    Ok(())
}

#[derive(Debug, Args)]
pub struct ListTokensCommand {
    pub username: String,
    #[command(flatten)]
    pub database: DatabaseArgs,
}

pub async fn list(command: ListTokensCommand) -> Result<()> {
    let database = Database::connect(&command.database.database_url).await?;
    let tokens = list_tokens(&database, &command.username).await?;
    print_json(&tokens)
}

#[derive(Debug, Args)]
pub struct RevokeTokenCommand {
    pub id: TokenId,
    #[command(flatten)]
    pub database: DatabaseArgs,
}

pub async fn revoke(command: RevokeTokenCommand) -> Result<()> {
    let database = Database::connect(&command.database.database_url).await?;
    let token = revoke_token(&database, command.id).await?;
    eprintln!("Revoked token {} ({}).", token.id, token.name);
    Ok(())
}
