use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::print_json;
use crate::domain::ids::{BookId, SessionId};
use crate::domain::sessions::NewSession;
use crate::infrastructure::client::BokbadClient;

#[derive(Debug, Subcommand)]
pub enum SessionCommands {
    /// Log a reading session and advance the book
    Log(LogSessionCommand),
    /// List sessions, newest first
    List(ListSessionsCommand),
    /// Delete a session (book progress is kept)
    Delete(DeleteSessionCommand),
}

pub async fn run(client: &BokbadClient, cmd: SessionCommands) -> Result<()> {
    match cmd {
        SessionCommands::Log(c) => log_session(client, c).await,
        SessionCommands::List(c) => list_sessions(client, c).await,
        SessionCommands::Delete(c) => delete_session(client, c).await,
    }
}

#[derive(Debug, Args)]
pub struct LogSessionCommand {
    pub book_id: BookId,
    /// Session date (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Paper books: the page reached
    #[arg(long)]
    pub page: Option<i32>,
    /// Ebooks: the percentage reached
    #[arg(long)]
    pub percent: Option<f64>,
    /// Audiobooks: position reached or minutes listened; others: minutes spent
    #[arg(long)]
    pub minutes: Option<i32>,
    #[arg(long)]
    pub notes: Option<String>,
}

pub async fn log_session(client: &BokbadClient, command: LogSessionCommand) -> Result<()> {
    let payload = NewSession {
        book_id: command.book_id,
        session_date: command.date,
        pages_read: command.page,
        percentage: command.percent,
        duration_minutes: command.minutes,
        notes: command.notes,
    };
    let result = client.sessions().log(&payload).await?;
    if result.just_completed {
        eprintln!("Finished \"{}\".", result.book.book.title);
    }
    print_json(&result)
}

#[derive(Debug, Args)]
pub struct ListSessionsCommand {
    #[arg(long)]
    pub book_id: Option<BookId>,
}

pub async fn list_sessions(client: &BokbadClient, command: ListSessionsCommand) -> Result<()> {
    let sessions = client.sessions().list(command.book_id).await?;
    print_json(&sessions)
}

#[derive(Debug, Args)]
pub struct DeleteSessionCommand {
    pub id: SessionId,
}

pub async fn delete_session(client: &BokbadClient, command: DeleteSessionCommand) -> Result<()> {
    client.sessions().delete(command.id).await?;
    eprintln!("Deleted session {}.", command.id);
    Ok(())
}
