use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::{parse_enum, print_json};
use crate::domain::book_items::{BookFilter, BookFormat, BookStatus, NewBook, UpdateBook};
use crate::domain::ids::{BookId, SeriesId};
use crate::infrastructure::client::BokbadClient;

#[derive(Debug, Subcommand)]
pub enum BookCommands {
    /// Add a new book
    Add(AddBookCommand),
    /// List books, optionally filtered
    List(ListBooksCommand),
    /// List genres, topics and authors in use
    Tags,
    /// Show a book by ID
    Show(ShowBookCommand),
    /// Update a book
    Update(UpdateBookCommand),
    /// Delete a book and its sessions
    Delete(DeleteBookCommand),
}

pub async fn run(client: &BokbadClient, cmd: BookCommands) -> Result<()> {
    match cmd {
        BookCommands::Add(c) => add_book(client, c).await,
        BookCommands::List(c) => list_books(client, c).await,
        BookCommands::Tags => print_json(&client.books().tags().await?),
        BookCommands::Show(c) => show_book(client, c).await,
        BookCommands::Update(c) => update_book(client, c).await,
        BookCommands::Delete(c) => delete_book(client, c).await,
    }
}

#[derive(Debug, Args)]
pub struct AddBookCommand {
    #[arg(long)]
    pub title: String,
    /// Book format: paper, ebook, or audiobook
    #[arg(long, default_value = "paper")]
    pub format: String,
    /// Author name (repeatable)
    #[arg(long = "author")]
    pub authors: Vec<String>,
    #[arg(long)]
    pub isbn: Option<String>,
    /// Genre (repeatable)
    #[arg(long = "genre")]
    pub genres: Vec<String>,
    /// Topic (repeatable)
    #[arg(long = "topic")]
    pub topics: Vec<String>,
    #[arg(long)]
    pub thoughts: Option<String>,
    /// want-to-read, up-next, reading, or read
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub total_pages: Option<i32>,
    #[arg(long)]
    pub current_page: Option<i32>,
    #[arg(long)]
    pub current_percentage: Option<f64>,
    #[arg(long)]
    pub total_minutes: Option<i32>,
    #[arg(long)]
    pub current_minutes: Option<i32>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub finish_date: Option<NaiveDate>,
    #[arg(long)]
    pub series_id: Option<SeriesId>,
    #[arg(long)]
    pub series_order: Option<i32>,
}

pub async fn add_book(client: &BokbadClient, command: AddBookCommand) -> Result<()> {
    let format: BookFormat = parse_enum(&command.format, "format")?;
    let mut payload = NewBook::new(command.title, format);
    payload.authors = command.authors;
    payload.isbn = command.isbn;
    payload.genres = command.genres;
    payload.topics = command.topics;
    payload.thoughts = command.thoughts;
    if let Some(status) = command.status {
        payload.status = parse_enum::<BookStatus>(&status, "status")?;
    }
    payload.total_pages = command.total_pages;
    payload.current_page = command.current_page;
    payload.current_percentage = command.current_percentage;
    payload.total_duration_minutes = command.total_minutes;
    payload.current_duration_minutes = command.current_minutes;
    payload.start_date = command.start_date;
    payload.finish_date = command.finish_date;
    payload.series_id = command.series_id;
    payload.series_order = command.series_order;

    let book = client.books().create(&payload).await?;
    print_json(&book)
}

#[derive(Debug, Args)]
pub struct ListBooksCommand {
    #[arg(long)]
    pub status: Option<String>,
    /// Match against title or author
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub topic: Option<String>,
}

pub async fn list_books(client: &BokbadClient, command: ListBooksCommand) -> Result<()> {
    let filter = BookFilter {
        status: command
            .status
            .map(|s| parse_enum::<BookStatus>(&s, "status"))
            .transpose()?,
        search: command.search,
        genre: command.genre,
        topic: command.topic,
    };
    let books = client.books().list(&filter).await?;
    print_json(&books)
}

#[derive(Debug, Args)]
pub struct ShowBookCommand {
    pub id: BookId,
    /// Include the book's sessions
    #[arg(long)]
    pub sessions: bool,
}

pub async fn show_book(client: &BokbadClient, command: ShowBookCommand) -> Result<()> {
    let book = client.books().get(command.id).await?;
    if command.sessions {
        let sessions = client.books().sessions(command.id).await?;
        return print_json(&serde_json::json!({ "book": book, "sessions": sessions }));
    }
    print_json(&book)
}

#[derive(Debug, Args)]
pub struct UpdateBookCommand {
    pub id: BookId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long = "author")]
    pub authors: Vec<String>,
    #[arg(long)]
    pub isbn: Option<String>,
    /// Replace the genres (repeatable)
    #[arg(long = "genre")]
    pub genres: Vec<String>,
    /// Replace the topics (repeatable)
    #[arg(long = "topic")]
    pub topics: Vec<String>,
    /// Remove every genre and topic
    #[arg(long, conflicts_with_all = ["genres", "topics"])]
    pub clear_tags: bool,
    /// Pass an empty string to clear
    #[arg(long)]
    pub thoughts: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub format: Option<String>,
    #[arg(long)]
    pub total_pages: Option<i32>,
    #[arg(long)]
    pub current_page: Option<i32>,
    #[arg(long)]
    pub current_percentage: Option<f64>,
    #[arg(long)]
    pub total_minutes: Option<i32>,
    #[arg(long)]
    pub current_minutes: Option<i32>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub finish_date: Option<NaiveDate>,
    /// Clear the finish date
    #[arg(long, conflicts_with = "finish_date")]
    pub clear_finish_date: bool,
    #[arg(long)]
    pub series_id: Option<SeriesId>,
    /// Remove the book from its series
    #[arg(long, conflicts_with = "series_id")]
    pub clear_series: bool,
}

pub async fn update_book(client: &BokbadClient, command: UpdateBookCommand) -> Result<()> {
    let payload = UpdateBook {
        title: command.title,
        authors: (!command.authors.is_empty()).then_some(command.authors),
        isbn: command.isbn,
        genres: if command.clear_tags {
            Some(Vec::new())
        } else {
            (!command.genres.is_empty()).then_some(command.genres)
        },
        topics: if command.clear_tags {
            Some(Vec::new())
        } else {
            (!command.topics.is_empty()).then_some(command.topics)
        },
        thoughts: command.thoughts,
        status: command
            .status
            .map(|s| parse_enum::<BookStatus>(&s, "status"))
            .transpose()?,
        format: command
            .format
            .map(|s| parse_enum::<BookFormat>(&s, "format"))
            .transpose()?,
        total_pages: command.total_pages,
        current_page: command.current_page,
        current_percentage: command.current_percentage,
        total_duration_minutes: command.total_minutes,
        current_duration_minutes: command.current_minutes,
        start_date: command.start_date.map(Some),
        finish_date: if command.clear_finish_date {
            Some(None)
        } else {
            command.finish_date.map(Some)
        },
        series_id: if command.clear_series {
            Some(None)
        } else {
            command.series_id.map(Some)
        },
        series_order: None,
    };

    let book = client.books().update(command.id, &payload).await?;
    print_json(&book)
}

#[derive(Debug, Args)]
pub struct DeleteBookCommand {
    pub id: BookId,
}

pub async fn delete_book(client: &BokbadClient, command: DeleteBookCommand) -> Result<()> {
    client.books().delete(command.id).await?;
    eprintln!("Deleted book {}.", command.id);
    Ok(())
}
