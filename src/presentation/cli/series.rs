use anyhow::Result;
use clap::{Args, Subcommand};

use super::print_json;
use crate::domain::ids::SeriesId;
use crate::domain::series::NewSeries;
use crate::infrastructure::client::BokbadClient;

#[derive(Debug, Subcommand)]
pub enum SeriesCommands {
    /// List series with their book counts
    List,
    /// Add a series
    Add(AddSeriesCommand),
    /// Delete a series; its books are kept
    Delete(DeleteSeriesCommand),
}

pub async fn run(client: &BokbadClient, cmd: SeriesCommands) -> Result<()> {
    match cmd {
        SeriesCommands::List => print_json(&client.series().list().await?),
        SeriesCommands::Add(c) => {
            let payload = NewSeries {
                name: c.name,
                total_books: c.total_books,
            };
            print_json(&client.series().create(&payload).await?)
        }
        SeriesCommands::Delete(c) => {
            client.series().delete(c.id).await?;
            eprintln!("Deleted series {}.", c.id);
            Ok(())
        }
    }
}

#[derive(Debug, Args)]
pub struct AddSeriesCommand {
    pub name: String,
    #[arg(long)]
    pub total_books: Option<i32>,
}

#[derive(Debug, Args)]
pub struct DeleteSeriesCommand {
    pub id: SeriesId,
}
