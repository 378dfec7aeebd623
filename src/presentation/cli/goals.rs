use anyhow::Result;
use clap::{Args, Subcommand};

use super::print_json;
use crate::domain::goals::GoalTargets;
use crate::infrastructure::client::BokbadClient;

#[derive(Debug, Subcommand)]
pub enum GoalCommands {
    /// Set the goal for a year
    Set(SetGoalCommand),
    /// Show a year's goal and progress
    Show(YearArg),
    /// Delete a year's goal
    Delete(YearArg),
}

pub async fn run(client: &BokbadClient, cmd: GoalCommands) -> Result<()> {
    match cmd {
        GoalCommands::Set(c) => {
            let targets = GoalTargets {
                target_books: c.books,
                target_pages: c.pages,
            };
            print_json(&client.goals().set(c.year, &targets).await?)
        }
        GoalCommands::Show(c) => print_json(&client.goals().get(c.year).await?),
        GoalCommands::Delete(c) => {
            client.goals().delete(c.year).await?;
            eprintln!("Deleted goal for {}.", c.year);
            Ok(())
        }
    }
}

#[derive(Debug, Args)]
pub struct SetGoalCommand {
    pub year: i32,
    #[arg(long)]
    pub books: Option<i32>,
    #[arg(long)]
    pub pages: Option<i32>,
}

#[derive(Debug, Args)]
pub struct YearArg {
    pub year: i32,
}
