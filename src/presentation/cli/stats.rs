use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::print_json;
use crate::infrastructure::client::BokbadClient;

#[derive(Debug, Subcommand)]
pub enum StatsCommands {
    /// Statistics for a date range, or all time
    Period(PeriodCommand),
    /// Current streak and recent reading days
    Streak(StreakCommand),
    /// Per-day minutes and pages
    Daily(DailyCommand),
    /// Genres and topics of finished books
    Genres(PeriodCommand),
    /// Books finished per month of a year
    Yearly(YearlyCommand),
    /// Reading activity for one month
    Calendar(CalendarCommand),
}

pub async fn run(client: &BokbadClient, cmd: StatsCommands) -> Result<()> {
    match cmd {
        StatsCommands::Period(c) => print_json(&client.stats().period(c.from, c.to).await?),
        StatsCommands::Streak(c) => print_json(&client.stats().streak(c.days).await?),
        StatsCommands::Daily(c) => print_json(&client.stats().daily(c.from, c.to).await?),
        StatsCommands::Genres(c) => print_json(&client.stats().genres(c.from, c.to).await?),
        StatsCommands::Yearly(c) => {
            print_json(&client.stats().yearly(c.year, c.compare).await?)
        }
        StatsCommands::Calendar(c) => {
            print_json(&client.stats().calendar(c.year, c.month).await?)
        }
    }
}

#[derive(Debug, Args)]
pub struct PeriodCommand {
    #[arg(long)]
    pub from: Option<NaiveDate>,
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct StreakCommand {
    /// Number of recent days to show (1-30)
    #[arg(long)]
    pub days: Option<u32>,
}

#[derive(Debug, Args)]
pub struct DailyCommand {
    #[arg(long)]
    pub from: NaiveDate,
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct YearlyCommand {
    #[arg(long)]
    pub year: Option<i32>,
    /// Include the previous year
    #[arg(long)]
    pub compare: bool,
}

#[derive(Debug, Args)]
pub struct CalendarCommand {
    #[arg(long)]
    pub year: Option<i32>,
    #[arg(long)]
    pub month: Option<u32>,
}
