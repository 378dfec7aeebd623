pub mod books;
pub mod goals;
pub mod series;
pub mod sessions;
pub mod stats;
pub mod users;

use std::net::SocketAddr;

use books::BookCommands;
use clap::{Args, Parser, Subcommand};
use goals::GoalCommands;
use series::SeriesCommands;
use sessions::SessionCommands;
use stats::StatsCommands;
use users::UserCommands;

#[derive(Debug, Parser)]
#[command(author, version, about = "Track reading progress and statistics", long_about = None)]
pub struct Cli {
    #[arg(
        long = "url",
        global = true,
        env = "BOKBAD_URL",
        default_value = "http://localhost:3000"
    )]
    pub api_url: String,

    /// API token sent as a bearer credential
    #[arg(long, global = true, env = "BOKBAD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Provision users directly in the database
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage books
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },

    /// Log and inspect reading sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Reading statistics
    Stats {
        #[command(subcommand)]
        command: StatsCommands,
    },

    /// Manage yearly reading goals
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },

    /// Manage book series
    Series {
        #[command(subcommand)]
        command: SeriesCommands,
    },
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://bokbad.db")]
    pub database_url: String,

    #[arg(long, env = "BOKBAD_HTTP_ADDR", default_value = "127.0.0.1:3000")]
    pub http_addr: SocketAddr,
}

pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn parse_enum<T: std::str::FromStr<Err = ()>>(
    value: &str,
    kind: &str,
) -> anyhow::Result<T> {
    value
        .parse::<T>()
        .map_err(|()| anyhow::anyhow!("invalid {kind}: {value}"))
}
