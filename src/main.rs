use anyhow::Result;
use bokbad::application::{ServerConfig, serve};
use bokbad::infrastructure::client::BokbadClient;
use bokbad::presentation::cli::{
    Cli, Commands, ServeCommand, books, goals, series, sessions, stats, users,
};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => run_server(cmd).await,
        Commands::User { command } => users::run(command).await,
        Commands::Book { command } => {
            let client = BokbadClient::from_base_url(&cli.api_url, cli.token)?;
            books::run(&client, command).await
        }
        Commands::Session { command } => {
            let client = BokbadClient::from_base_url(&cli.api_url, cli.token)?;
            sessions::run(&client, command).await
        }
        Commands::Stats { command } => {
            let client = BokbadClient::from_base_url(&cli.api_url, cli.token)?;
            stats::run(&client, command).await
        }
        Commands::Goal { command } => {
            let client = BokbadClient::from_base_url(&cli.api_url, cli.token)?;
            goals::run(&client, command).await
        }
        Commands::Series { command } => {
            let client = BokbadClient::from_base_url(&cli.api_url, cli.token)?;
            series::run(&client, command).await
        }
    }
}

async fn run_server(command: ServeCommand) -> Result<()> {
    let config = ServerConfig {
        bind_address: command.http_addr,
        database_url: command.database_url,
    };

    serve(config).await
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
