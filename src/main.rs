//! DraftKingsOdds - Main Entry Point
//!
//! Fetches DraftKings pregame odds or streams live odds updates to the console.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use draftkings_odds::config::load_config;
use draftkings_odds::{ConsoleSink, DraftKingsClient, OddsSink, SelectionFilter};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the games of a league with their event ids
    Events {
        /// League name, e.g. NHL or NBA
        #[arg(short, long)]
        league: Option<String>,
    },
    /// Fetch pregame odds for the main markets of a league
    Snapshot {
        #[arg(short, long)]
        league: Option<String>,
        /// Store the snapshot as JSON
        #[arg(long)]
        save: bool,
        /// Output path for --save (defaults to <league>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Stream live odds updates until Ctrl-C
    Stream {
        #[arg(short, long)]
        league: Option<String>,
        /// Comma-separated event ids to keep
        #[arg(long, value_delimiter = ',')]
        event_ids: Option<Vec<String>>,
        /// Comma-separated market names to keep, e.g. Moneyline,Total
        #[arg(long, value_delimiter = ',')]
        markets: Option<Vec<String>>,
        /// Stop after this many seconds without a message
        #[arg(long)]
        idle_timeout: Option<u64>,
    },
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let mut config = load_config(Some(args.config.as_str()))?;

    let level = parse_level(args.log_level.as_deref().unwrap_or(&config.settings.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting DraftKingsOdds application");
    info!("Configuration file: {}", args.config);

    match args.command {
        Command::Events { league } => {
            let client = client_for(&config, league.as_deref())?;
            for (game, event_id) in client.get_event_ids().await? {
                println!("{} {}", game, event_id);
            }
        }
        Command::Snapshot {
            league,
            save,
            output,
        } => {
            let client = client_for(&config, league.as_deref())?;
            let games = client.get_pregame_odds().await?;
            for game in &games {
                println!("{}", game.game);
                for market in &game.markets {
                    let outcomes: Vec<String> = market
                        .outcomes
                        .iter()
                        .map(|o| format!("{} @ {}", o.label, o.odds))
                        .collect();
                    println!("  {}: {}", market.market_name, outcomes.join(" | "));
                }
            }
            if save {
                client.store_as_json(&games, output.as_deref())?;
            } else if output.is_some() {
                warn!("--output has no effect without --save");
            }
        }
        Command::Stream {
            league,
            event_ids,
            markets,
            idle_timeout,
        } => {
            if let Some(secs) = idle_timeout {
                config.settings.idle_timeout_seconds = secs;
            }
            let client = client_for(&config, league.as_deref())?;
            let filter = SelectionFilter {
                event_ids: event_ids.map(|ids| ids.into_iter().collect()),
                markets: markets.map(|names| names.into_iter().collect()),
            };

            let cancel = CancellationToken::new();
            let shutdown = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Received shutdown signal, cleaning up...");
                    shutdown.cancel();
                }
            });

            let (mut tx, mut rx) = client.event_channel();
            let printer = tokio::spawn(async move {
                let mut sink = ConsoleSink::stdout();
                while let Some(event) = rx.recv().await {
                    if let Err(e) = sink.emit(event).await {
                        warn!("Failed to print update: {}", e);
                    }
                }
            });

            let result = client.live_odds_stream(filter, &mut tx, cancel).await;
            drop(tx);
            printer.await?;
            result?;
        }
    }

    Ok(())
}

fn client_for(
    config: &draftkings_odds::AppConfig,
    league: Option<&str>,
) -> draftkings_odds::Result<DraftKingsClient> {
    match league {
        Some(league) => DraftKingsClient::for_league(config, league),
        None => DraftKingsClient::new(config),
    }
}
