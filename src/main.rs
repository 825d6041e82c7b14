use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use soccerx::ai::ChatSession;
use soccerx::config::{Settings, load_dotenv};
use soccerx::fixture::kickoff_view;
use soccerx::kickoff::{run_countdown, to_target_instant};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "soccerx", version, about = "SoccerX football assistant")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the AI sports assistant
    Chat,
    /// Show when a match kicks off
    Kickoff {
        /// Match date as sent by the API (YYYY-MM-DD)
        date: String,
        /// Match time as sent by the API (HH:MM[:SS])
        time: String,
        /// Provider status, e.g. NS, 1H, FT
        #[arg(long)]
        status: Option<String>,
        /// Keep printing the countdown every second until kickoff
        #[arg(long)]
        watch: bool,
    },
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("soccerx=info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    // Env mutation has to happen before the runtime spawns worker threads.
    load_dotenv();
    init_tracing();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Chat => chat().await,
        Command::Kickoff {
            date,
            time,
            status,
            watch,
        } => kickoff(&date, &time, status.as_deref(), watch).await,
    }
}

async fn chat() -> Result<()> {
    let settings = Settings::from_env();
    let mut session = ChatSession::new(settings.build_cascade());

    for message in session.messages() {
        println!("assistant> {}", message.content);
    }
    if !session.is_configured() {
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if let Some(reply) = session.send(&line).await {
            println!("assistant> {}", reply.content);
        }
    }
    Ok(())
}

async fn kickoff(date: &str, time: &str, status: Option<&str>, watch: bool) -> Result<()> {
    let view = kickoff_view(status, date, time, OffsetDateTime::now_utc());
    println!("{} {}", view.status.badge(), view.when);

    match (watch, view.countdown) {
        (false, Some(remaining)) => println!("Starts in: {remaining}"),
        (true, Some(_)) => {
            let target = to_target_instant(date, time)?;
            run_countdown(
                target,
                OffsetDateTime::now_utc,
                Duration::from_secs(1),
                |remaining| println!("Starts in: {remaining}"),
            )
            .await;
        }
        (_, None) => {}
    }
    Ok(())
}
