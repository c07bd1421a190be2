/// Melody console - chat-style music commands against simulated voice sessions
use clap::{Parser, Subcommand};
use melody_console::{
    commands::render_event, CatalogResolver, Console, MelodyConfig, SimulatedBackendFactory,
};
use melody_core::GuildId;
use melody_playback::{event_channel, format::format_seconds, SessionRegistry};
use std::{path::PathBuf, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "melody-console")]
#[command(about = "Melody music bot console", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read commands from stdin and play them
    Run {
        /// Configuration file path
        #[arg(short, long, env = "MELODY_CONFIG")]
        config: Option<PathBuf>,
    },
    /// List the tracks the catalog can resolve
    Catalog {
        /// Configuration file path
        #[arg(short, long, env = "MELODY_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "melody_console=info,melody_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            run(config).await?;
        }
        Commands::Catalog { config } => {
            list_catalog(config)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<MelodyConfig> {
    let config = MelodyConfig::load(path.as_deref())?;
    config.validate()?;
    Ok(config)
}

async fn run(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let catalog = CatalogResolver::load(&config.catalog.path, config.catalog.match_threshold)?;
    tracing::info!(
        "Catalog loaded: {} tracks from {}",
        catalog.entries().len(),
        config.catalog.path.display()
    );

    let backends = SimulatedBackendFactory::new(config.simulator.time_scale, catalog.lengths());
    let (events_tx, mut events_rx) = event_channel();
    let registry = Arc::new(
        SessionRegistry::new(Arc::new(catalog), Arc::new(backends), config.playback.clone())
            .with_events(events_tx),
    );

    let console = Console::new(
        Arc::clone(&registry),
        GuildId::new(config.bot.guild_id),
        config.bot.requester.clone(),
        config.bot.prefix.clone(),
    );

    tracing::info!(
        "Listening for commands in guild {} (prefix `{}`)",
        console.guild(),
        config.bot.prefix
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if let Some(reply) = console.handle_line(&line) {
                        println!("{reply}");
                    }
                }
                None => break,
            },
            Some(event) = events_rx.recv() => {
                println!("{}", render_event(&event));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    registry.shutdown();
    tracing::info!("Console stopped");

    Ok(())
}

fn list_catalog(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let catalog = CatalogResolver::load(&config.catalog.path, config.catalog.match_threshold)?;

    println!("Catalog ({} tracks):", catalog.entries().len());
    for (i, entry) in catalog.entries().iter().enumerate() {
        println!(
            "  {:>2}) {} [{}] {}",
            i + 1,
            entry.title,
            format_seconds(entry.duration),
            entry.url
        );
    }

    Ok(())
}
