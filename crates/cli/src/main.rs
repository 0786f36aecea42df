use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context as _,
    cadence_commands::TrackQueue,
    cadence_config::{CadenceConfig, TOKEN_ENV},
    cadence_discord::CacheVoiceStates,
    cadence_dispatch::{CommandDefinition, CommandRegistry, Dispatcher},
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "cadence", about = "Cadence, a Discord music bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file. Defaults to ./cadence.toml, then ~/.config/cadence/.
    #[arg(long, global = true, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Connect to Discord and serve commands (default).
    Run,
    /// Print the command payloads that would be registered.
    Commands,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Every command the bot serves.
fn commands(tracks: Arc<TrackQueue>) -> Vec<CommandDefinition> {
    cadence_commands::builtin(tracks)
}

async fn run(config: CadenceConfig) -> anyhow::Result<()> {
    let token = config
        .discord
        .token
        .clone()
        .with_context(|| format!("no bot token: set discord.token or {TOKEN_ENV}"))?;

    let voice = Arc::new(CacheVoiceStates::new());
    let dispatcher = Dispatcher::from_config(
        &config,
        commands(Arc::new(TrackQueue::new())),
        Arc::clone(&voice) as _,
    )?;
    cadence_discord::run(&token, Arc::new(dispatcher), voice).await
}

fn print_commands() -> anyhow::Result<()> {
    let registry = CommandRegistry::load(commands(Arc::new(TrackQueue::new())))?;
    println!("{}", serde_json::to_string_pretty(&registry.payloads())?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "cadence starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let config = cadence_config::discover_and_load(cli.config.as_deref())?;
            run(config).await
        },
        Commands::Commands => print_commands(),
    }
}
