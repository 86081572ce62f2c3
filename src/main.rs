use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use power_snake::game::{Difficulty, GameMode, GameSettings, MapSize};
use power_snake::modes::HumanMode;
use power_snake::storage::{JsonFileStore, MemoryStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "power_snake")]
#[command(version, about = "Terminal snake with game modes and timed power-ups")]
struct Cli {
    /// Initial game mode on the menu
    #[arg(long, value_enum, default_value_t = GameMode::Classic)]
    mode: GameMode,

    /// Initial difficulty (tick speed)
    #[arg(long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// Initial board size
    #[arg(long, value_enum, default_value_t = MapSize::Medium)]
    map_size: MapSize,

    /// Where the high score is kept
    #[arg(long, default_value = ".power_snake_high_score.json")]
    high_score_file: PathBuf,

    /// Keep the high score in memory only
    #[arg(long)]
    no_persist: bool,

    /// Write logs to this file (the terminal belongs to the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let settings = GameSettings::new(cli.mode, cli.difficulty, cli.map_size);
    tracing::info!(%settings, no_persist = cli.no_persist, "starting");

    if cli.no_persist {
        HumanMode::new(settings, MemoryStore::new()).run().await?;
    } else {
        let store = JsonFileStore::new(cli.high_score_file);
        tracing::info!(path = %store.path().display(), "high score file");
        HumanMode::new(settings, store).run().await?;
    }

    Ok(())
}
