//! TecnoBot TUI: full-screen chat with the Instituto 13 de Julio assistant.
//!
//! Transcript view, input line and model selector, built with `ratatui` +
//! `crossterm`. Logs go to a file so they do not corrupt the screen.

mod app;
mod chat;
mod widgets;

use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tecnobot_core::{StartupOverrides, bootstrap};
use tecnobot_shared::{EnvSecrets, ModelSelection, config_dir, load_config};

/// Log file name inside the config directory.
const LOG_FILE_NAME: &str = "tecnobot-tui.log";

/// Full-screen chat with TecnoBot.
#[derive(Parser)]
#[command(name = "tecnobot-tui", version, long_about = None)]
struct Args {
    /// Knowledge file (keyword → text JSON). Overrides the config file.
    #[arg(long, env = "TECNOBOT_KNOWLEDGE")]
    knowledge: Option<PathBuf>,

    /// Model to start with. Overrides the config file.
    #[arg(long, env = "TECNOBOT_MODEL")]
    model: Option<ModelSelection>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    // Fatal problems are reported on the normal terminal, before the UI starts.
    let config = load_config()?;
    let overrides = StartupOverrides {
        knowledge_path: args.knowledge,
        model: args.model,
    };
    let startup =
        bootstrap(&config, &overrides, &EnvSecrets).wrap_err("TecnoBot no puede iniciar")?;

    app::run(&startup.assistant, startup.model, &runtime)
}

/// Send logs to `~/.tecnobot/tecnobot-tui.log`.
fn init_tracing() -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("cannot create {}", dir.display()))?;
    let path = dir.join(LOG_FILE_NAME);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("cannot open log file {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tecnobot=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
