//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use tecnobot_core::bootstrap::{self, StartupOverrides};
use tecnobot_core::retriever::retrieve_detailed;
use tecnobot_shared::{AppConfig, EnvSecrets, ModelSelection, init_config, load_config};
use tracing::info;

use crate::chat;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// TecnoBot, the virtual assistant for the Instituto 13 de Julio.
#[derive(Parser)]
#[command(
    name = "tecnobot",
    version,
    about = "Chat with TecnoBot, the Instituto 13 de Julio virtual assistant.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Knowledge file (keyword → text JSON). Overrides the config file.
    #[arg(long, global = true, env = "TECNOBOT_KNOWLEDGE")]
    pub knowledge: Option<PathBuf>,

    /// Model to start with. Overrides the config file.
    #[arg(long, global = true, env = "TECNOBOT_MODEL")]
    pub model: Option<ModelSelection>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `chat` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Start an interactive conversation.
    Chat,

    /// Ask a single question and print the answer.
    Ask {
        /// The question.
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },

    /// Show the knowledge context a question would retrieve.
    Context {
        /// The question.
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,
    },

    /// List the available models.
    Models,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

impl Cli {
    fn overrides(&self) -> StartupOverrides {
        StartupOverrides {
            knowledge_path: self.knowledge.clone(),
            model: self.model,
        }
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so they never mix
/// with answers on stdout.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "tecnobot=warn",
        1 => "tecnobot=info",
        2 => "tecnobot=debug",
        _ => "tecnobot=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let overrides = cli.overrides();
    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => cmd_chat(&overrides).await,
        Command::Ask { question } => cmd_ask(&overrides, &question.join(" ")).await,
        Command::Context { query } => cmd_context(&overrides, &query.join(" ")),
        Command::Models => cmd_models(&overrides),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Config, knowledge and credential, or a fatal error before any input is read.
fn startup(overrides: &StartupOverrides) -> Result<bootstrap::Startup> {
    let config = load_config()?;
    bootstrap::bootstrap(&config, overrides, &EnvSecrets)
        .wrap_err("TecnoBot no puede iniciar")
}

async fn cmd_chat(overrides: &StartupOverrides) -> Result<()> {
    let startup = startup(overrides)?;
    info!(model = %startup.model, "starting interactive chat");
    chat::run_chat(&startup.assistant, startup.model).await
}

async fn cmd_ask(overrides: &StartupOverrides, question: &str) -> Result<()> {
    let startup = startup(overrides)?;
    let assistant = &startup.assistant;
    let mut session = assistant.new_session(startup.model);

    let thinking = chat::Thinking::start();
    let result = assistant.dispatch(&mut session, question).await;
    thinking.finish();

    let completion = result.wrap_err("Ocurrió un error al contactar la API de Groq")?;
    println!("{}", completion.text);
    Ok(())
}

fn cmd_context(overrides: &StartupOverrides, query: &str) -> Result<()> {
    let config = load_config()?;
    let kb = bootstrap::load_knowledge(&config, overrides)
        .wrap_err("TecnoBot no puede iniciar")?;

    let retrieval = retrieve_detailed(query, &kb, &config.defaults.fallback_key);

    if retrieval.used_fallback {
        println!("Sin coincidencias; contexto por defecto ('{}'):", config.defaults.fallback_key);
    } else {
        println!("Palabras clave: {}", retrieval.matched.join(", "));
    }
    println!();
    print!("{}", retrieval.context);
    if !retrieval.context.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn cmd_models(overrides: &StartupOverrides) -> Result<()> {
    let config: AppConfig = load_config()?;
    let current = bootstrap::initial_model(&config, overrides);
    for model in ModelSelection::ALL {
        let marker = if model == current { "*" } else { " " };
        println!("{marker} {:<20} {}", model.as_str(), model.hint());
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
