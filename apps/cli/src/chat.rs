//! Interactive chat loop on stdin/stdout.

use std::io::Write;
use std::time::Duration;

use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tecnobot_core::persona::BOT_NAME;
use tecnobot_core::{Assistant, Session};
use tecnobot_shared::{CompletionProvider, ModelSelection, Role};
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line of user input, classified.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ChatInput {
    Empty,
    Exit,
    Help,
    ListModels,
    SetModel(String),
    History,
    Unknown(String),
    Message(String),
}

/// Classify a raw input line. Anything not starting with `/word` is a question.
pub(crate) fn parse_input(line: &str) -> ChatInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ChatInput::Empty;
    }
    if matches!(trimmed.to_lowercase().as_str(), "salir" | "exit" | "quit") {
        return ChatInput::Exit;
    }
    let message = || ChatInput::Message(line.trim_end_matches(['\r', '\n']).to_string());
    let Some(command) = trimmed.strip_prefix('/') else {
        return message();
    };

    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    // Only `/word` is a command; "/ ¿horario?" or "/8hs" is a question.
    if name.is_empty() || !name.chars().all(char::is_alphabetic) {
        return message();
    }
    let arg = parts.next().map(str::trim).unwrap_or_default();
    match name {
        "exit" | "salir" | "quit" => ChatInput::Exit,
        "help" | "ayuda" => ChatInput::Help,
        "models" | "modelos" => ChatInput::ListModels,
        "model" | "modelo" if !arg.is_empty() => ChatInput::SetModel(arg.to_string()),
        "model" | "modelo" => ChatInput::ListModels,
        "history" | "historial" => ChatInput::History,
        other => ChatInput::Unknown(other.to_string()),
    }
}

/// Busy indicator shown while waiting for the model.
pub(crate) struct Thinking {
    spinner: ProgressBar,
}

impl Thinking {
    pub(crate) fn start() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.set_message(format!("{BOT_NAME} está pensando..."));
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    pub(crate) fn finish(self) {
        self.spinner.finish_and_clear();
    }
}

/// Run the read–answer loop until EOF or an exit command.
pub(crate) async fn run_chat<P: CompletionProvider>(
    assistant: &Assistant<P>,
    model: ModelSelection,
) -> Result<()> {
    let mut session = assistant.new_session(model);

    println!("🎓 Chatbot del Instituto 13 de Julio  (modelo: {model}, /ayuda para comandos)");
    println!();
    print_last(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("🧑‍💻 › ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Exit => break,
            ChatInput::Help => print_help(),
            ChatInput::ListModels => print_models(session.model()),
            ChatInput::SetModel(name) => match name.parse::<ModelSelection>() {
                Ok(m) => {
                    session.set_model(m);
                    println!("Modelo cambiado a {m}.");
                }
                Err(e) => eprintln!("{e}"),
            },
            ChatInput::History => print_history(&session),
            ChatInput::Unknown(cmd) => eprintln!("Comando desconocido: /{cmd} (probá /ayuda)"),
            ChatInput::Message(text) => {
                let thinking = Thinking::start();
                let result = assistant.dispatch(&mut session, &text).await;
                thinking.finish();

                match result {
                    Ok(_) => print_last(&session),
                    Err(e) if e.is_dispatch() => {
                        eprintln!("Ocurrió un error al contactar la API de Groq: {e}");
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
        }
    }

    Ok(())
}

fn print_last(session: &Session) {
    if let Some(msg) = session.transcript().last() {
        if msg.role == Role::Assistant {
            println!("🤖 {BOT_NAME} › {}", msg.content);
            println!();
        }
    }
}

fn print_help() {
    println!("Escribí tu pregunta y presioná Enter.");
    println!("Las líneas que empiezan con /palabra son comandos:");
    println!("  /modelos          lista los modelos disponibles");
    println!("  /modelo <id>      cambia el modelo para las próximas preguntas");
    println!("  /historial        muestra la conversación");
    println!("  /salir            termina la sesión");
}

fn print_models(current: ModelSelection) {
    for model in ModelSelection::ALL {
        let marker = if model == current { "*" } else { " " };
        println!("{marker} {:<20} {}", model.as_str(), model.hint());
    }
}

fn print_history(session: &Session) {
    for msg in session.transcript().messages() {
        let who = match msg.role {
            Role::User => "🧑‍💻",
            Role::Assistant => "🤖",
            Role::System => "⚙",
        };
        println!("{who} {}", msg.content);
    }
    println!();
}
