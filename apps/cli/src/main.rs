//! TecnoBot CLI: virtual assistant for the Instituto 13 de Julio.
//!
//! Answers questions about the institute from a keyword knowledge file,
//! using a hosted language model for the wording.

mod chat;
mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    // A missing .env is normal; real variables still apply.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
