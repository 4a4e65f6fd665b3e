mod cli;
mod client;
mod config;
mod converter;
mod dto;
mod error;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use crate::cli::Cli;
use crate::client::OpenAiClient;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config();
    info!(
        "Using configuration: input={:?}, output={:?}, model={}, language={}",
        config.input_path, config.output_path, config.transcription.model, config.transcription.language
    );

    let client = OpenAiClient::from_env().context("Failed to create transcription client")?;

    let written = converter::convert(&client, &config)
        .await
        .with_context(|| format!("Failed to transcribe {}", config.input_path.display()))?;

    println!("{} segments written to {}", written, config.output_path.display());
    Ok(())
}
