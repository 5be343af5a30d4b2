//! is-speech
//!
//! Icelandic text-to-speech and speech-to-text from the command line.

#![allow(clippy::print_stderr)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use is_speech::{TiroSpeechProvider, WhisperCppProvider};
use is_speech_cli::{
    Cli, CliError, Commands, Settings, SttRequest, SystemPlayer, TtsRequest,
    log_filter_from_verbosity, read_piped_stdin, resolve_tts_text, run_stt, run_tts,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter_from_verbosity(cli.verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref()).map_err(CliError::from)?;
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Tts(args) => {
            let stdin = read_piped_stdin().context("failed to read standard input")?;
            let text = resolve_tts_text(&args, stdin)?;
            let request = TtsRequest::from_args(&args, text)?;

            let tts = TiroSpeechProvider::new(settings.tts.clone()).map_err(CliError::from)?;
            let player = SystemPlayer::new().with_preferred(settings.player.clone());

            let outcome = run_tts(&tts, &player, &request, &mut stdout).await?;
            if let Some(warning) = outcome.warning() {
                eprintln!("Warning: {warning}");
            }
        },

        Commands::Stt(args) => {
            let config = settings.whisper_config(args.model_path.as_deref());
            let stt = WhisperCppProvider::new(config).map_err(CliError::from)?;

            run_stt(&stt, &SttRequest::from(&args), &mut stdout).await?;
        },
    }

    Ok(())
}
