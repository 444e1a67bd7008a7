use anyhow::{Context, Result};
use clap::Parser;
use multitranslate::config::{Config, Provider};
use multitranslate::interactive::{format_translations, run_interactive_wizard, TextSource};
use multitranslate::speech::{listen_until, WhisperRecognizer};
use multitranslate::{create_engine, MultiTranslator, TranslationRequest};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "multitranslate")]
#[command(version, about = "Translate one text into many languages at once")]
#[command(
    long_about = "Translate typed text, or speech from a WAV recording, into several target languages using LibreTranslate or Google Gemini."
)]
struct Cli {
    /// Text to translate
    text: Option<String>,

    /// Target languages by display name (e.g. Hindi,French)
    #[arg(short, long, value_delimiter = ',')]
    languages: Vec<String>,

    /// Transcribe this WAV recording instead of taking TEXT
    #[arg(short, long, conflicts_with = "text")]
    audio: Option<PathBuf>,

    /// Translation provider: libre, gemini
    #[arg(short, long)]
    provider: Option<String>,

    /// Source language code (e.g., en)
    #[arg(short, long)]
    source: Option<String>,

    /// Number of languages translated at once
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// List the selectable languages and exit
    #[arg(long)]
    list_languages: bool,

    /// Pick text and languages interactively
    #[arg(short, long)]
    interactive: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// Resolves on Ctrl+C. Never resolves if the signal cannot be watched.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn recognize_recording(config: &Config, path: PathBuf) -> Result<String> {
    let api_key = config
        .openai_api_key
        .clone()
        .context("OPENAI_API_KEY not set; it is required for speech input")?;

    let recognizer = WhisperRecognizer::new(api_key, path)
        .with_language(config.source_language.clone())
        .with_timeout(config.timeout())?;

    let text = listen_until(&recognizer, interrupted())
        .await
        .context("Speech recognition failed")?;
    info!("Recognised: {}", text);
    Ok(text)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;

    if let Some(ref provider) = cli.provider {
        config.provider = provider
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
    }
    if let Some(source) = cli.source {
        config.source_language = source;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }

    let catalog = config.catalog();

    if cli.list_languages {
        for entry in catalog.entries() {
            println!("{:<12} {}", entry.name, entry.code);
        }
        return Ok(());
    }

    let (source, languages) = if cli.interactive {
        let answers = run_interactive_wizard(&mut config, &catalog)?;
        (answers.source, answers.languages)
    } else {
        let source = match (cli.audio, cli.text) {
            (Some(path), _) => TextSource::Recording(path),
            (None, Some(text)) => TextSource::Typed(text),
            (None, None) => anyhow::bail!("Provide TEXT, --audio FILE or --interactive"),
        };
        (source, cli.languages)
    };

    let text = match source {
        TextSource::Typed(text) => text,
        TextSource::Recording(path) => {
            if !path.exists() {
                anyhow::bail!("Recording not found: {}", path.display());
            }
            recognize_recording(&config, path).await?
        }
    };

    let request = TranslationRequest::new(text, languages)?;

    let provider: Provider = config.provider;
    config
        .validate(provider)
        .context("Configuration validation failed")?;

    info!("Provider: {}", provider);
    info!("Source:   {}", config.source_language);
    info!("Targets:  {}", request.target_languages().join(", "));

    let engine = create_engine(provider, &config)?;
    let translator = MultiTranslator::new(
        Arc::new(catalog),
        engine,
        config.source_language.clone(),
    )
    .with_concurrency(config.concurrency)
    .with_progress(!cli.json);

    let result = tokio::select! {
        result = translator.translate_request(&request) => result,
        _ = interrupted() => anyhow::bail!("Interrupted"),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        print!("{}", format_translations(&result));
        if result.is_degraded() {
            println!();
            println!("  Note: no language could be translated");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_language_list() {
        let cli = Cli::parse_from(["multitranslate", "Hello", "-l", "Hindi,French"]);
        assert_eq!(cli.text.as_deref(), Some("Hello"));
        assert_eq!(cli.languages, vec!["Hindi", "French"]);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_audio_conflicts_with_text() {
        let parsed = Cli::try_parse_from(["multitranslate", "Hello", "--audio", "a.wav"]);
        assert!(parsed.is_err());
    }
}
