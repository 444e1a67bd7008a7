use crate::catalog::LanguageCatalog;
use crate::config::Config;
use crate::result::TranslationResult;
use console::style;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use std::path::PathBuf;

/// Where the text to translate comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    Typed(String),
    Recording(PathBuf),
}

pub struct InteractiveResult {
    pub source: TextSource,
    pub languages: Vec<String>,
}

pub fn run_interactive_wizard(
    config: &mut Config,
    catalog: &LanguageCatalog,
) -> anyhow::Result<InteractiveResult> {
    print_header();

    // Step 1: Text or recording
    let source = select_text_source(config)?;

    // Step 2: Target languages
    let languages = select_languages(catalog)?;

    // Step 3: Confirm
    print_summary(&source, &languages);

    if !Confirm::new()
        .with_prompt("Translate now?")
        .default(true)
        .interact()?
    {
        anyhow::bail!("Cancelled by user");
    }

    println!();

    Ok(InteractiveResult { source, languages })
}

fn print_header() {
    println!();
    println!(
        "{}",
        style("╔═══════════════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║        multitranslate - one text, many languages  ║").cyan()
    );
    println!(
        "{}",
        style("╚═══════════════════════════════════════════════════╝").cyan()
    );
    println!();
}

fn select_text_source(config: &mut Config) -> anyhow::Result<TextSource> {
    let options = ["Type text", "Speak (transcribe a WAV recording)"];
    let selection = Select::new()
        .with_prompt("Enter or speak text")
        .items(&options)
        .default(0)
        .interact()?;

    if selection == 0 {
        let text: String = Input::new()
            .with_prompt("Text")
            .validate_with(|input: &String| -> Result<(), &'static str> {
                if input.trim().is_empty() {
                    Err(crate::request::BLANK_TEXT_MESSAGE)
                } else {
                    Ok(())
                }
            })
            .interact_text()?;
        return Ok(TextSource::Typed(text.trim().to_string()));
    }

    if config.openai_api_key.is_none() {
        setup_openai_key(config)?;
    }

    let path: String = Input::new()
        .with_prompt("Path to WAV recording")
        .interact_text()?;
    let path = PathBuf::from(path.trim());
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    Ok(TextSource::Recording(path))
}

fn setup_openai_key(config: &mut Config) -> anyhow::Result<()> {
    println!("{} OpenAI API key not found", style("!").yellow());

    let api_key: String = Input::new()
        .with_prompt("Enter your OpenAI API key")
        .interact_text()?;

    if api_key.trim().is_empty() {
        anyhow::bail!("API key is required for speech input");
    }

    config.openai_api_key = Some(api_key.trim().to_string());

    if Confirm::new()
        .with_prompt("Save API key to config file?")
        .default(true)
        .interact()?
    {
        let path = config.save()?;
        println!(
            "{} API key saved to {}\n",
            style("✓").green(),
            path.display()
        );
    }

    Ok(())
}

fn select_languages(catalog: &LanguageCatalog) -> anyhow::Result<Vec<String>> {
    let items = language_items(catalog);

    loop {
        let chosen = MultiSelect::new()
            .with_prompt("Select languages (space to toggle, enter to confirm)")
            .items(&items)
            .interact()?;

        let languages: Vec<String> = chosen
            .into_iter()
            .filter_map(|i| catalog.entries().get(i).map(|e| e.name.clone()))
            .collect();

        if !languages.is_empty() {
            return Ok(languages);
        }
        println!(
            "{} {}",
            style("!").yellow(),
            crate::request::NO_LANGUAGES_MESSAGE
        );
    }
}

fn language_items(catalog: &LanguageCatalog) -> Vec<String> {
    catalog
        .entries()
        .iter()
        .map(|e| format!("{} ({})", e.name, e.code))
        .collect()
}

fn print_summary(source: &TextSource, languages: &[String]) {
    println!("\n{}", style("═══ Summary ═══").bold());
    match source {
        TextSource::Typed(text) => println!("  Text:      {}", style(text).cyan()),
        TextSource::Recording(path) => {
            println!("  Recording: {}", style(path.display()).cyan())
        }
    }
    println!("  Languages: {}", languages.join(", "));
    println!();
}

/// Render a result the way the translator screen lists it.
pub fn format_translations(result: &TranslationResult) -> String {
    let mut out = String::new();
    out.push_str("Translations:\n");
    for (name, outcome) in result.in_requested_order() {
        out.push_str(&format!("  {}: {}\n", name, outcome.display_text()));
    }
    out
}
