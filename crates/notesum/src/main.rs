//! Maintain a versioned `## Summary` section in Markdown notes.
//!
//! Settings (provider, model, summary length, API key) are read from
//! `$HOME/.config/notesum/settings.json` unless `--settings` points
//! elsewhere. The API key may instead come from `NOTESUM_API_KEY`,
//! `ANTHROPIC_API_KEY` or `OPENAI_API_KEY`.
//!
//! # Examples
//!
//! ```sh
//! # Summarize a note with the configured provider
//! notesum summarize notes/meeting.md
//!
//! # Same, but with a shorter summary from a different model
//! notesum summarize notes/meeting.md --length short --model claude-3-5-haiku-20241022
//!
//! # Write a summary produced elsewhere
//! some-tool notes/meeting.md | notesum apply notes/meeting.md --stdin
//!
//! # Preview without touching the file
//! notesum apply notes/meeting.md --summary "Decided to ship." --dry-run
//!
//! # Inspect and delete the section (history included)
//! notesum show notes/meeting.md
//! notesum remove notes/meeting.md
//!
//! # Choose a provider once
//! notesum config --provider openai --api-key sk-...
//! ```

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use notesum::config::Settings;
use notesum::files::{read_text, write_atomic};
use notesum::prompt::SummaryLength;
use notesum::provider::ProviderKind;
use notesum::section::{self, SummaryBlock};
use notesum::summarizer::SummarizerService;
use notesum::timestamp::{TIMESTAMP_FORMAT, current_timestamp, is_valid_timestamp};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Maintain a versioned summary section in Markdown notes.
#[derive(Parser)]
#[command(name = "notesum", version)]
struct Cli {
    /// Settings file (default: ~/.config/notesum/settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug). RUST_LOG applies otherwise.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a note with the configured provider and write the summary into it
    Summarize {
        file: PathBuf,

        /// Provider for this run
        #[arg(long, value_enum)]
        provider: Option<ProviderKind>,

        /// Model for this run
        #[arg(long)]
        model: Option<String>,

        /// Summary length for this run
        #[arg(long, value_enum)]
        length: Option<SummaryLength>,

        /// Print the updated note instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Write a given summary into a note
    Apply {
        file: PathBuf,

        #[command(flatten)]
        source: SummarySource,

        /// Timestamp for the new summary (YYYY-MM-DD HH:MM, default: now)
        #[arg(long)]
        timestamp: Option<String>,

        /// Print the updated note instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete the summary section and all of its history
    Remove {
        file: PathBuf,

        /// Print the updated note instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the current summary and its history
    Show { file: PathBuf },

    /// Update and print settings
    Config {
        #[arg(long, value_enum)]
        provider: Option<ProviderKind>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long, value_enum)]
        length: Option<SummaryLength>,

        /// Stored in the settings file; prefer an environment variable
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SummarySource {
    /// Summary text
    #[arg(long)]
    summary: Option<String>,

    /// Read the summary from a file
    #[arg(long)]
    summary_file: Option<PathBuf>,

    /// Read the summary from stdin
    #[arg(long)]
    stdin: bool,
}

impl SummarySource {
    fn read(&self) -> Result<String, String> {
        let text = if let Some(ref text) = self.summary {
            text.clone()
        } else if let Some(ref path) = self.summary_file {
            read_text(path)?
        } else {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            buf
        };
        if text.trim().is_empty() {
            return Err("the summary is empty".to_string());
        }
        Ok(text)
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Write `updated` back to `file`, or print it for a dry run.
fn write_back(file: &Path, updated: &str, dry_run: bool) -> Result<(), String> {
    if dry_run {
        print!("{updated}");
        return Ok(());
    }
    write_atomic(file, updated)?;
    info!("updated {}", file.display());
    Ok(())
}

async fn summarize(
    settings: Settings,
    file: &Path,
    provider: Option<ProviderKind>,
    model: Option<String>,
    length: Option<SummaryLength>,
    dry_run: bool,
) -> Result<(), String> {
    let mut settings = settings;
    if let Some(provider) = provider {
        settings.set_provider(provider);
    }
    if let Some(model) = model {
        settings = settings.with_model(model);
    }
    if let Some(length) = length {
        settings = settings.with_summary_length(length);
    }

    let options = settings.summary_options();
    if options.api_key.is_empty() {
        return Err(format!(
            "API key is not configured (run `notesum config --api-key ...` or set {})",
            settings.provider.api_key_env()
        ));
    }

    let note = read_text(file)?;
    let service = SummarizerService::new(settings.provider)?;
    info!(
        "summarizing {} with {} ({}, {})",
        file.display(),
        settings.provider,
        settings.model,
        settings.summary_length
    );
    let updated = service
        .summarize_note(&note, &options, &current_timestamp())
        .await?;
    write_back(file, &updated, dry_run)
}

fn apply(
    file: &Path,
    source: &SummarySource,
    timestamp: Option<String>,
    dry_run: bool,
) -> Result<(), String> {
    let timestamp = match timestamp {
        Some(ts) if is_valid_timestamp(&ts) => ts,
        Some(ts) => {
            return Err(format!(
                "invalid timestamp '{ts}' (expected {TIMESTAMP_FORMAT})"
            ));
        }
        None => current_timestamp(),
    };
    let summary = source.read()?;
    let note = read_text(file)?;
    let updated = section::upsert(&note, &summary, &timestamp);
    write_back(file, &updated, dry_run)
}

fn remove(file: &Path, dry_run: bool) -> Result<(), String> {
    let note = read_text(file)?;
    let located = section::locate(&note);
    let removal = section::remove(&note, located.as_ref());
    if !removal.removed {
        eprintln!("No summary section in {}", file.display());
        return Ok(());
    }
    write_back(file, &removal.document, dry_run)
}

fn show(file: &Path) -> Result<(), String> {
    let note = read_text(file)?;
    let Some(located) = section::locate(&note) else {
        return Err(format!("no summary section in {}", file.display()));
    };
    let block = SummaryBlock::parse(&located.raw_text);

    println!(
        "Lines {}-{} (updated {})",
        located.start_line + 1,
        located.end_line + 1,
        block.timestamp.as_deref().unwrap_or("unknown")
    );
    println!();
    println!("{}", block.content);

    let entries = block
        .history
        .as_ref()
        .map(|h| h.entries())
        .unwrap_or_default();
    if !entries.is_empty() {
        println!();
        println!("History ({} entries, oldest first):", entries.len());
        for entry in &entries {
            println!();
            println!("[{}]", entry.timestamp);
            println!("{}", entry.content);
        }
    }
    Ok(())
}

fn config(
    settings_path: &Path,
    mut settings: Settings,
    provider: Option<ProviderKind>,
    model: Option<String>,
    length: Option<SummaryLength>,
    api_key: Option<String>,
) -> Result<(), String> {
    let changed = provider.is_some() || model.is_some() || length.is_some() || api_key.is_some();
    if let Some(provider) = provider {
        settings.set_provider(provider);
    }
    if let Some(model) = model {
        if !settings.provider.models().contains(&model.as_str()) {
            eprintln!(
                "  Warning: '{model}' is not a known {} model",
                settings.provider
            );
        }
        settings.model = model;
    }
    if let Some(length) = length {
        settings.summary_length = length;
    }
    if let Some(api_key) = api_key {
        settings.api_key = api_key.trim().to_string();
    }

    if changed {
        settings.first_run_complete = true;
        settings.save(settings_path)?;
        eprintln!("Saved {}", settings_path.display());
    }

    let key_source = if settings.api_key.is_empty() && !settings.resolve_api_key().is_empty() {
        " (from environment)"
    } else {
        ""
    };
    println!("provider: {}", settings.provider);
    println!("model:    {}", settings.model);
    println!("length:   {}", settings.summary_length);
    println!("api key:  {}{key_source}", settings.masked_api_key());
    Ok(())
}

async fn run(cli: Cli) -> Result<(), String> {
    let settings_path = cli.settings.unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path)?;

    match cli.command {
        Command::Summarize {
            file,
            provider,
            model,
            length,
            dry_run,
        } => summarize(settings, &file, provider, model, length, dry_run).await,
        Command::Apply {
            file,
            source,
            timestamp,
            dry_run,
        } => apply(&file, &source, timestamp, dry_run),
        Command::Remove { file, dry_run } => remove(&file, dry_run),
        Command::Show { file } => show(&file),
        Command::Config {
            provider,
            model,
            length,
            api_key,
        } => config(&settings_path, settings, provider, model, length, api_key),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
