use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voice_journal::{
    filter_entries, Config, DurationProbe, EntryWithTopics, FileDurationProbe, FileNameProvider,
    FilterQuery, Mood, SortOrder, TimestampFileNames, TopicId,
};

#[derive(Parser)]
#[command(name = "voice-journal", version, about = "Audio journal tooling")]
struct Cli {
    /// Configuration file (TOML, extension optional)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Filter and sort entries from a JSON export
    Filter {
        #[arg(long)]
        entries: PathBuf,
        #[arg(long = "mood")]
        moods: Vec<Mood>,
        #[arg(long = "topic")]
        topics: Vec<TopicId>,
        #[arg(long, default_value = "")]
        query: String,
        /// Inclusive lower bound, epoch ms
        #[arg(long)]
        from: Option<i64>,
        /// Inclusive upper bound, epoch ms
        #[arg(long)]
        to: Option<i64>,
        #[arg(long)]
        sort: Option<SortOrder>,
    },
    /// Print the duration of an audio file
    Probe { file: PathBuf },
    /// Print a fresh audio file name
    Name,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Filter {
            entries,
            moods,
            topics,
            query,
            from,
            to,
            sort,
        } => {
            let raw = std::fs::read_to_string(&entries)
                .with_context(|| format!("Failed to read {}", entries.display()))?;
            let items: Vec<EntryWithTopics> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse entries from {}", entries.display()))?;
            info!("Loaded {} entries", items.len());

            let matched = filter_entries(&FilterQuery {
                entries: &items,
                moods: &moods,
                topic_ids: &topics,
                text: &query,
                from_millis: from,
                to_millis: to,
                sort: sort.unwrap_or(cfg.journal.default_sort),
            });
            let titles: Vec<&str> = matched.iter().map(|item| item.entry.title.as_str()).collect();
            println!("{}", serde_json::to_string_pretty(&titles)?);
        }
        Command::Probe { file } => match FileDurationProbe.duration_ms(&file) {
            Some(ms) => println!("{ms}"),
            None => anyhow::bail!("Could not read the duration of {}", file.display()),
        },
        Command::Name => {
            println!("{}", TimestampFileNames::from_config(&cfg.storage).new_audio_file_name());
        }
    }

    Ok(())
}
