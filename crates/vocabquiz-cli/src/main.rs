//! vocabquiz CLI — interactive vocabulary quizzes in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "vocabquiz",
    version,
    about = "English-Vietnamese vocabulary quizzes and flashcards"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive quiz session
    Play {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Extra directory of predefined topic files
        #[arg(long)]
        topics: Option<PathBuf>,

        /// Saved-topics JSON file
        #[arg(long)]
        store: Option<PathBuf>,

        /// Augmentation provider (e.g. "gemini", "openai", "ollama", "mock")
        #[arg(long)]
        provider: Option<String>,

        /// Seed for reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Directory for exported quiz reports
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// List predefined and saved topics
    Topics {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Extra directory of predefined topic files
        #[arg(long)]
        topics: Option<PathBuf>,

        /// Saved-topics JSON file
        #[arg(long)]
        store: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate topic TOML files
    Validate {
        /// Path to a topic file or directory
        #[arg(long)]
        topics: PathBuf,
    },

    /// Create starter config and example topic
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vocabquiz=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            config,
            topics,
            store,
            provider,
            seed,
            export,
        } => {
            commands::play::execute(commands::play::PlayOptions {
                config,
                topics,
                store,
                provider,
                seed,
                export,
            })
            .await
        }
        Commands::Topics {
            config,
            topics,
            store,
            json,
        } => commands::topics::execute(config, topics, store, json),
        Commands::Validate { topics } => commands::validate::execute(topics),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
