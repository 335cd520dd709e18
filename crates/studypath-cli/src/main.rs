//! studypath CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

mod commands;

use commands::answers::Section;

#[derive(Parser)]
#[command(
    name = "studypath",
    version,
    about = "Spaced-repetition study tracker and exam score predictor"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where to find the catalog, the learner data and the learner.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Catalog TOML file or directory (overrides config)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Learner data file (overrides config)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Learner id (overrides config)
    #[arg(long)]
    pub user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example catalog
    Init,

    /// Validate catalog TOML files
    Validate {
        /// Path to catalog file or directory
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Record a vocabulary review
    Review {
        /// Vocabulary item id
        word: u64,

        /// The word was not remembered
        #[arg(long)]
        forgot: bool,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Generate a vocabulary quiz
    Quiz {
        /// Number of questions (default: quiz_size from config)
        #[arg(long)]
        count: Option<usize>,

        /// Only quiz words of this difficulty
        #[arg(long)]
        difficulty: Option<u8>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Grade vocabulary quiz answers
    QuizSubmit {
        /// JSON file with `[{"word_id": .., "selected_option": ".."}]`
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Grade answers for a listening item
    Listening {
        /// Listening item id
        id: u64,

        /// Answers as `question=answer` pairs, e.g. "1=A,2=C"
        #[arg(long)]
        answers: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Grade answers for a reading item
    Reading {
        /// Reading item id
        id: u64,

        /// Answers as `question=answer` pairs, e.g. "1=B,2=D"
        #[arg(long)]
        answers: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Grade a writing answer
    Write {
        /// Writing prompt id
        id: u64,

        /// Answer text
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the answer from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show current and target proficiency per domain
    Skills {
        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show weak points and the learning plan
    Plan {
        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Predict the exam score
    Predict {
        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show the progress snapshot
    Progress {
        /// Recompute the snapshot from records
        #[arg(long)]
        refresh: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Export a progress report
    Report {
        /// Output format: json, html, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Output directory
        #[arg(long, default_value = "./studypath-reports")]
        output: PathBuf,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Compare two progress reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Regression threshold in proficiency points (default: from config)
        #[arg(long)]
        threshold: Option<f64>,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("studypath=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::Review {
            word,
            forgot,
            store,
        } => commands::review::execute(word, !forgot, store).await,
        Commands::Quiz {
            count,
            difficulty,
            format,
            store,
        } => commands::quiz::execute(count, difficulty, format, store).await,
        Commands::QuizSubmit {
            answers,
            format,
            store,
        } => commands::quiz::submit(answers, format, store).await,
        Commands::Listening {
            id,
            answers,
            format,
            store,
        } => {
            commands::answers::execute(Section::Listening, id, answers, format, store).await
        }
        Commands::Reading {
            id,
            answers,
            format,
            store,
        } => {
            commands::answers::execute(Section::Reading, id, answers, format, store).await
        }
        Commands::Write {
            id,
            text,
            file,
            format,
            store,
        } => commands::write::execute(id, text, file, format, store).await,
        Commands::Skills { format, store } => commands::analysis::skills(format, store).await,
        Commands::Plan { format, store } => commands::analysis::plan(format, store).await,
        Commands::Predict { format, store } => commands::analysis::predict(format, store).await,
        Commands::Progress {
            refresh,
            format,
            store,
        } => commands::analysis::progress(refresh, format, store).await,
        Commands::Report {
            format,
            output,
            store,
        } => commands::report::execute(format, output, store).await,
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
            config,
        } => commands::compare::execute(
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
            config,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
