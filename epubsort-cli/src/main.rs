//! epubsort CLI - organize a folder of EPUB files by their metadata

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use epubsort_core::normalize::DEFAULT_CORPORATE_SUFFIX;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "epubsort")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Exit immediately after a fatal error instead of waiting for Enter
    #[arg(long, global = true)]
    no_pause: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move ebooks into folders named after their publisher
    Publisher {
        /// Directory to organize
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Corporate suffix removed from publisher names (empty to keep names as-is)
        #[arg(long, default_value = DEFAULT_CORPORATE_SUFFIX)]
        strip_suffix: String,

        /// Also write a timestamped run log to this file
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Print the final counters as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move ebooks into folders named after their language
    Language {
        /// Directory to organize
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Run log location [default: DIR/run_log.txt]
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Print the final counters as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename ebooks after their title
    Rename {
        /// Directory whose ebooks are renamed
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Print the final counters as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract plain text from ebooks
    ToText {
        /// EPUB files to extract (default: every EPUB in the current directory)
        files: Vec<String>,

        /// Directory the .txt files are written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Display the metadata of an ebook and the names derived from it
    Info {
        /// Input file path
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "epubsort_cli=debug,epubsort_core=debug"
    } else {
        "epubsort_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let pause = !cli.no_pause;
    match run(cli.command, cli.verbose) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\nFatal error: {:#}", e);
            if pause {
                wait_for_enter();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, verbose: bool) -> Result<()> {
    match command {
        Commands::Publisher {
            dir,
            strip_suffix,
            log_file,
            json,
        } => commands::publisher(&dir, &strip_suffix, log_file, json, verbose),

        Commands::Language {
            dir,
            log_file,
            json,
        } => commands::language(&dir, log_file, json, verbose),

        Commands::Rename { dir, json } => commands::rename(&dir, json),

        Commands::ToText { files, output_dir } => commands::to_text(&files, &output_dir),

        Commands::Info { input, json } => commands::info(&input, json),
    }
}

/// Keep a double-clicked console window open until the user has read the error
fn wait_for_enter() {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return;
    }
    eprintln!("Press Enter to exit...");
    let mut line = String::new();
    let _ = stdin.read_line(&mut line);
}
