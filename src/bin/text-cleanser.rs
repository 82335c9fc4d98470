//! text-cleanser CLI binary.

use std::{path::PathBuf, process, sync::Arc};

use clap::{Parser, Subcommand};
use log::LevelFilter;
use serde::Serialize;
use text_cleanser::{
    CleanseError, CleanseRequest, CleanseResponse, CleansingService, ErrorResponse, FileStore,
    MemoryStore, Pipeline, PipelineConfig, RecordStore, SlangDictionary, UploadedFile,
};

/// Normalize text and CSV files: keep letters, collapse whitespace,
/// optionally replace slang with formal words.
#[derive(Parser, Debug, Clone)]
#[command(name = "text-cleanser")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Args {
    /// Pipeline config: a .json/.toml file or an inline JSON document
    #[arg(short, long, env = "TEXT_CLEANSER_CONFIG")]
    config: Option<String>,

    /// Verbosity level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    quiet: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Cleanse a single text
    Cleanse {
        text: String,
    },

    /// Clean every text column of a CSV file
    Upload {
        file: PathBuf,
    },

    /// Cleanse a text, then replace slang terms using a dictionary
    Substitute {
        text: String,

        /// Headerless slang,formal CSV (defaults to the configured one)
        #[arg(short, long)]
        dictionary: Option<PathBuf>,
    },
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

fn init_logging(level: LevelFilter) {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.filter_level(level),
    };
    builder.init();
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CleanseError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn run_request<S: RecordStore>(
    config: PipelineConfig,
    store: S,
    command: &Command,
    pretty: bool,
) -> Result<(), CleanseError> {
    let service = CleansingService::new(config, Arc::new(store))?;
    match command {
        Command::Cleanse { text } => {
            print_json(&service.cleanse(&CleanseRequest::new(text.as_str()))?, pretty)
        }
        Command::Upload { file } => {
            print_json(&service.upload(Some(UploadedFile::from_path(file)?))?, pretty)
        }
        Command::Substitute { .. } => Err(CleanseError::InvalidInput(
            "substitute does not use a record store".to_string(),
        )),
    }
}

fn execute(args: &Args) -> Result<(), CleanseError> {
    let config = match &args.config {
        Some(config) => PipelineConfig::from_config(config)?,
        None => PipelineConfig::default(),
    };

    match &args.command {
        Command::Cleanse { .. } | Command::Upload { .. } => match config.store_path.clone() {
            Some(path) => run_request(config, FileStore::open(path)?, &args.command, args.pretty),
            None => run_request(config, MemoryStore::new(), &args.command, args.pretty),
        },
        Command::Substitute { text, dictionary } => {
            let dictionary = match dictionary {
                Some(path) => SlangDictionary::from_path(path, &config.dictionary_encoding)?,
                None => config
                    .load_dictionary()?
                    .ok_or(CleanseError::MissingDictionary)?,
            };
            let pipeline = Pipeline::new()
                .with_dictionary(Arc::new(dictionary))
                .with_substitution(true)
                .build()?;
            let response = CleanseResponse {
                cleaned_text: pipeline.process(text),
            };
            print_json(&response, args.pretty)
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.log_level());

    if let Err(e) = execute(&args) {
        let error = ErrorResponse::from(&e);
        eprintln!(
            "{}",
            serde_json::to_string(&error).unwrap_or_else(|_| e.to_string())
        );
        process::exit(1);
    }
}
