use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::PathBuf;
use symdex::group::group;
use symdex::index::loader::{load_all, resolve_paths};
use symdex::index::stats::IndexStats;
use symdex::index::EntryStore;
use symdex::output;
use symdex::query::{MatchMode, QueryEngine, SearchOptions};
use symdex::utils::AppConfig;
use termcolor::ColorChoice;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "symdex")]
#[command(about = "Fast symbol lookup over generated documentation search indexes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up symbols by name
    Search {
        /// Query text (a full or partial symbol name)
        query: String,

        /// Shard files or directories of shards
        #[arg(short, long = "index")]
        index: Vec<PathBuf>,

        /// Match anywhere in the name instead of at the start
        #[arg(long, conflicts_with = "prefix")]
        substring: bool,

        /// Match at the start of the name, overriding the config file
        #[arg(long)]
        prefix: bool,

        /// Match case exactly
        #[arg(short = 's', long, conflicts_with = "ignore_case")]
        case_sensitive: bool,

        /// Ignore case, overriding the config file
        #[arg(long)]
        ignore_case: bool,

        /// Maximum number of matches
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Only query shards of this domain (e.g. `classes`)
        #[arg(short, long)]
        domain: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// When to use colors
        #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
        color: ColorMode,
    },
    /// Load and validate shards
    Check {
        /// Shard files or directories of shards
        #[arg(short, long = "index")]
        index: Vec<PathBuf>,
    },
    /// Show index statistics
    Stats {
        /// Shard files or directories of shards
        #[arg(short, long = "index")]
        index: Vec<PathBuf>,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl From<ColorMode> for ColorChoice {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Commands::Search {
            query,
            index,
            substring,
            prefix,
            case_sensitive,
            ignore_case,
            limit,
            domain,
            json,
            color,
        } => {
            let store = open_store(&config, &index)?;
            let options = SearchOptions {
                case_sensitive: if case_sensitive {
                    true
                } else if ignore_case {
                    false
                } else {
                    config.case_sensitive
                },
                max_results: Some(limit.unwrap_or(config.default_limit)),
                match_mode: if substring {
                    MatchMode::Substring
                } else if prefix {
                    MatchMode::Prefix
                } else {
                    config.match_mode
                },
                domain,
            };
            debug!(query = %query, mode = %options.match_mode, "searching");

            let engine = QueryEngine::with_scoring_weights(&store, config.scoring.clone());
            let matches = engine.search(&query, &options)?;
            let groups = group(&matches);

            if json {
                output::write_json(&mut io::stdout().lock(), &query, &groups)?;
            } else if groups.is_empty() {
                eprintln!("No matches for '{}'", query);
            } else {
                output::print_groups(&groups, color.into())?;
            }
        }
        Commands::Check { index } => {
            let store = open_store(&config, &index)?;
            for shard in store.shards() {
                println!(
                    "{}: {} entries, {} targets",
                    shard.shard_id(),
                    shard.len(),
                    shard.target_count()
                );
            }
            println!("OK: {} shards, {} entries", store.shards().len(), store.len());
        }
        Commands::Stats { index, json } => {
            let store = open_store(&config, &index)?;
            let stats = IndexStats::collect(&store);
            if json {
                serde_json::to_writer_pretty(io::stdout().lock(), &stats)?;
                println!();
            } else {
                stats.print(&mut io::stdout().lock())?;
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Load every shard named on the command line, or in the config when none are
fn open_store(config: &AppConfig, inputs: &[PathBuf]) -> Result<EntryStore> {
    let inputs = if inputs.is_empty() {
        config.index_paths.as_slice()
    } else {
        inputs
    };
    if inputs.is_empty() {
        bail!("No index given. Pass --index <FILE|DIR> or set index_paths in the config file.");
    }

    let paths = resolve_paths(inputs, &config.shard_patterns)?;
    if paths.is_empty() {
        bail!("No shard files found in the given index paths");
    }

    let shards = load_all(&paths).context("Failed to load index shards")?;
    let store = EntryStore::from_shards(shards).context("Failed to build entry store")?;
    Ok(store)
}
