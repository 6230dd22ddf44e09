//! gbp CLI
//!
//! Maintenance commands for the build planner backend: seeding the reference
//! dictionary from a dump file, dumping it back out, and running the server.

mod commands;
mod error;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use gbp_db::Store;
use gbp_server::Settings;

pub(crate) use error::CliError;

#[derive(Parser)]
#[command(name = "gbp")]
#[command(
    about = "Build planner backend: seed, dump and serve the reference dictionary",
    long_about = None
)]
struct Cli {
    /// Data directory of the live store (overrides the config file)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Settings file (defaults to ./gbp.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a dump file to the live store
    Seed {
        /// Dump file to read
        file: PathBuf,
    },

    /// Write the live reference data into a dump file and record it
    Dump {
        /// Dump file to write (tables are replaced)
        file: PathBuf,

        /// Notes stored with the dump record
        #[arg(default_value = "")]
        notes: String,
    },

    /// Print the SHA-256 digest of a dump file
    Hash {
        file: PathBuf,

        /// Also write the digest to this file
        dest: Option<PathBuf>,
    },

    /// List recorded dumps, newest first
    Dumps,

    /// Re-seed from a recorded dump
    Restore {
        /// Id of the dump record
        dump_id: String,
    },

    /// Run the HTTP server
    Serve {
        /// Listen address (overrides the config file)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Apply pending schema migrations and print the schema version
    Migrate,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Commands::Seed { file } => commands::seed::run_seed(&settings, &file),
        Commands::Dump { file, notes } => commands::dump::run_dump(&settings, &file, &notes),
        Commands::Hash { file, dest } => commands::hash::run_hash(&file, dest.as_deref()),
        Commands::Dumps => commands::dump::run_dumps(&settings),
        Commands::Restore { dump_id } => commands::seed::run_restore(&settings, &dump_id),
        Commands::Serve { addr } => commands::serve::run_serve(settings, addr),
        Commands::Migrate => commands::migrate::run_migrate(&settings),
    }
}

/// Console logger: info lines print bare, other levels carry a prefix.
/// `RUST_LOG` still overrides the level picked by the flags.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else if quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            log::Level::Error => {
                let style = buf.default_level_style(record.level());
                writeln!(buf, "{style}error{style:#}: {}", record.args())
            }
            level => {
                let style = buf.default_level_style(level);
                writeln!(
                    buf,
                    "{style}{}{style:#}: {}",
                    level.as_str().to_lowercase(),
                    record.args()
                )
            }
        })
        .init();
}

pub(crate) fn log_blank() {
    log::info!("");
}

fn load_settings(config: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Settings, CliError> {
    let mut settings = Settings::load(config).map_err(|e| CliError::config(e.to_string()))?;
    if let Some(data_dir) = data_dir {
        settings.data_dir = data_dir;
    }
    log::debug!("Data directory: {}", settings.data_dir.display());
    Ok(settings)
}

pub(crate) fn open_store(settings: &Settings) -> Result<Store, CliError> {
    Store::open(&settings.data_dir).map_err(|e| {
        CliError::store(format!(
            "Failed to open store at {}: {}",
            settings.data_dir.display(),
            e
        ))
    })
}
